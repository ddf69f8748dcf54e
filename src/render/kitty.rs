use crate::render::{draw_overlay_popup, write_bg_rgb, write_hud_line, Frame, Renderer};
use anyhow::Context;
use base64::Engine;
use std::io::Write;

// 3072 raw bytes -> 4096 bytes of base64 per escape, the protocol's chunk limit.
const RAW_CHUNK: usize = 3 * 1024;

/// Kitty graphics protocol, direct transmission.
///
/// The surface goes out with its alpha channel intact, so the backdrop cells
/// painted underneath show through the translucent field.
pub struct KittyRenderer {
    image_id: u32,
    placement_id: u32,
    scratch: Vec<u8>,
    // Text chrome drawn last frame that the next frame must wipe.
    popup_shown: bool,
    hud_rows_drawn: u16,
}

impl Default for KittyRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl KittyRenderer {
    pub fn new() -> Self {
        Self {
            image_id: 1,
            placement_id: 1,
            scratch: Vec::new(),
            popup_shown: false,
            hud_rows_drawn: 0,
        }
    }

    /// Escape that removes every image this renderer placed.
    pub fn delete_all() -> &'static [u8] {
        b"\x1b_Ga=d,d=A\x1b\\"
    }
}

impl Renderer for KittyRenderer {
    fn name(&self) -> &'static str {
        "kitty"
    }

    fn pixels_per_cell(&self) -> (usize, usize) {
        (2, 4)
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        let cols = frame.term_cols as usize;
        let visual_rows = frame.visual_rows as usize;
        let w = frame.pixel_width;
        let h = frame.pixel_height;

        if cols == 0 || visual_rows == 0 {
            return Ok(());
        }

        if frame.sync_updates {
            out.write_all(b"\x1b[?2026h")?;
        }

        if frame.hud_rows != self.hud_rows_drawn || self.popup_shown {
            clear_text_rows(out, frame.term_rows as usize)?;
        }

        // Backdrop cells sit under the image.
        out.write_all(b"\x1b[0m")?;
        let bg = frame.backdrop;
        write_bg_rgb(out, bg.0, bg.1, bg.2)?;
        for row in 1..=visual_rows {
            write!(out, "\x1b[{};1H\x1b[2K", row)?;
        }
        out.write_all(b"\x1b[0m\x1b[H")?;

        let need = w.saturating_mul(h).saturating_mul(4);
        if w > 0 && h > 0 && frame.pixels_rgba.len() >= need {
            let target = Placement {
                image: self.image_id,
                placement: self.placement_id,
                cols,
                rows: visual_rows,
            };
            target.transmit(out, &frame.pixels_rgba[..need], (w, h), &mut self.scratch)?;
        } else {
            write!(out, "\x1b_Ga=d,d=I,i={}\x1b\\", self.image_id)?;
        }

        let mut hud_lines = frame.hud.lines();
        for i in 0..(frame.hud_rows as usize) {
            write_hud_line(out, visual_rows + i + 1, cols, hud_lines.next())?;
        }

        if let Some(text) = frame.overlay {
            draw_overlay_popup(out, frame.term_cols, frame.term_rows, text)?;
        }
        self.popup_shown = frame.overlay.is_some();
        self.hud_rows_drawn = frame.hud_rows;

        if frame.sync_updates {
            out.write_all(b"\x1b[?2026l")?;
        }
        out.flush()?;
        Ok(())
    }
}

/// Where an image lands: ids plus the cell rectangle it is stretched over.
#[derive(Debug, Clone, Copy)]
struct Placement {
    image: u32,
    placement: u32,
    cols: usize,
    rows: usize,
}

impl Placement {
    /// Sends `rgba` as a chunked `a=T` transmission; `scratch` holds the base64 text.
    fn transmit(
        &self,
        out: &mut dyn Write,
        rgba: &[u8],
        size: (usize, usize),
        scratch: &mut Vec<u8>,
    ) -> anyhow::Result<()> {
        let engine = &base64::engine::general_purpose::STANDARD;
        let total = rgba.chunks(RAW_CHUNK).len();
        for (n, chunk) in rgba.chunks(RAW_CHUNK).enumerate() {
            scratch.resize(chunk.len().div_ceil(3) * 4, 0);
            let len = engine
                .encode_slice(chunk, scratch.as_mut_slice())
                .context("base64 encode surface")?;

            let more = u8::from(n + 1 < total);
            if n == 0 {
                write!(
                    out,
                    "\x1b_Ga=T,f=32,s={},v={},t=d,i={},p={},c={},r={},C=1,q=2,z=1,m={more};",
                    size.0, size.1, self.image, self.placement, self.cols, self.rows
                )?;
            } else {
                write!(out, "\x1b_Gm={more};")?;
            }
            out.write_all(&scratch[..len])?;
            out.write_all(b"\x1b\\")?;
        }
        Ok(())
    }
}

fn clear_text_rows(out: &mut dyn Write, rows: usize) -> anyhow::Result<()> {
    for row in 1..=rows {
        write!(out, "\x1b[{};1H\x1b[0m\x1b[2K", row)?;
    }
    Ok(())
}
