use crate::render::{
    luma_u8, text_frame_begin, text_frame_end, write_bg_rgb, write_fg_rgb, Frame, Renderer,
};
use std::io::Write;

// Dark -> bright ramp. ASCII-safe and compact.
const RAMP: &[u8] = b" .,:;irsXA253hMHGS#9B&@";

pub struct AsciiRenderer {
    last_fg: Option<(u8, u8, u8)>,
}

impl Default for AsciiRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl AsciiRenderer {
    pub fn new() -> Self {
        Self { last_fg: None }
    }
}

impl Renderer for AsciiRenderer {
    fn name(&self) -> &'static str {
        "ascii"
    }

    fn pixels_per_cell(&self) -> (usize, usize) {
        (1, 1)
    }

    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()> {
        let Some((cols, visual_rows)) = text_frame_begin(frame, out)? else {
            return Ok(());
        };

        self.last_fg = None;
        let bg = frame.backdrop;
        write_bg_rgb(out, bg.0, bg.1, bg.2)?;

        for y in 0..visual_rows {
            for x in 0..cols {
                let fg = frame.sample_flat(x, y, cols, visual_rows);
                let l = luma_u8(fg.0, fg.1, fg.2) as usize;
                let ch = RAMP[l * (RAMP.len() - 1) / 255];

                if self.last_fg != Some(fg) {
                    write_fg_rgb(out, fg.0, fg.1, fg.2)?;
                    self.last_fg = Some(fg);
                }
                out.write_all(&[ch])?;
            }
            out.write_all(b"\r\n")?;
        }

        text_frame_end(frame, cols, visual_rows, out)
    }
}
