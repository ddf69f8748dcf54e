mod ascii;
mod halfblock;
mod kitty;

pub use ascii::AsciiRenderer;
pub use halfblock::HalfBlockRenderer;
pub use kitty::KittyRenderer;

use crate::config::Rgb;
use std::io::Write;

/// One presentable frame: a straight-alpha RGBA surface plus terminal chrome.
pub struct Frame<'a> {
    pub term_cols: u16,
    pub term_rows: u16,
    pub visual_rows: u16,
    pub pixel_width: usize,
    pub pixel_height: usize,
    /// May be shorter than `w*h*4` (for example before activation); missing
    /// pixels are treated as fully transparent.
    pub pixels_rgba: &'a [u8],
    /// Shown wherever the surface is not fully opaque.
    pub backdrop: Rgb,
    pub hud: &'a str,
    pub hud_rows: u16,
    pub overlay: Option<&'a str>,
    pub sync_updates: bool,
}

impl Frame<'_> {
    fn has_pixels(&self) -> bool {
        self.pixel_width > 0
            && self.pixel_height > 0
            && self.pixels_rgba.len() >= self.pixel_width * self.pixel_height * 4
    }

    /// Nearest surface sample for cell-grid position `(gx, gy)` of a
    /// `grid_w`×`grid_h` grid, flattened over the backdrop.
    pub fn sample_flat(&self, gx: usize, gy: usize, grid_w: usize, grid_h: usize) -> (u8, u8, u8) {
        if !self.has_pixels() || grid_w == 0 || grid_h == 0 {
            return (self.backdrop.0, self.backdrop.1, self.backdrop.2);
        }
        let sx = ((gx * 2 + 1) * self.pixel_width / (grid_w * 2)).min(self.pixel_width - 1);
        let sy = ((gy * 2 + 1) * self.pixel_height / (grid_h * 2)).min(self.pixel_height - 1);
        let i = (sy * self.pixel_width + sx) * 4;
        let p = &self.pixels_rgba[i..i + 4];
        blend_over([p[0], p[1], p[2], p[3]], self.backdrop)
    }
}

pub trait Renderer {
    fn name(&self) -> &'static str;
    /// Terminal pixels per cell, as (x, y).
    fn pixels_per_cell(&self) -> (usize, usize);
    fn render(&mut self, frame: &Frame<'_>, out: &mut dyn Write) -> anyhow::Result<()>;
}

/// Source-over of a straight-alpha pixel onto an opaque backdrop.
#[inline]
pub fn blend_over(px: [u8; 4], bg: Rgb) -> (u8, u8, u8) {
    let a = px[3] as u32;
    let ia = 255 - a;
    let mix = |s: u8, d: u8| ((s as u32 * a + d as u32 * ia + 127) / 255) as u8;
    (mix(px[0], bg.0), mix(px[1], bg.1), mix(px[2], bg.2))
}

#[inline]
pub fn luma_u8(r: u8, g: u8, b: u8) -> u8 {
    ((r as u32 * 54 + g as u32 * 183 + b as u32 * 19) >> 8) as u8
}

pub fn write_fg_rgb(out: &mut dyn Write, r: u8, g: u8, b: u8) -> std::io::Result<()> {
    write!(out, "\x1b[38;2;{};{};{}m", r, g, b)
}

pub fn write_bg_rgb(out: &mut dyn Write, r: u8, g: u8, b: u8) -> std::io::Result<()> {
    write!(out, "\x1b[48;2;{};{};{}m", r, g, b)
}

/// Shared prologue for the cell renderers. Returns `(cols, visual_rows)`, or
/// `None` when there is nothing to draw.
pub(crate) fn text_frame_begin(
    frame: &Frame<'_>,
    out: &mut dyn Write,
) -> anyhow::Result<Option<(usize, usize)>> {
    let cols = frame.term_cols as usize;
    let visual_rows = frame.visual_rows as usize;
    if cols == 0 || visual_rows == 0 {
        return Ok(None);
    }

    if frame.sync_updates {
        out.write_all(b"\x1b[?2026h")?;
    }
    out.write_all(b"\x1b[H\x1b[0m")?;
    // Autowrap off while painting full-width rows; the last column would otherwise wrap.
    out.write_all(b"\x1b[?7l")?;
    Ok(Some((cols, visual_rows)))
}

pub(crate) fn text_frame_end(
    frame: &Frame<'_>,
    cols: usize,
    visual_rows: usize,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    let mut hud_lines = frame.hud.lines();
    for i in 0..(frame.hud_rows as usize) {
        write_hud_line(out, visual_rows + i + 1, cols, hud_lines.next())?;
    }

    if let Some(text) = frame.overlay {
        draw_overlay_popup(out, frame.term_cols, frame.term_rows, text)?;
    }

    out.write_all(b"\x1b[?7h")?;
    if frame.sync_updates {
        out.write_all(b"\x1b[?2026l")?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_hud_line(
    out: &mut dyn Write,
    row: usize,
    cols: usize,
    line: Option<&str>,
) -> anyhow::Result<()> {
    write!(out, "\x1b[{};1H\x1b[0m\x1b[2K", row)?;
    if let Some(line) = line {
        let clipped: String = line.chars().take(cols).collect();
        out.write_all(clipped.as_bytes())?;
    }
    Ok(())
}

pub fn draw_overlay_popup(
    out: &mut dyn Write,
    term_cols: u16,
    term_rows: u16,
    text: &str,
) -> anyhow::Result<()> {
    if text.trim().is_empty() {
        return Ok(());
    }

    let cols = term_cols as usize;
    let rows = term_rows as usize;
    if cols < 8 || rows < 4 {
        return Ok(());
    }

    let max_inner_w = cols.saturating_sub(6).max(1);
    let mut lines: Vec<String> = Vec::new();
    for raw in text.lines() {
        if raw.is_empty() {
            lines.push(String::new());
            continue;
        }
        let chars: Vec<char> = raw.chars().collect();
        for chunk in chars.chunks(max_inner_w) {
            lines.push(chunk.iter().collect());
        }
    }
    if lines.is_empty() {
        return Ok(());
    }

    let widest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
    let inner_w = widest.clamp(1, max_inner_w);
    let box_w = (inner_w + 4).min(cols.saturating_sub(2)).max(4);
    let inner_w = box_w.saturating_sub(4);
    let body_h = lines.len().min(rows.saturating_sub(3).max(1));
    let box_h = (body_h + 2).min(rows.saturating_sub(1)).max(3);

    let start_col = (cols.saturating_sub(box_w)) / 2 + 1;
    let start_row = (rows.saturating_sub(box_h)) / 2 + 1;

    let horiz = "-".repeat(box_w.saturating_sub(2));
    let blank = " ".repeat(inner_w);
    // Unlike a help screen, the popup leaves the field visible around it.
    out.write_all(b"\x1b[0m\x1b[38;2;246;236;255m\x1b[48;2;18;8;28m")?;
    write!(out, "\x1b[{};{}H+{}+", start_row, start_col, horiz)?;

    for (i, line) in lines.iter().take(body_h).enumerate() {
        let row = start_row + 1 + i;
        write!(out, "\x1b[{};{}H| {} |", row, start_col, blank)?;
        if i == 0 {
            write!(
                out,
                "\x1b[{};{}H\x1b[1m\x1b[38;2;255;176;96m{}\x1b[22m\x1b[38;2;246;236;255m",
                row,
                start_col + 2,
                line
            )?;
        } else {
            write!(out, "\x1b[{};{}H{}", row, start_col + 2, line)?;
        }
    }

    write!(out, "\x1b[{};{}H+{}+", start_row + box_h - 1, start_col, horiz)?;
    out.write_all(b"\x1b[0m")?;
    Ok(())
}
