use crate::dream::{Host, Viewport};
use crate::render::KittyRenderer;
use anyhow::Context;
use crossterm::{
    cursor, queue,
    terminal::{self, ClearType},
};
use std::io::{stdout, Write};

/// Raw mode and the alternate screen, held for the lifetime of the value.
pub struct TerminalSession {
    kitty_images: bool,
}

impl TerminalSession {
    /// `kitty_images` marks sessions that place Kitty images, which must be
    /// deleted on exit or they outlive the alternate screen.
    pub fn enter(kitty_images: bool) -> anyhow::Result<Self> {
        terminal::enable_raw_mode().context("enable raw mode")?;
        // Built before the screen switch so a failure below still runs Drop.
        let session = Self { kitty_images };

        let mut out = stdout();
        queue!(
            out,
            terminal::EnterAlternateScreen,
            terminal::Clear(ClearType::All),
            cursor::Hide
        )
        .context("switch to alternate screen")?;
        out.flush().context("flush terminal setup")?;
        Ok(session)
    }
}

/// Undoes everything the frame loop may have left switched on.
fn write_restore(out: &mut impl Write, kitty_images: bool) -> std::io::Result<()> {
    if kitty_images {
        out.write_all(KittyRenderer::delete_all())?;
    }
    // End sync output, re-enable autowrap, reset colors.
    out.write_all(b"\x1b[?2026l\x1b[?7h\x1b[0m")?;
    queue!(out, cursor::Show, terminal::LeaveAlternateScreen)?;
    out.flush()
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let _ = write_restore(&mut stdout(), self.kitty_images);
    }
}

/// The terminal seen as a dream host: cells × renderer pixels per cell, scaled by `dpr`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerminalHost {
    cols: u16,
    visual_rows: u16,
    px_per_cell: (usize, usize),
    dpr: f64,
    touch_like: bool,
}

impl TerminalHost {
    pub fn new(px_per_cell: (usize, usize), dpr: f64, touch_like: bool) -> Self {
        Self {
            cols: 0,
            visual_rows: 0,
            px_per_cell,
            dpr,
            touch_like,
        }
    }

    /// Records the cell area available to the field (terminal minus HUD rows).
    pub fn set_cells(&mut self, cols: u16, visual_rows: u16) -> bool {
        let changed = (cols, visual_rows) != (self.cols, self.visual_rows);
        self.cols = cols;
        self.visual_rows = visual_rows;
        changed
    }

    pub fn cells(&self) -> (u16, u16) {
        (self.cols, self.visual_rows)
    }
}

impl Host for TerminalHost {
    fn viewport(&self) -> Viewport {
        Viewport::new(
            (self.cols as usize * self.px_per_cell.0) as f64,
            (self.visual_rows as usize * self.px_per_cell.1) as f64,
            self.dpr,
        )
    }

    fn is_touch_like(&self) -> bool {
        self.touch_like
    }
}
