use crate::config::{RendererMode, TouchMode};

#[derive(Debug, Clone)]
pub struct CapabilityReport {
    pub auto_probe: bool,
    pub requested_renderer: RendererMode,
    pub renderer: RendererMode,
    pub touch_like: bool,
    notes: Vec<String>,
}

impl CapabilityReport {
    pub fn changed(&self) -> bool {
        self.renderer != self.requested_renderer
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    pub fn push_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub fn status_label(&self) -> String {
        let touch = if self.touch_like { "touch" } else { "desktop" };
        if !self.auto_probe {
            return format!("off (renderer={:?}, {touch})", self.renderer);
        }
        if self.changed() {
            return format!(
                "fallback ren {:?}->{:?}, {touch}",
                self.requested_renderer, self.renderer
            );
        }
        format!("ok ren={:?}, {touch}", self.renderer)
    }
}

pub fn probe_runtime(
    requested_renderer: RendererMode,
    touch: TouchMode,
    auto_probe: bool,
) -> CapabilityReport {
    let mut report = CapabilityReport {
        auto_probe,
        requested_renderer,
        renderer: requested_renderer,
        touch_like: false,
        notes: Vec::new(),
    };

    report.touch_like = match touch {
        TouchMode::On => true,
        TouchMode::Off => false,
        TouchMode::Auto => {
            let detected = touch_like_host();
            if detected {
                report.push_note("mobile terminal detected; dream will start in low power");
            }
            detected
        }
    };

    if !auto_probe {
        report.push_note("capability probe disabled by --auto-probe=false");
        return report;
    }

    if requested_renderer == RendererMode::Kitty && !kitty_graphics_available() {
        report.renderer = RendererMode::HalfBlock;
        report.push_note("kitty graphics unavailable in this terminal; falling back to half-block renderer");
    }

    if report.notes.is_empty() {
        report.push_note("probe selected requested renderer with no fallback");
    }

    report
}

fn env_flag(name: &str) -> Option<bool> {
    let v = std::env::var(name).ok()?;
    match v.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Terminal-side stand-in for a coarse-pointer device check.
fn touch_like_host() -> bool {
    if let Some(forced) = env_flag("PAPRIKA_FORCE_TOUCH") {
        return forced;
    }

    if std::env::var("TERMUX_VERSION").is_ok() {
        return true;
    }

    let term_program = std::env::var("TERM_PROGRAM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    ["a-shell", "ish", "blink", "termius", "juicessh"]
        .iter()
        .any(|p| term_program.contains(p))
}

fn kitty_graphics_available() -> bool {
    if let Some(forced) = env_flag("PAPRIKA_FORCE_KITTY") {
        return forced;
    }

    if std::env::var("KITTY_WINDOW_ID").is_ok() {
        return true;
    }

    let term = std::env::var("TERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    if term.contains("kitty") {
        return true;
    }

    let term_program = std::env::var("TERM_PROGRAM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    term_program.contains("ghostty") || term_program.contains("kitty") || term_program.contains("wezterm")
}
