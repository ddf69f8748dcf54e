use clap::{Parser, ValueEnum};

#[derive(Parser, Debug, Clone)]
#[command(name = "paprika-dream", version, about = "Psychedelic field for true-color terminals")]
pub struct Config {
    #[arg(long, value_enum, default_value_t = RendererMode::HalfBlock)]
    pub renderer: RendererMode,

    /// Host refresh rate the loop is paced to.
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Device pixel ratio applied to the terminal viewport (capped at 2).
    #[arg(long, default_value_t = 1.0)]
    pub dpr: f64,

    /// Start in low-power mode.
    #[arg(long, default_value_t = false)]
    pub low_power: bool,

    #[arg(long, value_enum, default_value_t = TouchMode::Auto)]
    pub touch: TouchMode,

    #[arg(long, value_enum, default_value_t = DampingMode::PerInput)]
    pub damping: DampingMode,

    #[arg(long, value_enum, default_value_t = FramePacing::Modulo)]
    pub pacing: FramePacing,

    /// Color behind the translucent field, as #rrggbb.
    #[arg(long, default_value = "#120a1c", value_parser = parse_hex_rgb)]
    pub backdrop: Rgb,

    /// Skip the splash and activate immediately.
    #[arg(long, default_value_t = false)]
    pub auto_start: bool,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub sync_updates: bool,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub auto_probe: bool,

    /// Write tracing output here. Without it only the HUD console sees log lines.
    #[arg(long)]
    pub log_file: Option<String>,

    /// Filter directive, e.g. `info` or `paprika_dream=debug`. Falls back to PAPRIKA_LOG.
    #[arg(long)]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RendererMode {
    #[value(alias = "ansi", alias = "text")]
    Ascii,
    #[value(name = "half-block", alias = "halfblock", alias = "half_block", alias = "hb")]
    HalfBlock,
    Kitty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TouchMode {
    Auto,
    On,
    Off,
}

/// When the 0.98 drift damping is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DampingMode {
    /// After each directional input; drift holds still between key presses.
    #[value(name = "per-input", alias = "input")]
    PerInput,
    /// Continuously while running, one step per 1/60 s.
    #[value(name = "per-frame", alias = "frame")]
    PerFrame,
}

/// How the low-power fps cap decides which ticks redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FramePacing {
    /// Redraw when simulation time crosses a multiple of the frame step.
    Modulo,
    /// Fixed-step accumulator.
    #[value(alias = "acc")]
    Accumulator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub fn parse_hex_rgb(raw: &str) -> Result<Rgb, String> {
    let s = raw.trim();
    let hex = s.strip_prefix('#').unwrap_or(s);
    let expand = |c: char| format!("{c}{c}");
    let full = match hex.len() {
        3 => hex.chars().map(expand).collect::<String>(),
        6 => hex.to_string(),
        _ => return Err(format!("expected #rgb or #rrggbb, got {raw:?}")),
    };
    let byte = |i: usize| {
        full.get(i..i + 2)
            .and_then(|p| u8::from_str_radix(p, 16).ok())
            .ok_or_else(|| format!("invalid hex color {raw:?}"))
    };
    Ok(Rgb(byte(0)?, byte(2)?, byte(4)?))
}
