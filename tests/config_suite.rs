use clap::Parser;
use paprika_dream::capability::probe_runtime;
use paprika_dream::config::{
    parse_hex_rgb, Config, DampingMode, FramePacing, RendererMode, Rgb, TouchMode,
};

// ── CLI parsing ─────────────────────────────────────────────────────────────

#[test]
fn defaults_match_documented_values() {
    let cfg = Config::try_parse_from(["paprika-dream"]).unwrap();
    assert_eq!(cfg.renderer, RendererMode::HalfBlock);
    assert_eq!(cfg.fps, 60);
    assert_eq!(cfg.dpr, 1.0);
    assert!(!cfg.low_power);
    assert_eq!(cfg.touch, TouchMode::Auto);
    assert_eq!(cfg.damping, DampingMode::PerInput);
    assert_eq!(cfg.pacing, FramePacing::Modulo);
    assert_eq!(cfg.backdrop, Rgb(0x12, 0x0a, 0x1c));
    assert!(!cfg.auto_start);
    assert!(cfg.sync_updates);
    assert!(cfg.auto_probe);
    assert!(cfg.log_file.is_none());
    assert!(cfg.log_level.is_none());
}

#[test]
fn flags_and_aliases_parse() {
    let cfg = Config::try_parse_from([
        "paprika-dream",
        "--renderer",
        "hb",
        "--damping",
        "frame",
        "--pacing",
        "acc",
        "--touch",
        "on",
        "--low-power",
        "--auto-start",
        "--dpr",
        "2.5",
        "--sync-updates",
        "false",
        "--backdrop",
        "#fff",
        "--log-level",
        "paprika_dream=debug",
    ])
    .unwrap();
    assert_eq!(cfg.renderer, RendererMode::HalfBlock);
    assert_eq!(cfg.damping, DampingMode::PerFrame);
    assert_eq!(cfg.pacing, FramePacing::Accumulator);
    assert_eq!(cfg.touch, TouchMode::On);
    assert!(cfg.low_power);
    assert!(cfg.auto_start);
    assert_eq!(cfg.dpr, 2.5);
    assert!(!cfg.sync_updates);
    assert_eq!(cfg.backdrop, Rgb(255, 255, 255));
    assert_eq!(cfg.log_level.as_deref(), Some("paprika_dream=debug"));
}

#[test]
fn renderer_names_parse() {
    for (raw, want) in [
        ("ascii", RendererMode::Ascii),
        ("text", RendererMode::Ascii),
        ("half-block", RendererMode::HalfBlock),
        ("halfblock", RendererMode::HalfBlock),
        ("kitty", RendererMode::Kitty),
    ] {
        let cfg = Config::try_parse_from(["paprika-dream", "--renderer", raw]).unwrap();
        assert_eq!(cfg.renderer, want, "renderer {raw}");
    }
}

#[test]
fn bad_values_are_rejected() {
    assert!(Config::try_parse_from(["paprika-dream", "--backdrop", "#12345"]).is_err());
    assert!(Config::try_parse_from(["paprika-dream", "--renderer", "sixel"]).is_err());
    assert!(Config::try_parse_from(["paprika-dream", "--damping", "sometimes"]).is_err());
}

#[test]
fn hex_colors_parse() {
    assert_eq!(parse_hex_rgb("#120a1c"), Ok(Rgb(0x12, 0x0a, 0x1c)));
    assert_eq!(parse_hex_rgb("ABCDEF"), Ok(Rgb(0xab, 0xcd, 0xef)));
    assert_eq!(parse_hex_rgb(" #f80 "), Ok(Rgb(0xff, 0x88, 0x00)));
    assert!(parse_hex_rgb("#gg0000").is_err());
    assert!(parse_hex_rgb("").is_err());
    assert!(parse_hex_rgb("#ééé").is_err());
}

// ── Capability probe ────────────────────────────────────────────────────────

#[test]
fn forced_touch_is_reported() {
    let report = probe_runtime(RendererMode::HalfBlock, TouchMode::On, true);
    assert!(report.touch_like);
    assert_eq!(report.renderer, RendererMode::HalfBlock);
    assert!(!report.changed());
    assert!(report.status_label().starts_with("ok"));
    assert!(report.status_label().contains("touch"));
}

#[test]
fn probe_off_keeps_requested_renderer() {
    let report = probe_runtime(RendererMode::Kitty, TouchMode::Off, false);
    assert!(!report.touch_like);
    assert_eq!(report.renderer, RendererMode::Kitty);
    assert!(report.status_label().starts_with("off"));
    assert!(report.notes().iter().any(|n| n.contains("disabled")));
}

#[test]
fn probe_always_leaves_a_note() {
    let report = probe_runtime(RendererMode::Ascii, TouchMode::Off, true);
    assert_eq!(report.renderer, RendererMode::Ascii);
    assert!(!report.notes().is_empty());
}
