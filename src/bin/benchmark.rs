use std::time::{Duration, Instant};

use anyhow::Result;
use paprika_dream::config::{DampingMode, FramePacing};
use paprika_dream::dream::{Direction, FixedHost, Scheduler, SchedulerOptions};

const DEFAULT_SEED: u64 = 0x5eed_d2ea;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Normal,
    LowPower,
    Both,
}

struct Args {
    mode: Mode,
    frames: usize,
    w: f64,
    h: f64,
    dpr: f64,
    damping: DampingMode,
    pacing: FramePacing,
    seed: u64,
    ci_smoke: bool,
    quick: bool,
    max_ms: f64,
}

fn parse_args() -> Args {
    let mut args = Args {
        mode: Mode::Both,
        frames: 240,
        w: 1280.0,
        h: 720.0,
        dpr: 1.0,
        damping: DampingMode::PerInput,
        pacing: FramePacing::Modulo,
        seed: DEFAULT_SEED,
        ci_smoke: false,
        quick: false,
        max_ms: 16.0,
    };

    let argv = std::env::args().skip(1).collect::<Vec<_>>();
    let mut i = 0usize;
    while i < argv.len() {
        let k = argv[i].as_str();
        let v = argv.get(i + 1).map(|s| s.as_str());
        match (k, v) {
            ("--mode", Some("normal")) => {
                args.mode = Mode::Normal;
                i += 2;
            }
            ("--mode", Some("low-power")) | ("--mode", Some("low")) => {
                args.mode = Mode::LowPower;
                i += 2;
            }
            ("--mode", Some("both")) => {
                args.mode = Mode::Both;
                i += 2;
            }
            ("--frames", Some(x)) => {
                if let Ok(n) = x.parse::<usize>() {
                    args.frames = n.max(1);
                }
                i += 2;
            }
            ("--w", Some(x)) => {
                if let Ok(n) = x.parse::<f64>() {
                    args.w = n.max(1.0);
                }
                i += 2;
            }
            ("--h", Some(x)) => {
                if let Ok(n) = x.parse::<f64>() {
                    args.h = n.max(1.0);
                }
                i += 2;
            }
            ("--dpr", Some(x)) => {
                if let Ok(n) = x.parse::<f64>() {
                    args.dpr = n;
                }
                i += 2;
            }
            ("--damping", Some("per-frame")) => {
                args.damping = DampingMode::PerFrame;
                i += 2;
            }
            ("--damping", Some("per-input")) => {
                args.damping = DampingMode::PerInput;
                i += 2;
            }
            ("--pacing", Some("accumulator")) => {
                args.pacing = FramePacing::Accumulator;
                i += 2;
            }
            ("--pacing", Some("modulo")) => {
                args.pacing = FramePacing::Modulo;
                i += 2;
            }
            ("--seed", Some(x)) => {
                if let Ok(n) = x.parse::<u64>() {
                    args.seed = n;
                }
                i += 2;
            }
            ("--ci-smoke", Some(x)) if !x.starts_with("--") => {
                args.ci_smoke = parse_bool(x).unwrap_or(true);
                i += 2;
            }
            ("--ci-smoke", _) => {
                args.ci_smoke = true;
                i += 1;
            }
            ("--quick", Some(x)) if !x.starts_with("--") => {
                args.quick = parse_bool(x).unwrap_or(true);
                i += 2;
            }
            ("--quick", _) => {
                args.quick = true;
                i += 1;
            }
            ("--max-ms", Some(x)) => {
                if let Ok(v) = x.parse::<f64>() {
                    args.max_ms = v.max(0.1);
                }
                i += 2;
            }
            _ => {
                i += 1;
            }
        }
    }

    if args.quick {
        args.frames = args.frames.min(60);
    }

    args
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

struct BenchResult {
    label: &'static str,
    ms_per_redraw: f64,
    redraws: usize,
}

/// Runs `frames` simulated 60 Hz ticks with seeded random input.
fn bench_mode(args: &Args, low_power: bool) -> BenchResult {
    let label = if low_power { "low-power" } else { "normal" };
    let host = FixedHost::new(args.w, args.h, args.dpr);
    let mut dream = Scheduler::new(
        host,
        SchedulerOptions {
            damping: args.damping,
            pacing: args.pacing,
        },
    );
    dream.activate();
    dream.set_low_power(low_power);

    let mut rng = fastrand::Rng::with_seed(args.seed);
    let frame_ms = 1000.0 / 60.0;
    let mut now_ms = 0.0f64;
    let mut redraws = 0usize;
    let mut lit = 0usize;
    let mut busy = Duration::ZERO;

    for _ in 0..args.frames {
        match rng.u8(..16) {
            0 => dream.apply_drift(Direction::Up),
            1 => dream.apply_drift(Direction::Down),
            2 => dream.apply_drift(Direction::Left),
            3 => dream.apply_drift(Direction::Right),
            4 => dream.trigger_flash(),
            _ => {}
        }

        now_ms += frame_ms;
        let start = Instant::now();
        let outcome = dream.tick(now_ms);
        if outcome.redrawn {
            busy += start.elapsed();
            redraws += 1;
            if dream.surface().rgba().chunks_exact(4).any(|p| p[3] != 0) {
                lit += 1;
            }
        }
    }

    let layout = dream.layout();
    let ms_per_redraw = if redraws == 0 {
        0.0
    } else {
        busy.as_secs_f64() * 1000.0 / redraws as f64
    };
    let (dx, dy) = dream.state().drift();
    println!(
        "{:<9} {:>8.3} ms/redraw  redraws={:>4}/{}  lit={:>4}  surface={}x{} buffer={}x{}  drift={:+.3}/{:+.3}",
        label,
        ms_per_redraw,
        redraws,
        args.frames,
        lit,
        layout.surface_w,
        layout.surface_h,
        layout.buffer_w,
        layout.buffer_h,
        dx,
        dy
    );

    BenchResult {
        label,
        ms_per_redraw,
        redraws,
    }
}

fn main() -> Result<()> {
    let args = parse_args();
    println!(
        "Dream benchmark: viewport={}x{} dpr={} frames={} damping={:?} pacing={:?} seed={:#x} quick={}",
        args.w, args.h, args.dpr, args.frames, args.damping, args.pacing, args.seed, args.quick
    );

    let mut results = Vec::new();
    if matches!(args.mode, Mode::Normal | Mode::Both) {
        results.push(bench_mode(&args, false));
    }
    if matches!(args.mode, Mode::LowPower | Mode::Both) {
        results.push(bench_mode(&args, true));
    }

    if args.ci_smoke {
        let slow = results
            .iter()
            .filter(|r| r.redraws == 0 || r.ms_per_redraw > args.max_ms)
            .map(|r| format!("{} ({:.3} ms, {} redraws)", r.label, r.ms_per_redraw, r.redraws))
            .collect::<Vec<_>>();
        if !slow.is_empty() {
            eprintln!("CI smoke failed (max {:.1} ms/redraw): {}", args.max_ms, slow.join(", "));
            std::process::exit(1);
        }
        println!("CI smoke passed (max {:.1} ms/redraw)", args.max_ms);
    }

    Ok(())
}
