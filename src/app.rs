use crate::capability::probe_runtime;
use crate::config::{Config, DampingMode, FramePacing, RendererMode};
use crate::dream::{Direction, Host, Phase, Scheduler, SchedulerOptions};
use crate::logging::Console;
use crate::render::{AsciiRenderer, Frame, HalfBlockRenderer, KittyRenderer, Renderer};
use crate::terminal::{TerminalHost, TerminalSession};
use anyhow::Context;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use std::io::BufWriter;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Which chrome is visible on top of the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Panels {
    pub hud: bool,
    pub help: bool,
    pub console: bool,
}

impl Default for Panels {
    fn default() -> Self {
        Self {
            hud: true,
            help: false,
            console: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Handled,
    Ignored,
}

pub fn run(cfg: Config, console: Console) -> anyhow::Result<()> {
    let report = probe_runtime(cfg.renderer, cfg.touch, cfg.auto_probe);
    for note in report.notes() {
        info!("[probe] {note}");
    }
    if report.changed() {
        warn!("[probe] {}", report.status_label());
    }

    let _session = TerminalSession::enter(report.renderer == RendererMode::Kitty)?;
    let mut out = BufWriter::new(std::io::stdout());

    let mut renderer = make_renderer(report.renderer);
    let host = TerminalHost::new(renderer.pixels_per_cell(), cfg.dpr, report.touch_like);

    let mut last_size = crossterm::terminal::size().context("get terminal size")?;
    if last_size.1 < 2 || last_size.0 < 4 {
        return Err(anyhow::anyhow!(
            "terminal too small (need at least 4x2, got {}x{})",
            last_size.0,
            last_size.1
        ));
    }

    let mut panels = Panels::default();
    let mut hud_rows = hud_rows_for_size(last_size, panels.hud);

    let mut dream = Scheduler::new(
        host,
        SchedulerOptions {
            damping: cfg.damping,
            pacing: cfg.pacing,
        },
    );
    relayout(&mut dream, last_size, hud_rows);
    if cfg.low_power {
        dream.set_low_power(true);
    }
    if cfg.auto_start {
        dream.activate();
    } else {
        info!("paprika dream loaded. Press Enter to begin.");
    }

    let start = Instant::now();
    let mut fps = FpsCounter::new();
    let mut dirty = true;
    let probe_label = report.status_label();

    loop {
        let now = Instant::now();

        // Drain input events (non-blocking).
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(k) if k.kind != KeyEventKind::Release => {
                    let old_hud = panels.hud;
                    match handle_key(k.code, k.modifiers, &mut dream, &mut panels) {
                        KeyAction::Quit => return Ok(()),
                        KeyAction::Handled => dirty = true,
                        KeyAction::Ignored => {}
                    }
                    if panels.hud != old_hud {
                        hud_rows = hud_rows_for_size(last_size, panels.hud);
                        relayout(&mut dream, last_size, hud_rows);
                    }
                }
                Event::Resize(c, r) => {
                    last_size = (c, r);
                    hud_rows = hud_rows_for_size(last_size, panels.hud);
                    relayout(&mut dream, last_size, hud_rows);
                    dirty = true;
                }
                _ => {}
            }
        }

        // Size check once per frame (resize events can be missed in some terminals).
        let sz = crossterm::terminal::size()?;
        if sz != last_size {
            last_size = sz;
            hud_rows = hud_rows_for_size(last_size, panels.hud);
            relayout(&mut dream, last_size, hud_rows);
            dirty = true;
        }

        let outcome = dream.tick(start.elapsed().as_secs_f64() * 1000.0);
        if outcome.redrawn {
            fps.tick();
        }

        if outcome.redrawn || dirty {
            let (term_cols, term_rows) = last_size;
            let hud = if panels.hud {
                build_wrapped_hud(
                    term_cols as usize,
                    &HudInfo {
                        dream: &dream,
                        fps: fps.fps(),
                        renderer: renderer.name(),
                        probe: &probe_label,
                        last_log: console.last().unwrap_or_default(),
                    },
                )
            } else {
                String::new()
            };

            let target_hud_rows = hud_rows_for_text(term_rows, panels.hud, &hud);
            if target_hud_rows != hud_rows {
                hud_rows = target_hud_rows;
                relayout(&mut dream, last_size, hud_rows);
            }
            let visual_rows = term_rows.saturating_sub(hud_rows).max(1);

            let console_text;
            let overlay = if panels.help {
                Some(help_popup_text())
            } else if panels.console {
                console_text = console_popup_text(&console, term_rows.saturating_sub(6) as usize);
                Some(console_text.as_str())
            } else if dream.phase() == Phase::Idle {
                Some(splash_text())
            } else {
                None
            };

            let surface = dream.surface();
            let frame = Frame {
                term_cols,
                term_rows,
                visual_rows,
                pixel_width: surface.width(),
                pixel_height: surface.height(),
                pixels_rgba: surface.rgba(),
                backdrop: cfg.backdrop,
                hud: &hud,
                hud_rows,
                overlay,
                sync_updates: cfg.sync_updates,
            };
            renderer.render(&frame, &mut out)?;
            dirty = false;
        }

        // Stand-in for the display refresh: one tick per host frame.
        let target = Duration::from_secs_f32(1.0 / cfg.fps.max(1) as f32);
        let elapsed = now.elapsed();
        if elapsed < target {
            std::thread::sleep(target - elapsed);
        }
    }
}

fn make_renderer(mode: RendererMode) -> Box<dyn Renderer> {
    match mode {
        RendererMode::Ascii => Box::new(AsciiRenderer::new()),
        RendererMode::HalfBlock => Box::new(HalfBlockRenderer::new()),
        RendererMode::Kitty => Box::new(KittyRenderer::new()),
    }
}

fn relayout(dream: &mut Scheduler<TerminalHost>, size: (u16, u16), hud_rows: u16) {
    let (cols, rows) = size;
    let visual_rows = rows.saturating_sub(hud_rows).max(1);
    if dream.host_mut().set_cells(cols, visual_rows) {
        dream.resize();
    }
}

/// Maps one key press onto the dream's operations.
pub fn handle_key<H: Host>(
    code: KeyCode,
    mods: KeyModifiers,
    dream: &mut Scheduler<H>,
    panels: &mut Panels,
) -> KeyAction {
    if mods.contains(KeyModifiers::CONTROL) && matches!(code, KeyCode::Char('c')) {
        return KeyAction::Quit;
    }

    let started = dream.state().started();
    match code {
        KeyCode::Char('q') | KeyCode::Char('Q') => KeyAction::Quit,
        KeyCode::Enter => {
            dream.activate();
            KeyAction::Handled
        }
        KeyCode::Esc => {
            if panels.help || panels.console {
                panels.help = false;
                panels.console = false;
                return KeyAction::Handled;
            }
            if !started {
                return KeyAction::Ignored;
            }
            dream.toggle_pause();
            KeyAction::Handled
        }
        KeyCode::Char('l') | KeyCode::Char('L') => {
            dream.toggle_low_power();
            KeyAction::Handled
        }
        KeyCode::Char('i') | KeyCode::Char('I') => {
            panels.hud = !panels.hud;
            KeyAction::Handled
        }
        KeyCode::Char('?') | KeyCode::Char('h') | KeyCode::Char('H') | KeyCode::F(1) => {
            panels.help = !panels.help;
            KeyAction::Handled
        }
        KeyCode::Char('c') | KeyCode::Char('C') => {
            panels.console = !panels.console;
            KeyAction::Handled
        }
        _ if !started => KeyAction::Ignored,
        KeyCode::Up => drift(dream, Direction::Up),
        KeyCode::Down => drift(dream, Direction::Down),
        KeyCode::Left => drift(dream, Direction::Left),
        KeyCode::Right => drift(dream, Direction::Right),
        KeyCode::Char(' ') => {
            dream.trigger_flash();
            KeyAction::Handled
        }
        _ => KeyAction::Ignored,
    }
}

fn drift<H: Host>(dream: &mut Scheduler<H>, dir: Direction) -> KeyAction {
    dream.apply_drift(dir);
    KeyAction::Handled
}

fn hud_rows_for_size(size: (u16, u16), show_hud: bool) -> u16 {
    if !show_hud {
        return 0;
    }
    let rows = size.1;
    if rows <= 1 {
        return 0;
    }
    (rows - 1).min(4)
}

fn hud_rows_for_text(term_rows: u16, show_hud: bool, hud: &str) -> u16 {
    if !show_hud {
        return 0;
    }
    let max_rows = term_rows.saturating_sub(1);
    let wanted = hud.lines().count() as u16;
    wanted.min(max_rows)
}

pub struct HudInfo<'a, H: Host> {
    pub dream: &'a Scheduler<H>,
    pub fps: f32,
    pub renderer: &'a str,
    pub probe: &'a str,
    pub last_log: String,
}

pub fn build_wrapped_hud<H: Host>(cols: usize, info: &HudInfo<'_, H>) -> String {
    let state = info.dream.state();
    let layout = info.dream.layout();
    let opts = info.dream.options();
    let (dx, dy) = state.drift();
    let cap = if state.fps_cap() > 0.0 {
        format!("{:.0}", state.fps_cap())
    } else {
        "uncapped".to_string()
    };

    let logical_lines = vec![
        format!(
            "Dream: {} | LowPower: {} | Cap: {} | Scale: {:.2} | Surface: {}x{} | Buffer: {}x{} | FPS: {:>4.1}",
            info.dream.phase().label(),
            if state.low_power() { "on" } else { "off" },
            cap,
            state.scale(),
            layout.surface_w,
            layout.surface_h,
            layout.buffer_w,
            layout.buffer_h,
            info.fps,
        ),
        format!(
            "t: {:>7.2}s | Flash: {:.2} | Drift: {:+.3}/{:+.3} | Damping: {} | Pacing: {} | Renderer: {} | Probe: {}",
            state.t(),
            state.flash(),
            dx,
            dy,
            damping_label(opts.damping),
            pacing_label(opts.pacing),
            info.renderer,
            info.probe,
        ),
        format!("Log: {}", info.last_log),
        "Keys: enter start | arrows drift | space flash | esc pause | l low power | i HUD | c console | ?/h/F1 help | q quit".to_string(),
    ];

    wrap_hud_lines(cols, &logical_lines).join("\n")
}

fn damping_label(mode: DampingMode) -> &'static str {
    match mode {
        DampingMode::PerInput => "per-input",
        DampingMode::PerFrame => "per-frame",
    }
}

fn pacing_label(mode: FramePacing) -> &'static str {
    match mode {
        FramePacing::Modulo => "modulo",
        FramePacing::Accumulator => "accumulator",
    }
}

fn wrap_hud_lines(cols: usize, lines: &[String]) -> Vec<String> {
    let width = cols.max(1);
    let mut out = Vec::new();
    for line in lines {
        out.extend(hard_wrap_line(line, width));
    }
    out
}

fn hard_wrap_line(line: &str, width: usize) -> Vec<String> {
    if line.is_empty() {
        return vec![String::new()];
    }
    let chars: Vec<char> = line.chars().collect();
    chars.chunks(width).map(|c| c.iter().collect()).collect()
}

fn splash_text() -> &'static str {
    "PAPRIKA DREAM\n\
press enter to begin\n\
\n\
arrows drift | space flash | esc pause | l low power"
}

fn help_popup_text() -> &'static str {
    "Paprika Dream Hotkeys\n\
enter  start the dream\n\
arrows  drift across the field\n\
space  flash pulse\n\
esc  pause / resume (closes popups first)\n\
l  toggle low power (lower resolution, 24 fps cap)\n\
i  show/hide HUD\n\
c  show/hide console log\n\
? or h or F1  toggle this help\n\
q or ctrl-c  quit"
}

/// Console popup: a header with the lifetime line count, then up to
/// `max_lines` of the most recent log lines, oldest first.
pub fn console_popup_text(console: &Console, max_lines: usize) -> String {
    let lines = console.recent(max_lines.max(1));
    let total = console.total_count();
    let mut text = format!("Console ({} of {} lines)", lines.len(), total);
    if lines.is_empty() {
        text.push_str("\n(no log lines yet)");
    }
    for line in lines {
        text.push('\n');
        text.push_str(&line);
    }
    text
}

struct FpsCounter {
    last: Instant,
    frames: u32,
    fps: f32,
}

impl FpsCounter {
    fn new() -> Self {
        Self {
            last: Instant::now(),
            frames: 0,
            fps: 0.0,
        }
    }

    fn tick(&mut self) {
        self.frames += 1;
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        if dt >= 0.5 {
            self.fps = (self.frames as f32) / dt;
            self.frames = 0;
            self.last = now;
        }
    }

    fn fps(&self) -> f32 {
        self.fps
    }
}
