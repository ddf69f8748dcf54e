use crossterm::event::{KeyCode, KeyModifiers};
use paprika_dream::app::{
    build_wrapped_hud, console_popup_text, handle_key, HudInfo, KeyAction, Panels,
};
use paprika_dream::dream::{FixedHost, Host, Phase, Scheduler, SchedulerOptions};
use paprika_dream::logging::Console;
use paprika_dream::terminal::TerminalHost;
use tracing_subscriber::layer::SubscriberExt;

struct Ui {
    dream: Scheduler<FixedHost>,
    panels: Panels,
}

impl Ui {
    fn new() -> Self {
        Self {
            dream: Scheduler::new(FixedHost::new(320.0, 200.0, 1.0), SchedulerOptions::default()),
            panels: Panels::default(),
        }
    }

    fn press(&mut self, code: KeyCode) -> KeyAction {
        self.press_with(code, KeyModifiers::NONE)
    }

    fn press_with(&mut self, code: KeyCode, mods: KeyModifiers) -> KeyAction {
        handle_key(code, mods, &mut self.dream, &mut self.panels)
    }
}

#[test]
fn quit_keys() {
    let mut ui = Ui::new();
    assert_eq!(ui.press(KeyCode::Char('q')), KeyAction::Quit);
    assert_eq!(
        ui.press_with(KeyCode::Char('c'), KeyModifiers::CONTROL),
        KeyAction::Quit
    );
}

#[test]
fn enter_activates_once() {
    let mut ui = Ui::new();
    assert_eq!(ui.dream.phase(), Phase::Idle);
    assert_eq!(ui.press(KeyCode::Enter), KeyAction::Handled);
    assert_eq!(ui.dream.phase(), Phase::Running);
    ui.press(KeyCode::Enter);
    assert_eq!(ui.dream.phase(), Phase::Running);
}

#[test]
fn motion_and_flash_wait_for_activation() {
    let mut ui = Ui::new();
    assert_eq!(ui.press(KeyCode::Right), KeyAction::Ignored);
    assert_eq!(ui.press(KeyCode::Char(' ')), KeyAction::Ignored);
    assert_eq!(ui.dream.state().drift(), (0.0, 0.0));
    assert_eq!(ui.dream.state().flash(), 0.0);

    ui.press(KeyCode::Enter);
    assert_eq!(ui.press(KeyCode::Right), KeyAction::Handled);
    assert_eq!(ui.press(KeyCode::Char(' ')), KeyAction::Handled);
    assert!(ui.dream.state().drift().0 > 0.0);
    assert!(ui.dream.state().flash() > 0.0);
}

#[test]
fn escape_toggles_pause_after_start() {
    let mut ui = Ui::new();
    assert_eq!(ui.press(KeyCode::Esc), KeyAction::Ignored);

    ui.press(KeyCode::Enter);
    ui.press(KeyCode::Esc);
    assert_eq!(ui.dream.phase(), Phase::Paused);
    ui.press(KeyCode::Esc);
    assert_eq!(ui.dream.phase(), Phase::Running);
}

#[test]
fn escape_closes_help_before_pausing() {
    let mut ui = Ui::new();
    ui.press(KeyCode::Enter);
    ui.press(KeyCode::Char('?'));
    assert!(ui.panels.help);

    ui.press(KeyCode::Esc);
    assert!(!ui.panels.help);
    assert_eq!(ui.dream.phase(), Phase::Running);
}

#[test]
fn low_power_key_works_before_start() {
    let mut ui = Ui::new();
    ui.press(KeyCode::Char('l'));
    assert!(ui.dream.state().low_power());
    assert_eq!(ui.dream.state().fps_cap(), 24.0);
    ui.press(KeyCode::Char('L'));
    assert!(!ui.dream.state().low_power());
}

#[test]
fn hud_and_help_toggles() {
    let mut ui = Ui::new();
    ui.press(KeyCode::Char('i'));
    assert!(!ui.panels.hud);
    ui.press(KeyCode::F(1));
    assert!(ui.panels.help);
    ui.press(KeyCode::Char('h'));
    assert!(!ui.panels.help);
    assert_eq!(ui.press(KeyCode::Char('z')), KeyAction::Ignored);
}

#[test]
fn console_key_toggles_and_escape_closes_it() {
    let mut ui = Ui::new();
    ui.press(KeyCode::Enter);
    assert_eq!(ui.press(KeyCode::Char('c')), KeyAction::Handled);
    assert!(ui.panels.console);

    ui.press(KeyCode::Esc);
    assert!(!ui.panels.console);
    assert_eq!(ui.dream.phase(), Phase::Running, "esc closed the popup instead of pausing");

    ui.press(KeyCode::Char('C'));
    ui.press(KeyCode::Char('C'));
    assert!(!ui.panels.console);
}

#[test]
fn console_popup_lists_recent_history() {
    let console = Console::new(4);
    let subscriber = tracing_subscriber::registry().with(console.layer());
    tracing::subscriber::with_default(subscriber, || {
        for i in 0..6 {
            tracing::info!("line {i}");
        }
    });

    let text = console_popup_text(&console, 3);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines, vec!["Console (3 of 6 lines)", "line 3", "line 4", "line 5"]);
}

#[test]
fn console_popup_when_empty() {
    let text = console_popup_text(&Console::new(8), 10);
    assert_eq!(text, "Console (0 of 0 lines)\n(no log lines yet)");
}

#[test]
fn hud_reports_state_and_wraps() {
    let mut ui = Ui::new();
    ui.press(KeyCode::Enter);
    ui.press(KeyCode::Char('l'));
    let info = HudInfo {
        dream: &ui.dream,
        fps: 24.0,
        renderer: "halfblock",
        probe: "ok",
        last_log: "[start] dream activated".to_string(),
    };

    let wide = build_wrapped_hud(400, &info);
    assert_eq!(wide.lines().count(), 4);
    assert!(wide.contains("Dream: running"));
    assert!(wide.contains("LowPower: on"));
    assert!(wide.contains("Cap: 24"));
    assert!(wide.contains("Log: [start] dream activated"));

    let narrow = build_wrapped_hud(20, &info);
    assert!(narrow.lines().all(|l| l.chars().count() <= 20));
    assert!(narrow.lines().count() > 4);
}

#[test]
fn terminal_host_maps_cells_to_pixels() {
    let mut dream = Scheduler::new(TerminalHost::new((1, 2), 1.0, false), SchedulerOptions::default());
    assert_eq!(dream.host().cells(), (0, 0));
    assert_eq!(dream.surface().size(), (1, 1));

    assert!(dream.host_mut().set_cells(80, 24));
    assert!(!dream.host_mut().set_cells(80, 24));
    dream.resize();
    assert_eq!(dream.host().cells(), (80, 24));
    assert_eq!(dream.surface().size(), (80, 48));
    assert_eq!(dream.buffer().size(), (64, 64));
    assert!(!dream.host().is_touch_like());
}

#[test]
fn terminal_host_applies_dpr() {
    let mut host = TerminalHost::new((2, 4), 2.0, true);
    host.set_cells(100, 30);
    let vp = host.viewport();
    assert_eq!((vp.width, vp.height, vp.dpr), (200.0, 120.0, 2.0));

    let dream = Scheduler::new(host, SchedulerOptions::default());
    assert_eq!(dream.surface().size(), (400, 240));
    assert!(dream.host().is_touch_like());
}

fn lit_cells(dream: &Scheduler<TerminalHost>) -> usize {
    dream
        .surface()
        .rgba()
        .chunks_exact(4)
        .filter(|p| p[3] != 0)
        .count()
}

#[test]
fn paused_field_survives_hud_relayout() {
    let mut dream = Scheduler::new(TerminalHost::new((1, 2), 1.0, false), SchedulerOptions::default());
    dream.host_mut().set_cells(50, 17);
    dream.resize();
    dream.activate();
    dream.tick(0.0);
    dream.tick(16.0);
    dream.set_paused(true);

    assert_eq!(lit_cells(&dream), 50 * 34);

    assert!(dream.host_mut().set_cells(50, 18));
    dream.resize();
    let mut now = 32.0;
    for _ in 0..10 {
        dream.tick(now);
        now += 16.0;
    }
    assert_eq!(lit_cells(&dream), 50 * 36);
}
