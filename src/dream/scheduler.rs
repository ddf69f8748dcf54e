use crate::config::{DampingMode, FramePacing};
use crate::dream::compositor::{Compositor, LowResBuffer};
use crate::dream::host::{Host, Layout};
use crate::dream::present::{Presenter, Surface};
use crate::dream::state::{Direction, RenderState};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Paused,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Paused => "paused",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerOptions {
    pub damping: DampingMode,
    pub pacing: FramePacing,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            damping: DampingMode::PerInput,
            pacing: FramePacing::Modulo,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickOutcome {
    /// False only while idle; the host should stop calling `tick` until activation.
    pub rescheduled: bool,
    pub redrawn: bool,
    pub dt: f32,
}

/// Drives one dream: owns its state, buffers and pacing.
///
/// Every mutation goes through `&mut self` on a single thread, so the
/// compositor and presenter never race with input handlers.
pub struct Scheduler<H: Host> {
    host: H,
    opts: SchedulerOptions,
    state: RenderState,
    compositor: Compositor,
    presenter: Presenter,
    surface: Surface,
    layout: Layout,
    pace_acc: f64,
    frames_drawn: u64,
}

impl<H: Host> Scheduler<H> {
    /// Creates an idle scheduler sized for the host's current viewport.
    pub fn new(host: H, opts: SchedulerOptions) -> Self {
        let mut s = Self {
            host,
            opts,
            state: RenderState::new(),
            compositor: Compositor::new(0, 0),
            presenter: Presenter::new(),
            surface: Surface::new(0, 0),
            layout: Layout::default(),
            pace_acc: 0.0,
            frames_drawn: 0,
        };
        s.resize();
        s
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn options(&self) -> SchedulerOptions {
        self.opts
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn buffer(&self) -> &LowResBuffer {
        self.compositor.buffer()
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn phase(&self) -> Phase {
        match (self.state.started, self.state.paused) {
            (false, _) => Phase::Idle,
            (true, false) => Phase::Running,
            (true, true) => Phase::Paused,
        }
    }

    /// Starts the loop. Calling it again once started does nothing.
    pub fn activate(&mut self) {
        if self.state.started {
            return;
        }
        self.state.started = true;

        if self.host.is_touch_like() {
            self.set_low_power(true);
            info!("[hint] touch device detected -> low power enabled");
        } else {
            self.resize();
        }
        info!("[start] dream activated");
    }

    /// Ignored until the scheduler has been activated.
    pub fn set_paused(&mut self, on: bool) {
        if !self.state.started || self.state.paused == on {
            return;
        }
        self.state.paused = on;
        if on {
            info!("[pause] paused");
        } else {
            info!("[pause] resumed");
        }
    }

    pub fn toggle_pause(&mut self) {
        let on = !self.state.paused;
        self.set_paused(on);
    }

    pub fn set_low_power(&mut self, on: bool) {
        self.state.set_low_power(on);
        self.pace_acc = 0.0;
        self.resize();
    }

    pub fn toggle_low_power(&mut self) {
        let on = !self.state.low_power;
        self.set_low_power(on);
    }

    pub fn trigger_flash(&mut self) {
        self.state.trigger_flash();
        debug!(flash = self.state.flash, "flash");
    }

    pub fn apply_drift(&mut self, dir: Direction) {
        self.state.apply_drift(dir, self.opts.damping);
    }

    /// Re-reads the host viewport and reallocates the surface and buffer at the current scale.
    pub fn resize(&mut self) {
        let layout = Layout::compute(self.host.viewport(), self.state.scale);
        if (layout.surface_w, layout.surface_h) != self.surface.size() {
            self.surface = Surface::new(layout.surface_w, layout.surface_h);
        }
        self.compositor.resize(layout.buffer_w, layout.buffer_h);
        self.layout = layout;
        info!(
            "[resize] surface {}x{} | buffer {}x{} | lowPower={}",
            layout.surface_w, layout.surface_h, layout.buffer_w, layout.buffer_h, self.state.low_power
        );

        // Fresh buffers are blank; repaint the current instant so a paused
        // field stays visible. No time passes and flash does not decay.
        if self.state.started {
            self.paint(0.0);
        }
    }

    /// One display-refresh callback at monotonic time `now_ms`.
    pub fn tick(&mut self, now_ms: f64) -> TickOutcome {
        if !self.state.started {
            return TickOutcome {
                rescheduled: false,
                redrawn: false,
                dt: 0.0,
            };
        }

        let dt = self.state.advance_clock(now_ms);
        let mut redrawn = false;

        if !self.state.paused {
            self.state.t += dt;
            if self.opts.damping == DampingMode::PerFrame {
                self.state.damp_drift_for(dt as f32);
            }
            if self.should_redraw(dt) {
                self.redraw(dt as f32);
                redrawn = true;
            }
        }

        TickOutcome {
            rescheduled: true,
            redrawn,
            dt: dt as f32,
        }
    }

    fn should_redraw(&mut self, dt: f64) -> bool {
        let cap = self.state.fps_cap as f64;
        if cap <= 0.0 {
            return true;
        }
        let step = 1.0 / cap;
        match self.opts.pacing {
            FramePacing::Modulo => self.state.t % step < dt,
            FramePacing::Accumulator => {
                self.pace_acc += dt;
                if self.pace_acc < step {
                    return false;
                }
                self.pace_acc = (self.pace_acc - step).min(step);
                true
            }
        }
    }

    fn redraw(&mut self, dt: f32) {
        self.paint(dt);
        self.frames_drawn = self.frames_drawn.saturating_add(1);
    }

    fn paint(&mut self, dt: f32) {
        self.compositor.compose(&mut self.state, dt);
        let opacity = self.state.quality().opacity;
        self.presenter
            .present(self.compositor.buffer(), &mut self.surface, opacity);
    }
}
