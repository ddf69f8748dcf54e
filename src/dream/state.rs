use crate::config::DampingMode;

pub const FLASH_MAX: f32 = 1.5;
pub const FLASH_STEP: f32 = 0.8;
/// Flash decay in units per second.
pub const FLASH_DECAY: f32 = 1.8;
pub const DRIFT_DAMPING: f32 = 0.98;
/// Tick rate the per-frame damping factor is defined against.
pub const DAMPING_REFERENCE_HZ: f32 = 60.0;
pub const MAX_FRAME_DT: f64 = 0.05;

/// Everything that changes when low-power mode flips.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityPreset {
    pub scale: f64,
    pub fps_cap: f32,
    pub opacity: f32,
    pub drift_step: f32,
}

impl QualityPreset {
    pub const NORMAL: Self = Self {
        scale: 0.48,
        fps_cap: 0.0,
        opacity: 0.70,
        drift_step: 0.05,
    };

    pub const LOW_POWER: Self = Self {
        scale: 0.32,
        fps_cap: 24.0,
        opacity: 0.55,
        drift_step: 0.07,
    };

    pub fn for_mode(low_power: bool) -> Self {
        if low_power {
            Self::LOW_POWER
        } else {
            Self::NORMAL
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit offset in (x, y); y grows downward.
    pub fn unit(self) -> (f32, f32) {
        match self {
            Self::Up => (0.0, -1.0),
            Self::Down => (0.0, 1.0),
            Self::Left => (-1.0, 0.0),
            Self::Right => (1.0, 0.0),
        }
    }
}

/// Mutable interaction and quality state for one dream instance.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderState {
    pub(crate) started: bool,
    pub(crate) paused: bool,
    pub(crate) low_power: bool,
    pub(crate) flash: f32,
    pub(crate) drift_x: f32,
    pub(crate) drift_y: f32,
    pub(crate) t: f64,
    pub(crate) fps_cap: f32,
    pub(crate) last_frame_ms: Option<f64>,
    pub(crate) scale: f64,
}

impl Default for RenderState {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderState {
    pub fn new() -> Self {
        let q = QualityPreset::NORMAL;
        Self {
            started: false,
            paused: false,
            low_power: false,
            flash: 0.0,
            drift_x: 0.0,
            drift_y: 0.0,
            t: 0.0,
            fps_cap: q.fps_cap,
            last_frame_ms: None,
            scale: q.scale,
        }
    }

    pub fn started(&self) -> bool {
        self.started
    }

    pub fn paused(&self) -> bool {
        self.paused
    }

    pub fn low_power(&self) -> bool {
        self.low_power
    }

    pub fn flash(&self) -> f32 {
        self.flash
    }

    pub fn drift(&self) -> (f32, f32) {
        (self.drift_x, self.drift_y)
    }

    pub fn t(&self) -> f64 {
        self.t
    }

    pub fn fps_cap(&self) -> f32 {
        self.fps_cap
    }

    pub fn last_frame_ms(&self) -> Option<f64> {
        self.last_frame_ms
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn quality(&self) -> QualityPreset {
        QualityPreset::for_mode(self.low_power)
    }

    /// Switches quality mode. Scale and fps cap always move together.
    pub(crate) fn set_low_power(&mut self, on: bool) {
        let q = QualityPreset::for_mode(on);
        self.low_power = on;
        self.fps_cap = q.fps_cap;
        self.scale = q.scale;
    }

    pub(crate) fn trigger_flash(&mut self) {
        self.flash = (self.flash + FLASH_STEP).min(FLASH_MAX);
    }

    pub(crate) fn decay_flash(&mut self, dt: f32) {
        self.flash = (self.flash - dt.max(0.0) * FLASH_DECAY).max(0.0);
    }

    pub(crate) fn apply_drift(&mut self, dir: Direction, damping: DampingMode) {
        let step = self.quality().drift_step;
        let (ux, uy) = dir.unit();
        self.drift_x += ux * step;
        self.drift_y += uy * step;
        if damping == DampingMode::PerInput {
            self.drift_x *= DRIFT_DAMPING;
            self.drift_y *= DRIFT_DAMPING;
        }
    }

    /// Frame-rate independent form of one 0.98 step per 1/60 s.
    pub(crate) fn damp_drift_for(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        let k = DRIFT_DAMPING.powf(dt * DAMPING_REFERENCE_HZ);
        self.drift_x *= k;
        self.drift_y *= k;
    }

    /// Records `now_ms` and returns the clamped elapsed seconds since the previous tick.
    pub(crate) fn advance_clock(&mut self, now_ms: f64) -> f64 {
        let last = self.last_frame_ms.unwrap_or(now_ms);
        self.last_frame_ms = Some(now_ms);
        ((now_ms - last) / 1000.0).clamp(0.0, MAX_FRAME_DT)
    }
}
