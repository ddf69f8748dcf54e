/// Host viewport in logical units plus the device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub dpr: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64, dpr: f64) -> Self {
        Self { width, height, dpr }
    }

    /// Device pixel ratio with the host value sanitized and capped.
    pub fn effective_dpr(&self) -> f64 {
        if self.dpr.is_finite() && self.dpr > 0.0 {
            self.dpr.min(MAX_DPR)
        } else {
            1.0
        }
    }
}

pub const MAX_DPR: f64 = 2.0;
pub const MIN_BUFFER_DIM: usize = 64;

/// The environment a dream runs inside.
pub trait Host {
    fn viewport(&self) -> Viewport;
    fn is_touch_like(&self) -> bool;
}

/// A host with a fixed viewport; used headless and in tests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedHost {
    pub viewport: Viewport,
    pub touch_like: bool,
}

impl FixedHost {
    pub fn new(width: f64, height: f64, dpr: f64) -> Self {
        Self {
            viewport: Viewport::new(width, height, dpr),
            touch_like: false,
        }
    }

    pub fn touch(mut self, on: bool) -> Self {
        self.touch_like = on;
        self
    }
}

impl Host for FixedHost {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn is_touch_like(&self) -> bool {
        self.touch_like
    }
}

/// Surface and low-resolution buffer sizes derived from a viewport and scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Layout {
    pub surface_w: usize,
    pub surface_h: usize,
    pub buffer_w: usize,
    pub buffer_h: usize,
}

impl Layout {
    pub fn compute(viewport: Viewport, scale: f64) -> Self {
        let dpr = viewport.effective_dpr();
        let surface_w = floor_dim(viewport.width * dpr).max(1);
        let surface_h = floor_dim(viewport.height * dpr).max(1);
        Self {
            surface_w,
            surface_h,
            buffer_w: floor_dim(surface_w as f64 * scale).max(MIN_BUFFER_DIM),
            buffer_h: floor_dim(surface_h as f64 * scale).max(MIN_BUFFER_DIM),
        }
    }
}

fn floor_dim(v: f64) -> usize {
    if v.is_finite() && v > 0.0 {
        v.floor() as usize
    } else {
        0
    }
}
