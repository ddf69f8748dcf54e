use crate::dream::field::field;
use crate::dream::palette::palette;
use crate::dream::state::RenderState;

/// Drift units to buffer pixels.
pub const DRIFT_MAGNITUDE: f32 = 140.0;

/// Reduced-resolution RGBA frame. Alpha is always 255.
#[derive(Debug, Clone, PartialEq)]
pub struct LowResBuffer {
    w: usize,
    h: usize,
    pixels: Vec<u8>,
}

impl LowResBuffer {
    pub fn new(w: usize, h: usize) -> Self {
        let mut pixels = vec![0u8; w.saturating_mul(h).saturating_mul(4)];
        for px in pixels.chunks_exact_mut(4) {
            px[3] = 255;
        }
        Self { w, h, pixels }
    }

    /// Wraps existing pixels; alpha is forced opaque. `None` if the length is not `w*h*4`.
    pub fn from_rgba(w: usize, h: usize, mut pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() != w.checked_mul(h)?.checked_mul(4)? {
            return None;
        }
        for px in pixels.chunks_exact_mut(4) {
            px[3] = 255;
        }
        Some(Self { w, h, pixels })
    }

    pub fn width(&self) -> usize {
        self.w
    }

    pub fn height(&self) -> usize {
        self.h
    }

    pub fn size(&self) -> (usize, usize) {
        (self.w, self.h)
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.w + x) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }
}

/// Owns the low-resolution buffer and fills it from the field each frame.
pub struct Compositor {
    buf: LowResBuffer,
    // Squared normalized coordinates, cached per column/row for the vignette.
    nx2: Vec<f32>,
    ny2: Vec<f32>,
}

impl Compositor {
    pub fn new(w: usize, h: usize) -> Self {
        let mut c = Self {
            buf: LowResBuffer::new(0, 0),
            nx2: Vec::new(),
            ny2: Vec::new(),
        };
        c.resize(w, h);
        c
    }

    /// Reallocates the buffer. Every resize starts from a fresh allocation.
    pub fn resize(&mut self, w: usize, h: usize) {
        self.buf = LowResBuffer::new(w, h);
        self.nx2 = normalized_squares(w);
        self.ny2 = normalized_squares(h);
    }

    pub fn buffer(&self) -> &LowResBuffer {
        &self.buf
    }

    /// Fills every pixel for the current state, then decays flash by `dt` seconds.
    pub fn compose(&mut self, state: &mut RenderState, dt: f32) {
        let (w, h) = self.buf.size();
        if w == 0 || h == 0 {
            state.decay_flash(dt);
            return;
        }

        let pal = palette();
        let t = state.t as f32;
        let t_swapped = t * 0.9;
        let ripple_phase = t * 2.2;
        let ox = state.drift_x * DRIFT_MAGNITUDE;
        let oy = state.drift_y * DRIFT_MAGNITUDE;
        let flash_off = state.flash * 90.0;

        for (y, row) in self.buf.pixels.chunks_exact_mut(w * 4).enumerate() {
            let fy = y as f32 + oy;
            let ny2 = self.ny2[y];
            for (x, px) in row.chunks_exact_mut(4).enumerate() {
                let fx = x as f32 + ox;

                let v = field(fx, fy, t);
                let u = field(fy, fx, t_swapped);
                let m = (v + u) * 0.5;

                let ripple = ((fx + fy) * 0.02 + ripple_phase).sin() * 40.0;
                let idx = ((m + 2.0) * 120.0 + ripple) as i32;
                let c = pal.get((idx as f32 + flash_off) as i32);

                let vv = (1.0 - (self.nx2[x] + ny2) * 0.75).max(0.0);
                let k = 0.55 + 0.45 * vv;

                px[0] = (c[0] as f32 * k).round() as u8;
                px[1] = (c[1] as f32 * k).round() as u8;
                px[2] = (c[2] as f32 * k).round() as u8;
                px[3] = 255;
            }
        }

        state.decay_flash(dt);
    }
}

fn normalized_squares(n: usize) -> Vec<f32> {
    let len = n.max(1) as f32;
    (0..n)
        .map(|i| {
            let v = (i as f32 / len) * 2.0 - 1.0;
            v * v
        })
        .collect()
}
