use crate::dream::compositor::LowResBuffer;

/// Full-resolution display surface. Straight (non-premultiplied) RGBA.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    w: usize,
    h: usize,
    rgba: Vec<u8>,
}

impl Surface {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            rgba: vec![0u8; w.saturating_mul(h).saturating_mul(4)],
        }
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

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn clear(&mut self) {
        self.rgba.fill(0);
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> [u8; 4] {
        let i = (y * self.w + x) * 4;
        [self.rgba[i], self.rgba[i + 1], self.rgba[i + 2], self.rgba[i + 3]]
    }
}

#[derive(Debug, Clone, Copy)]
struct Tap {
    i0: usize,
    i1: usize,
    frac: f32,
}

/// Stretches a [`LowResBuffer`] onto a [`Surface`] with bilinear smoothing.
#[derive(Default)]
pub struct Presenter {
    cols: Vec<Tap>,
    rows: Vec<Tap>,
    key: (usize, usize, usize, usize),
}

impl Presenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears `dst` and draws `src` over the whole surface at `opacity`.
    ///
    /// `src` is opaque and `dst` starts transparent, so each destination pixel
    /// carries the interpolated color with alpha = `opacity`.
    pub fn present(&mut self, src: &LowResBuffer, dst: &mut Surface, opacity: f32) {
        dst.clear();
        let (sw, sh) = src.size();
        let (dw, dh) = dst.size();
        if sw == 0 || sh == 0 || dw == 0 || dh == 0 {
            return;
        }

        let key = (sw, sh, dw, dh);
        if self.key != key || self.cols.len() != dw || self.rows.len() != dh {
            self.cols = taps(sw, dw);
            self.rows = taps(sh, dh);
            self.key = key;
        }

        let alpha = (opacity.clamp(0.0, 1.0) * 255.0).round() as u8;
        let sp = src.pixels();
        let row_bytes = sw * 4;

        for (y, drow) in dst.rgba.chunks_exact_mut(dw * 4).enumerate() {
            let ty = self.rows[y];
            let r0 = &sp[ty.i0 * row_bytes..(ty.i0 + 1) * row_bytes];
            let r1 = &sp[ty.i1 * row_bytes..(ty.i1 + 1) * row_bytes];
            for (x, px) in drow.chunks_exact_mut(4).enumerate() {
                let tx = self.cols[x];
                let a0 = tx.i0 * 4;
                let a1 = tx.i1 * 4;
                for ch in 0..3 {
                    let top = lerp(r0[a0 + ch] as f32, r0[a1 + ch] as f32, tx.frac);
                    let bot = lerp(r1[a0 + ch] as f32, r1[a1 + ch] as f32, tx.frac);
                    px[ch] = lerp(top, bot, ty.frac).round().clamp(0.0, 255.0) as u8;
                }
                px[3] = alpha;
            }
        }
    }
}

/// Sample positions use pixel centers, clamped at the edges.
fn taps(src: usize, dst: usize) -> Vec<Tap> {
    let ratio = src as f32 / dst as f32;
    let max = (src - 1) as f32;
    (0..dst)
        .map(|d| {
            let s = ((d as f32 + 0.5) * ratio - 0.5).clamp(0.0, max);
            let i0 = s.floor() as usize;
            let i1 = (i0 + 1).min(src - 1);
            Tap {
                i0,
                i1,
                frac: s - i0 as f32,
            }
        })
        .collect()
}

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
