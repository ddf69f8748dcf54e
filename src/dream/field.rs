/// Noise-like scalar field sampled at `(x, y)` in buffer pixels and `t` in seconds.
///
/// Two sinusoid pairs at different spatial frequencies and phase velocities,
/// weighted 0.55/0.45. Each pair lies in [-2, 2], so the result does too.
#[inline]
pub fn field(x: f32, y: f32, t: f32) -> f32 {
    let a = (x * 0.018 + t * 0.8).sin() + (y * 0.014 - t * 0.7).cos();
    let b = ((x + y) * 0.010 + t * 0.55).sin() + ((x - y) * 0.012 - t * 0.6).cos();
    a * 0.55 + b * 0.45
}
