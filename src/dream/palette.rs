use std::f32::consts::TAU;
use std::sync::OnceLock;

pub const PALETTE_SIZE: usize = 512;

/// Cyclic color table shared read-only by the compositor.
pub struct Palette {
    colors: [[u8; 3]; PALETTE_SIZE],
}

impl Palette {
    fn build() -> Self {
        let mut colors = [[0u8; 3]; PALETTE_SIZE];
        for (i, c) in colors.iter_mut().enumerate() {
            let a = (i as f32 / PALETTE_SIZE as f32) * TAU;
            *c = [
                channel(140.0, 110.0, a, 0.0),
                channel(120.0, 120.0, a, 2.1),
                channel(150.0, 105.0, a, 4.2),
            ];
        }
        Self { colors }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Lookup with cyclic wrap; negative indices wrap from the end.
    #[inline]
    pub fn get(&self, idx: i32) -> [u8; 3] {
        self.colors[(idx & (PALETTE_SIZE as i32 - 1)) as usize]
    }

    pub fn colors(&self) -> &[[u8; 3]] {
        &self.colors
    }
}

fn channel(base: f32, amp: f32, a: f32, phase: f32) -> u8 {
    (base + amp * (a + phase).sin()).clamp(0.0, 255.0) as u8
}

/// The process-wide palette, built on first use.
pub fn palette() -> &'static Palette {
    static PALETTE: OnceLock<Palette> = OnceLock::new();
    PALETTE.get_or_init(Palette::build)
}
