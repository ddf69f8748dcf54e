use paprika_dream::dream::{
    field, palette, Compositor, Direction, FixedHost, LowResBuffer, Presenter, RenderState,
    Scheduler, SchedulerOptions, Surface, DRIFT_MAGNITUDE, PALETTE_SIZE,
};

/// Inputs to one compose call, as read back from a dream's state.
#[derive(Clone, Copy)]
struct Scene {
    t: f32,
    drift: (f32, f32),
    flash: f32,
}

const STILL: Scene = Scene {
    t: 0.0,
    drift: (0.0, 0.0),
    flash: 0.0,
};

/// Straight recomputation of one buffer pixel.
fn expected_pixel(x: usize, y: usize, w: usize, h: usize, scene: Scene) -> [u8; 4] {
    let t = scene.t;
    let fx = x as f32 + scene.drift.0 * DRIFT_MAGNITUDE;
    let fy = y as f32 + scene.drift.1 * DRIFT_MAGNITUDE;
    let v = field(fx, fy, t);
    let u = field(fy, fx, t * 0.9);
    let m = (v + u) * 0.5;
    let ripple = ((fx + fy) * 0.02 + t * 2.2).sin() * 40.0;
    let idx = ((m + 2.0) * 120.0 + ripple) as i32;
    let c = palette().get((idx as f32 + scene.flash * 90.0) as i32);

    let norm = |i: usize, n: usize| {
        let v = (i as f32 / n as f32) * 2.0 - 1.0;
        v * v
    };
    let vv = (1.0 - (norm(x, w) + norm(y, h)) * 0.75).max(0.0);
    let k = 0.55 + 0.45 * vv;
    [
        (c[0] as f32 * k).round() as u8,
        (c[1] as f32 * k).round() as u8,
        (c[2] as f32 * k).round() as u8,
        255,
    ]
}

fn mismatches(buf: &LowResBuffer, scene: Scene) -> usize {
    let (w, h) = buf.size();
    (0..h)
        .flat_map(|y| (0..w).map(move |x| (x, y)))
        .filter(|&(x, y)| buf.pixel(x, y) != expected_pixel(x, y, w, h, scene))
        .count()
}

// ── Palette ─────────────────────────────────────────────────────────────────

#[test]
fn palette_has_512_entries() {
    assert_eq!(PALETTE_SIZE, 512);
    assert_eq!(palette().len(), 512);
    assert_eq!(palette().colors().len(), 512);
}

#[test]
fn palette_is_built_once() {
    assert!(std::ptr::eq(palette(), palette()));
}

#[test]
fn palette_first_entry_matches_formula() {
    // R = 140 + 110 sin(0), G = 120 + 120 sin(2.1), B = 150 + 105 sin(4.2)
    assert_eq!(palette().colors()[0], [140, 223, 58]);
}

#[test]
fn palette_channels_stay_in_formula_bounds() {
    for c in palette().colors() {
        assert!((30..=250).contains(&c[0]), "red out of range: {c:?}");
        assert!(c[1] <= 240, "green out of range: {c:?}");
        assert!((45..=255).contains(&c[2]), "blue out of range: {c:?}");
    }
}

#[test]
fn palette_lookup_wraps_both_ways() {
    let pal = palette();
    assert_eq!(pal.get(-1), pal.get(511));
    assert_eq!(pal.get(512), pal.get(0));
    assert_eq!(pal.get(1024 + 37), pal.get(37));
    assert_eq!(pal.get(-512), pal.get(0));
}

// ── Field ───────────────────────────────────────────────────────────────────

#[test]
fn field_at_origin_is_one() {
    assert!((field(0.0, 0.0, 0.0) - 1.0).abs() < 1e-6);
}

#[test]
fn field_is_deterministic() {
    for &(x, y, t) in &[(0.0, 0.0, 0.0), (13.5, -7.25, 3.0), (640.0, 480.0, 1234.5)] {
        assert_eq!(field(x, y, t).to_bits(), field(x, y, t).to_bits());
    }
}

#[test]
fn field_is_bounded_on_a_grid() {
    for yi in 0..40 {
        for xi in 0..40 {
            for ti in 0..5 {
                let v = field(xi as f32 * 7.3, yi as f32 * 5.1, ti as f32 * 1.7);
                assert!(v.abs() <= 2.0 + 1e-5, "field out of bounds: {v}");
            }
        }
    }
}

// ── Compositor ──────────────────────────────────────────────────────────────

#[test]
fn compositor_matches_reference_at_time_zero() {
    let (w, h) = (64, 48);
    let mut comp = Compositor::new(w, h);
    let mut state = RenderState::new();
    comp.compose(&mut state, 0.0);

    let buf = comp.buffer();
    assert_eq!(buf.size(), (w, h));
    for &(x, y) in &[(0, 0), (1, 0), (31, 23), (32, 24), (63, 47), (10, 40)] {
        assert_eq!(buf.pixel(x, y), expected_pixel(x, y, w, h, STILL), "pixel ({x},{y})");
    }
}

/// Runs a dream to a nonzero time with drift and flash applied, composing once more
/// and returning the scene that compose saw.
fn drifted_flashing_dream() -> (Scheduler<FixedHost>, Scene) {
    let mut dream = Scheduler::new(FixedHost::new(200.0, 160.0, 1.0), SchedulerOptions::default());
    dream.activate();
    let mut now = 0.0;
    for _ in 0..30 {
        dream.tick(now);
        now += 1000.0 / 60.0;
    }
    dream.apply_drift(Direction::Right);
    dream.apply_drift(Direction::Right);
    dream.apply_drift(Direction::Up);
    dream.trigger_flash();

    let flash = dream.state().flash();
    assert!(dream.tick(now).redrawn);
    let scene = Scene {
        t: dream.state().t() as f32,
        drift: dream.state().drift(),
        flash,
    };
    (dream, scene)
}

#[test]
fn compositor_applies_drift_flash_and_time() {
    let (dream, scene) = drifted_flashing_dream();
    assert!(scene.t > 0.0);
    assert!(scene.drift.0 > 0.0 && scene.drift.1 < 0.0);
    assert!((scene.flash - 0.8).abs() < 1e-6);
    assert_eq!(mismatches(dream.buffer(), scene), 0);
}

#[test]
fn drift_and_flash_change_the_picture() {
    let (dream, scene) = drifted_flashing_dream();
    let buf = dream.buffer();
    let no_drift = Scene {
        drift: (0.0, 0.0),
        ..scene
    };
    let no_flash = Scene { flash: 0.0, ..scene };
    let total = buf.width() * buf.height();
    assert!(mismatches(buf, no_drift) > total / 2, "drift offset ignored");
    assert!(mismatches(buf, no_flash) > total / 2, "flash offset ignored");
}

#[test]
fn compositor_output_is_opaque() {
    let mut comp = Compositor::new(80, 64);
    let mut state = RenderState::new();
    comp.compose(&mut state, 0.016);
    assert!(comp.buffer().pixels().chunks_exact(4).all(|p| p[3] == 255));
}

#[test]
fn compositor_vignette_darkens_corners() {
    let (w, h) = (64, 64);
    let mut comp = Compositor::new(w, h);
    let mut state = RenderState::new();
    comp.compose(&mut state, 0.0);

    // Corner vignette factor is 0.55, so no channel can exceed 255 * 0.55.
    let corner = comp.buffer().pixel(0, 0);
    assert!(corner[..3].iter().all(|&c| c <= 141), "corner too bright: {corner:?}");
}

#[test]
fn compositor_resize_reallocates() {
    let mut comp = Compositor::new(64, 64);
    comp.resize(100, 70);
    assert_eq!(comp.buffer().size(), (100, 70));
    assert_eq!(comp.buffer().pixels().len(), 100 * 70 * 4);
}

#[test]
fn compositor_on_empty_buffer_is_a_no_op() {
    let mut comp = Compositor::new(0, 0);
    let mut state = RenderState::new();
    comp.compose(&mut state, 0.05);
    assert!(comp.buffer().pixels().is_empty());
    assert_eq!(state.flash(), 0.0);
}

// ── Presenter ───────────────────────────────────────────────────────────────

fn solid_buffer(w: usize, h: usize, rgb: [u8; 3]) -> LowResBuffer {
    let mut px = vec![0u8; w * h * 4];
    for p in px.chunks_exact_mut(4) {
        p[..3].copy_from_slice(&rgb);
    }
    LowResBuffer::from_rgba(w, h, px).unwrap()
}

#[test]
fn from_rgba_rejects_wrong_length_and_forces_alpha() {
    assert!(LowResBuffer::from_rgba(2, 2, vec![0; 15]).is_none());
    let buf = LowResBuffer::from_rgba(1, 1, vec![1, 2, 3, 0]).unwrap();
    assert_eq!(buf.pixel(0, 0), [1, 2, 3, 255]);
}

#[test]
fn presenter_stretches_solid_color_with_normal_opacity() {
    let src = solid_buffer(4, 4, [200, 100, 50]);
    let mut dst = Surface::new(10, 6);
    Presenter::new().present(&src, &mut dst, 0.70);
    for p in dst.rgba().chunks_exact(4) {
        assert_eq!(p, [200, 100, 50, 179]);
    }
}

#[test]
fn presenter_low_power_opacity_is_140() {
    let src = solid_buffer(2, 2, [10, 20, 30]);
    let mut dst = Surface::new(3, 3);
    Presenter::new().present(&src, &mut dst, 0.55);
    assert_eq!(dst.pixel(1, 1), [10, 20, 30, 140]);
}

#[test]
fn presenter_interpolates_between_pixel_centers() {
    let src = LowResBuffer::from_rgba(2, 1, vec![0, 0, 0, 255, 255, 255, 255, 255]).unwrap();
    let mut dst = Surface::new(4, 1);
    Presenter::new().present(&src, &mut dst, 1.0);
    let reds: Vec<u8> = (0..4).map(|x| dst.pixel(x, 0)[0]).collect();
    assert_eq!(reds, vec![0, 64, 191, 255]);
}

#[test]
fn presenter_clears_before_drawing() {
    let mut presenter = Presenter::new();
    let mut dst = Surface::new(5, 5);
    presenter.present(&solid_buffer(2, 2, [255, 0, 0]), &mut dst, 0.7);
    assert!(dst.rgba().iter().any(|&b| b != 0));

    presenter.present(&LowResBuffer::new(0, 0), &mut dst, 0.7);
    assert!(dst.rgba().iter().all(|&b| b == 0));
}

#[test]
fn presenter_handles_size_changes_between_calls() {
    let mut presenter = Presenter::new();
    let src = solid_buffer(3, 3, [9, 9, 9]);
    let mut a = Surface::new(6, 6);
    presenter.present(&src, &mut a, 1.0);
    let mut b = Surface::new(2, 9);
    presenter.present(&src, &mut b, 1.0);
    assert!(b.rgba().chunks_exact(4).all(|p| p == [9, 9, 9, 255]));
}
