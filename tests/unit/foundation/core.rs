use super::*;

#[test]
fn surface_size_rejects_zero_area() {
    assert!(SurfaceSize::new(0, 10).is_err());
    assert!(SurfaceSize::new(10, 0).is_err());
    let s = SurfaceSize::new(4, 2).unwrap();
    assert!(!s.is_empty());
}

#[test]
fn over_respects_alpha_extremes() {
    let dst = Rgba8::opaque(10, 20, 30);
    assert_eq!(Rgba8::opaque(1, 2, 3).over(dst), Rgba8::opaque(1, 2, 3));
    assert_eq!(Rgba8::transparent().over(dst), dst);
}

#[test]
fn over_half_alpha_blends_toward_source() {
    let dst = Rgba8::opaque(0, 0, 0);
    let out = Rgba8::new(255, 255, 255, 128).over(dst);
    assert_eq!(out.a, 255);
    assert!(out.r > 120 && out.r < 136);
}

#[test]
fn clamp_unit_handles_nan_and_bounds() {
    assert_eq!(clamp_unit(f64::NAN), 0.0);
    assert_eq!(clamp_unit(-0.5), 0.0);
    assert_eq!(clamp_unit(1.5), 1.0);
    assert_eq!(clamp_unit(0.25), 0.25);
}

#[test]
fn format_clock_pads_seconds() {
    assert_eq!(format_clock(0.0), "0:00");
    assert_eq!(format_clock(4.9), "0:04");
    assert_eq!(format_clock(75.0), "1:15");
    assert_eq!(format_clock(-3.0), "0:00");
    assert_eq!(format_clock(f64::INFINITY), "0:00");
}
