use super::*;

const INK: Rgba8 = Rgba8::opaque(200, 220, 255);

fn square_wave(frames: usize) -> PcmBuffer {
    let data = (0..frames)
        .map(|i| if i % 2 == 0 { 0.5 } else { -0.5 })
        .collect();
    PcmBuffer::from_planar(100, vec![data]).unwrap()
}

#[test]
fn rejects_zero_sized_surface() {
    let pcm = square_wave(10);
    assert!(rasterize(&pcm, 0, 10, INK).is_err());
    assert!(rasterize(&pcm, 10, 0, INK).is_err());
}

#[test]
fn envelope_column_spans_min_to_max_rows() {
    let pcm = square_wave(400);
    let img = rasterize(&pcm, 4, 100, INK).unwrap();
    assert_eq!(img.size(), SurfaceSize { width: 4, height: 100 });
    // min=-0.5 -> row 25, max=0.5 -> row 75
    assert_eq!(img.pixel(0, 24), Some(Rgba8::transparent()));
    assert_eq!(img.pixel(0, 25), Some(INK));
    assert_eq!(img.pixel(0, 74), Some(INK));
    assert_eq!(img.pixel(0, 75), Some(Rgba8::transparent()));
    assert_eq!(img.pixel(4, 0), None);
}

#[test]
fn silence_draws_a_one_pixel_midline() {
    let pcm = PcmBuffer::from_planar(100, vec![vec![0.0; 50]]).unwrap();
    let img = rasterize(&pcm, 5, 10, INK).unwrap();
    for x in 0..5 {
        let inked: Vec<u32> = (0..10)
            .filter(|&y| img.pixel(x, y) == Some(INK))
            .collect();
        assert_eq!(inked, vec![5]);
    }
}

#[test]
fn stereo_is_downmixed_before_reduction() {
    // Opposite-polarity channels cancel to silence.
    let l = vec![0.8f32; 64];
    let r = vec![-0.8f32; 64];
    let pcm = PcmBuffer::from_planar(100, vec![l, r]).unwrap();
    let img = rasterize(&pcm, 8, 20, INK).unwrap();
    assert_eq!(img.pixel(3, 10), Some(INK));
    assert_eq!(img.pixel(3, 2), Some(Rgba8::transparent()));
    assert_eq!(img.pixel(3, 17), Some(Rgba8::transparent()));
}

#[test]
fn rasterize_is_deterministic() {
    let frames = 10_007;
    let data = (0..frames)
        .map(|i| ((i as f32) * 0.013).sin() * 0.7)
        .collect();
    let pcm = PcmBuffer::from_planar(44_100, vec![data]).unwrap();
    let a = rasterize(&pcm, 321, 77, INK).unwrap();
    let b = rasterize(&pcm, 321, 77, INK).unwrap();
    assert_eq!(a.as_raw(), b.as_raw());
}

#[test]
fn full_scale_peaks_stay_inside_the_image() {
    let pcm = PcmBuffer::from_planar(100, vec![vec![1.0, -1.0, 2.0, -3.0]]).unwrap();
    let img = rasterize(&pcm, 2, 10, INK).unwrap();
    assert_eq!(img.pixel(0, 0), Some(INK));
    assert_eq!(img.pixel(0, 9), Some(INK));
}

#[test]
fn save_png_writes_a_readable_file() {
    let pcm = square_wave(100);
    let img = rasterize(&pcm, 16, 8, INK).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wave.png");
    img.save_png(&path).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    assert_eq!(&bytes[1..4], b"PNG");
}
