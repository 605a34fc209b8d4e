//! Tests for series overlays and captions.

use image::{Rgba, RgbaImage};
use renderer::{
    find_system_font, load_font, CaptionStyle, Colormap, OverlayStyle, PlotRenderer, ValueRange,
};

const BACKGROUND: Rgba<u8> = Rgba([242, 239, 233, 255]);

fn base(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_pixel(width, height, BACKGROUND)
}

/// Points on a diagonal track.
fn track(count: usize, size: u32) -> Vec<(f64, f64)> {
    let step = (size as f64 - 20.0) / (count.max(2) - 1) as f64;
    (0..count)
        .map(|i| (10.0 + i as f64 * step, 10.0 + i as f64 * step))
        .collect()
}

#[test]
fn test_fixed_range_colors_are_shared_between_series() {
    let renderer = PlotRenderer::new(OverlayStyle {
        gradient_lines: false,
        value_range: Some(ValueRange::new(0.0, 100.0)),
        ..Default::default()
    });
    let points = track(2, 100);

    let a = renderer
        .render(&base(100, 100), &points, Some(&[50.0, 60.0]), None)
        .unwrap();
    let b = renderer
        .render(&base(100, 100), &points, Some(&[50.0, 90.0]), None)
        .unwrap();

    // Same value, same color, regardless of the rest of the series
    assert_eq!(a.get_pixel(10, 10), b.get_pixel(10, 10));
    assert_eq!(*a.get_pixel(10, 10), Colormap::plasma().color_at(0.5));
}

#[test]
fn test_gradient_line_changes_color_along_track() {
    let renderer = PlotRenderer::new(OverlayStyle {
        markers: false,
        line_width: 1,
        colormap: Colormap::grayscale(),
        ..Default::default()
    });
    let points = [(0.0, 20.0), (99.0, 20.0)];
    let img = renderer
        .render(&base(100, 40), &points, Some(&[0.0, 1.0]), None)
        .unwrap();

    let left = img.get_pixel(5, 20).0[0];
    let right = img.get_pixel(95, 20).0[0];
    assert!(left < right, "expected dark to light, got {} -> {}", left, right);
}

#[test]
fn test_disabled_layers_leave_base() {
    let renderer = PlotRenderer::new(OverlayStyle {
        markers: false,
        gradient_lines: false,
        ..Default::default()
    });
    let img = renderer
        .render(&base(50, 50), &track(5, 50), Some(&[1.0, 2.0, 3.0, 4.0, 5.0]), None)
        .unwrap();
    assert_eq!(img, base(50, 50));
}

#[test]
fn test_points_outside_image_are_clipped() {
    let renderer = PlotRenderer::new(OverlayStyle::default());
    let points = [(-40.0, -40.0), (500.0, 500.0)];
    let img = renderer
        .render(&base(60, 60), &points, Some(&[1.0, 2.0]), None)
        .unwrap();
    assert_eq!(img.dimensions(), (60, 60));
}

#[test]
fn test_caption_drawn_with_system_font() {
    let Some(path) = find_system_font() else {
        eprintln!("no system font found, skipping");
        return;
    };
    let font = load_font(&path).unwrap();
    let renderer = PlotRenderer::new(OverlayStyle::default()).with_font(
        font,
        CaptionStyle {
            size: 18.0,
            ..Default::default()
        },
    );

    let img = renderer
        .render(&base(200, 100), &[], None, Some("Speed"))
        .unwrap();

    // Something changed in the bottom-left corner, nothing at the top-right
    let bottom_left_changed = (0..80)
        .flat_map(|x| (60..100).map(move |y| (x, y)))
        .any(|(x, y)| *img.get_pixel(x, y) != BACKGROUND);
    assert!(bottom_left_changed);
    assert_eq!(*img.get_pixel(199, 0), BACKGROUND);
}

#[test]
fn test_load_font_rejects_non_font_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("not-a-font.ttf");
    std::fs::write(&path, b"plain text").unwrap();
    assert!(load_font(&path).is_err());
}
