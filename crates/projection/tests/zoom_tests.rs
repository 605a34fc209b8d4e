//! Property checks for zoom selection over many boxes and sizes.

use projection::{select_zoom, span_pixels, WebMercator, DEFAULT_TILE_SIZE};
use xmap_common::{BoundingBox, PixelSize};

const MAX_ZOOM: u32 = 19;

fn sample_boxes() -> Vec<BoundingBox> {
    let mut boxes = Vec::new();
    for i in 0..40 {
        let t = i as f64;
        let lat = ((t * 13.7) % 150.0) - 75.0;
        let lon = ((t * 47.3) % 340.0) - 170.0;
        let lat_ext = 0.001 * (1.0 + (t * 3.1) % 500.0);
        let lon_ext = 0.002 * (1.0 + (t * 5.9) % 400.0);
        boxes.push(BoundingBox::new(
            lat,
            (lat + lat_ext).min(85.0),
            lon,
            (lon + lon_ext).min(180.0),
        ));
    }
    boxes
}

fn sample_sizes() -> Vec<PixelSize> {
    vec![
        PixelSize::square(1),
        PixelSize::square(256),
        PixelSize::square(300),
        PixelSize::square(512),
        PixelSize::new(1024, 200),
        PixelSize::new(200, 1024),
        PixelSize::square(2000),
    ]
}

#[test]
fn test_selected_zoom_is_sufficient_and_minimal() {
    for bbox in sample_boxes() {
        for min in sample_sizes() {
            let sel = select_zoom(&bbox, min, DEFAULT_TILE_SIZE, MAX_ZOOM).unwrap();
            let (w, h) = span_pixels(&bbox, sel.zoom, DEFAULT_TILE_SIZE);

            if sel.capped {
                assert_eq!(sel.zoom, MAX_ZOOM);
                continue;
            }

            assert!(
                min.is_satisfied_by(w, h),
                "zoom {} too small for {:?} on {}",
                sel.zoom,
                min,
                bbox
            );

            if sel.zoom > 0 {
                let (pw, ph) = span_pixels(&bbox, sel.zoom - 1, DEFAULT_TILE_SIZE);
                assert!(
                    !min.is_satisfied_by(pw, ph),
                    "zoom {} not minimal for {:?} on {}",
                    sel.zoom,
                    min,
                    bbox
                );
            }
        }
    }
}

#[test]
fn test_zoom_monotonic_in_size() {
    let bbox = BoundingBox::new(47.3, 47.7, 8.3, 8.8);
    let mut last = 0;
    for size in (64..=4096).step_by(64) {
        let sel = select_zoom(&bbox, PixelSize::square(size), DEFAULT_TILE_SIZE, MAX_ZOOM).unwrap();
        assert!(sel.zoom >= last);
        last = sel.zoom;
    }
}

#[test]
fn test_larger_tiles_need_lower_or_equal_zoom() {
    let bbox = BoundingBox::new(51.4, 51.6, -0.3, 0.1);
    let small = select_zoom(&bbox, PixelSize::square(512), 256, MAX_ZOOM).unwrap();
    let large = select_zoom(&bbox, PixelSize::square(512), 512, MAX_ZOOM).unwrap();
    assert_eq!(large.zoom + 1, small.zoom);
}

#[test]
fn test_span_matches_world_pixels() {
    let proj = WebMercator::default();
    let bbox = BoundingBox::new(40.0, 41.0, -74.0, -73.0);
    let (x0, y0) = proj.to_world_pixels(bbox.lat_max, bbox.lon_min, 9);
    let (x1, y1) = proj.to_world_pixels(bbox.lat_min, bbox.lon_max, 9);
    let (w, h) = span_pixels(&bbox, 9, DEFAULT_TILE_SIZE);
    assert!((x1 - x0 - w).abs() < 1e-6);
    assert!((y1 - y0 - h).abs() < 1e-6);
}
