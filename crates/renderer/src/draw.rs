//! Marker and line primitives.

use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_circle_mut, draw_hollow_circle_mut, BresenhamLineIter};

/// Linear mix of two RGBA colors, `t` in [0, 1].
pub fn mix(a: Rgba<u8>, b: Rgba<u8>, t: f64) -> Rgba<u8> {
    let t = t.clamp(0.0, 1.0);
    let channel = |i: usize| (a.0[i] as f64 * (1.0 - t) + b.0[i] as f64 * t).round() as u8;
    Rgba([channel(0), channel(1), channel(2), channel(3)])
}

/// Source-over compositing of `color` onto the pixel at `(x, y)`.
///
/// Pixels outside the image are ignored.
pub fn blend_pixel(img: &mut RgbaImage, x: i32, y: i32, color: Rgba<u8>) {
    if x < 0 || y < 0 || x >= img.width() as i32 || y >= img.height() as i32 {
        return;
    }

    let dst = img.get_pixel_mut(x as u32, y as u32);
    let src_a = color.0[3] as f64 / 255.0;
    let dst_a = dst.0[3] as f64 / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);
    if out_a <= 0.0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }

    for i in 0..3 {
        let c = (color.0[i] as f64 * src_a + dst.0[i] as f64 * dst_a * (1.0 - src_a)) / out_a;
        dst.0[i] = c.round() as u8;
    }
    dst.0[3] = (out_a * 255.0).round() as u8;
}

/// Filled circular marker centered on `center`, with an optional ring.
pub fn draw_marker(
    img: &mut RgbaImage,
    center: (f64, f64),
    radius: u32,
    fill: Rgba<u8>,
    outline: Option<Rgba<u8>>,
) {
    let c = (center.0.round() as i32, center.1.round() as i32);
    draw_filled_circle_mut(img, c, radius as i32, fill);
    if let Some(ring) = outline {
        draw_hollow_circle_mut(img, c, radius as i32, ring);
    }
}

/// Line from `from` to `to` whose color runs from `start` to `end`.
///
/// Widths above one are drawn as a chain of small discs along the
/// Bresenham path.
pub fn draw_gradient_line(
    img: &mut RgbaImage,
    from: (f64, f64),
    to: (f64, f64),
    start: Rgba<u8>,
    end: Rgba<u8>,
    width: u32,
) {
    if width == 0 {
        return;
    }

    let mut path: Vec<(i32, i32)> = BresenhamLineIter::new(
        (from.0 as f32, from.1 as f32),
        (to.0 as f32, to.1 as f32),
    )
    .collect();

    // The iterator walks along increasing x (or y when steep), not from `from`
    if let Some(&(x, y)) = path.first() {
        let dist = |p: (f64, f64)| (x as f64 - p.0).powi(2) + (y as f64 - p.1).powi(2);
        if dist(from) > dist(to) {
            path.reverse();
        }
    }

    let steps = path.len().saturating_sub(1).max(1) as f64;
    let radius = (width / 2) as i32;

    for (i, (x, y)) in path.into_iter().enumerate() {
        let color = mix(start, end, i as f64 / steps);
        if radius == 0 {
            if x >= 0 && y >= 0 && (x as u32) < img.width() && (y as u32) < img.height() {
                img.put_pixel(x as u32, y as u32, color);
            }
        } else {
            draw_filled_circle_mut(img, (x, y), radius, color);
        }
    }
}
