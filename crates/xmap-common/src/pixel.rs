//! Pixel-space sizes and rectangles.

use serde::{Deserialize, Serialize};

/// An image size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelSize {
    pub width: u32,
    pub height: u32,
}

impl PixelSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Same size in both dimensions.
    pub fn square(size: u32) -> Self {
        Self {
            width: size,
            height: size,
        }
    }

    /// True if a `width` x `height` area (fractional pixels) is at least this size.
    pub fn is_satisfied_by(&self, width: f64, height: f64) -> bool {
        width >= self.width as f64 && height >= self.height as f64
    }
}

/// An integer pixel rectangle inside an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest integer rectangle covering the fractional span
    /// `[x_min, x_max] x [y_min, y_max]`, clipped to `limit`.
    pub fn covering(x_min: f64, y_min: f64, x_max: f64, y_max: f64, limit: PixelSize) -> Self {
        let clip_x = |v: f64| v.clamp(0.0, limit.width as f64);
        let clip_y = |v: f64| v.clamp(0.0, limit.height as f64);

        let x0 = clip_x(x_min.floor()) as u32;
        let y0 = clip_y(y_min.floor()) as u32;
        let x1 = clip_x(x_max.ceil()) as u32;
        let y1 = clip_y(y_max.ceil()) as u32;

        Self {
            x: x0,
            y: y0,
            width: x1.saturating_sub(x0).max(1),
            height: y1.saturating_sub(y0).max(1),
        }
    }

    pub fn size(&self) -> PixelSize {
        PixelSize::new(self.width, self.height)
    }

    /// Check if a fractional pixel position lies inside the rectangle.
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x as f64
            && py >= self.y as f64
            && px <= (self.x + self.width) as f64
            && py <= (self.y + self.height) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_covering_rounds_outward() {
        let rect = PixelRect::covering(10.4, 20.6, 110.2, 220.0, PixelSize::square(512));
        assert_eq!(rect, PixelRect::new(10, 20, 101, 200));
        assert!(rect.contains(10.4, 20.6));
        assert!(rect.contains(110.2, 220.0));
    }

    #[test]
    fn test_covering_clips_to_limit() {
        let rect = PixelRect::covering(-5.0, -5.0, 600.0, 300.0, PixelSize::new(512, 256));
        assert_eq!(rect, PixelRect::new(0, 0, 512, 256));
    }

    #[test]
    fn test_size_satisfied() {
        let min = PixelSize::new(300, 200);
        assert!(min.is_satisfied_by(300.0, 200.0));
        assert!(!min.is_satisfied_by(299.9, 500.0));
    }
}
