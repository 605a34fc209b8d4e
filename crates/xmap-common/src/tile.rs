//! XYZ (slippy map) tile addressing.

use crate::BoundingBox;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A tile coordinate (z/x/y) in the XYZ scheme (origin at the top-left).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    /// Zoom level
    pub z: u32,
    /// Column (x)
    pub x: u32,
    /// Row (y)
    pub y: u32,
}

impl TileCoord {
    pub fn new(z: u32, x: u32, y: u32) -> Self {
        Self { z, x, y }
    }

    /// Number of tiles along one axis at this zoom.
    pub fn tiles_per_axis(&self) -> u32 {
        1u32 << self.z
    }

    /// True if x and y are inside the tile grid of this zoom.
    pub fn is_valid(&self) -> bool {
        self.x < self.tiles_per_axis() && self.y < self.tiles_per_axis()
    }

    /// Geographic bounds of this tile.
    pub fn bounds(&self) -> BoundingBox {
        let n = self.tiles_per_axis() as f64;

        let lon_min = self.x as f64 / n * 360.0 - 180.0;
        let lon_max = (self.x + 1) as f64 / n * 360.0 - 180.0;

        let lat_max = (std::f64::consts::PI * (1.0 - 2.0 * self.y as f64 / n))
            .sinh()
            .atan()
            .to_degrees();
        let lat_min = (std::f64::consts::PI * (1.0 - 2.0 * (self.y + 1) as f64 / n))
            .sinh()
            .atan()
            .to_degrees();

        BoundingBox::new(lat_min, lat_max, lon_min, lon_max)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.z, self.x, self.y)
    }
}

/// An inclusive rectangular block of tiles at one zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRange {
    pub z: u32,
    pub x_min: u32,
    pub x_max: u32,
    pub y_min: u32,
    pub y_max: u32,
}

impl TileRange {
    /// Create a range, ordering the corners and clamping to the zoom's grid.
    pub fn new(z: u32, x_a: u32, x_b: u32, y_a: u32, y_b: u32) -> Self {
        let last = (1u32 << z) - 1;
        Self {
            z,
            x_min: x_a.min(x_b).min(last),
            x_max: x_a.max(x_b).min(last),
            y_min: y_a.min(y_b).min(last),
            y_max: y_a.max(y_b).min(last),
        }
    }

    /// Number of tile columns.
    pub fn columns(&self) -> u32 {
        self.x_max - self.x_min + 1
    }

    /// Number of tile rows.
    pub fn rows(&self) -> u32 {
        self.y_max - self.y_min + 1
    }

    /// Total number of tiles.
    pub fn count(&self) -> usize {
        self.columns() as usize * self.rows() as usize
    }

    pub fn contains(&self, coord: &TileCoord) -> bool {
        coord.z == self.z
            && (self.x_min..=self.x_max).contains(&coord.x)
            && (self.y_min..=self.y_max).contains(&coord.y)
    }

    /// Iterate row by row, left to right.
    pub fn iter(&self) -> impl Iterator<Item = TileCoord> + '_ {
        (self.y_min..=self.y_max)
            .flat_map(move |y| (self.x_min..=self.x_max).map(move |x| TileCoord::new(self.z, x, y)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_zero_bounds_cover_world() {
        let bbox = TileCoord::new(0, 0, 0).bounds();
        assert!((bbox.lon_min - (-180.0)).abs() < 1e-9);
        assert!((bbox.lon_max - 180.0).abs() < 1e-9);
        assert!((bbox.lat_max - crate::MERCATOR_MAX_LAT).abs() < 1e-6);
        assert!((bbox.lat_min + crate::MERCATOR_MAX_LAT).abs() < 1e-6);
    }

    #[test]
    fn test_tile_validity() {
        assert!(TileCoord::new(2, 3, 3).is_valid());
        assert!(!TileCoord::new(2, 4, 0).is_valid());
    }

    #[test]
    fn test_range_iteration_order() {
        let range = TileRange::new(3, 5, 4, 1, 2);
        assert_eq!(range.columns(), 2);
        assert_eq!(range.rows(), 2);
        assert_eq!(range.count(), 4);

        let tiles: Vec<TileCoord> = range.iter().collect();
        assert_eq!(
            tiles,
            vec![
                TileCoord::new(3, 4, 1),
                TileCoord::new(3, 5, 1),
                TileCoord::new(3, 4, 2),
                TileCoord::new(3, 5, 2),
            ]
        );
        assert!(tiles.iter().all(|t| range.contains(t)));
    }

    #[test]
    fn test_range_clamped_to_grid() {
        let range = TileRange::new(1, 0, 7, 0, 7);
        assert_eq!(range.x_max, 1);
        assert_eq!(range.y_max, 1);
    }
}
