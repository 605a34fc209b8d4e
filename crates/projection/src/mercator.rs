//! Spherical Mercator (EPSG:3857) in the XYZ tile pixel space.
//!
//! Positions are expressed as fractions of the world square ("unit"
//! coordinates, [0, 1] on both axes with the origin at the north-west
//! corner), as fractional tile numbers, or as global pixels at a zoom.

use std::f64::consts::PI;

use xmap_common::{BoundingBox, TileCoord, TileRange, MERCATOR_MAX_LAT};

/// Standard OpenStreetMap tile edge in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// Longitude to unit x in [0, 1].
pub fn lon_to_unit_x(lon: f64) -> f64 {
    (lon + 180.0) / 360.0
}

/// Latitude to unit y in [0, 1], north at 0. Clamped to the Mercator limit.
pub fn lat_to_unit_y(lat: f64) -> f64 {
    let lat_rad = lat.clamp(-MERCATOR_MAX_LAT, MERCATOR_MAX_LAT).to_radians();
    (1.0 - lat_rad.tan().asinh() / PI) / 2.0
}

pub fn unit_x_to_lon(x: f64) -> f64 {
    x * 360.0 - 180.0
}

pub fn unit_y_to_lat(y: f64) -> f64 {
    (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees()
}

/// Web Mercator projection for a given tile size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebMercator {
    tile_size: u32,
}

impl Default for WebMercator {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
        }
    }
}

impl WebMercator {
    pub fn new(tile_size: u32) -> Self {
        Self { tile_size }
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Edge length of the whole world in pixels at `zoom`.
    pub fn world_size(&self, zoom: u32) -> f64 {
        self.tile_size as f64 * 2f64.powi(zoom as i32)
    }

    /// Fractional tile numbers `(x, y)` of a position, without rounding.
    pub fn fractional_tile(&self, lat: f64, lon: f64, zoom: u32) -> (f64, f64) {
        let n = 2f64.powi(zoom as i32);
        (lon_to_unit_x(lon) * n, lat_to_unit_y(lat) * n)
    }

    /// Tile containing a position.
    pub fn tile_at(&self, lat: f64, lon: f64, zoom: u32) -> TileCoord {
        let last = ((1u64 << zoom) - 1) as f64;
        let (x, y) = self.fractional_tile(lat, lon, zoom);
        TileCoord::new(
            zoom,
            x.floor().clamp(0.0, last) as u32,
            y.floor().clamp(0.0, last) as u32,
        )
    }

    /// Global pixel position of `(lat, lon)` at `zoom`.
    pub fn to_world_pixels(&self, lat: f64, lon: f64, zoom: u32) -> (f64, f64) {
        let size = self.world_size(zoom);
        (lon_to_unit_x(lon) * size, lat_to_unit_y(lat) * size)
    }

    /// Inverse of [`to_world_pixels`](Self::to_world_pixels), returns `(lat, lon)`.
    pub fn from_world_pixels(&self, x: f64, y: f64, zoom: u32) -> (f64, f64) {
        let size = self.world_size(zoom);
        (unit_y_to_lat(y / size), unit_x_to_lon(x / size))
    }

    /// Block of tiles covering a bounding box.
    pub fn tile_range(&self, bbox: &BoundingBox, zoom: u32) -> TileRange {
        let north_west = self.tile_at(bbox.lat_max, bbox.lon_min, zoom);
        let south_east = self.tile_at(bbox.lat_min, bbox.lon_max, zoom);
        TileRange::new(zoom, north_west.x, south_east.x, north_west.y, south_east.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_is_center_of_world() {
        let proj = WebMercator::default();
        let (x, y) = proj.to_world_pixels(0.0, 0.0, 0);
        assert!((x - 128.0).abs() < 1e-9);
        assert!((y - 128.0).abs() < 1e-9);
    }

    #[test]
    fn test_tile_at_known_location() {
        let tile = WebMercator::default().tile_at(48.1374, 11.5755, 12);
        assert_eq!(tile, TileCoord::new(12, 2179, 1421));

        // Southern and eastern hemisphere
        let tile = WebMercator::default().tile_at(-33.8688, 151.2093, 10);
        assert_eq!(tile, TileCoord::new(10, 942, 614));
    }

    #[test]
    fn test_world_pixel_roundtrip() {
        let proj = WebMercator::default();
        let (x, y) = proj.to_world_pixels(48.1374, 11.5755, 14);
        let (lat, lon) = proj.from_world_pixels(x, y, 14);
        assert!((lat - 48.1374).abs() < 1e-9);
        assert!((lon - 11.5755).abs() < 1e-9);
    }

    #[test]
    fn test_tile_at_clamps_edges() {
        let proj = WebMercator::default();
        assert_eq!(proj.tile_at(90.0, 180.0, 2), TileCoord::new(2, 3, 0));
        assert_eq!(proj.tile_at(-90.0, -180.0, 2), TileCoord::new(2, 0, 3));
    }

    #[test]
    fn test_tile_range_for_bbox() {
        let proj = WebMercator::default();
        let bbox = BoundingBox::new(40.0, 41.0, -74.0, -73.0);
        let range = proj.tile_range(&bbox, 9);
        assert!(range.contains(&proj.tile_at(40.0, -74.0, 9)));
        assert!(range.contains(&proj.tile_at(41.0, -73.0, 9)));
        assert!(range.x_min <= range.x_max && range.y_min <= range.y_max);
    }
}
