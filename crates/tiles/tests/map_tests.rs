//! Tests for tile stitching, pixel transforms and caching.
//!
//! All tiles come from in-memory fetchers; nothing here touches the network.

use std::cell::Cell;
use std::io::Cursor;

use bytes::Bytes;
use image::{ImageOutputFormat, Rgba, RgbaImage};
use tiles::{
    CachedTileFetcher, MapProvider, TileError, TileFetcher, TileMapProvider, TileResult,
    TileSource,
};
use xmap_common::{BoundingBox, TileCoord};

// ============================================================================
// Helpers
// ============================================================================

fn encode_png(img: &RgbaImage) -> Bytes {
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img.clone())
        .write_to(&mut buf, ImageOutputFormat::Png)
        .unwrap();
    Bytes::from(buf.into_inner())
}

/// Serves tiles filled with a color derived from their position.
struct ColorFetcher {
    size: u32,
    calls: Cell<usize>,
}

impl ColorFetcher {
    fn new(size: u32) -> Self {
        Self {
            size,
            calls: Cell::new(0),
        }
    }

    fn color(coord: &TileCoord) -> Rgba<u8> {
        Rgba([(coord.x % 256) as u8, (coord.y % 256) as u8, coord.z as u8, 255])
    }
}

impl TileFetcher for ColorFetcher {
    fn fetch_tile(&self, coord: TileCoord) -> TileResult<Bytes> {
        self.calls.set(self.calls.get() + 1);
        Ok(encode_png(&RgbaImage::from_pixel(
            self.size,
            self.size,
            Self::color(&coord),
        )))
    }
}

struct GarbageFetcher;

impl TileFetcher for GarbageFetcher {
    fn fetch_tile(&self, _coord: TileCoord) -> TileResult<Bytes> {
        Ok(Bytes::from_static(b"not an image"))
    }
}

struct FailingFetcher;

impl TileFetcher for FailingFetcher {
    fn fetch_tile(&self, coord: TileCoord) -> TileResult<Bytes> {
        Err(TileError::Http {
            url: format!("https://tiles.invalid/{}.png", coord),
            status: 503,
        })
    }
}

fn nyc_bbox() -> BoundingBox {
    BoundingBox::new(40.0, 41.0, -74.0, -73.0)
}

// ============================================================================
// Stitching
// ============================================================================

#[test]
fn test_stitched_size_matches_tile_range() {
    let provider = TileMapProvider::new(ColorFetcher::new(256), &TileSource::default());
    let map = provider.fetch_map(&nyc_bbox(), 9).unwrap();

    let range = *map.range();
    assert_eq!(map.zoom(), 9);
    assert_eq!(map.size().width, range.columns() * 256);
    assert_eq!(map.size().height, range.rows() * 256);
    assert_eq!(provider.fetcher().calls.get(), range.count());
}

#[test]
fn test_tiles_placed_at_their_offsets() {
    let provider = TileMapProvider::new(ColorFetcher::new(256), &TileSource::default());
    let map = provider.fetch_map(&nyc_bbox(), 9).unwrap();
    let range = *map.range();

    for coord in range.iter() {
        let px = (coord.x - range.x_min) * 256 + 128;
        let py = (coord.y - range.y_min) * 256 + 128;
        assert_eq!(*map.image().get_pixel(px, py), ColorFetcher::color(&coord));
    }
}

#[test]
fn test_mismatched_tile_size_is_resampled() {
    // Fetcher returns 512px tiles, provider expects 256px
    let provider = TileMapProvider::new(ColorFetcher::new(512), &TileSource::default());
    let map = provider.fetch_map(&nyc_bbox(), 8).unwrap();
    assert_eq!(map.size().width, map.range().columns() * 256);
}

// ============================================================================
// Pixel transform
// ============================================================================

#[test]
fn test_bbox_corners_project_inside_image() {
    let provider = TileMapProvider::new(ColorFetcher::new(256), &TileSource::default());
    let bbox = nyc_bbox();
    let map = provider.fetch_map(&bbox, 10).unwrap();
    let size = map.size();

    for (lat, lon) in [
        (bbox.lat_min, bbox.lon_min),
        (bbox.lat_min, bbox.lon_max),
        (bbox.lat_max, bbox.lon_min),
        (bbox.lat_max, bbox.lon_max),
        bbox.center(),
    ] {
        let (x, y) = map.to_pixels(lat, lon);
        assert!(x >= 0.0 && x <= size.width as f64, "x={} for {},{}", x, lat, lon);
        assert!(y >= 0.0 && y <= size.height as f64, "y={} for {},{}", y, lat, lon);
    }

    assert!(map.geo_bounds().contains_bbox(&bbox));
}

#[test]
fn test_pixel_roundtrip() {
    let provider = TileMapProvider::new(ColorFetcher::new(256), &TileSource::default());
    let map = provider.fetch_map(&nyc_bbox(), 9).unwrap();

    let (x, y) = map.to_pixels(40.5, -73.5);
    let (lat, lon) = map.from_pixels(x, y);
    assert!((lat - 40.5).abs() < 1e-9);
    assert!((lon - (-73.5)).abs() < 1e-9);
}

#[test]
fn test_bbox_pixels_and_crop() {
    let provider = TileMapProvider::new(ColorFetcher::new(256), &TileSource::default());
    let bbox = nyc_bbox();
    let map = provider.fetch_map(&bbox, 9).unwrap();

    let rect = map.bbox_pixels(&bbox);
    // 1/360 of the 131072 px world, rounded outward
    assert!(rect.width >= 364 && rect.width <= 366);
    assert!(rect.height >= 478);

    let cropped = map.crop(&rect);
    assert_eq!(cropped.dimensions(), (rect.width, rect.height));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_too_many_tiles() {
    let provider =
        TileMapProvider::new(ColorFetcher::new(256), &TileSource::default()).with_max_tiles(1);
    let err = provider.fetch_map(&nyc_bbox(), 12).unwrap_err();
    assert!(matches!(err, TileError::TooManyTiles { max: 1, .. }));
    assert_eq!(provider.fetcher().calls.get(), 0);
}

#[test]
fn test_zoom_above_source_limit() {
    let provider = TileMapProvider::new(ColorFetcher::new(256), &TileSource::default());
    let err = provider.fetch_map(&nyc_bbox(), 22).unwrap_err();
    assert!(matches!(err, TileError::ZoomOutOfRange { zoom: 22, .. }));
}

#[test]
fn test_undecodable_tile() {
    let provider = TileMapProvider::new(GarbageFetcher, &TileSource::default());
    let err = provider.fetch_map(&nyc_bbox(), 5).unwrap_err();
    assert!(matches!(err, TileError::Decode { .. }));
}

#[test]
fn test_fetch_error_passes_through() {
    let provider = TileMapProvider::new(FailingFetcher, &TileSource::default());
    let err = provider.fetch_map(&nyc_bbox(), 5).unwrap_err();
    assert!(matches!(err, TileError::Http { status: 503, .. }));
}

// ============================================================================
// Caching
// ============================================================================

#[test]
fn test_memory_cache_hits() {
    let cached = CachedTileFetcher::new(ColorFetcher::new(256), 16);
    let coord = TileCoord::new(3, 2, 1);

    let first = cached.fetch_tile(coord).unwrap();
    let second = cached.fetch_tile(coord).unwrap();

    assert_eq!(first, second);
    assert_eq!(cached.inner().calls.get(), 1);
    assert_eq!(cached.stats().memory_hits(), 1);
    assert_eq!(cached.stats().misses(), 1);
    assert!((cached.stats().hit_rate() - 50.0).abs() < 1e-9);
}

#[test]
fn test_disk_cache_persists_between_instances() {
    let dir = tempfile::tempdir().unwrap();
    let coord = TileCoord::new(4, 7, 5);

    let first = CachedTileFetcher::new(ColorFetcher::new(256), 0).with_disk_cache(dir.path());
    first.fetch_tile(coord).unwrap();
    assert!(CachedTileFetcher::<ColorFetcher>::disk_path(dir.path(), &coord).exists());

    let second = CachedTileFetcher::new(ColorFetcher::new(256), 0).with_disk_cache(dir.path());
    second.fetch_tile(coord).unwrap();
    assert_eq!(second.inner().calls.get(), 0);
    assert_eq!(second.stats().disk_hits(), 1);
}

#[test]
fn test_corrupt_disk_tile_is_evicted() {
    let dir = tempfile::tempdir().unwrap();
    let coord = TileCoord::new(0, 0, 0);
    let path = CachedTileFetcher::<ColorFetcher>::disk_path(dir.path(), &coord);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, b"truncated").unwrap();

    let cached = CachedTileFetcher::new(ColorFetcher::new(256), 16).with_disk_cache(dir.path());
    let provider = TileMapProvider::new(cached, &TileSource::default());

    let err = provider.fetch_map(&nyc_bbox(), 0).unwrap_err();
    assert!(matches!(err, TileError::Decode { .. }));
    assert!(!path.exists());

    // The next request goes to the wrapped fetcher and stores a good copy
    provider.fetch_map(&nyc_bbox(), 0).unwrap();
    assert_eq!(provider.fetcher().inner().calls.get(), 1);
    assert!(path.exists());
}

#[test]
fn test_errors_are_not_cached() {
    let cached = CachedTileFetcher::new(FailingFetcher, 16);
    assert!(cached.fetch_tile(TileCoord::new(1, 0, 0)).is_err());
    assert!(cached.fetch_tile(TileCoord::new(1, 0, 0)).is_err());
    assert_eq!(cached.stats().misses(), 2);
}
