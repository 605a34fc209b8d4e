//! In-memory tile fetchers and map providers.
//!
//! Tiles are generated as real PNG bytes so the decode and stitch path is
//! exercised exactly as with downloaded tiles.

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use image::{ImageOutputFormat, Rgba, RgbaImage};
use tiles::{MapImage, MapProvider, TileError, TileFetcher, TileResult};
use xmap_common::{BoundingBox, TileCoord};

/// Encode a single-color square tile as PNG.
pub fn solid_tile_png(size: u32, color: Rgba<u8>) -> Bytes {
    let img = RgbaImage::from_pixel(size, size, color);
    let mut buf = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut buf, ImageOutputFormat::Png)
        .unwrap();
    Bytes::from(buf.into_inner())
}

/// Deterministic, position-dependent color for a tile.
pub fn tile_color(coord: &TileCoord) -> Rgba<u8> {
    Rgba([
        (coord.x.wrapping_mul(37) % 256) as u8,
        (coord.y.wrapping_mul(59) % 256) as u8,
        (coord.z * 10 % 256) as u8,
        255,
    ])
}

/// Serves generated tiles and counts requests.
#[derive(Debug)]
pub struct CountingTileFetcher {
    tile_size: u32,
    calls: AtomicUsize,
}

impl CountingTileFetcher {
    pub fn new(tile_size: u32) -> Self {
        Self {
            tile_size,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for CountingTileFetcher {
    fn default() -> Self {
        Self::new(256)
    }
}

impl TileFetcher for CountingTileFetcher {
    fn fetch_tile(&self, coord: TileCoord) -> TileResult<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(solid_tile_png(self.tile_size, tile_color(&coord)))
    }
}

/// Fails every request with the given HTTP status.
#[derive(Debug)]
pub struct FailingTileFetcher {
    pub status: u16,
}

impl TileFetcher for FailingTileFetcher {
    fn fetch_tile(&self, coord: TileCoord) -> TileResult<Bytes> {
        Err(TileError::Http {
            url: format!("https://tiles.invalid/{}.png", coord),
            status: self.status,
        })
    }
}

/// Wraps a map provider and records every `fetch_map` call.
pub struct RecordingMapProvider<P> {
    inner: P,
    requests: std::sync::Mutex<Vec<(BoundingBox, u32)>>,
}

impl<P: MapProvider> RecordingMapProvider<P> {
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            requests: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Every `(bbox, zoom)` requested so far.
    pub fn requests(&self) -> Vec<(BoundingBox, u32)> {
        self.requests.lock().unwrap().clone()
    }
}

impl<P: MapProvider> MapProvider for RecordingMapProvider<P> {
    fn fetch_map(&self, bbox: &BoundingBox, zoom: u32) -> TileResult<MapImage> {
        self.requests.lock().unwrap().push((*bbox, zoom));
        self.inner.fetch_map(bbox, zoom)
    }

    fn tile_size(&self) -> u32 {
        self.inner.tile_size()
    }

    fn max_zoom(&self) -> u32 {
        self.inner.max_zoom()
    }

    fn max_tiles(&self) -> usize {
        self.inner.max_tiles()
    }
}
