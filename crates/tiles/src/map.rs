//! Stitched map rasters.

use image::imageops::{self, FilterType};
use image::RgbaImage;
use projection::WebMercator;
use tracing::{debug, info, instrument, warn};
use xmap_common::{BoundingBox, PixelRect, PixelSize, TileCoord, TileRange};

use crate::fetcher::check_coord;
use crate::{TileError, TileFetcher, TileResult, TileSource};

/// Default upper bound on the number of tiles in one map.
pub const DEFAULT_MAX_TILES: usize = 64;

/// A raster stitched from a block of tiles, with its pixel transform.
#[derive(Debug, Clone)]
pub struct MapImage {
    image: RgbaImage,
    range: TileRange,
    projection: WebMercator,
}

impl MapImage {
    /// Wrap an already stitched image covering `range`.
    pub fn new(image: RgbaImage, range: TileRange, tile_size: u32) -> Self {
        Self {
            image,
            range,
            projection: WebMercator::new(tile_size),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn zoom(&self) -> u32 {
        self.range.z
    }

    pub fn range(&self) -> &TileRange {
        &self.range
    }

    pub fn tile_size(&self) -> u32 {
        self.projection.tile_size()
    }

    pub fn size(&self) -> PixelSize {
        PixelSize::new(self.image.width(), self.image.height())
    }

    fn origin_pixels(&self) -> (f64, f64) {
        let ts = self.tile_size() as f64;
        (self.range.x_min as f64 * ts, self.range.y_min as f64 * ts)
    }

    /// Pixel position of `(lat, lon)` in this image.
    pub fn to_pixels(&self, lat: f64, lon: f64) -> (f64, f64) {
        let (x, y) = self.projection.to_world_pixels(lat, lon, self.zoom());
        let (ox, oy) = self.origin_pixels();
        (x - ox, y - oy)
    }

    /// Geographic position `(lat, lon)` of a pixel in this image.
    pub fn from_pixels(&self, x: f64, y: f64) -> (f64, f64) {
        let (ox, oy) = self.origin_pixels();
        self.projection.from_world_pixels(x + ox, y + oy, self.zoom())
    }

    /// Geographic area covered by the whole image.
    pub fn geo_bounds(&self) -> BoundingBox {
        let north_west = TileCoord::new(self.range.z, self.range.x_min, self.range.y_min).bounds();
        let south_east = TileCoord::new(self.range.z, self.range.x_max, self.range.y_max).bounds();
        BoundingBox::new(
            south_east.lat_min,
            north_west.lat_max,
            north_west.lon_min,
            south_east.lon_max,
        )
    }

    /// Smallest pixel rectangle covering `bbox`, clipped to the image.
    pub fn bbox_pixels(&self, bbox: &BoundingBox) -> PixelRect {
        let (x_min, y_min) = self.to_pixels(bbox.lat_max, bbox.lon_min);
        let (x_max, y_max) = self.to_pixels(bbox.lat_min, bbox.lon_max);
        PixelRect::covering(x_min, y_min, x_max, y_max, self.size())
    }

    /// Copy of the pixels inside `rect`.
    pub fn crop(&self, rect: &PixelRect) -> RgbaImage {
        imageops::crop_imm(&self.image, rect.x, rect.y, rect.width, rect.height).to_image()
    }
}

/// Produces a map raster for a bounding box at a zoom level.
pub trait MapProvider {
    fn fetch_map(&self, bbox: &BoundingBox, zoom: u32) -> TileResult<MapImage>;

    /// Edge length of one tile in pixels.
    fn tile_size(&self) -> u32;

    /// Highest zoom this provider can serve.
    fn max_zoom(&self) -> u32;

    /// Most tiles a single map may be stitched from.
    fn max_tiles(&self) -> usize {
        usize::MAX
    }
}

impl<T: MapProvider + ?Sized> MapProvider for &T {
    fn fetch_map(&self, bbox: &BoundingBox, zoom: u32) -> TileResult<MapImage> {
        (**self).fetch_map(bbox, zoom)
    }

    fn tile_size(&self) -> u32 {
        (**self).tile_size()
    }

    fn max_zoom(&self) -> u32 {
        (**self).max_zoom()
    }

    fn max_tiles(&self) -> usize {
        (**self).max_tiles()
    }
}

/// Builds maps by fetching and stitching every tile that covers the box.
pub struct TileMapProvider<F> {
    fetcher: F,
    tile_size: u32,
    max_zoom: u32,
    max_tiles: usize,
}

impl<F: TileFetcher> TileMapProvider<F> {
    pub fn new(fetcher: F, source: &TileSource) -> Self {
        Self {
            fetcher,
            tile_size: source.tile_size,
            max_zoom: source.max_zoom,
            max_tiles: DEFAULT_MAX_TILES,
        }
    }

    pub fn with_max_tiles(mut self, max_tiles: usize) -> Self {
        self.max_tiles = max_tiles;
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    fn load_tile(&self, coord: TileCoord) -> TileResult<RgbaImage> {
        let bytes = self.fetcher.fetch_tile(coord)?;
        let tile = match image::load_from_memory(&bytes) {
            Ok(decoded) => decoded.to_rgba8(),
            Err(source) => {
                warn!(tile = %coord, error = %source, "Undecodable tile, dropping cached copy");
                self.fetcher.invalidate(coord);
                return Err(TileError::Decode {
                    tile: coord,
                    source,
                });
            }
        };

        if tile.width() == self.tile_size && tile.height() == self.tile_size {
            Ok(tile)
        } else {
            debug!(
                tile = %coord,
                width = tile.width(),
                height = tile.height(),
                "Resampling tile to configured size"
            );
            Ok(imageops::resize(
                &tile,
                self.tile_size,
                self.tile_size,
                FilterType::Triangle,
            ))
        }
    }
}

impl<F: TileFetcher> MapProvider for TileMapProvider<F> {
    #[instrument(skip(self, bbox), fields(bbox = %bbox))]
    fn fetch_map(&self, bbox: &BoundingBox, zoom: u32) -> TileResult<MapImage> {
        if zoom > self.max_zoom {
            return Err(TileError::ZoomOutOfRange {
                zoom,
                max_zoom: self.max_zoom,
            });
        }

        let range = WebMercator::new(self.tile_size).tile_range(bbox, zoom);
        let count = range.count();
        if count > self.max_tiles {
            return Err(TileError::TooManyTiles {
                count,
                max: self.max_tiles,
            });
        }

        let ts = self.tile_size;
        let mut canvas = RgbaImage::new(range.columns() * ts, range.rows() * ts);

        for coord in range.iter() {
            check_coord(&coord, self.max_zoom)?;
            let tile = self.load_tile(coord)?;
            let x = ((coord.x - range.x_min) * ts) as i64;
            let y = ((coord.y - range.y_min) * ts) as i64;
            imageops::replace(&mut canvas, &tile, x, y);
        }

        info!(
            zoom,
            tiles = count,
            width = canvas.width(),
            height = canvas.height(),
            "Stitched map"
        );

        Ok(MapImage::new(canvas, range, ts))
    }

    fn tile_size(&self) -> u32 {
        self.tile_size
    }

    fn max_zoom(&self) -> u32 {
        self.max_zoom
    }

    fn max_tiles(&self) -> usize {
        self.max_tiles
    }
}
