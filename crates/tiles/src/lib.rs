//! Map-fetch delegate for x-map.
//!
//! Turns a bounding box and zoom level into a stitched raster:
//! - `source`: tile URL templates (OpenStreetMap by default)
//! - `fetcher`: blocking HTTP tile download with retry
//! - `cache`: in-memory LRU and on-disk tile caches
//! - `map`: tile range selection, decoding and stitching into a `MapImage`

pub mod cache;
pub mod error;
pub mod fetcher;
pub mod map;
pub mod source;

pub use cache::{CacheStats, CachedTileFetcher};
pub use error::{TileError, TileResult};
pub use fetcher::{HttpFetcherConfig, HttpTileFetcher, TileFetcher};
pub use map::{MapImage, MapProvider, TileMapProvider, DEFAULT_MAX_TILES};
pub use source::TileSource;
