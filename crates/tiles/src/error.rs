//! Error types for tile fetching.

use std::path::PathBuf;

use thiserror::Error;
use xmap_common::TileCoord;

/// Result type alias using TileError.
pub type TileResult<T> = Result<T, TileError>;

#[derive(Debug, Error)]
pub enum TileError {
    #[error("Invalid tile URL template '{template}': {message}")]
    InvalidTemplate { template: String, message: String },

    #[error("Zoom level {zoom} exceeds the tile source maximum of {max_zoom}")]
    ZoomOutOfRange { zoom: u32, max_zoom: u32 },

    #[error("Tile {0} is outside the tile grid")]
    InvalidTile(TileCoord),

    #[error("Map would need {count} tiles, more than the allowed {max}")]
    TooManyTiles { count: usize, max: usize },

    #[error("HTTP {status} fetching {url}")]
    Http { url: String, status: u16 },

    #[error("Request for {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Failed to decode tile {tile}: {source}")]
    Decode {
        tile: TileCoord,
        #[source]
        source: image::ImageError,
    },

    #[error("Tile cache error at {}: {source}", path.display())]
    Cache {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TileError {
    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            TileError::Http { status, .. } => *status == 429 || *status >= 500,
            TileError::Request { source, .. } => source.is_timeout() || source.is_connect(),
            _ => false,
        }
    }
}
