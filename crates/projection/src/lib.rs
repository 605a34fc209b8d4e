//! Coordinate transformations for slippy-map rasters.
//!
//! Implements the spherical (Web) Mercator projection used by OpenStreetMap
//! tiles and the zoom selection built on it.

pub mod mercator;
pub mod zoom;

pub use mercator::{WebMercator, DEFAULT_TILE_SIZE};
pub use zoom::{fit_tile_budget, select_zoom, span_pixels, ZoomSelection};

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ProjectionError {
    #[error("Bounding box has zero extent ({0}); pad it before selecting a zoom")]
    DegenerateBounds(String),

    #[error("Tile size must be positive")]
    InvalidTileSize,
}
