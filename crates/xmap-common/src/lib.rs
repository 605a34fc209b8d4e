//! Common types and utilities shared across the x-map crates.

pub mod bbox;
pub mod dataset;
pub mod error;
pub mod pixel;
pub mod style;
pub mod tile;

pub use bbox::{BoundingBox, DEGENERATE_PADDING_DEG, MERCATOR_MAX_LAT};
pub use dataset::{Dataset, Row};
pub use error::{XMapError, XMapResult};
pub use pixel::{PixelRect, PixelSize};
pub use style::{Color, ColorStop};
pub use tile::{TileCoord, TileRange};
