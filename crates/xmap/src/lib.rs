//! x-map: plot coordinate-tagged data onto OpenStreetMap tiles.
//!
//! The map area and zoom level are derived from the data:
//! - the bounding box of all `(lat, lon)` rows is padded and extended,
//! - the smallest zoom at which that box spans the minimum image size is
//!   selected,
//! - the covering tiles are fetched, stitched and cropped to the box,
//! - every value column is drawn on its own copy of the map.
//!
//! ```ignore
//! use xmap::{plot, Dataset, XMapConfig};
//!
//! let data = Dataset::from_rows(&[[40.0, -73.0, 1.0], [41.0, -74.0, 2.0]])?;
//! let config = XMapConfig::default();
//! let provider = config.tiles.build_provider()?;
//! let images = plot(&data, &provider, &config)?;
//! ```

pub mod bounds;
pub mod config;
pub mod error;
pub mod output;
pub mod plot;

pub use bounds::{data_bounds, plot_bounds, select_view};
pub use config::{HttpMapProvider, TileConfig, XMapConfig};
pub use error::{ConfigError, PlotError, PlotResult};
pub use output::{output_paths, save_images};
pub use plot::{plot, plot_map, MapView, XMap};

pub use xmap_common::{BoundingBox, Dataset, PixelSize, XMapError};
