//! Top-level error type for plotting calls.

use std::path::PathBuf;

use projection::ProjectionError;
use thiserror::Error;
use tiles::TileError;
use xmap_common::XMapError;

pub type PlotResult<T> = Result<T, PlotError>;

#[derive(Debug, Error)]
pub enum PlotError {
    /// Invalid input, configuration or rendering request.
    #[error(transparent)]
    Input(#[from] XMapError),

    /// Failure of the map-fetch delegate, passed through unchanged.
    #[error(transparent)]
    Fetch(#[from] TileError),

    #[error("Zoom selection failed: {0}")]
    Projection(#[from] ProjectionError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl PlotError {
    /// True if the tile delegate was reached and failed.
    pub fn is_fetch_error(&self) -> bool {
        matches!(self, PlotError::Fetch(_))
    }
}

/// Errors loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(#[from] XMapError),
}
