//! Error types for x-map input validation and rendering.

use thiserror::Error;

/// Result type alias using XMapError.
pub type XMapResult<T> = Result<T, XMapError>;

/// Errors raised synchronously by x-map before or after the tile fetch.
///
/// Failures of the tile delegate itself are not represented here; they are
/// carried unmodified by the caller's own error type.
#[derive(Debug, Error)]
pub enum XMapError {
    // === Input Errors ===
    #[error("Empty input: the dataset has no rows")]
    EmptyInput,

    #[error("Row {row}: invalid coordinate (lat={lat}, lon={lon})")]
    InvalidCoordinate { row: usize, lat: f64, lon: f64 },

    #[error("Row {row}: expected {expected} columns, found {found}")]
    RowWidthMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("Row {row}: at least latitude and longitude columns are required, found {found}")]
    TooFewColumns { row: usize, found: usize },

    #[error("Row {row}: could not parse '{token}' as a number")]
    ParseError { row: usize, token: String },

    #[error("Invalid parameter value for '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    // === Rendering Errors ===
    #[error("{what}: expected {expected} entries (one per value column), found {found}")]
    SeriesMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("Rendering failed: {0}")]
    Render(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl XMapError {
    /// Shorthand for an `InvalidParameter` error.
    pub fn invalid_parameter(param: impl Into<String>, message: impl Into<String>) -> Self {
        XMapError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    /// True for errors caused by the shape or range of the input dataset.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            XMapError::EmptyInput
                | XMapError::InvalidCoordinate { .. }
                | XMapError::RowWidthMismatch { .. }
                | XMapError::TooFewColumns { .. }
                | XMapError::ParseError { .. }
        )
    }
}
