//! Error types for grid construction.

use thiserror::Error;

/// Result type alias using GridError.
pub type GridResult<T> = Result<T, GridError>;

/// Errors raised while building grids from records.
///
/// Sampling never returns these: an interpolation target outside the valid
/// region is a `None` result, not an error.
#[derive(Debug, Error)]
pub enum GridError {
    #[error("Malformed grid record: {0}")]
    MalformedRecord(#[from] serde_json::Error),

    #[error("Record data length {actual} does not match header nx*ny = {expected}")]
    DataLengthMismatch { expected: usize, actual: usize },

    #[error("Component records disagree: {0}")]
    ComponentMismatch(String),

    #[error("Grid deltas must be non-zero: dx={dx}, dy={dy}")]
    DegenerateSpacing { dx: f64, dy: f64 },
}
