//! Error types for filter operations.

use thiserror::Error;

/// Error type for filter operations.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Buffer dimensions unsuitable for the operation.
    #[error("invalid dimensions: {0}")]
    InvalidDimensions(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Worker pool could not be created.
    #[error("worker pool: {0}")]
    Pool(String),

    /// Error from a core buffer operation.
    #[error(transparent)]
    Core(#[from] pixfx_core::Error),
}

/// Result type for filter operations.
pub type OpsResult<T> = Result<T, OpsError>;
