//! Error types for job files and synthetic sources.

use std::path::PathBuf;

use pixfx_ops::OpsError;
use thiserror::Error;

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading or running a job.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error reading a job file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Job file not found.
    #[error("job file not found: {path}")]
    NotFound {
        /// Path that was searched.
        path: PathBuf,
    },

    /// Kernel preset name not recognized.
    #[error("unknown kernel: {0} (expected identity, box, gaussian, sharpen, edge, emboss or random)")]
    UnknownKernel(String),

    /// Kernel description that does not produce a valid kernel.
    #[error("invalid kernel: {0}")]
    InvalidKernel(String),

    /// Source pattern description that cannot be rendered.
    #[error("invalid source: {0}")]
    InvalidSource(String),

    /// A pipeline step failed.
    #[error("step {index} ({op}) failed: {source}")]
    Step {
        /// Zero-based step index.
        index: usize,
        /// Step name.
        op: &'static str,
        /// Engine error.
        #[source]
        source: OpsError,
    },
}
