//! # pixfx-cli
//!
//! Library half of the `pixfx` command-line tool.
//!
//! - [`pattern`] - Synthetic source images
//! - [`config`] - YAML job files
//! - [`pipeline`] - Running a job's steps
//! - [`summary`] - Text/JSON result summaries with SHA-256 digests
//!
//! # Example
//!
//! ```rust
//! use pixfx_cli::config::Job;
//! use pixfx_cli::pipeline::run_job;
//! use pixfx_ops::InlinePool;
//!
//! let job = Job::from_yaml_str("source: { pattern: gradient, width: 8, height: 8 }\nsteps:\n  - op: blur\n    h_radius: 1\n").unwrap();
//! let out = run_job(&job, &InlinePool).unwrap();
//! assert_eq!(out.output.dimensions(), (8, 8));
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod pattern;
pub mod pipeline;
pub mod summary;

pub use config::{ConvolveStep, Job, KernelPreset, KernelSpec, Step};
pub use error::{ConfigError, ConfigResult};
pub use pattern::{parse_color, Pattern, SourceSpec};
pub use pipeline::{run_job, JobOutput};
pub use summary::{digest, Summary};
