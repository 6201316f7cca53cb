//! # pixfx-ops
//!
//! Pixel filter engines for packed ARGB buffers.
//!
//! Every engine borrows a [`PixelBuffer`](pixfx_core::PixelBuffer), allocates
//! a fresh output of the same dimensions and reports progress through a
//! [`ProgressSink`](pixfx_core::ProgressSink) while it runs.
//!
//! # Modules
//!
//! - [`box_blur`] - Separable box blur with fractional radii
//! - [`convolve`] - Kernel convolution with zero/clamp/wrap edges
//! - [`smear`] - Stochastic crosses, lines and shapes on a worker pool
//! - [`pool`] - Worker pools the smear engine runs on
//!
//! Blur and convolution run on the calling thread and are deterministic.
//! The smear engine fans out to a caller-supplied [`WorkerPool`].
//!
//! # Example
//!
//! ```rust
//! use pixfx_core::{NoProgress, PixelBuffer};
//! use pixfx_ops::{box_blur, convolve, BlurParams, ConvolveParams, Kernel};
//!
//! let src = PixelBuffer::filled(8, 8, 0xFF808080).unwrap();
//!
//! // Three rounds approximate a Gaussian
//! let soft = box_blur(&src, &BlurParams::uniform(2.0, 3), &NoProgress).unwrap();
//!
//! let sharp = convolve(&soft, &Kernel::sharpen(1.0), &ConvolveParams::default(), &NoProgress).unwrap();
//! assert_eq!(sharp.dimensions(), (8, 8));
//! ```
//!
//! # Features
//!
//! - `parallel` (default) - rayon-backed pools
//! - `serde` - `Serialize`/`Deserialize` for the parameter types

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod box_blur;
pub mod convolve;
pub mod pool;
pub mod smear;

pub use box_blur::{box_blur, BlurParams};
pub use convolve::{convolve, ConvolveParams, EdgeAction, Kernel, KernelShape};
pub use error::{OpsError, OpsResult};
pub use pool::{InlinePool, Task, WorkerPool};
#[cfg(feature = "parallel")]
pub use pool::{build_pool, GlobalPool};
pub use smear::{smear, task_seed, SmearParams, SmearShape};
