//! # pixfx-core
//!
//! Core types for the pixfx filter engines.
//!
//! This crate provides the foundational types shared by every engine:
//!
//! - [`pixel`] - Packing/unpacking of 32-bit ARGB pixels, premultiplied alpha, mixing
//! - [`PixelBuffer`] - Owned row-major buffer of packed pixels
//! - [`AtomicPixelBuffer`] - Buffer whose pixels can be written from many threads
//! - [`ProgressSink`] - Receiver of "one unit of work done" notifications
//! - [`Error`] - Buffer construction and access errors
//!
//! ## Crate Structure
//!
//! ```text
//! pixfx-core (this crate)
//!    ^
//!    |
//!    +-- pixfx-ops (box blur, convolution, smear)
//!    +-- pixfx-cli
//! ```
//!
//! ## Example
//!
//! ```rust
//! use pixfx_core::{pixel, PixelBuffer};
//!
//! let red = pixel::pack(255, 255, 0, 0);
//! let buf = PixelBuffer::filled(4, 4, red).unwrap();
//! assert_eq!(buf.get(3, 3), Some(red));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod buffer;
pub mod error;
pub mod pixel;
pub mod progress;

pub use buffer::{AtomicPixelBuffer, PixelBuffer};
pub use error::{Error, Result};
pub use pixel::Argb;
pub use progress::{NoProgress, ProgressCounter, ProgressSink, TracingProgress};

/// Prelude module for convenient imports.
///
/// ```
/// use pixfx_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::buffer::{AtomicPixelBuffer, PixelBuffer};
    pub use crate::error::{Error, Result};
    pub use crate::pixel::{self, Argb};
    pub use crate::progress::{NoProgress, ProgressCounter, ProgressSink, TracingProgress};
}
