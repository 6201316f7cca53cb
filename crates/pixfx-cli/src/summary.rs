//! Result summaries.
//!
//! Image output is out of scope, so commands print what a caller needs to
//! check a run: dimensions, channel means, how many pixels changed, and a
//! SHA-256 digest of the packed pixels for comparing runs.

use std::fmt;

use pixfx_core::{pixel, PixelBuffer};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Mean of each channel over all pixels, `0..=255`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ChannelMeans {
    /// Alpha.
    pub a: f64,
    /// Red.
    pub r: f64,
    /// Green.
    pub g: f64,
    /// Blue.
    pub b: f64,
}

impl ChannelMeans {
    /// Computes the means of a buffer; all zero when empty.
    pub fn of(buf: &PixelBuffer) -> Self {
        if buf.is_empty() {
            return Self::default();
        }
        let mut sums = [0u64; 4];
        for &px in buf.as_slice() {
            for (sum, c) in sums.iter_mut().zip(pixel::unpack(px)) {
                *sum += c as u64;
            }
        }
        let n = buf.len() as f64;
        let [a, r, g, b] = sums.map(|s| s as f64 / n);
        Self { a, r, g, b }
    }
}

/// Summary of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    /// Operation name.
    pub op: String,
    /// Output width.
    pub width: usize,
    /// Output height.
    pub height: usize,
    /// Output channel means.
    pub mean: ChannelMeans,
    /// Pixels that differ from the source.
    pub changed_pixels: usize,
    /// Hex SHA-256 of the output pixels as little-endian `u32`s.
    pub sha256: String,
}

impl Summary {
    /// Summarizes `output` relative to `source`.
    pub fn new(op: impl Into<String>, source: &PixelBuffer, output: &PixelBuffer) -> Self {
        let changed_pixels = source
            .as_slice()
            .iter()
            .zip(output.as_slice())
            .filter(|(a, b)| a != b)
            .count();
        Self {
            op: op.into(),
            width: output.width(),
            height: output.height(),
            mean: ChannelMeans::of(output),
            changed_pixels,
            sha256: digest(output),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {}x{}", self.op, self.width, self.height)?;
        writeln!(
            f,
            "  mean     a={:.2} r={:.2} g={:.2} b={:.2}",
            self.mean.a, self.mean.r, self.mean.g, self.mean.b
        )?;
        writeln!(f, "  changed  {} of {} pixels", self.changed_pixels, self.width * self.height)?;
        write!(f, "  sha256   {}", self.sha256)
    }
}

/// Hex SHA-256 digest of a buffer's pixels.
pub fn digest(buf: &PixelBuffer) -> String {
    let mut hasher = Sha256::new();
    hasher.update(buf.to_le_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
