//! Pixel buffers.
//!
//! - [`PixelBuffer`] - owned, row-major buffer of packed ARGB pixels
//! - [`AtomicPixelBuffer`] - the same layout stored in [`AtomicU32`] cells so
//!   that many threads can read and write pixels without a lock
//!
//! # Memory Layout
//!
//! Pixels are stored row-major, top-to-bottom, one `u32` per pixel:
//!
//! ```text
//! index = y * width + x
//! ```
//!
//! The invariant `len == width * height` is checked by every constructor.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::pixel::Argb;
use crate::{Error, Result};

fn checked_len(width: usize, height: usize) -> Result<usize> {
    width
        .checked_mul(height)
        .ok_or_else(|| Error::invalid_dimensions(width, height, "pixel count overflows usize"))
}

/// Owned buffer of packed ARGB pixels.
///
/// # Example
///
/// ```rust
/// use pixfx_core::PixelBuffer;
///
/// let mut buf = PixelBuffer::new(8, 4).unwrap();
/// buf.set(7, 3, 0xFFFF0000).unwrap();
/// assert_eq!(buf.get(7, 3), Some(0xFFFF0000));
/// assert_eq!(buf.get(8, 0), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    data: Vec<Argb>,
    width: usize,
    height: usize,
}

impl PixelBuffer {
    /// Creates a buffer filled with transparent black.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        Self::filled(width, height, 0)
    }

    /// Creates a buffer with every pixel set to `px`.
    pub fn filled(width: usize, height: usize, px: Argb) -> Result<Self> {
        let len = checked_len(width, height)?;
        Ok(Self {
            data: vec![px; len],
            width,
            height,
        })
    }

    /// Wraps existing pixel data.
    ///
    /// Fails if `data.len() != width * height`.
    pub fn from_vec(data: Vec<Argb>, width: usize, height: usize) -> Result<Self> {
        let len = checked_len(width, height)?;
        if data.len() != len {
            return Err(Error::invalid_dimensions(
                width,
                height,
                format!("expected {} pixels, got {}", len, data.len()),
            ));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Buffer width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Buffer height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Number of pixels.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// `true` if the buffer holds no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the pixel at `(x, y)`, or `None` outside the buffer.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<Argb> {
        if x < self.width && y < self.height {
            Some(self.data[y * self.width + x])
        } else {
            None
        }
    }

    /// Sets the pixel at `(x, y)`.
    pub fn set(&mut self, x: usize, y: usize, px: Argb) -> Result<()> {
        if x >= self.width || y >= self.height {
            return Err(Error::out_of_bounds(x, y, self.width, self.height));
        }
        self.data[y * self.width + x] = px;
        Ok(())
    }

    /// Row `y` as a slice.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: usize) -> &[Argb] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    /// All pixels, row-major.
    #[inline]
    pub fn as_slice(&self) -> &[Argb] {
        &self.data
    }

    /// All pixels, row-major, mutable.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Argb] {
        &mut self.data
    }

    /// Consumes the buffer and returns the pixel data.
    #[inline]
    pub fn into_vec(self) -> Vec<Argb> {
        self.data
    }

    /// Pixel data as little-endian bytes, four per pixel.
    ///
    /// Stable across platforms, suitable for hashing.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.data.iter().flat_map(|px| px.to_le_bytes()).collect()
    }
}

/// Pixel buffer shared between threads.
///
/// Each pixel lives in its own [`AtomicU32`], so a packed pixel is always
/// loaded and stored as one unit and a reader can never observe half of two
/// different writes. There is no cross-pixel consistency: two threads doing
/// read-modify-write on the same pixel may lose one of the updates.
///
/// # Example
///
/// ```rust
/// use pixfx_core::{AtomicPixelBuffer, PixelBuffer};
///
/// let src = PixelBuffer::filled(2, 2, 0xFF000000).unwrap();
/// let shared = AtomicPixelBuffer::from_buffer(&src);
/// std::thread::scope(|s| {
///     s.spawn(|| shared.store(0, 0xFFFFFFFF));
///     s.spawn(|| shared.store(3, 0xFF00FF00));
/// });
/// let out = shared.into_buffer();
/// assert_eq!(out.as_slice(), &[0xFFFFFFFF, 0xFF000000, 0xFF000000, 0xFF00FF00]);
/// ```
#[derive(Debug)]
pub struct AtomicPixelBuffer {
    cells: Box<[AtomicU32]>,
    width: usize,
    height: usize,
}

impl AtomicPixelBuffer {
    /// Copies a [`PixelBuffer`] into atomic cells.
    pub fn from_buffer(src: &PixelBuffer) -> Self {
        let cells = src.as_slice().iter().map(|&px| AtomicU32::new(px)).collect();
        Self {
            cells,
            width: src.width,
            height: src.height,
        }
    }

    /// Buffer width in pixels.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Buffer height in pixels.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of pixels.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// `true` if the buffer holds no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Loads the pixel at `index`.
    #[inline]
    pub fn load(&self, index: usize) -> Argb {
        self.cells[index].load(Ordering::Relaxed)
    }

    /// Stores `px` at `index`.
    #[inline]
    pub fn store(&self, index: usize, px: Argb) {
        self.cells[index].store(px, Ordering::Relaxed);
    }

    /// Loads, transforms and stores the pixel at `index`.
    ///
    /// Not a compare-and-swap: a concurrent writer between the load and the
    /// store is overwritten.
    #[inline]
    pub fn update(&self, index: usize, f: impl FnOnce(Argb) -> Argb) {
        let cell = &self.cells[index];
        cell.store(f(cell.load(Ordering::Relaxed)), Ordering::Relaxed);
    }

    /// Converts back into an owned [`PixelBuffer`].
    pub fn into_buffer(self) -> PixelBuffer {
        let data = self
            .cells
            .into_vec()
            .into_iter()
            .map(AtomicU32::into_inner)
            .collect();
        PixelBuffer {
            data,
            width: self.width,
            height: self.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec_checks_len() {
        let err = PixelBuffer::from_vec(vec![0; 8], 3, 3).unwrap_err();
        assert!(matches!(err, Error::InvalidDimensions { width: 3, height: 3, .. }));
        assert!(PixelBuffer::from_vec(vec![0; 9], 3, 3).is_ok());
    }

    #[test]
    fn test_overflowing_dimensions() {
        assert!(PixelBuffer::new(usize::MAX, 2).is_err());
    }

    #[test]
    fn test_get_set() {
        let mut buf = PixelBuffer::new(3, 2).unwrap();
        buf.set(2, 1, 7).unwrap();
        assert_eq!(buf.get(2, 1), Some(7));
        assert_eq!(buf.as_slice()[5], 7);
        assert_eq!(buf.row(1), &[0, 0, 7]);
        assert!(buf.set(3, 0, 1).unwrap_err().is_bounds_error());
        assert_eq!(buf.get(0, 2), None);
    }

    #[test]
    fn test_empty_buffer() {
        let buf = PixelBuffer::new(0, 5).unwrap();
        assert!(buf.is_empty());
        assert_eq!(buf.dimensions(), (0, 5));
    }

    #[test]
    fn test_le_bytes() {
        let buf = PixelBuffer::from_vec(vec![0x0102_0304], 1, 1).unwrap();
        assert_eq!(buf.to_le_bytes(), vec![4, 3, 2, 1]);
    }

    #[test]
    fn test_atomic_roundtrip() {
        let src = PixelBuffer::from_vec((0..12).collect(), 4, 3).unwrap();
        let shared = AtomicPixelBuffer::from_buffer(&src);
        assert_eq!(shared.len(), 12);
        assert_eq!(shared.load(5), 5);
        shared.update(5, |px| px * 10);
        assert_eq!(shared.load(5), 50);
        let out = shared.into_buffer();
        assert_eq!(out.dimensions(), (4, 3));
        assert_eq!(out.get(1, 1), Some(50));
    }

    #[test]
    fn test_atomic_concurrent_writes_never_tear() {
        let src = PixelBuffer::new(1, 1).unwrap();
        let shared = AtomicPixelBuffer::from_buffer(&src);
        let patterns = [0xFFFF_FFFFu32, 0x0000_0000, 0xFF00_FF00, 0x00FF_00FF];
        std::thread::scope(|s| {
            for &p in &patterns {
                let shared = &shared;
                s.spawn(move || {
                    for _ in 0..10_000 {
                        shared.store(0, p);
                        assert!(patterns.contains(&shared.load(0)));
                    }
                });
            }
        });
        assert!(patterns.contains(&shared.load(0)));
    }
}
