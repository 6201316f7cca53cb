//! Kernel convolution with edge handling.
//!
//! # Kernels
//!
//! - [`Kernel::identity`] - Passes pixels through unchanged
//! - [`Kernel::box_blur`] - Simple average blur
//! - [`Kernel::gaussian`] - Gaussian blur (smooth)
//! - [`Kernel::sharpen`] - Unsharp masking
//! - [`Kernel::edge_detect`] - Laplacian edges
//! - [`Kernel::emboss`] - Directional relief
//! - [`Kernel::row`] / [`Kernel::column`] - One-dimensional kernels
//! - [`Kernel::random`] - Seeded random kernel, normalized on average
//!
//! # Edges
//!
//! Where the kernel hangs over the buffer border, [`EdgeAction`] decides what
//! the missing cells read: nothing, the nearest edge pixel, or the pixel on
//! the opposite side.
//!
//! # Example
//!
//! ```rust
//! use pixfx_core::{NoProgress, PixelBuffer};
//! use pixfx_ops::convolve::{convolve, ConvolveParams, EdgeAction, Kernel};
//!
//! let src = PixelBuffer::filled(16, 16, 0xFF336699).unwrap();
//! let params = ConvolveParams { edge_action: EdgeAction::Wrap, ..Default::default() };
//! let blurred = convolve(&src, &Kernel::gaussian(5, 1.0), &params, &NoProgress).unwrap();
//! assert_eq!(blurred.dimensions(), (16, 16));
//! ```

use pixfx_core::{pixel, PixelBuffer, ProgressSink};
use rand::{rngs::StdRng, Rng, SeedableRng};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::{OpsError, OpsResult};

/// Convolution kernel.
///
/// Weights are stored row-major. Both dimensions are odd, so the kernel has
/// a well-defined center at `(width / 2, height / 2)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    data: Vec<f32>,
    width: usize,
    height: usize,
}

/// How a kernel is applied, derived from its dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelShape {
    /// Single row (including 1x1).
    Horizontal,
    /// Single column.
    Vertical,
    /// General two-dimensional kernel.
    Full2D,
}

/// What out-of-range kernel cells read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EdgeAction {
    /// Cells outside the buffer contribute nothing.
    Zero,
    /// Cells outside the buffer read the nearest edge pixel.
    #[default]
    Clamp,
    /// Coordinates wrap around to the opposite edge.
    Wrap,
}

impl EdgeAction {
    /// Maps a possibly out-of-range coordinate onto `0..len`.
    ///
    /// `None` means the cell is skipped. `len` must be non-zero.
    #[inline]
    pub fn resolve(self, coord: isize, len: usize) -> Option<usize> {
        let n = len as isize;
        if (0..n).contains(&coord) {
            return Some(coord as usize);
        }
        match self {
            Self::Zero => None,
            Self::Clamp => Some(coord.clamp(0, n - 1) as usize),
            Self::Wrap => Some(coord.rem_euclid(n) as usize),
        }
    }
}

impl std::str::FromStr for EdgeAction {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zero" => Ok(Self::Zero),
            "clamp" => Ok(Self::Clamp),
            "wrap" => Ok(Self::Wrap),
            _ => Err(OpsError::InvalidParameter(format!(
                "unknown edge action: {s} (expected zero, clamp or wrap)"
            ))),
        }
    }
}

/// Convolution parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConvolveParams {
    /// Convolve the alpha channel too. When off, output alpha is 255.
    pub include_alpha: bool,
    /// Edge handling.
    pub edge_action: EdgeAction,
    /// Premultiply alpha before convolving.
    pub premultiply_alpha: bool,
}

impl Default for ConvolveParams {
    fn default() -> Self {
        Self {
            include_alpha: true,
            edge_action: EdgeAction::Clamp,
            premultiply_alpha: true,
        }
    }
}

#[inline]
fn odd(size: usize) -> usize {
    if size % 2 == 0 { size + 1 } else { size }
}

impl Kernel {
    /// Creates a new kernel from data.
    ///
    /// Width and height must be odd numbers.
    pub fn new(data: Vec<f32>, width: usize, height: usize) -> OpsResult<Self> {
        if width % 2 == 0 || height % 2 == 0 {
            return Err(OpsError::InvalidParameter(format!(
                "kernel dimensions must be odd, got {width}x{height}"
            )));
        }
        if data.len() != width * height {
            return Err(OpsError::InvalidParameter(format!(
                "kernel data size {} doesn't match {}x{}",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self { data, width, height })
    }

    /// Single-row kernel.
    pub fn row(weights: Vec<f32>) -> OpsResult<Self> {
        let width = weights.len();
        Self::new(weights, width, 1)
    }

    /// Single-column kernel.
    pub fn column(weights: Vec<f32>) -> OpsResult<Self> {
        let height = weights.len();
        Self::new(weights, 1, height)
    }

    /// `size x size` kernel with a single 1.0 in the center.
    ///
    /// Even sizes are rounded up.
    pub fn identity(size: usize) -> Self {
        let size = odd(size);
        let mut data = vec![0.0; size * size];
        data[size * size / 2] = 1.0;
        Self { data, width: size, height: size }
    }

    /// Creates a box blur kernel (simple average).
    ///
    /// # Example
    ///
    /// ```rust
    /// use pixfx_ops::convolve::Kernel;
    ///
    /// let k = Kernel::box_blur(3);
    /// assert_eq!(k.dimensions(), (3, 3));
    /// ```
    pub fn box_blur(size: usize) -> Self {
        let size = odd(size);
        let count = size * size;
        Self {
            data: vec![1.0 / count as f32; count],
            width: size,
            height: size,
        }
    }

    /// Creates a normalized Gaussian kernel.
    ///
    /// # Arguments
    ///
    /// * `size` - Kernel size (will be made odd)
    /// * `sigma` - Standard deviation (blur amount)
    pub fn gaussian(size: usize, sigma: f32) -> Self {
        let size = odd(size);
        let half = (size / 2) as i32;
        let sigma2 = 2.0 * sigma * sigma;

        let data: Vec<f32> = (-half..=half)
            .flat_map(|y| (-half..=half).map(move |x| (-((x * x + y * y) as f32) / sigma2).exp()))
            .collect();
        let sum: f32 = data.iter().sum();

        Self {
            data: data.into_iter().map(|w| w / sum).collect(),
            width: size,
            height: size,
        }
    }

    /// 3x3 sharpening kernel; `amount` of 0.5-2.0 is typical.
    pub fn sharpen(amount: f32) -> Self {
        let center = 1.0 + 4.0 * amount;
        #[rustfmt::skip]
        let data = vec![
            0.0, -amount, 0.0,
            -amount, center, -amount,
            0.0, -amount, 0.0,
        ];
        Self { data, width: 3, height: 3 }
    }

    /// 3x3 Laplacian edge detector.
    pub fn edge_detect() -> Self {
        #[rustfmt::skip]
        let data = vec![
            0.0, -1.0, 0.0,
            -1.0, 4.0, -1.0,
            0.0, -1.0, 0.0,
        ];
        Self { data, width: 3, height: 3 }
    }

    /// 3x3 emboss kernel.
    pub fn emboss() -> Self {
        #[rustfmt::skip]
        let data = vec![
            -2.0, -1.0, 0.0,
            -1.0, 1.0, 1.0,
            0.0, 1.0, 2.0,
        ];
        Self { data, width: 3, height: 3 }
    }

    /// Seeded random `size x size` kernel.
    ///
    /// Each weight is `4u / (10000n) - 1/n` for `u` uniform in `[0, 10000)`
    /// and `n = size * size`. Weights average to `1/n`, so the kernel sums
    /// to about 1 and keeps overall brightness.
    pub fn random(size: usize, seed: u64) -> Self {
        let size = odd(size);
        let n = (size * size) as f32;
        let mut rng = StdRng::seed_from_u64(seed);
        let data = (0..size * size)
            .map(|_| {
                let u = rng.gen_range(0..10_000u32) as f32;
                4.0 * u / (10_000.0 * n) - 1.0 / n
            })
            .collect();
        Self { data, width: size, height: size }
    }

    /// Kernel width.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Kernel height.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Weights, row-major.
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Returns the kernel radius (half-size).
    #[inline]
    pub fn radius(&self) -> (usize, usize) {
        (self.width / 2, self.height / 2)
    }

    /// Sum of all weights.
    pub fn sum(&self) -> f32 {
        self.data.iter().sum()
    }

    /// Classifies the kernel for dispatch.
    pub fn shape(&self) -> KernelShape {
        if self.height == 1 {
            KernelShape::Horizontal
        } else if self.width == 1 {
            KernelShape::Vertical
        } else {
            KernelShape::Full2D
        }
    }
}

/// Per-channel accumulator for one output pixel.
#[derive(Default)]
struct Acc([f32; 4]);

impl Acc {
    #[inline]
    fn add(&mut self, weight: f32, px: u32) {
        for (acc, c) in self.0.iter_mut().zip(pixel::unpack(px)) {
            *acc += weight * c as f32;
        }
    }

    #[inline]
    fn finish(&self, include_alpha: bool) -> u32 {
        let [a, r, g, b] = self.0.map(|v| pixel::clamp_channel((v + 0.5) as i32));
        pixel::pack(if include_alpha { a } else { 255 }, r, g, b)
    }
}

/// Convolves a buffer with a kernel.
///
/// Dispatches on [`Kernel::shape`]. Reports one progress unit per output row.
///
/// # Errors
///
/// Only buffer construction errors; kernels are validated when built.
pub fn convolve(
    src: &PixelBuffer,
    kernel: &Kernel,
    params: &ConvolveParams,
    progress: &dyn ProgressSink,
) -> OpsResult<PixelBuffer> {
    let (width, height) = src.dimensions();
    let shape = kernel.shape();
    trace!(
        width,
        height,
        kw = kernel.width,
        kh = kernel.height,
        ?shape,
        edge = ?params.edge_action,
        include_alpha = params.include_alpha,
        "convolve"
    );

    if src.is_empty() {
        return Ok(src.clone());
    }

    let mut input = src.as_slice().to_vec();
    if params.premultiply_alpha {
        pixel::premultiply_slice(&mut input);
    }
    let mut output = vec![0u32; input.len()];

    let image = Image { data: &input, width, height };
    match shape {
        KernelShape::Horizontal => convolve_horizontal(&image, &mut output, kernel, params, progress),
        KernelShape::Vertical => convolve_vertical(&image, &mut output, kernel, params, progress),
        KernelShape::Full2D => convolve_2d(&image, &mut output, kernel, params, progress),
    }
    debug!(?shape, sum = kernel.sum(), "Convolution done");

    if params.premultiply_alpha {
        pixel::unpremultiply_slice(&mut output);
    }

    Ok(PixelBuffer::from_vec(output, width, height)?)
}

struct Image<'a> {
    data: &'a [u32],
    width: usize,
    height: usize,
}

impl Image<'_> {
    #[inline]
    fn at(&self, x: usize, y: usize) -> u32 {
        self.data[y * self.width + x]
    }
}

fn convolve_2d(
    src: &Image<'_>,
    dst: &mut [u32],
    kernel: &Kernel,
    params: &ConvolveParams,
    progress: &dyn ProgressSink,
) {
    let (rx, ry) = kernel.radius();
    let edge = params.edge_action;

    for (y, out_row) in dst.chunks_exact_mut(src.width).enumerate() {
        for (x, out) in out_row.iter_mut().enumerate() {
            let mut acc = Acc::default();
            for (ky, weights) in kernel.data.chunks_exact(kernel.width).enumerate() {
                for (kx, &w) in weights.iter().enumerate() {
                    if w == 0.0 {
                        continue;
                    }
                    let sy = (y + ky) as isize - ry as isize;
                    let sx = (x + kx) as isize - rx as isize;
                    let (Some(iy), Some(ix)) = (edge.resolve(sy, src.height), edge.resolve(sx, src.width))
                    else {
                        continue;
                    };
                    acc.add(w, src.at(ix, iy));
                }
            }
            *out = acc.finish(params.include_alpha);
        }
        progress.unit_done();
    }
}

fn convolve_horizontal(
    src: &Image<'_>,
    dst: &mut [u32],
    kernel: &Kernel,
    params: &ConvolveParams,
    progress: &dyn ProgressSink,
) {
    let (rx, _) = kernel.radius();
    let edge = params.edge_action;

    for (y, out_row) in dst.chunks_exact_mut(src.width).enumerate() {
        for (x, out) in out_row.iter_mut().enumerate() {
            let mut acc = Acc::default();
            for (kx, &w) in kernel.data.iter().enumerate() {
                if w == 0.0 {
                    continue;
                }
                let sx = (x + kx) as isize - rx as isize;
                if let Some(ix) = edge.resolve(sx, src.width) {
                    acc.add(w, src.at(ix, y));
                }
            }
            *out = acc.finish(params.include_alpha);
        }
        progress.unit_done();
    }
}

fn convolve_vertical(
    src: &Image<'_>,
    dst: &mut [u32],
    kernel: &Kernel,
    params: &ConvolveParams,
    progress: &dyn ProgressSink,
) {
    let (_, ry) = kernel.radius();
    let edge = params.edge_action;

    for (y, out_row) in dst.chunks_exact_mut(src.width).enumerate() {
        for (x, out) in out_row.iter_mut().enumerate() {
            let mut acc = Acc::default();
            for (ky, &w) in kernel.data.iter().enumerate() {
                if w == 0.0 {
                    continue;
                }
                let sy = (y + ky) as isize - ry as isize;
                if let Some(iy) = edge.resolve(sy, src.height) {
                    acc.add(w, src.at(x, iy));
                }
            }
            *out = acc.finish(params.include_alpha);
        }
        progress.unit_done();
    }
}
