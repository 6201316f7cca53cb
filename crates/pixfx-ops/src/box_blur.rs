//! Separable box blur.
//!
//! A box blur averages each pixel with its neighbours inside a window of
//! `2r + 1` pixels. Running it several times approaches a Gaussian blur, so
//! `iterations = 3` is the usual choice for a soft, smooth result.
//!
//! # Algorithm
//!
//! Each round runs a horizontal pass and a vertical pass. Both use the same
//! routine, [`blur_pass`]: it reads rows and writes its output transposed, so
//! the second pass, fed the transposed buffer, walks the original columns as
//! rows and transposes them back. [`PassDirection`] names which layout a pass
//! reads.
//!
//! Per row, channel sums over the window are kept in running totals; moving
//! one pixel right adds the pixel entering the window and subtracts the one
//! leaving it. Averages come out of a [`DivideTable`] instead of a division.
//! Indices outside the row are clamped to the nearest edge pixel.
//!
//! Fractional radii (`2.5`) add one correction pass per axis, weighting the
//! two direct neighbours by the fractional part.
//!
//! # Example
//!
//! ```rust
//! use pixfx_core::{NoProgress, PixelBuffer};
//! use pixfx_ops::box_blur::{box_blur, BlurParams};
//!
//! let src = PixelBuffer::filled(16, 16, 0xFF808080).unwrap();
//! let params = BlurParams::uniform(3.0, 3);
//! let blurred = box_blur(&src, &params, &NoProgress).unwrap();
//! assert_eq!(blurred, src); // constant image stays constant
//! ```

use pixfx_core::{pixel, PixelBuffer, ProgressSink};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::{OpsError, OpsResult};

/// Fractional radius parts at or below this are ignored.
pub const FRACTION_EPSILON: f32 = 0.001;

/// Largest accepted radius. Its divide table holds `256 * 131_073` bytes.
pub const MAX_RADIUS: f32 = 65_536.0;

/// Box blur parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BlurParams {
    /// Horizontal radius, `>= 0`, may be fractional.
    pub h_radius: f32,
    /// Vertical radius, `>= 0`, may be fractional.
    pub v_radius: f32,
    /// Number of horizontal + vertical rounds.
    pub iterations: u32,
    /// Premultiply alpha before blurring to avoid dark fringes.
    pub premultiply_alpha: bool,
}

impl Default for BlurParams {
    fn default() -> Self {
        Self {
            h_radius: 0.0,
            v_radius: 0.0,
            iterations: 1,
            premultiply_alpha: true,
        }
    }
}

impl BlurParams {
    /// Creates parameters with separate radii.
    pub fn new(h_radius: f32, v_radius: f32, iterations: u32) -> Self {
        Self {
            h_radius,
            v_radius,
            iterations,
            ..Self::default()
        }
    }

    /// Same radius in both directions.
    pub fn uniform(radius: f32, iterations: u32) -> Self {
        Self::new(radius, radius, iterations)
    }

    /// Sets the premultiply flag.
    pub fn with_premultiply(mut self, premultiply_alpha: bool) -> Self {
        self.premultiply_alpha = premultiply_alpha;
        self
    }

    /// Progress units reported by [`box_blur`] for a `width x height` buffer.
    pub fn work_units(&self, width: usize, height: usize) -> usize {
        self.iterations as usize * (width + height)
    }

    /// `true` when either radius has a fractional part to correct.
    pub fn has_fraction(&self) -> bool {
        fraction(self.h_radius) > FRACTION_EPSILON || fraction(self.v_radius) > FRACTION_EPSILON
    }

    fn validate(&self) -> OpsResult<()> {
        for (name, r) in [("h_radius", self.h_radius), ("v_radius", self.v_radius)] {
            if !r.is_finite() || r < 0.0 {
                return Err(OpsError::InvalidParameter(format!(
                    "{name} must be finite and >= 0, got {r:.2}"
                )));
            }
            if r > MAX_RADIUS {
                return Err(OpsError::InvalidParameter(format!(
                    "{name} must be <= {MAX_RADIUS}, got {r:.2}"
                )));
            }
        }
        Ok(())
    }
}

#[inline]
fn fraction(radius: f32) -> f32 {
    radius - radius.floor()
}

/// Which logical layout a pass reads.
///
/// A pass always walks rows and writes columns; the direction only decides
/// how the flat buffer is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassDirection {
    /// Input is `width x height`, rows are image rows.
    Horizontal,
    /// Input is the transposed `height x width` buffer, rows are image columns.
    Vertical,
}

impl PassDirection {
    /// `(row_len, rows)` of the input for an image of `width x height`.
    #[inline]
    pub fn layout(self, width: usize, height: usize) -> (usize, usize) {
        match self {
            Self::Horizontal => (width, height),
            Self::Vertical => (height, width),
        }
    }
}

/// Lookup table mapping a channel sum over `2r + 1` pixels to its average.
#[derive(Debug, Clone)]
pub struct DivideTable {
    radius: usize,
    table: Vec<u8>,
}

impl DivideTable {
    /// Builds the table for `floor(radius)`.
    ///
    /// A negative, non-finite or oversized radius (above [`MAX_RADIUS`]) is a
    /// configuration error.
    pub fn new(radius: f32) -> OpsResult<Self> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(OpsError::InvalidParameter(format!(
                "divide table size is negative, radius = {radius:.2}"
            )));
        }
        if radius > MAX_RADIUS {
            return Err(OpsError::InvalidParameter(format!(
                "radius too large for a divide table: {radius:.2} > {MAX_RADIUS}"
            )));
        }
        let r = radius as usize;
        let window = 2 * r + 1;
        let table = (0..256 * window).map(|i| (i / window) as u8).collect();
        Ok(Self { radius: r, table })
    }

    /// Integer radius.
    #[inline]
    pub fn radius(&self) -> usize {
        self.radius
    }

    /// Window width `2r + 1`.
    #[inline]
    pub fn window(&self) -> usize {
        2 * self.radius + 1
    }

    #[inline]
    fn average(&self, sum: usize) -> u8 {
        self.table[sum]
    }
}

/// Blurs a buffer.
///
/// Runs `iterations` rounds of horizontal + vertical box passes, then the
/// fractional correction if either radius has a fractional part. Reports
/// one progress unit per row of each box pass, see
/// [`BlurParams::work_units`]; the fractional pass does not report.
///
/// # Errors
///
/// - [`OpsError::InvalidParameter`] for a negative or non-finite radius
/// - [`OpsError::InvalidDimensions`] if the fractional pass is needed and
///   the buffer is narrower or shorter than 2 pixels
pub fn box_blur(
    src: &PixelBuffer,
    params: &BlurParams,
    progress: &dyn ProgressSink,
) -> OpsResult<PixelBuffer> {
    let (width, height) = src.dimensions();
    trace!(
        width,
        height,
        h_radius = params.h_radius,
        v_radius = params.v_radius,
        iterations = params.iterations,
        premultiply = params.premultiply_alpha,
        "box_blur"
    );
    params.validate()?;

    if src.is_empty() {
        return Ok(src.clone());
    }

    let fractional = params.has_fraction();
    if fractional && (width < 2 || height < 2) {
        return Err(OpsError::InvalidDimensions(format!(
            "fractional blur needs at least 2x2 pixels, got {width}x{height}"
        )));
    }

    let h_table = DivideTable::new(params.h_radius)?;
    let v_table = DivideTable::new(params.v_radius)?;
    debug!(
        width,
        height,
        h_window = h_table.window(),
        v_window = v_table.window(),
        fractional,
        "Applying box blur"
    );

    let mut a = src.as_slice().to_vec();
    let mut b = vec![0u32; a.len()];

    if params.premultiply_alpha {
        pixel::premultiply_slice(&mut a);
    }

    for _ in 0..params.iterations {
        blur_pass(&a, &mut b, width, height, PassDirection::Horizontal, &h_table, progress);
        blur_pass(&b, &mut a, width, height, PassDirection::Vertical, &v_table, progress);
    }

    if fractional {
        blur_fractional(&a, &mut b, width, height, PassDirection::Horizontal, params.h_radius)?;
        blur_fractional(&b, &mut a, width, height, PassDirection::Vertical, params.v_radius)?;
    }

    if params.premultiply_alpha {
        pixel::unpremultiply_slice(&mut a);
    }

    Ok(PixelBuffer::from_vec(a, width, height)?)
}

/// One box pass: blur every row of `src` and write it as a column of `dst`.
///
/// `src` is read in the layout named by `direction`; `dst` ends up in the
/// other one. Reports one progress unit per row.
///
/// # Panics
///
/// Panics if either slice is shorter than `width * height`.
pub fn blur_pass(
    src: &[u32],
    dst: &mut [u32],
    width: usize,
    height: usize,
    direction: PassDirection,
    table: &DivideTable,
    progress: &dyn ProgressSink,
) {
    let (row_len, rows) = direction.layout(width, height);
    if row_len == 0 {
        return;
    }
    let r = table.radius();
    let last = row_len - 1;

    for y in 0..rows {
        let row = &src[y * row_len..(y + 1) * row_len];
        let mut sums = [0usize; 4];

        // Seed the window centered on x = 0, clamping to the first pixel
        for i in -(r as isize)..=(r as isize) {
            let px = row[i.clamp(0, last as isize) as usize];
            for (sum, c) in sums.iter_mut().zip(pixel::unpack(px)) {
                *sum += c as usize;
            }
        }

        let mut out_index = y;
        for x in 0..row_len {
            dst[out_index] = pixel::pack(
                table.average(sums[0]),
                table.average(sums[1]),
                table.average(sums[2]),
                table.average(sums[3]),
            );

            let entering = pixel::unpack(row[(x + r + 1).min(last)]);
            let leaving = pixel::unpack(row[x.saturating_sub(r)]);
            for ((sum, e), l) in sums.iter_mut().zip(entering).zip(leaving) {
                *sum = *sum + e as usize - l as usize;
            }
            out_index += rows;
        }

        progress.unit_done();
    }
}

/// Fractional correction pass, transposing like [`blur_pass`].
///
/// Interior pixels become `(center + (left + right) * f) / (1 + 2f)`
/// with `f = radius - floor(radius)`, truncated at each step. The first
/// and last pixel of every row are copied unchanged.
///
/// # Errors
///
/// [`OpsError::InvalidDimensions`] if the logical row length or row count
/// is below 2.
pub fn blur_fractional(
    src: &[u32],
    dst: &mut [u32],
    width: usize,
    height: usize,
    direction: PassDirection,
    radius: f32,
) -> OpsResult<()> {
    let (row_len, rows) = direction.layout(width, height);
    if row_len < 2 || rows < 2 {
        return Err(OpsError::InvalidDimensions(format!(
            "fractional blur needs at least 2x2 pixels, got {width}x{height}"
        )));
    }

    let f = fraction(radius);
    let scale = 1.0 / (1.0 + 2.0 * f);

    for y in 0..rows {
        let row = &src[y * row_len..(y + 1) * row_len];
        dst[y] = row[0];

        let mut out_index = y + rows;
        for x in 1..row_len - 1 {
            let left = pixel::unpack(row[x - 1]);
            let center = pixel::unpack(row[x]);
            let right = pixel::unpack(row[x + 1]);

            let mut out = [0u8; 4];
            for c in 0..4 {
                let weighted = center[c] as i32 + ((left[c] as i32 + right[c] as i32) as f32 * f) as i32;
                out[c] = pixel::clamp_channel((weighted as f32 * scale) as i32);
            }
            dst[out_index] = pixel::pack_array(out);
            out_index += rows;
        }

        dst[out_index] = row[row_len - 1];
    }

    Ok(())
}
