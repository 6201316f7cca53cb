//! Stochastic smear rendering.
//!
//! A smear scatters many small stamps over the image. Each stamp takes the
//! source color at a random position and mixes it into the output along a
//! cross, a line or a filled shape around that position.
//!
//! # Shapes
//!
//! | Shape | Stamp | Placements |
//! |-------|-------|------------|
//! | [`SmearShape::Crosses`] | `+` of random arm length in `[1, distance]` | `2 * density * w * h / (distance + 1)` |
//! | [`SmearShape::Lines`] | line at `angle` of random half-length in `[0, distance)` | `density * w * h`, batched |
//! | [`SmearShape::Circles`] | disc of radius `distance + 1` | `2 * density * w * h / (distance + 1)` |
//! | [`SmearShape::Squares`] | square of half-size `distance + 1` | same |
//! | [`SmearShape::Diamonds`] | diamond of radius `distance + 1` | same |
//!
//! # Concurrency
//!
//! Placements run as tasks on a [`WorkerPool`]. Each task draws from its own
//! generator seeded by [`task_seed`], so the random positions are the same
//! for a given seed no matter which pool runs them. Stamps write to an
//! [`AtomicPixelBuffer`]: overlapping stamps on different threads may lose
//! one of their mixes, but a pixel is never torn. On [`InlinePool`] the
//! whole result is reproducible.
//!
//! [`InlinePool`]: crate::pool::InlinePool
//!
//! # Example
//!
//! ```rust
//! use pixfx_core::{NoProgress, PixelBuffer};
//! use pixfx_ops::pool::InlinePool;
//! use pixfx_ops::smear::{smear, SmearParams, SmearShape};
//!
//! let src = PixelBuffer::filled(32, 32, 0xFF204060).unwrap();
//! let params = SmearParams { shape: SmearShape::Circles, seed: 7, ..Default::default() };
//! let out = smear(&src, &params, &InlinePool, &NoProgress).unwrap();
//! assert_eq!(out.dimensions(), (32, 32));
//! ```

mod stamp;

use std::fmt;
use std::str::FromStr;

use pixfx_core::{AtomicPixelBuffer, PixelBuffer, ProgressSink};
use rand::{rngs::StdRng, Rng, SeedableRng};
#[allow(unused_imports)]
use tracing::{debug, trace};

use crate::pool::{Task, WorkerPool};
use crate::{OpsError, OpsResult};
use stamp::Canvas;

/// Most stamp placements a single smear call accepts.
///
/// Bounds the time a call can take. Density 1 on a 4096x4096 buffer stays
/// below it for every shape.
pub const MAX_PLACEMENTS: usize = 1 << 25;

/// Tasks handed to the pool per `run_all` call.
const TASK_CHUNK: usize = 1 << 16;

/// Stamp shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SmearShape {
    /// Horizontal + vertical runs.
    Crosses,
    /// Angled lines.
    #[default]
    Lines,
    /// Filled discs.
    Circles,
    /// Filled squares.
    Squares,
    /// Filled diamonds.
    Diamonds,
}

impl SmearShape {
    /// All shapes, in code order.
    pub const ALL: [SmearShape; 5] = [
        Self::Crosses,
        Self::Lines,
        Self::Circles,
        Self::Squares,
        Self::Diamonds,
    ];

    /// Shape for a numeric code `0..=4`; anything else selects lines.
    pub fn from_code(code: i32) -> Self {
        usize::try_from(code)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or_default()
    }

    /// Lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Crosses => "crosses",
            Self::Lines => "lines",
            Self::Circles => "circles",
            Self::Squares => "squares",
            Self::Diamonds => "diamonds",
        }
    }

    fn is_filled(self) -> bool {
        matches!(self, Self::Circles | Self::Squares | Self::Diamonds)
    }
}

impl fmt::Display for SmearShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SmearShape {
    type Err = OpsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let wanted = Some(lower.as_str());
        Self::ALL
            .into_iter()
            .find(|shape| {
                let name = shape.name();
                // Singular forms too: "cross", "line", "circle"
                Some(name) == wanted || name.strip_suffix('s') == wanted || name.strip_suffix("es") == wanted
            })
            .ok_or_else(|| OpsError::InvalidParameter(format!("unknown smear shape: {s}")))
    }
}

/// Smear parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SmearParams {
    /// Stamp shape.
    pub shape: SmearShape,
    /// Stamps per pixel, scaled per shape. `>= 0`.
    pub density: f32,
    /// Stamp size in pixels.
    pub distance: u32,
    /// Line angle in radians.
    pub angle: f32,
    /// How far each touched pixel moves toward the stamp color, usually `[0, 1]`.
    pub mix: f32,
    /// Master seed.
    pub seed: u64,
}

impl Default for SmearParams {
    fn default() -> Self {
        Self {
            shape: SmearShape::Lines,
            density: 0.5,
            distance: 8,
            angle: 0.0,
            mix: 0.5,
            seed: 0,
        }
    }
}

impl SmearParams {
    /// Number of stamp placements for a `width x height` buffer.
    ///
    /// For lines this is rounded up to whole batches by [`Self::task_count`].
    pub fn placements(&self, width: usize, height: usize) -> usize {
        let area = width as f64 * height as f64;
        let density = self.density as f64;
        let n = match self.shape {
            SmearShape::Lines => 2.0 * density * area / 2.0,
            _ => 2.0 * density * area / (self.distance as f64 + 1.0),
        };
        n as usize
    }

    /// Placements per task: batches of `n / 100 + 1` for lines, 1 otherwise.
    pub fn placements_per_task(&self, width: usize, height: usize) -> usize {
        match self.shape {
            SmearShape::Lines => self.placements(width, height) / 100 + 1,
            _ => 1,
        }
    }

    /// Number of tasks, which is also the number of progress units.
    pub fn task_count(&self, width: usize, height: usize) -> usize {
        self.placements(width, height)
            .div_ceil(self.placements_per_task(width, height))
    }

    /// Most distinct pixels a single stamp can touch.
    pub fn stamp_area(&self) -> usize {
        let d = self.distance as usize;
        match self.shape {
            SmearShape::Crosses => 4 * d + 1,
            SmearShape::Lines => (2 * d).saturating_sub(1),
            _ => {
                let side = 2 * (d + 1) + 1;
                side * side
            }
        }
    }

    /// Upper bound on the number of pixels a smear can change.
    pub fn max_touched(&self, width: usize, height: usize) -> usize {
        self.task_count(width, height)
            .saturating_mul(self.placements_per_task(width, height))
            .saturating_mul(self.stamp_area())
            .min(width * height)
    }

    fn validate(&self, width: usize, height: usize) -> OpsResult<()> {
        if !self.density.is_finite() || self.density < 0.0 {
            return Err(OpsError::InvalidParameter(format!(
                "density must be finite and >= 0, got {}",
                self.density
            )));
        }
        if !self.mix.is_finite() {
            return Err(OpsError::InvalidParameter(format!("mix must be finite, got {}", self.mix)));
        }
        if !self.angle.is_finite() {
            return Err(OpsError::InvalidParameter(format!("angle must be finite, got {}", self.angle)));
        }
        if self.distance == 0 && !self.shape.is_filled() {
            return Err(OpsError::InvalidParameter(format!(
                "{} need a distance of at least 1",
                self.shape
            )));
        }
        let placements = self.placements(width, height);
        if placements > MAX_PLACEMENTS {
            return Err(OpsError::InvalidParameter(format!(
                "density {} gives {placements} {} placements on {width}x{height}, limit is {MAX_PLACEMENTS}",
                self.density, self.shape
            )));
        }
        Ok(())
    }
}

/// Seed for task `index` derived from the master seed.
///
/// Distinct indices give distinct seeds for the same master seed.
#[inline]
pub fn task_seed(seed: u64, index: u64) -> u64 {
    seed ^ index.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Renders a smear of `src`.
///
/// Runs one task per placement (per batch for lines) on `pool` and waits for
/// all of them. Tasks are submitted in chunks of a fixed size. The pool reports one progress unit per task, see
/// [`SmearParams::task_count`].
///
/// # Errors
///
/// [`OpsError::InvalidParameter`] for negative or non-finite density,
/// non-finite mix or angle, a zero distance with lines or crosses, or more
/// than [`MAX_PLACEMENTS`] placements.
pub fn smear(
    src: &PixelBuffer,
    params: &SmearParams,
    pool: &dyn WorkerPool,
    progress: &dyn ProgressSink,
) -> OpsResult<PixelBuffer> {
    let (width, height) = src.dimensions();
    trace!(
        width,
        height,
        shape = %params.shape,
        density = params.density,
        distance = params.distance,
        angle = params.angle,
        mix = params.mix,
        seed = params.seed,
        "smear"
    );
    params.validate(width, height)?;

    if src.is_empty() {
        return Ok(src.clone());
    }

    let tasks_total = params.task_count(width, height);
    let per_task = params.placements_per_task(width, height);
    debug!(
        shape = %params.shape,
        placements = params.placements(width, height),
        tasks = tasks_total,
        per_task,
        threads = pool.threads(),
        "Rendering smear"
    );

    let out = AtomicPixelBuffer::from_buffer(src);
    let canvas = Canvas::new(src.as_slice(), &out, params.mix);
    let stamper = Stamper::new(&canvas, params, width, height);

    // Submitted in chunks so the task list stays small on large buffers
    let mut start = 0;
    while start < tasks_total {
        let end = (start + TASK_CHUNK).min(tasks_total);
        let tasks: Vec<Task<'_>> = (start..end)
            .map(|index| {
                let stamper = &stamper;
                Box::new(move || stamper.run(index as u64, per_task)) as Task<'_>
            })
            .collect();
        pool.run_all(tasks, progress);
        start = end;
    }

    Ok(out.into_buffer())
}

/// Per-call state shared by every task.
struct Stamper<'a> {
    canvas: &'a Canvas<'a>,
    shape: SmearShape,
    seed: u64,
    distance: u32,
    cos: f32,
    sin: f32,
    width: usize,
    height: usize,
}

impl<'a> Stamper<'a> {
    fn new(canvas: &'a Canvas<'a>, params: &SmearParams, width: usize, height: usize) -> Self {
        Self {
            canvas,
            shape: params.shape,
            seed: params.seed,
            distance: params.distance,
            cos: params.angle.cos(),
            sin: params.angle.sin(),
            width,
            height,
        }
    }

    fn run(&self, index: u64, placements: usize) {
        let mut rng = StdRng::seed_from_u64(task_seed(self.seed, index));
        for _ in 0..placements {
            self.place(&mut rng);
        }
    }

    fn place(&self, rng: &mut StdRng) {
        let x = rng.gen_range(0..self.width);
        let y = rng.gen_range(0..self.height);
        let color = self.canvas.source(x, y);
        let (sx, sy) = (x as isize, y as isize);

        match self.shape {
            SmearShape::Crosses => {
                let len = rng.gen_range(1..=self.distance) as isize;
                self.canvas.cross(sx, sy, len, color);
            }
            SmearShape::Lines => {
                let len = rng.gen_range(0..self.distance) as f32;
                let dx = (len * self.cos) as isize;
                let dy = (len * self.sin) as isize;
                self.canvas.line((sx - dx, sy - dy), (sx + dx, sy + dy), color);
            }
            SmearShape::Circles => self.canvas.circle(sx, sy, self.radius(), color),
            SmearShape::Squares => self.canvas.square(sx, sy, self.radius(), color),
            SmearShape::Diamonds => self.canvas.diamond(sx, sy, self.radius(), color),
        }
    }

    #[inline]
    fn radius(&self) -> isize {
        self.distance as isize + 1
    }
}
