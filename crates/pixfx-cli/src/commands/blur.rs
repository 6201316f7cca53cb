//! Blur command
//!
//! Box blur with separate horizontal and vertical radii.

use super::Options;
use crate::BlurArgs;
use anyhow::{Context, Result};
use pixfx_cli::Summary;
use pixfx_core::TracingProgress;
use pixfx_ops::{box_blur, BlurParams};
#[allow(unused_imports)]
use tracing::{debug, info, trace};

pub fn run(args: BlurArgs, opts: &Options) -> Result<()> {
    let params = BlurParams {
        h_radius: args.h_radius.unwrap_or(args.radius),
        v_radius: args.v_radius.unwrap_or(args.radius),
        iterations: args.iterations,
        premultiply_alpha: !args.no_premultiply,
    };
    trace!(?params, "blur::run");

    let src = args.source.spec().render().context("Failed to render source")?;
    let (w, h) = src.dimensions();
    info!(h_radius = params.h_radius, v_radius = params.v_radius, iterations = params.iterations, w, h, "Applying blur");

    if opts.verbose > 0 {
        eprintln!(
            "Applying box blur (h={}, v={}, iterations={}) to {}x{} {:?}",
            params.h_radius, params.v_radius, params.iterations, w, h, args.source.pattern
        );
    }

    let progress = TracingProgress::new("blur", params.work_units(w, h));
    let out = box_blur(&src, &params, &progress).context("Blur failed")?;

    super::report(&Summary::new("blur", &src, &out), opts)
}
