//! Smear command

use super::Options;
use crate::SmearArgs;
use anyhow::{Context, Result};
use pixfx_cli::Summary;
use pixfx_core::TracingProgress;
use pixfx_ops::{smear, SmearParams};
#[allow(unused_imports)]
use tracing::{debug, info, trace};

pub fn run(args: SmearArgs, opts: &Options) -> Result<()> {
    let params = SmearParams {
        shape: args.shape,
        density: args.density,
        distance: args.distance,
        angle: args.angle.to_radians(),
        mix: args.mix,
        seed: args.seed,
    };
    trace!(?params, threads = opts.threads, "smear::run");

    let src = args.source.spec().render().context("Failed to render source")?;
    let (w, h) = src.dimensions();
    let pool = super::worker_pool(opts.threads)?;
    info!(
        shape = %params.shape,
        tasks = params.task_count(w, h),
        threads = pool.threads(),
        "Applying smear"
    );

    if opts.verbose > 0 {
        eprintln!(
            "Smearing {}x{} {:?} with {} ({} tasks on {} threads)",
            w,
            h,
            args.source.pattern,
            params.shape,
            params.task_count(w, h),
            pool.threads()
        );
    }

    let progress = TracingProgress::new("smear", params.task_count(w, h));
    let out = smear(&src, &params, pool.as_ref(), &progress).context("Smear failed")?;

    super::report(&Summary::new("smear", &src, &out), opts)
}
