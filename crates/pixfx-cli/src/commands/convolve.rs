//! Convolve command
//!
//! Applies a preset kernel with the chosen edge handling.

use super::Options;
use crate::ConvolveArgs;
use anyhow::{Context, Result};
use pixfx_cli::{KernelSpec, Summary};
use pixfx_core::TracingProgress;
use pixfx_ops::{convolve, ConvolveParams};
#[allow(unused_imports)]
use tracing::{debug, info, trace};

pub fn run(args: ConvolveArgs, opts: &Options) -> Result<()> {
    trace!(kernel = %args.kernel, size = args.size, edge = ?args.edge, "convolve::run");

    let spec = KernelSpec {
        size: args.size,
        sigma: args.sigma,
        amount: args.amount,
        seed: args.kernel_seed,
        ..KernelSpec::preset(args.kernel)
    };
    let kernel = spec.build().context("Failed to build kernel")?;
    let params = ConvolveParams {
        include_alpha: !args.exclude_alpha,
        edge_action: args.edge,
        premultiply_alpha: !args.no_premultiply,
    };

    let src = args.source.spec().render().context("Failed to render source")?;
    let (w, h) = src.dimensions();
    let (kw, kh) = kernel.dimensions();
    info!(kernel = %args.kernel, kw, kh, shape = ?kernel.shape(), w, h, "Applying convolution");

    if opts.verbose > 0 {
        eprintln!(
            "Convolving {}x{} {:?} with {} {}x{} kernel ({:?} edges)",
            w, h, args.source.pattern, args.kernel, kw, kh, params.edge_action
        );
    }

    let progress = TracingProgress::new("convolve", h);
    let out = convolve(&src, &kernel, &params, &progress).context("Convolution failed")?;

    super::report(&Summary::new("convolve", &src, &out), opts)
}
