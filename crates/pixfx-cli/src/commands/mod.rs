//! CLI command implementations

pub mod blur;
pub mod convolve;
pub mod run;
pub mod smear;

use anyhow::{Context, Result};
use pixfx_cli::Summary;
use pixfx_ops::{InlinePool, WorkerPool};
use tracing::debug;

/// Global options every command receives.
pub struct Options {
    pub verbose: u8,
    pub threads: usize,
    pub json: bool,
}

/// Builds the smear worker pool. One thread runs tasks inline.
pub fn worker_pool(threads: usize) -> Result<Box<dyn WorkerPool>> {
    if threads == 1 {
        debug!("Using inline pool");
        return Ok(Box::new(InlinePool));
    }
    let pool = pixfx_ops::build_pool(threads).context("Failed to configure thread pool")?;
    Ok(Box::new(pool))
}

/// Prints a summary as text or JSON.
pub fn report(summary: &Summary, opts: &Options) -> Result<()> {
    if opts.json {
        let json = serde_json::to_string_pretty(summary).context("Failed to serialize summary")?;
        println!("{json}");
    } else {
        println!("{summary}");
    }
    Ok(())
}
