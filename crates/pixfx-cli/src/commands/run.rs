//! Run command
//!
//! Loads a YAML job and runs its steps over the job's source.

use super::Options;
use crate::RunArgs;
use anyhow::{Context, Result};
use pixfx_cli::{run_job, Job, Summary};
#[allow(unused_imports)]
use tracing::{debug, info, trace};

pub fn run(args: RunArgs, opts: &Options) -> Result<()> {
    trace!(job = %args.job.display(), "run::run");

    let job = Job::from_file(&args.job)
        .with_context(|| format!("Failed to load job: {}", args.job.display()))?;

    if opts.verbose > 0 {
        let ops: Vec<_> = job.steps.iter().map(|s| s.name()).collect();
        eprintln!("Running {} ({})", args.job.display(), ops.join(" -> "));
    }

    let pool = super::worker_pool(opts.threads)?;
    let result = run_job(&job, pool.as_ref())
        .with_context(|| format!("Job failed: {}", args.job.display()))?;

    let name = args
        .job
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "job".into());
    super::report(&Summary::new(name, &result.source, &result.output), opts)
}
