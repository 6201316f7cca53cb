//! Runs jobs step by step.

use pixfx_core::{PixelBuffer, TracingProgress};
use pixfx_ops::{box_blur, convolve, smear, WorkerPool};
#[allow(unused_imports)]
use tracing::{debug, info, trace};

use crate::config::{Job, Step};
use crate::error::{ConfigError, ConfigResult};

/// Source and final buffer of a job.
#[derive(Debug, Clone)]
pub struct JobOutput {
    /// Rendered source.
    pub source: PixelBuffer,
    /// Result after the last step.
    pub output: PixelBuffer,
}

/// Renders the source and applies every step in order.
pub fn run_job(job: &Job, pool: &dyn WorkerPool) -> ConfigResult<JobOutput> {
    let source = job.source.render()?;
    info!(
        pattern = ?job.source.pattern,
        width = source.width(),
        height = source.height(),
        steps = job.steps.len(),
        "Running job"
    );

    let mut current = source.clone();
    for (index, step) in job.steps.iter().enumerate() {
        current = apply_step(index, step, &current, pool)?;
    }

    Ok(JobOutput { source, output: current })
}

fn apply_step(index: usize, step: &Step, src: &PixelBuffer, pool: &dyn WorkerPool) -> ConfigResult<PixelBuffer> {
    let (w, h) = src.dimensions();
    trace!(index, op = step.name(), w, h, "apply_step");
    let failed = |source| ConfigError::Step {
        index,
        op: step.name(),
        source,
    };

    match step {
        Step::Blur(params) => {
            let progress = TracingProgress::new("blur", params.work_units(w, h));
            box_blur(src, params, &progress).map_err(failed)
        }
        Step::Convolve(c) => {
            let kernel = c.kernel.build()?;
            let progress = TracingProgress::new("convolve", h);
            convolve(src, &kernel, &c.params, &progress).map_err(failed)
        }
        Step::Smear(params) => {
            let progress = TracingProgress::new("smear", params.task_count(w, h));
            smear(src, params, pool, &progress).map_err(failed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::{Pattern, SourceSpec};
    use pixfx_ops::{BlurParams, InlinePool, SmearParams};

    fn job(steps: Vec<Step>) -> Job {
        Job {
            source: SourceSpec {
                pattern: Pattern::Gradient,
                width: 16,
                height: 12,
                ..Default::default()
            },
            steps,
        }
    }

    #[test]
    fn test_no_steps() {
        let out = run_job(&job(vec![]), &InlinePool).unwrap();
        assert_eq!(out.source, out.output);
    }

    #[test]
    fn test_steps_in_order() {
        let steps = vec![
            Step::Blur(BlurParams::uniform(1.0, 2)),
            Step::Smear(SmearParams { seed: 3, ..Default::default() }),
        ];
        let out = run_job(&job(steps), &InlinePool).unwrap();
        assert_eq!(out.output.dimensions(), (16, 12));
        assert_ne!(out.source, out.output);
    }

    #[test]
    fn test_step_error_names_step() {
        let steps = vec![
            Step::Blur(BlurParams::uniform(1.0, 1)),
            Step::Blur(BlurParams::uniform(-2.0, 1)),
        ];
        let err = run_job(&job(steps), &InlinePool).unwrap_err();
        assert!(matches!(err, ConfigError::Step { index: 1, op: "blur", .. }));
    }
}
