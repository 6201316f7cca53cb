//! Progress reporting.
//!
//! Engines call [`ProgressSink::unit_done`] once per unit of work:
//! one output row for blur and convolution passes, one finished task for the
//! smear family. Sinks must be cheap and must not block.
//!
//! # Example
//!
//! ```rust
//! use pixfx_core::{ProgressCounter, ProgressSink};
//!
//! let counter = ProgressCounter::new();
//! for _ in 0..3 {
//!     counter.unit_done();
//! }
//! assert_eq!(counter.count(), 3);
//!
//! // Closures are sinks too
//! let log = || {};
//! log.unit_done();
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;

/// Receiver of "one unit of work done" notifications.
///
/// `Sync` because parallel engines report from worker threads.
pub trait ProgressSink: Sync {
    /// Called once per finished unit of work.
    fn unit_done(&self);
}

impl<F: Fn() + Sync> ProgressSink for F {
    fn unit_done(&self) {
        self();
    }
}

/// Sink that ignores every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    #[inline]
    fn unit_done(&self) {}
}

/// Sink that counts notifications.
#[derive(Debug, Default)]
pub struct ProgressCounter {
    done: AtomicUsize,
}

impl ProgressCounter {
    /// Creates a counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Units reported so far.
    pub fn count(&self) -> usize {
        self.done.load(Ordering::Relaxed)
    }
}

impl ProgressSink for ProgressCounter {
    #[inline]
    fn unit_done(&self) {
        self.done.fetch_add(1, Ordering::Relaxed);
    }
}

/// Sink that logs through `tracing` every time another tenth of the
/// expected total is reached.
#[derive(Debug)]
pub struct TracingProgress {
    label: String,
    total: usize,
    done: AtomicUsize,
}

impl TracingProgress {
    /// Creates a sink expecting `total` units.
    pub fn new(label: impl Into<String>, total: usize) -> Self {
        Self {
            label: label.into(),
            total,
            done: AtomicUsize::new(0),
        }
    }

    /// Units reported so far.
    pub fn count(&self) -> usize {
        self.done.load(Ordering::Relaxed)
    }

    /// Expected number of units.
    pub fn total(&self) -> usize {
        self.total
    }
}

impl ProgressSink for TracingProgress {
    fn unit_done(&self) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        if self.total == 0 {
            return;
        }
        let step = (self.total / 10).max(1);
        if done % step == 0 || done == self.total {
            let percent = (done.min(self.total) * 100) / self.total;
            debug!(label = %self.label, done, total = self.total, percent, "progress");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_across_threads() {
        let counter = ProgressCounter::new();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for _ in 0..250 {
                        counter.unit_done();
                    }
                });
            }
        });
        assert_eq!(counter.count(), 1000);
    }

    #[test]
    fn test_closure_sink() {
        let hits = AtomicUsize::new(0);
        let sink = || {
            hits.fetch_add(1, Ordering::Relaxed);
        };
        let dyn_sink: &dyn ProgressSink = &sink;
        dyn_sink.unit_done();
        dyn_sink.unit_done();
        assert_eq!(hits.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_tracing_progress_counts() {
        let sink = TracingProgress::new("blur", 25);
        for _ in 0..30 {
            sink.unit_done();
        }
        assert_eq!(sink.count(), 30);
        assert_eq!(sink.total(), 25);
    }

    #[test]
    fn test_no_progress_is_noop() {
        NoProgress.unit_done();
    }
}
