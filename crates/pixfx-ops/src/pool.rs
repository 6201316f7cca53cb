//! Worker pools for the parallel engines.
//!
//! A [`WorkerPool`] takes a batch of independent tasks, runs them, and
//! blocks until every one has finished. The pool reports one progress unit
//! per finished task. Pool lifetime and thread count belong to the caller.
//!
//! # Implementations
//!
//! - [`rayon::ThreadPool`] - a dedicated pool, see [`build_pool`]
//! - [`GlobalPool`] - rayon's global pool
//! - [`InlinePool`] - runs tasks in order on the calling thread
//!
//! # Example
//!
//! ```rust
//! use pixfx_core::ProgressCounter;
//! use pixfx_ops::pool::{InlinePool, Task, WorkerPool};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! let hits = AtomicUsize::new(0);
//! let counter = &hits;
//! let tasks: Vec<Task<'_>> = (0..4)
//!     .map(|_| Box::new(move || { counter.fetch_add(1, Ordering::Relaxed); }) as Task<'_>)
//!     .collect();
//! let progress = ProgressCounter::new();
//! InlinePool.run_all(tasks, &progress);
//! assert_eq!(hits.load(Ordering::Relaxed), 4);
//! assert_eq!(progress.count(), 4);
//! ```

use pixfx_core::ProgressSink;
#[allow(unused_imports)]
use tracing::{debug, trace};

#[cfg(feature = "parallel")]
use crate::{OpsError, OpsResult};

/// A unit of work that may borrow from the caller's stack.
pub type Task<'env> = Box<dyn FnOnce() + Send + 'env>;

/// Runs batches of tasks to completion.
pub trait WorkerPool: Sync {
    /// Submits every task and waits for all of them.
    ///
    /// Must not return before each task has run, and must call
    /// `progress.unit_done()` exactly once per finished task.
    fn run_all<'env>(&self, tasks: Vec<Task<'env>>, progress: &'env dyn ProgressSink);

    /// Number of worker threads, for logging.
    fn threads(&self) -> usize;
}

/// Runs tasks sequentially on the calling thread, in submission order.
///
/// Useful for reproducible output: with a fixed seed, a smear rendered on
/// this pool is identical on every run.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlinePool;

impl WorkerPool for InlinePool {
    fn run_all<'env>(&self, tasks: Vec<Task<'env>>, progress: &'env dyn ProgressSink) {
        trace!(tasks = tasks.len(), "InlinePool::run_all");
        for task in tasks {
            task();
            progress.unit_done();
        }
    }

    fn threads(&self) -> usize {
        1
    }
}

/// Dispatches onto rayon's global thread pool.
#[cfg(feature = "parallel")]
#[derive(Debug, Clone, Copy, Default)]
pub struct GlobalPool;

#[cfg(feature = "parallel")]
impl WorkerPool for GlobalPool {
    fn run_all<'env>(&self, tasks: Vec<Task<'env>>, progress: &'env dyn ProgressSink) {
        trace!(tasks = tasks.len(), "GlobalPool::run_all");
        rayon::scope(|s| {
            for task in tasks {
                s.spawn(move |_| {
                    task();
                    progress.unit_done();
                });
            }
        });
    }

    fn threads(&self) -> usize {
        rayon::current_num_threads()
    }
}

#[cfg(feature = "parallel")]
impl WorkerPool for rayon::ThreadPool {
    fn run_all<'env>(&self, tasks: Vec<Task<'env>>, progress: &'env dyn ProgressSink) {
        trace!(tasks = tasks.len(), threads = self.current_num_threads(), "ThreadPool::run_all");
        self.scope(|s| {
            for task in tasks {
                s.spawn(move |_| {
                    task();
                    progress.unit_done();
                });
            }
        });
    }

    fn threads(&self) -> usize {
        self.current_num_threads()
    }
}

/// Builds a dedicated rayon pool.
///
/// `threads == 0` sizes the pool to the available hardware parallelism.
#[cfg(feature = "parallel")]
pub fn build_pool(threads: usize) -> OpsResult<rayon::ThreadPool> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("pixfx-worker-{i}"))
        .build()
        .map_err(|e| OpsError::Pool(e.to_string()))?;
    debug!(threads = pool.current_num_threads(), "Built worker pool");
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixfx_core::ProgressCounter;
    use std::sync::Mutex;

    fn collecting_tasks<'a>(log: &'a Mutex<Vec<usize>>, n: usize) -> Vec<Task<'a>> {
        (0..n)
            .map(|i| {
                Box::new(move || {
                    log.lock().unwrap().push(i);
                }) as Task<'a>
            })
            .collect()
    }

    #[test]
    fn test_inline_pool_preserves_order() {
        let log = Mutex::new(Vec::new());
        let progress = ProgressCounter::new();
        InlinePool.run_all(collecting_tasks(&log, 5), &progress);
        assert_eq!(*log.lock().unwrap(), vec![0, 1, 2, 3, 4]);
        assert_eq!(progress.count(), 5);
        assert_eq!(InlinePool.threads(), 1);
    }

    #[test]
    fn test_empty_batch() {
        let progress = ProgressCounter::new();
        InlinePool.run_all(Vec::new(), &progress);
        assert_eq!(progress.count(), 0);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_thread_pool_joins_all() {
        let pool = build_pool(3).unwrap();
        assert_eq!(pool.threads(), 3);

        let log = Mutex::new(Vec::new());
        let progress = ProgressCounter::new();
        pool.run_all(collecting_tasks(&log, 100), &progress);

        let mut seen = log.into_inner().unwrap();
        seen.sort_unstable();
        assert_eq!(seen, (0..100).collect::<Vec<_>>());
        assert_eq!(progress.count(), 100);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_global_pool_joins_all() {
        let log = Mutex::new(Vec::new());
        let progress = ProgressCounter::new();
        GlobalPool.run_all(collecting_tasks(&log, 17), &progress);
        assert_eq!(log.into_inner().unwrap().len(), 17);
        assert_eq!(progress.count(), 17);
    }
}
