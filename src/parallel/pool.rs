//! Rayon thread pool configuration for instantiation workloads.
//!
//! Use [WorkerPool::install] to run parallel work with a fixed number of
//! threads, or rely on Rayon's default (all CPU cores).

use log::warn;
use rayon::ThreadPoolBuilder;

/// Configures how many worker threads are used for parallel batches.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkerPool {
    /// Number of worker threads. If 0, use Rayon default (num_cpus).
    pub workers: usize,
}

impl WorkerPool {
    /// Use exactly `n` worker threads.
    pub fn with_workers(n: usize) -> Self {
        Self { workers: n }
    }

    /// Run a closure on a thread pool with this worker count. If
    /// [workers](WorkerPool::workers) is 0, or a dedicated pool cannot be
    /// built, the global Rayon pool is used.
    pub fn install<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        if self.workers == 0 {
            return f();
        }
        match ThreadPoolBuilder::new().num_threads(self.workers).build() {
            Ok(pool) => pool.install(f),
            Err(err) => {
                warn!("could not build a {}-thread pool ({err}); using the global pool", self.workers);
                f()
            }
        }
    }
}
