//! Rayon-based parallel executor.

use crate::{Executor, ExecutorError};
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fmt;
use std::sync::Arc;

/// A parallel executor backed by its own rayon thread pool.
///
/// The pool is private to the executor rather than rayon's global pool, so
/// its size is the upper bound on documents generated at once. Results come
/// back in input order whatever order the work finishes in.
#[derive(Clone)]
pub struct RayonExecutor {
    pool: Arc<ThreadPool>,
}

impl RayonExecutor {
    /// Creates an executor with one thread per logical CPU.
    pub fn new() -> Result<Self, ExecutorError> {
        Self::build(ThreadPoolBuilder::new())
    }

    pub fn with_threads(num_threads: usize) -> Result<Self, ExecutorError> {
        if num_threads == 0 {
            return Err(ExecutorError::new("thread count must be at least 1"));
        }
        Self::build(ThreadPoolBuilder::new().num_threads(num_threads))
    }

    fn build(builder: ThreadPoolBuilder) -> Result<Self, ExecutorError> {
        let pool = builder
            .thread_name(|i| format!("quire-worker-{}", i))
            .build()
            .map_err(|e| ExecutorError::new(e.to_string()))?;
        log::debug!("Started rayon pool with {} threads", pool.current_num_threads());
        Ok(Self { pool: Arc::new(pool) })
    }
}

impl fmt::Debug for RayonExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RayonExecutor")
            .field("num_threads", &self.pool.current_num_threads())
            .finish()
    }
}

impl Executor for RayonExecutor {
    fn execute_all<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + Clone + 'static,
    {
        self.pool.install(|| items.into_par_iter().map(f).collect())
    }

    fn parallelism(&self) -> usize {
        self.pool.current_num_threads()
    }

    fn name(&self) -> &'static str {
        "RayonExecutor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_rayon_executor_keeps_input_order() {
        let executor = RayonExecutor::with_threads(4).unwrap();
        let results = executor.execute_all((0..50u64).collect(), |x| {
            // Later items finish first.
            std::thread::sleep(Duration::from_micros(50 * (50 - x)));
            x * 2
        });
        assert_eq!(results, (0..50u64).map(|x| x * 2).collect::<Vec<_>>());
    }

    #[test]
    fn test_rayon_executor_bounds_concurrency() {
        let executor = RayonExecutor::with_threads(2).unwrap();
        assert_eq!(executor.parallelism(), 2);

        let active = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let _ = executor.execute_all((0..16).collect::<Vec<usize>>(), {
            let active = active.clone();
            let peak = peak.clone();
            move |_| {
                let now = active.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                std::thread::sleep(Duration::from_millis(2));
                active.fetch_sub(1, Ordering::SeqCst);
            }
        });
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[test]
    fn test_rayon_executor_rejects_zero_threads() {
        assert!(RayonExecutor::with_threads(0).is_err());
    }
}
