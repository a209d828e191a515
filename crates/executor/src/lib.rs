//! Executor implementations for quire document batches.
//!
//! ## Available Executors
//!
//! - [`RayonExecutor`]: Dedicated bounded thread pool (feature: `rayon`)
//! - [`SyncExecutor`]: Sequential execution
//!
//! ## Usage
//!
//! ```ignore
//! use quire_executor::{Executor, ExecutorImpl, RayonExecutor};
//!
//! let executor = ExecutorImpl::Rayon(RayonExecutor::with_threads(4)?);
//! let results = executor.execute_all(vec![1, 2, 3], |x| x * 2);
//! ```

#[cfg(feature = "rayon")]
mod rayon_executor;
mod sync;

#[cfg(feature = "rayon")]
pub use rayon_executor::RayonExecutor;
pub use sync::SyncExecutor;

use std::fmt::Debug;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("executor error: {message}")]
pub struct ExecutorError {
    pub message: String,
}

impl ExecutorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

/// A trait for executing work items, potentially in parallel.
pub trait Executor: Send + Sync + Debug {
    /// Applies `f` to every item. Results are returned in the same order as
    /// the input items.
    fn execute_all<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + Clone + 'static;

    /// Returns the level of parallelism this executor can provide.
    fn parallelism(&self) -> usize;

    /// Returns a human-readable name for this executor (for logging/debugging).
    fn name(&self) -> &'static str;
}

/// A type-erased executor that wraps concrete executor implementations.
///
/// Since the `Executor` trait has generic methods, it cannot be used as a trait object
/// (`dyn Executor`). This enum holds the concrete executor types and delegates to them.
#[derive(Clone, Debug)]
pub enum ExecutorImpl {
    /// Sequential executor (no parallelism)
    Sync(SyncExecutor),

    /// Bounded rayon thread pool executor
    #[cfg(feature = "rayon")]
    Rayon(RayonExecutor),
}

impl ExecutorImpl {
    /// A parallel executor of `max_concurrent` threads when rayon is
    /// available, otherwise the sequential one.
    pub fn bounded(max_concurrent: usize) -> Result<Self, ExecutorError> {
        #[cfg(feature = "rayon")]
        {
            if max_concurrent > 1 {
                return RayonExecutor::with_threads(max_concurrent).map(ExecutorImpl::Rayon);
            }
        }
        if max_concurrent == 0 {
            return Err(ExecutorError::new("max concurrent documents must be at least 1"));
        }
        Ok(ExecutorImpl::Sync(SyncExecutor::new()))
    }
}

impl Executor for ExecutorImpl {
    fn execute_all<T, R, F>(&self, items: Vec<T>, f: F) -> Vec<R>
    where
        T: Send + 'static,
        R: Send + 'static,
        F: Fn(T) -> R + Send + Sync + Clone + 'static,
    {
        match self {
            ExecutorImpl::Sync(exec) => exec.execute_all(items, f),
            #[cfg(feature = "rayon")]
            ExecutorImpl::Rayon(exec) => exec.execute_all(items, f),
        }
    }

    fn parallelism(&self) -> usize {
        match self {
            ExecutorImpl::Sync(exec) => exec.parallelism(),
            #[cfg(feature = "rayon")]
            ExecutorImpl::Rayon(exec) => exec.parallelism(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            ExecutorImpl::Sync(exec) => exec.name(),
            #[cfg(feature = "rayon")]
            ExecutorImpl::Rayon(exec) => exec.name(),
        }
    }
}

impl Default for ExecutorImpl {
    fn default() -> Self {
        ExecutorImpl::Sync(SyncExecutor::new())
    }
}
