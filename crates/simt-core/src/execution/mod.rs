//! Execution engines for scheduling independent execution groups
//!
//! An engine is the "launch mechanism" of the modelled accelerator: it is
//! handed a group count and a per-group closure and runs every group exactly
//! once. Groups are logically independent, so an engine is free to run them
//! in any order or fully in parallel.
//!
//! # Design Philosophy
//!
//! - **No ordering between groups**: results come back indexed, but side
//!   effects of different groups may interleave arbitrarily
//! - **Thread Pool Integration**: parallel engines use Rayon's global pool or
//!   a dedicated one
//! - **Composable**: kernels are generic over the engine

#[cfg(feature = "parallel")]
use crate::Result;

/// Execution strategy for group scheduling
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionStrategy {
    /// Run groups one after another on the calling thread
    Sequential,
    /// Run groups concurrently
    Parallel,
}

/// Trait for engines that schedule independent groups
pub trait ExecutionEngine: Clone + Send + Sync {
    /// Execute a function in the engine's execution context
    fn execute<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send;

    /// Run `f` once for every index in `0..count`, collecting results by index
    fn execute_batch<F, R>(&self, count: usize, f: F) -> Vec<R>
    where
        F: Fn(usize) -> R + Sync + Send,
        R: Send;

    /// Run `map` once for every index in `0..count` and fold the results
    ///
    /// `combine` must be associative; the grouping of results is unspecified.
    fn map_reduce<M, I, C, R>(&self, count: usize, map: M, identity: I, combine: C) -> R
    where
        M: Fn(usize) -> R + Sync + Send,
        I: Fn() -> R + Sync + Send,
        C: Fn(R, R) -> R + Sync + Send,
        R: Send;

    /// Get the execution strategy
    fn strategy(&self) -> ExecutionStrategy;

    /// Check if groups may run concurrently
    fn is_parallel(&self) -> bool {
        self.strategy() == ExecutionStrategy::Parallel
    }

    /// Get the number of threads available
    fn num_threads(&self) -> usize;
}

/// Sequential execution engine
///
/// Executes every group in order on the current thread.
#[derive(Clone, Copy, Debug, Default)]
pub struct SequentialEngine;

impl SequentialEngine {
    /// Create a new sequential engine
    pub fn new() -> Self {
        Self
    }
}

impl ExecutionEngine for SequentialEngine {
    fn execute<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        f()
    }

    fn execute_batch<F, R>(&self, count: usize, f: F) -> Vec<R>
    where
        F: Fn(usize) -> R + Sync + Send,
        R: Send,
    {
        (0..count).map(f).collect()
    }

    fn map_reduce<M, I, C, R>(&self, count: usize, map: M, identity: I, combine: C) -> R
    where
        M: Fn(usize) -> R + Sync + Send,
        I: Fn() -> R + Sync + Send,
        C: Fn(R, R) -> R + Sync + Send,
        R: Send,
    {
        (0..count).map(map).fold(identity(), combine)
    }

    fn strategy(&self) -> ExecutionStrategy {
        ExecutionStrategy::Sequential
    }

    fn num_threads(&self) -> usize {
        1
    }
}

/// Parallel execution engine using Rayon
///
/// Executes groups in parallel using Rayon's thread pool.
#[cfg(feature = "parallel")]
#[derive(Clone, Debug, Default)]
pub struct ParallelEngine {
    thread_pool: Option<std::sync::Arc<rayon::ThreadPool>>,
}

#[cfg(feature = "parallel")]
impl ParallelEngine {
    /// Create a new parallel engine with the global thread pool
    pub fn new() -> Self {
        Self { thread_pool: None }
    }

    /// Create a new parallel engine with a custom thread pool
    pub fn with_thread_pool(pool: std::sync::Arc<rayon::ThreadPool>) -> Self {
        Self {
            thread_pool: Some(pool),
        }
    }

    /// Create with a specific number of threads
    pub fn with_num_threads(num_threads: usize) -> Result<Self> {
        if num_threads == 0 {
            return Err(crate::Error::InvalidParameter(
                "num_threads must be at least 1".to_string(),
            ));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .thread_name(|i| format!("simt-group-{i}"))
            .build()
            .map_err(|e| crate::Error::Execution(format!("Failed to create thread pool: {e}")))?;

        log::debug!("created dedicated group scheduler with {num_threads} threads");

        Ok(Self {
            thread_pool: Some(std::sync::Arc::new(pool)),
        })
    }

    fn install<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        match &self.thread_pool {
            Some(pool) => pool.install(f),
            None => f(),
        }
    }
}

#[cfg(feature = "parallel")]
impl ExecutionEngine for ParallelEngine {
    fn execute<F, R>(&self, f: F) -> R
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        self.install(f)
    }

    fn execute_batch<F, R>(&self, count: usize, f: F) -> Vec<R>
    where
        F: Fn(usize) -> R + Sync + Send,
        R: Send,
    {
        use rayon::prelude::*;

        self.install(|| (0..count).into_par_iter().map(f).collect())
    }

    fn map_reduce<M, I, C, R>(&self, count: usize, map: M, identity: I, combine: C) -> R
    where
        M: Fn(usize) -> R + Sync + Send,
        I: Fn() -> R + Sync + Send,
        C: Fn(R, R) -> R + Sync + Send,
        R: Send,
    {
        use rayon::prelude::*;

        self.install(|| (0..count).into_par_iter().map(map).reduce(identity, combine))
    }

    fn strategy(&self) -> ExecutionStrategy {
        ExecutionStrategy::Parallel
    }

    fn num_threads(&self) -> usize {
        match &self.thread_pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }
}

/// Engine used when none is specified
#[cfg(feature = "parallel")]
pub type DefaultEngine = ParallelEngine;

/// Engine used when none is specified
#[cfg(not(feature = "parallel"))]
pub type DefaultEngine = SequentialEngine;

/// Create a sequential engine
pub fn sequential() -> SequentialEngine {
    SequentialEngine::new()
}

/// Create a parallel engine on the global Rayon pool
#[cfg(feature = "parallel")]
pub fn parallel() -> ParallelEngine {
    ParallelEngine::new()
}

/// Create the default engine for this build
///
/// Parallel when the `parallel` feature is enabled, sequential otherwise.
pub fn auto_engine() -> DefaultEngine {
    log::debug!(
        "auto engine: parallel feature {}, {} logical cpus",
        cfg!(feature = "parallel"),
        num_cpus::get()
    );
    DefaultEngine::default()
}
