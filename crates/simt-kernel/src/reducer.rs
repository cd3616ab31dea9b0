//! Reduction entry point
//!
//! A [`Reducer`] owns everything that outlives a single launch: the checked
//! configuration, the engine groups are scheduled on, and the scratch pool
//! group staging buffers are recycled through.
//!
//! # Example
//!
//! ```rust
//! use simt_kernel::{LaunchConfig, Reducer, Sum};
//!
//! let reducer = Reducer::<f32>::new(LaunchConfig::new(4)).unwrap();
//! let total = reducer.reduce(&[1.0, 2.0, 3.0, 4.0][..], Sum).unwrap();
//! assert_eq!(total, 10.0);
//! ```

use log::debug;
use simt_core::{auto_engine, DefaultEngine, Element, ExecutionEngine, PoolStats, Result, ScratchPool};

use crate::accumulator::{AtomicSink, FinalCombine, GlobalAccumulator, PartialsBuffer};
use crate::config::LaunchConfig;
use crate::device::DeviceSlice;
use crate::kernel::{LaunchStats, ReduceKernel};
use crate::op::{Max, Min, ReduceOp, Sum};

/// Result of a reduction together with how it was computed
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reduction<T> {
    /// The combined value of every input element
    pub value: T,
    /// Groups launched
    pub group_count: usize,
    /// Synchronisation performed across all groups
    pub stats: LaunchStats,
}

/// Reusable reduction driver
pub struct Reducer<T: Element, E: ExecutionEngine = DefaultEngine> {
    config: LaunchConfig,
    engine: E,
    pool: ScratchPool<T>,
}

impl<T: Element> Reducer<T> {
    /// Reducer on the default engine for this build
    pub fn new(config: LaunchConfig) -> Result<Self> {
        Self::with_engine(config, auto_engine())
    }
}

impl<T: Element, E: ExecutionEngine> Reducer<T, E> {
    /// Reducer scheduling groups on `engine`
    pub fn with_engine(config: LaunchConfig, engine: E) -> Result<Self> {
        config.validate()?;
        // Two buffers (registers and staging) per concurrently running group
        let pool = ScratchPool::new(2 * engine.num_threads().max(1));
        debug!(
            "reducer ready: group_size {}, lane_width {}, {:?} on {} thread(s)",
            config.group_size,
            config.effective_lane_width(),
            config.strategy,
            engine.num_threads()
        );
        Ok(Self { config, engine, pool })
    }

    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Scratch pool counters, for checking buffer reuse
    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Combine every element of `input` with `op`
    ///
    /// An empty input yields the operator's identity.
    pub fn reduce<'a, I, O>(&self, input: I, op: O) -> Result<T>
    where
        I: Into<DeviceSlice<'a, T>>,
        O: ReduceOp<T>,
    {
        self.reduce_with_report(input, op).map(|r| r.value)
    }

    /// Like [`reduce`](Self::reduce), also reporting group count and stats
    ///
    /// Every call starts from a fresh accumulator holding the identity, so
    /// repeated calls return the same value rather than a running total.
    pub fn reduce_with_report<'a, I, O>(&self, input: I, op: O) -> Result<Reduction<T>>
    where
        I: Into<DeviceSlice<'a, T>>,
        O: ReduceOp<T>,
    {
        let input = input.into();
        let group_count = self.config.group_count(input.len());
        let kernel = ReduceKernel::new(input, op, self.config)?;

        let (value, stats) = match self.config.finalize {
            FinalCombine::Atomic => {
                let accumulator = GlobalAccumulator::for_op(kernel.op());
                let sink = AtomicSink::new(&accumulator, kernel.op());
                let stats = kernel.launch(&self.engine, group_count, &self.pool, &sink)?;
                (accumulator.load(), stats)
            }
            FinalCombine::Partials => {
                let partials = PartialsBuffer::new(group_count, kernel.op().identity());
                let stats = kernel.launch(&self.engine, group_count, &self.pool, &partials)?;
                (partials.finalize(kernel.op()), stats)
            }
        };

        Ok(Reduction {
            value,
            group_count,
            stats,
        })
    }

    /// Reduce into a caller-owned accumulator
    ///
    /// The accumulator is not reset: the caller pre-sets it (normally to the
    /// operator's identity) and reads it back after this returns. With
    /// [`FinalCombine::Partials`] the groups write their own slots and only the
    /// finalised value is merged into `accumulator`, in one combine.
    pub fn reduce_into<'a, I, O>(
        &self,
        input: I,
        op: O,
        accumulator: &GlobalAccumulator<T>,
    ) -> Result<LaunchStats>
    where
        I: Into<DeviceSlice<'a, T>>,
        O: ReduceOp<T>,
    {
        let input = input.into();
        let group_count = self.config.group_count(input.len());
        let kernel = ReduceKernel::new(input, op, self.config)?;
        match self.config.finalize {
            FinalCombine::Atomic => {
                let sink = AtomicSink::new(accumulator, kernel.op());
                kernel.launch(&self.engine, group_count, &self.pool, &sink)
            }
            FinalCombine::Partials => {
                let partials = PartialsBuffer::new(group_count, kernel.op().identity());
                let stats = kernel.launch(&self.engine, group_count, &self.pool, &partials)?;
                accumulator.combine(kernel.op(), partials.finalize(kernel.op()));
                Ok(stats)
            }
        }
    }
}

/// Reduce `input` with `op` using groups of `group_size` threads
pub fn reduce<T: Element, O: ReduceOp<T>>(input: &[T], group_size: usize, op: O) -> Result<T> {
    Reducer::new(LaunchConfig::new(group_size))?.reduce(input, op)
}

/// Sum with the default launch configuration
pub fn sum<T: Element>(input: &[T]) -> Result<T> {
    Reducer::new(LaunchConfig::default())?.reduce(input, Sum)
}

/// Maximum with the default launch configuration; `-inf` when empty
pub fn max<T: Element>(input: &[T]) -> Result<T> {
    Reducer::new(LaunchConfig::default())?.reduce(input, Max)
}

/// Minimum with the default launch configuration; `+inf` when empty
pub fn min<T: Element>(input: &[T]) -> Result<T> {
    Reducer::new(LaunchConfig::default())?.reduce(input, Min)
}
