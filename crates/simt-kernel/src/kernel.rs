//! The reduction kernel
//!
//! One kernel invocation runs three stages in every group:
//!
//! 1. **Load**: each lane loads its register through the boundary guard
//! 2. **Block reduce**: the group combines its registers with the configured
//!    [`BlockStrategy`](crate::tree::BlockStrategy)
//! 3. **Contribute**: lane 0 hands the group's partial to the sink, once
//!
//! Groups share nothing but the sink, so the engine may run them in any order
//! or all at once.

use log::{debug, trace};
use simt_core::{Element, ExecutionEngine, Result, ScratchPool};

use crate::accumulator::PartialSink;
use crate::config::LaunchConfig;
use crate::device::DeviceSlice;
use crate::group::{GroupContext, GroupStats};
use crate::op::ReduceOp;
use crate::tree::block_reduce;

/// Aggregate synchronisation of one launch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaunchStats {
    /// Groups that ran to completion
    pub groups: usize,
    /// Sum of every group's counters
    pub totals: GroupStats,
}

impl LaunchStats {
    fn from_group(stats: GroupStats) -> Self {
        Self {
            groups: 1,
            totals: stats,
        }
    }

    fn merge(self, other: Self) -> Self {
        Self {
            groups: self.groups + other.groups,
            totals: self.totals + other.totals,
        }
    }
}

/// A reduction bound to its input, operator and configuration
#[derive(Debug, Clone)]
pub struct ReduceKernel<'a, T: Element, O> {
    input: DeviceSlice<'a, T>,
    op: O,
    config: LaunchConfig,
}

impl<'a, T: Element, O: ReduceOp<T>> ReduceKernel<'a, T, O> {
    /// Bind a kernel; fails if `config` is not launchable
    pub fn new(input: DeviceSlice<'a, T>, op: O, config: LaunchConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { input, op, config })
    }

    pub fn input(&self) -> &DeviceSlice<'a, T> {
        &self.input
    }

    pub fn op(&self) -> &O {
        &self.op
    }

    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }

    /// Run group `group` to completion
    ///
    /// The group's scratch is checked out of `pool` on entry and returned
    /// before this returns.
    pub fn run_group<S: PartialSink<T> + ?Sized>(
        &self,
        group: usize,
        pool: &ScratchPool<T>,
        sink: &S,
    ) -> Result<GroupStats> {
        let mut ctx = GroupContext::new(pool, group, self.config.group_size, self.config.lane_width)?;
        ctx.load(&self.input, self.config.load, &self.op);
        let partial = block_reduce(&mut ctx, self.config.strategy, &self.op);
        sink.contribute(group, partial);
        trace!("group {group} finished with partial {partial}");
        Ok(ctx.finish())
    }

    /// Run groups `0..group_count` on `engine`
    ///
    /// `group_count` is a launch parameter; use
    /// [`LaunchConfig::group_count`] to cover the whole input.
    pub fn launch<E, S>(
        &self,
        engine: &E,
        group_count: usize,
        pool: &ScratchPool<T>,
        sink: &S,
    ) -> Result<LaunchStats>
    where
        E: ExecutionEngine,
        S: PartialSink<T> + ?Sized,
    {
        debug!(
            "launching {} reduction over {} {} elements: {} groups of {} ({:?}, {:?} load)",
            self.op.kind(),
            self.input.len(),
            T::NAME,
            group_count,
            self.config.group_size,
            self.config.strategy,
            self.config.load,
        );

        engine.map_reduce(
            group_count,
            |group| self.run_group(group, pool, sink).map(LaunchStats::from_group),
            || Ok(LaunchStats::default()),
            |a: Result<LaunchStats>, b: Result<LaunchStats>| Ok(a?.merge(b?)),
        )
    }
}
