//! Launch configuration
//!
//! Everything the caller decides before launching a reduction: threads per
//! group, the hardware lane-group width, which block strategy finishes the
//! intra-group combine, how many elements each thread loads, and how group
//! partials are merged. [`LaunchConfig::validate`] rejects anything the kernel
//! cannot run before a single group is launched.

use serde::{Deserialize, Serialize};
use simt_core::{Error, Result};

use crate::accumulator::FinalCombine;
use crate::load::LoadWidth;
use crate::tree::BlockStrategy;

/// Largest supported threads-per-group
pub const MAX_GROUP_SIZE: usize = 1024;

/// Largest supported lane-group width
pub const MAX_LANE_WIDTH: usize = 64;

/// Threads per group when none is configured
pub const DEFAULT_GROUP_SIZE: usize = 256;

/// Lane-group ("warp") width when none is configured
pub const DEFAULT_LANE_WIDTH: usize = 32;

/// Parameters of one reduction launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchConfig {
    /// Threads per group; a power of two in `1..=MAX_GROUP_SIZE`
    pub group_size: usize,
    /// Width of a lockstep lane-group; a power of two in `1..=MAX_LANE_WIDTH`
    pub lane_width: usize,
    /// How a group combines its threads' values
    pub strategy: BlockStrategy,
    /// Elements loaded per thread
    pub load: LoadWidth,
    /// How group partials are merged into the final value
    pub finalize: FinalCombine,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            group_size: DEFAULT_GROUP_SIZE,
            lane_width: DEFAULT_LANE_WIDTH,
            strategy: BlockStrategy::default(),
            load: LoadWidth::default(),
            finalize: FinalCombine::default(),
        }
    }
}

impl LaunchConfig {
    /// Default configuration with the given group size
    pub fn new(group_size: usize) -> Self {
        Self {
            group_size,
            ..Self::default()
        }
    }

    /// Set the group size
    pub fn with_group_size(mut self, group_size: usize) -> Self {
        self.group_size = group_size;
        self
    }

    /// Set the lane-group width
    pub fn with_lane_width(mut self, lane_width: usize) -> Self {
        self.lane_width = lane_width;
        self
    }

    /// Set the block strategy
    pub fn with_strategy(mut self, strategy: BlockStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the per-thread load width
    pub fn with_load(mut self, load: LoadWidth) -> Self {
        self.load = load;
        self
    }

    /// Set how partials are finalised
    pub fn with_finalize(mut self, finalize: FinalCombine) -> Self {
        self.finalize = finalize;
        self
    }

    /// Reject configurations the kernel cannot run correctly
    pub fn validate(&self) -> Result<()> {
        if self.group_size == 0 || self.group_size > MAX_GROUP_SIZE {
            return Err(Error::out_of_range("group_size", self.group_size, 1, MAX_GROUP_SIZE));
        }
        if !self.group_size.is_power_of_two() {
            return Err(Error::not_power_of_two("group_size", self.group_size));
        }
        if self.lane_width == 0 || self.lane_width > MAX_LANE_WIDTH {
            return Err(Error::out_of_range("lane_width", self.lane_width, 1, MAX_LANE_WIDTH));
        }
        if !self.lane_width.is_power_of_two() {
            return Err(Error::not_power_of_two("lane_width", self.lane_width));
        }
        Ok(())
    }

    /// Lane-group width actually used by a group
    ///
    /// A group smaller than one lane-group is a single, partial lane-group.
    #[inline]
    pub fn effective_lane_width(&self) -> usize {
        self.lane_width.min(self.group_size)
    }

    /// Input elements covered by one group
    #[inline]
    pub fn elements_per_group(&self) -> usize {
        self.group_size * self.load.elements_per_thread()
    }

    /// Groups needed to cover `n` elements: `ceil(n / elements_per_group)`
    #[inline]
    pub fn group_count(&self, n: usize) -> usize {
        n.div_ceil(self.elements_per_group())
    }
}
