//! Hierarchical parallel reduction on a modelled SIMT accelerator
//!
//! A reduction of `N` elements is launched as `ceil(N / elements_per_group)`
//! independent groups. Inside each group:
//!
//! 1. every lane loads one element (or four) through a boundary guard that
//!    substitutes the operator's neutral element past the end of the input;
//! 2. the lanes combine their values with a halving tree in the group's
//!    staging buffer, switching to barrier-free lane-group rounds (register
//!    shuffles or lane-synchronised steps) once a single lane-group remains;
//! 3. lane 0 merges the group's partial into the shared accumulator with one
//!    atomic read-modify-write.
//!
//! Sum, maximum and minimum share the whole pipeline and differ only in their
//! [`ReduceOp`].
//!
//! # Example
//!
//! ```rust
//! use simt_kernel::{check_sum, sum, BlockStrategy, LaunchConfig, Max, Reducer};
//!
//! let data: Vec<f32> = (0..10_000).map(|i| (i % 100) as f32 * 0.5).collect();
//!
//! let total = sum(&data).unwrap();
//! assert!(check_sum(&data, total).unwrap().passed());
//!
//! let config = LaunchConfig::new(128).with_strategy(BlockStrategy::SharedTree);
//! let reducer = Reducer::new(config).unwrap();
//! assert_eq!(reducer.reduce(&data, Max).unwrap(), 49.5);
//! ```

pub mod accumulator;
pub mod config;
pub mod device;
pub mod group;
pub mod kernel;
pub mod lane;
pub mod load;
pub mod op;
pub mod reducer;
pub mod tree;
pub mod validate;

pub use accumulator::{AtomicSink, FinalCombine, GlobalAccumulator, PartialSink, PartialsBuffer};
pub use config::{
    LaunchConfig, DEFAULT_GROUP_SIZE, DEFAULT_LANE_WIDTH, MAX_GROUP_SIZE, MAX_LANE_WIDTH,
};
pub use device::DeviceSlice;
pub use group::{GroupContext, GroupStats};
pub use kernel::{LaunchStats, ReduceKernel};
pub use lane::{shuffle_distances, LaneGroup};
pub use load::{load_quad, load_scalar, LoadWidth};
pub use op::{Max, Min, ReduceKind, ReduceOp, Sum};
pub use reducer::{max, min, reduce, sum, Reducer, Reduction};
pub use tree::{block_reduce, BlockStrategy};
pub use validate::{check, check_extremum, check_sum, sum_tolerance, ReferenceCheck};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        BlockStrategy, DeviceSlice, FinalCombine, GlobalAccumulator, LaunchConfig, LoadWidth, Max,
        Min, ReduceKind, ReduceOp, Reducer, Reduction, Sum,
    };
    pub use simt_core::{Element, Error, ExecutionEngine, Result};
}
