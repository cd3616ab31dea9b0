//! Hierarchical parallel reduction on a modelled SIMT accelerator
//!
//! This crate re-exports the workspace members:
//!
//! - [`runtime`]: elements, execution engines, scratch arenas and the CPU
//!   reference reducers
//! - [`kernel`]: the reduction itself and its launch configuration
//!
//! # Example
//!
//! ```rust
//! use simt_reduce::prelude::*;
//!
//! let data: Vec<f64> = (1..=1000).map(f64::from).collect();
//! let reducer = Reducer::new(LaunchConfig::new(128)).unwrap();
//!
//! assert_eq!(reducer.reduce(&data, Sum).unwrap(), 500_500.0);
//! assert_eq!(reducer.reduce(&data, Max).unwrap(), 1000.0);
//! ```

pub use simt_core as runtime;
pub use simt_kernel as kernel;

pub use simt_core::{Element, Error, Result};
pub use simt_kernel::{
    check_sum, max, min, reduce, sum, BlockStrategy, FinalCombine, LaunchConfig, LoadWidth,
    ReduceKind, ReduceOp, Reducer, Reduction,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use simt_core::prelude::*;
    pub use simt_kernel::prelude::*;
}
