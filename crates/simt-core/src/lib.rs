//! Core types for modelling a SIMT accelerator on the host
//!
//! This crate provides the ambient layer the reduction kernel is built on:
//! the element types a device buffer may hold, the engines that schedule
//! independent execution groups, the pooled scratch memory each group owns
//! for its lifetime, and the sequential reference reducers results are
//! validated against.
//!
//! # Architecture Overview
//!
//! 1. **Elements** - `f32`/`f64` with bit-cast atomic storage
//! 2. **Execution Engines** - sequential or Rayon-backed group schedulers
//! 3. **Workspace** - aligned, exclusively owned, recycled scratch buffers
//! 4. **Primitives** - CPU reference reducers (scalar, AVX2)
//!
//! # Example
//!
//! ```rust
//! use simt_core::{auto_engine, ExecutionEngine, ScratchPool};
//!
//! let engine = auto_engine();
//! let pool = ScratchPool::<f32>::new(8);
//!
//! // Every "group" gets its own zeroed scratch buffer.
//! let totals = engine.execute_batch(4, |group| {
//!     let mut scratch = pool.checkout(32).unwrap();
//!     scratch.fill(group as f32);
//!     scratch.iter().sum::<f32>()
//! });
//! assert_eq!(totals, vec![0.0, 32.0, 64.0, 96.0]);
//! ```

pub mod error;
pub mod execution;
pub mod numeric;
pub mod primitives;
pub mod workspace;

// Re-export core types
pub use error::{Error, Result};

pub use execution::{
    auto_engine, sequential, DefaultEngine, ExecutionEngine, ExecutionStrategy, SequentialEngine,
};
#[cfg(feature = "parallel")]
pub use execution::{parallel, ParallelEngine};

pub use primitives::{
    best_available_backend, best_backend_name, scalar_backend, Avx2Backend, ComputePrimitives,
    ScalarBackend, SelectBackend,
};

pub use numeric::{AtomicElement, Element};

pub use workspace::{PoolStats, ScratchGuard, ScratchPool, SharedMemory, CACHE_LINE};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        AtomicElement, ComputePrimitives, Element, ExecutionEngine, ExecutionStrategy, Result,
        ScalarBackend, ScratchPool, SequentialEngine,
    };

    pub use crate::error::Error;

    #[cfg(feature = "parallel")]
    pub use crate::execution::{parallel, ParallelEngine};
    pub use crate::execution::{auto_engine, sequential};
}
