//! Concrete reference backends
//!
//! No Box, no dyn, just simple types with compile-time dispatch.

pub mod avx2;
pub mod scalar;

pub use avx2::Avx2Backend;
pub use scalar::ScalarBackend;

use super::ComputePrimitives;
use crate::{Element, Result};

/// Backend selection trait for automatic backend choice
pub trait SelectBackend: Element {
    /// The backend type to use for this element type
    type Backend: ComputePrimitives<Self>;

    /// Get an instance of the backend
    ///
    /// Fails when the build selected a SIMD backend the running CPU lacks.
    fn backend() -> Result<Self::Backend>;
}

macro_rules! impl_select_backend {
    ($type:ty) => {
        impl SelectBackend for $type {
            #[cfg(all(target_arch = "x86_64", feature = "avx2"))]
            type Backend = Avx2Backend;

            #[cfg(not(all(target_arch = "x86_64", feature = "avx2")))]
            type Backend = ScalarBackend;

            fn backend() -> Result<Self::Backend> {
                #[cfg(all(target_arch = "x86_64", feature = "avx2"))]
                {
                    Avx2Backend::new()
                }
                #[cfg(not(all(target_arch = "x86_64", feature = "avx2")))]
                {
                    Ok(ScalarBackend)
                }
            }
        }
    };
}

impl_select_backend!(f32);
impl_select_backend!(f64);

/// Get the best available backend for the current platform
pub fn best_available_backend<T: SelectBackend>() -> Result<T::Backend> {
    T::backend()
}
