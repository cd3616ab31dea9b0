//! AVX2 reference backend
//!
//! Accelerates the reference `sum` with 256-bit lanes; everything else uses
//! the trait's scalar defaults.

#[cfg(all(target_arch = "x86_64", feature = "avx2"))]
mod sum;

use crate::primitives::ComputePrimitives;
use crate::{Element, Error, Result};

/// AVX2 backend for x86_64 processors
#[derive(Clone, Copy, Debug)]
pub struct Avx2Backend {
    _verified: (),
}

impl Avx2Backend {
    /// Create a new AVX2 backend
    ///
    /// Fails if the crate was built without the `avx2` feature or the CPU
    /// doesn't support AVX2 instructions.
    pub fn new() -> Result<Self> {
        if Self::is_available() {
            Ok(Self { _verified: () })
        } else if cfg!(all(target_arch = "x86_64", feature = "avx2")) {
            Err(Error::FeatureNotAvailable(
                "AVX2 backend requested but CPU doesn't support AVX2 instructions".to_string(),
            ))
        } else {
            Err(Error::FeatureNotAvailable(
                "AVX2 backend not available: not compiled with AVX2 support".to_string(),
            ))
        }
    }

    /// Check if AVX2 is available on this CPU
    pub fn is_available() -> bool {
        #[cfg(all(target_arch = "x86_64", feature = "avx2"))]
        {
            is_x86_feature_detected!("avx2")
        }
        #[cfg(not(all(target_arch = "x86_64", feature = "avx2")))]
        {
            false
        }
    }
}

#[cfg(all(target_arch = "x86_64", feature = "avx2"))]
impl<T> ComputePrimitives<T> for Avx2Backend
where
    T: Element + sum::Avx2Sum,
{
    fn backend_name(&self) -> &'static str {
        "avx2"
    }

    fn simd_width(&self) -> usize {
        T::LANES
    }

    fn sum(&self, data: &[T]) -> f64 {
        // Safety: an Avx2Backend only exists once CPU support was checked in new()
        unsafe { T::sum_avx2(data) }
    }
}

// Fallback for non-AVX2 builds; new() never succeeds here.
#[cfg(not(all(target_arch = "x86_64", feature = "avx2")))]
impl<T: Element> ComputePrimitives<T> for Avx2Backend {
    fn backend_name(&self) -> &'static str {
        "avx2 (unavailable)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_availability_is_consistent() {
        assert_eq!(Avx2Backend::new().is_ok(), Avx2Backend::is_available());
    }

    #[cfg(all(target_arch = "x86_64", feature = "avx2"))]
    #[test]
    fn test_avx2_sum_matches_scalar_with_remainder() {
        use crate::primitives::ScalarBackend;

        let Ok(backend) = Avx2Backend::new() else {
            return;
        };
        for len in [0usize, 1, 3, 4, 7, 8, 9, 31, 100] {
            let data64: Vec<f64> = (0..len).map(|i| i as f64 - 3.0).collect();
            let data32: Vec<f32> = data64.iter().map(|&x| x as f32).collect();
            assert_eq!(backend.sum(data64.as_slice()), ScalarBackend.sum(data64.as_slice()));
            assert_eq!(backend.sum(data32.as_slice()), ScalarBackend.sum(data32.as_slice()));
        }
    }
}
