//! CPU reference reducers with compile-time backend dispatch
//!
//! This module provides the independently implemented, sequential reductions
//! the parallel kernel is validated against.
//!
//! # Architecture
//!
//! - Single `ComputePrimitives<T>` trait for all operations
//! - Concrete backend types: `ScalarBackend`, `Avx2Backend`
//! - Compile-time backend selection with runtime validation
//!
//! # Usage
//!
//! ```rust
//! use simt_core::{best_available_backend, ComputePrimitives};
//!
//! let backend = best_available_backend::<f64>().unwrap();
//! assert_eq!(backend.sum(&[1.0, 2.0, 3.0]), 6.0);
//! ```

pub mod backends;
pub mod traits;

pub use backends::{best_available_backend, Avx2Backend, ScalarBackend, SelectBackend};
pub use traits::ComputePrimitives;

/// Create a scalar backend (always available)
pub fn scalar_backend() -> ScalarBackend {
    ScalarBackend::new()
}

/// Get the best available backend name
pub fn best_backend_name() -> &'static str {
    #[cfg(all(target_arch = "x86_64", feature = "avx2"))]
    {
        if Avx2Backend::is_available() {
            return "avx2";
        }
    }
    "scalar"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_reference_sum() {
        let backend = scalar_backend();
        let data = [1.0f64, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        assert_eq!(backend.sum(&data), 36.0);
        assert_eq!(backend.sum(&[] as &[f64]), 0.0);
        assert_eq!(backend.sum_abs(&[-1.0f32, 2.0, -3.0]), 6.0);
    }

    #[test]
    fn test_scalar_reference_extrema() {
        let backend = scalar_backend();
        let data = [3.0f32, -7.5, 12.25, 0.0];
        assert_eq!(backend.max(&data), Some(12.25));
        assert_eq!(backend.min(&data), Some(-7.5));
        assert_eq!(backend.max(&[] as &[f32]), None);
    }

    #[test]
    fn test_f32_sum_is_widened() {
        let backend = scalar_backend();
        // 2^24 + 1 is not representable in f32, but the f64 accumulator keeps it.
        let data = [16_777_216.0f32, 1.0];
        assert_eq!(backend.sum(&data), 16_777_217.0);
    }

    #[test]
    fn test_best_backend_matches_name() {
        let backend = best_available_backend::<f64>().unwrap();
        let name = ComputePrimitives::<f64>::backend_name(&backend);
        assert!(name.starts_with(best_backend_name()));
        let data: Vec<f64> = (0..37).map(|i| i as f64 * 0.5).collect();
        assert_eq!(backend.sum(&data), scalar_backend().sum(&data));
    }
}
