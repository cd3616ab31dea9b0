//! Reference compute primitives trait
//!
//! These are the host-side, non-parallel reductions used to validate the
//! modelled accelerator's output. They share no code path with the kernel.

use crate::numeric::Element;

/// Sequential reductions over a host slice
///
/// Backends (scalar, AVX2) override the operations they accelerate and
/// inherit the straightforward loops for everything else.
pub trait ComputePrimitives<T: Element>: Clone + Send + Sync {
    /// Get the name of this backend
    fn backend_name(&self) -> &'static str;

    /// Get the SIMD width (number of elements processed in parallel)
    fn simd_width(&self) -> usize {
        1
    }

    /// Sum all elements in a slice, accumulating in f64
    fn sum(&self, data: &[T]) -> f64 {
        data.iter().fold(0.0, |acc, &x| acc + x.as_f64())
    }

    /// Sum of absolute values, used to scale comparison tolerances
    fn sum_abs(&self, data: &[T]) -> f64 {
        data.iter().fold(0.0, |acc, &x| acc + x.as_f64().abs())
    }

    /// Find the maximum value, `None` for an empty slice
    ///
    /// NaN elements are skipped unless every element is NaN.
    fn max(&self, data: &[T]) -> Option<T> {
        data.iter().copied().reduce(|a, b| a.max(b))
    }

    /// Find the minimum value, `None` for an empty slice
    fn min(&self, data: &[T]) -> Option<T> {
        data.iter().copied().reduce(|a, b| a.min(b))
    }
}
