//! Comparison against the sequential CPU reference
//!
//! The parallel sum combines values in a different order from a sequential
//! loop, so the two agree only up to rounding. The accepted error grows with
//! the input length and the magnitude of its elements. Extrema are exact.

use log::warn;
use num_traits::Float;
use simt_core::{ComputePrimitives, Error, Result, SelectBackend};

use crate::op::ReduceKind;

/// Outcome of comparing a parallel result with the reference
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceCheck {
    pub expected: f64,
    pub actual: f64,
    pub tolerance: f64,
}

impl ReferenceCheck {
    /// Absolute difference between the two results
    pub fn error(&self) -> f64 {
        (self.expected - self.actual).abs()
    }

    /// True when `actual` is within `tolerance` of `expected`
    ///
    /// Equal infinities pass; NaN never does.
    pub fn passed(&self) -> bool {
        self.expected == self.actual || self.error() <= self.tolerance
    }
}

/// Rounding bound for a sum of `input` in any association order
///
/// `4 * n * eps * sum(|x|)`, floored at the smallest positive normal value so
/// an all-zero input still has a non-zero bound.
pub fn sum_tolerance<T: SelectBackend>(input: &[T]) -> Result<f64> {
    let backend = T::backend()?;
    let magnitude = backend.sum_abs(input);
    let eps = <T as Float>::epsilon().as_f64();
    Ok((4.0 * input.len() as f64 * eps * magnitude).max(f64::MIN_POSITIVE))
}

/// Compare a parallel sum with the reference sum
pub fn check_sum<T: SelectBackend>(input: &[T], actual: T) -> Result<ReferenceCheck> {
    let backend = T::backend()?;
    let check = ReferenceCheck {
        expected: backend.sum(input),
        actual: actual.as_f64(),
        tolerance: sum_tolerance(input)?,
    };
    report(ReduceKind::Sum, &check, input.len());
    Ok(check)
}

/// Compare a parallel maximum or minimum with the reference
///
/// The reference of an empty input is the operator's identity.
pub fn check_extremum<T: SelectBackend>(input: &[T], kind: ReduceKind, actual: T) -> Result<ReferenceCheck> {
    let backend = T::backend()?;
    let expected = match kind {
        ReduceKind::Max => backend.max(input).unwrap_or_else(T::neg_infinity),
        ReduceKind::Min => backend.min(input).unwrap_or_else(T::infinity),
        ReduceKind::Sum => {
            return Err(Error::InvalidParameter(
                "check_extremum expects max or min, use check_sum".to_string(),
            ))
        }
    };
    let check = ReferenceCheck {
        expected: expected.as_f64(),
        actual: actual.as_f64(),
        tolerance: 0.0,
    };
    report(kind, &check, input.len());
    Ok(check)
}

/// Compare a parallel result of any kind with the reference
pub fn check<T: SelectBackend>(input: &[T], kind: ReduceKind, actual: T) -> Result<ReferenceCheck> {
    match kind {
        ReduceKind::Sum => check_sum(input, actual),
        ReduceKind::Max | ReduceKind::Min => check_extremum(input, kind, actual),
    }
}

fn report(kind: ReduceKind, check: &ReferenceCheck, n: usize) {
    if !check.passed() {
        warn!(
            "{kind} over {n} elements differs from reference: expected {}, got {} (error {:e}, tolerance {:e})",
            check.expected,
            check.actual,
            check.error(),
            check.tolerance
        );
    }
}
