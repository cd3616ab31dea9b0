//! Combine operators and their neutral elements
//!
//! The tree, lane-group and cross-group stages are identical for every
//! reduction; only the combine operator and the neutral element substituted
//! for out-of-range lanes change.
//!
//! | Operator | Neutral element | Combine |
//! |----------|-----------------|---------|
//! | `Sum`    | `0`             | `a + b` |
//! | `Max`    | `-inf`          | `max(a, b)` |
//! | `Min`    | `+inf`          | `min(a, b)` |

use num_traits::Float;
use serde::{Deserialize, Serialize};
use simt_core::Element;
use std::fmt;

/// Which reduction an operator performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReduceKind {
    /// Sum: `a + b`
    #[default]
    Sum,
    /// Maximum: `max(a, b)`
    Max,
    /// Minimum: `min(a, b)`
    Min,
}

impl fmt::Display for ReduceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReduceKind::Sum => write!(f, "sum"),
            ReduceKind::Max => write!(f, "max"),
            ReduceKind::Min => write!(f, "min"),
        }
    }
}

/// An associative, commutative combine operator with a neutral element
///
/// `combine(identity(), x) == x` must hold for every `x`, because lanes past
/// the end of the input contribute the identity.
pub trait ReduceOp<T: Element>: Send + Sync {
    /// Which reduction this is
    fn kind(&self) -> ReduceKind;

    /// The neutral element substituted for out-of-range lanes
    fn identity(&self) -> T;

    /// Combine two partial results
    fn combine(&self, a: T, b: T) -> T;
}

impl<T: Element, O: ReduceOp<T> + ?Sized> ReduceOp<T> for &O {
    #[inline]
    fn kind(&self) -> ReduceKind {
        (**self).kind()
    }

    #[inline]
    fn identity(&self) -> T {
        (**self).identity()
    }

    #[inline]
    fn combine(&self, a: T, b: T) -> T {
        (**self).combine(a, b)
    }
}

/// Summation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sum;

/// Maximum
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Max;

/// Minimum
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Min;

impl<T: Element> ReduceOp<T> for Sum {
    #[inline]
    fn kind(&self) -> ReduceKind {
        ReduceKind::Sum
    }

    #[inline]
    fn identity(&self) -> T {
        T::zero()
    }

    #[inline]
    fn combine(&self, a: T, b: T) -> T {
        a + b
    }
}

impl<T: Element> ReduceOp<T> for Max {
    #[inline]
    fn kind(&self) -> ReduceKind {
        ReduceKind::Max
    }

    #[inline]
    fn identity(&self) -> T {
        T::neg_infinity()
    }

    #[inline]
    fn combine(&self, a: T, b: T) -> T {
        Float::max(a, b)
    }
}

impl<T: Element> ReduceOp<T> for Min {
    #[inline]
    fn kind(&self) -> ReduceKind {
        ReduceKind::Min
    }

    #[inline]
    fn identity(&self) -> T {
        T::infinity()
    }

    #[inline]
    fn combine(&self, a: T, b: T) -> T {
        Float::min(a, b)
    }
}

// Runtime-selected operator, for configuration-driven reductions.
impl<T: Element> ReduceOp<T> for ReduceKind {
    #[inline]
    fn kind(&self) -> ReduceKind {
        *self
    }

    #[inline]
    fn identity(&self) -> T {
        match self {
            ReduceKind::Sum => Sum.identity(),
            ReduceKind::Max => Max.identity(),
            ReduceKind::Min => Min.identity(),
        }
    }

    #[inline]
    fn combine(&self, a: T, b: T) -> T {
        match self {
            ReduceKind::Sum => Sum.combine(a, b),
            ReduceKind::Max => Max.combine(a, b),
            ReduceKind::Min => Min.combine(a, b),
        }
    }
}
