//! Load stage with boundary guard
//!
//! Every thread produces exactly one register value. Threads whose global
//! index falls past the end of the input contribute the operator's neutral
//! element, so the downstream stages can always combine a full group.

use serde::{Deserialize, Serialize};
use simt_core::Element;

use crate::device::DeviceSlice;
use crate::op::ReduceOp;

/// Number of input elements each thread loads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadWidth {
    /// One element per thread
    #[default]
    Scalar,
    /// Four consecutive elements per thread
    Quad,
}

impl LoadWidth {
    /// Elements consumed by one thread
    #[inline]
    pub const fn elements_per_thread(self) -> usize {
        match self {
            LoadWidth::Scalar => 1,
            LoadWidth::Quad => 4,
        }
    }

    /// Load the register value for global thread `thread`
    #[inline]
    pub fn load<T: Element, O: ReduceOp<T>>(self, input: &DeviceSlice<'_, T>, thread: usize, op: &O) -> T {
        match self {
            LoadWidth::Scalar => load_scalar(input, thread, op),
            LoadWidth::Quad => load_quad(input, thread, op),
        }
    }
}

/// `input[n]` if `n` is in range, the neutral element otherwise
#[inline]
pub fn load_scalar<T: Element, O: ReduceOp<T>>(input: &DeviceSlice<'_, T>, n: usize, op: &O) -> T {
    input.get(n).unwrap_or_else(|| op.identity())
}

/// Combine of the four elements `4 * thread .. 4 * thread + 4`
///
/// Each sub-lane is guarded on its own: a quad straddling the end of the
/// input still contributes its in-range elements.
#[inline]
pub fn load_quad<T: Element, O: ReduceOp<T>>(input: &DeviceSlice<'_, T>, thread: usize, op: &O) -> T {
    let base = thread * 4;
    (base..base + 4)
        .map(|n| load_scalar(input, n, op))
        .fold(op.identity(), |acc, x| op.combine(acc, x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::{Max, Min, Sum};

    #[test]
    fn test_scalar_guard() {
        let data = [5.0f32, 6.0, 7.0];
        let input = DeviceSlice::from(&data[..]);
        assert_eq!(load_scalar(&input, 2, &Sum), 7.0);
        assert_eq!(load_scalar(&input, 3, &Sum), 0.0);
        assert_eq!(load_scalar(&input, 3, &Max), f32::NEG_INFINITY);
        assert_eq!(load_scalar(&input, 100, &Min), f32::INFINITY);
    }

    #[test]
    fn test_quad_guards_each_sub_lane() {
        // Thread 1 covers indices 4..8 of which only 4 and 5 exist.
        let data = [1.0f64, 1.0, 1.0, 1.0, 10.0, 20.0];
        let input = DeviceSlice::from(&data[..]);
        assert_eq!(load_quad(&input, 0, &Sum), 4.0);
        assert_eq!(load_quad(&input, 1, &Sum), 30.0);
        assert_eq!(load_quad(&input, 2, &Sum), 0.0);
        assert_eq!(load_quad(&input, 1, &Max), 20.0);
        assert_eq!(load_quad(&input, 1, &Min), 10.0);
    }

    #[test]
    fn test_padding_never_loaded() {
        let data = [1.0f32, 2.0, 3.0, f32::NAN, f32::NAN];
        let input = DeviceSlice::new(&data, 3).unwrap();
        assert_eq!(LoadWidth::Quad.load(&input, 0, &Sum), 6.0);
        assert_eq!(LoadWidth::Scalar.load(&input, 3, &Sum), 0.0);
    }
}
