//! Element types that can live in accelerator-visible memory
//!
//! This module provides the type foundation for the reduction: the real
//! number types the input buffer may hold (single or double precision, a
//! compile-time choice) and the atomic cell each one is stored in when it
//! acts as the shared cross-group accumulator.
//!
//! # Design
//!
//! - **Pure type constraints**: `Element` says what a lane register can hold
//! - **Bit-cast atomics**: floats are stored as their IEEE bits in an
//!   `AtomicU32`/`AtomicU64`, and every read-modify-write is a single
//!   compare-and-swap loop, so no lock is ever taken

use bytemuck::Pod;
use num_traits::Float;
use std::fmt::{Debug, Display};
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Atomic storage for one element
///
/// Mutation only happens through `store_value` and `fetch_combine`; there is
/// no plain read-modify-write path.
pub trait AtomicElement<T>: Send + Sync + Debug {
    /// Create a cell holding `value`
    fn from_value(value: T) -> Self;

    /// Read the current value
    fn load_value(&self) -> T;

    /// Overwrite the current value
    fn store_value(&self, value: T);

    /// Indivisibly replace the current value `v` with `f(v)`
    ///
    /// Returns the value observed immediately before the update. `f` may be
    /// invoked more than once under contention and must be pure.
    fn fetch_combine<F: FnMut(T) -> T>(&self, f: F) -> T;
}

/// Real number type usable as an input element and lane register
pub trait Element: Pod + Float + Debug + Display + Default + Send + Sync + 'static {
    /// Atomic cell used for the global accumulator
    type Atomic: AtomicElement<Self>;

    /// Human readable type name
    const NAME: &'static str;

    /// Convert from f64 (for creating constants)
    fn from_f64(val: f64) -> Self;

    /// Widen to f64 (for reference comparisons)
    fn as_f64(self) -> f64;
}

macro_rules! impl_element {
    ($float:ty, $atomic:ty, $name:literal) => {
        impl AtomicElement<$float> for $atomic {
            #[inline]
            fn from_value(value: $float) -> Self {
                <$atomic>::new(value.to_bits())
            }

            #[inline]
            fn load_value(&self) -> $float {
                <$float>::from_bits(self.load(Ordering::Acquire))
            }

            #[inline]
            fn store_value(&self, value: $float) {
                self.store(value.to_bits(), Ordering::Release)
            }

            #[inline]
            fn fetch_combine<F: FnMut($float) -> $float>(&self, mut f: F) -> $float {
                let previous = self.fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                    Some(f(<$float>::from_bits(bits)).to_bits())
                });
                match previous {
                    Ok(bits) | Err(bits) => <$float>::from_bits(bits),
                }
            }
        }

        impl Element for $float {
            type Atomic = $atomic;

            const NAME: &'static str = $name;

            #[inline]
            fn from_f64(val: f64) -> Self {
                val as $float
            }

            #[inline]
            fn as_f64(self) -> f64 {
                self as f64
            }
        }
    };
}

impl_element!(f32, AtomicU32, "f32");
impl_element!(f64, AtomicU64, "f64");
