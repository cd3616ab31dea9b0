//! Shared utilities for integration tests

#![allow(dead_code)]

pub use approx::assert_relative_eq;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Input lengths around group and lane-group boundaries
pub const BOUNDARY_LENGTHS: [usize; 7] = [0, 1, 127, 128, 129, 2048, 2048 * 7 + 3];

/// Every supported group size from one lane-group up to the hardware maximum
pub const GROUP_SIZES: [usize; 6] = [32, 64, 128, 256, 512, 1024];

/// Uniform data in `[min, max)` from a fixed seed
pub fn uniform_f32(n: usize, min: f32, max: f32, seed: u64) -> Vec<f32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(min..max)).collect()
}

/// Uniform data in `[min, max)` from a fixed seed
pub fn uniform_f64(n: usize, min: f64, max: f64, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(min..max)).collect()
}

/// The `valid` elements followed by `padding` NaN slots
pub fn nan_padded(valid: &[f32], padding: usize) -> Vec<f32> {
    let mut buffer = valid.to_vec();
    buffer.resize(valid.len() + padding, f32::NAN);
    buffer
}
