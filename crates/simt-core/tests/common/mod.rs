//! Shared utilities for integration tests

pub use approx::assert_relative_eq;

/// Generate array lengths that test edge cases for chunked and SIMD loops
pub fn edge_case_lengths() -> Vec<usize> {
    vec![
        0,   // Empty
        1,   // Single element
        3,   // Below one AVX2 f64 chunk
        4,   // AVX2 f64 width
        5,   // AVX2 f64 width + 1
        8,   // AVX2 f32 width
        9,   // AVX2 f32 width + 1
        31,  // Prime
        32,  // Lane-group width
        33,  // Lane-group width + 1
        127, // Mersenne prime
        128, // Power of 2
        129, // Power of 2 + 1
    ]
}

/// Generate test data with specific patterns
pub fn generate_test_data(len: usize) -> Vec<f64> {
    (0..len).map(|i| i as f64 + 0.1).collect()
}
