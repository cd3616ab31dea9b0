//! AVX2 sum kernels
//!
//! Both precisions accumulate in f64 lanes so results agree with the scalar
//! backend's widened accumulator.

use std::arch::x86_64::*;

/// Element types with an AVX2 sum kernel
pub trait Avx2Sum: Sized {
    /// Elements consumed per 256-bit load
    const LANES: usize;

    /// Sum with AVX2 instructions
    ///
    /// # Safety
    /// The CPU must support AVX2.
    unsafe fn sum_avx2(data: &[Self]) -> f64;
}

impl Avx2Sum for f32 {
    const LANES: usize = 8;

    unsafe fn sum_avx2(data: &[f32]) -> f64 {
        sum_f32(data)
    }
}

impl Avx2Sum for f64 {
    const LANES: usize = 4;

    unsafe fn sum_avx2(data: &[f64]) -> f64 {
        sum_f64(data)
    }
}

#[target_feature(enable = "avx2")]
unsafe fn horizontal(v: __m256d) -> f64 {
    let mut lanes = [0.0f64; 4];
    _mm256_storeu_pd(lanes.as_mut_ptr(), v);
    lanes[0] + lanes[1] + lanes[2] + lanes[3]
}

#[target_feature(enable = "avx2")]
unsafe fn sum_f32(data: &[f32]) -> f64 {
    let chunks = data.len() / 8;
    let mut lo = _mm256_setzero_pd();
    let mut hi = _mm256_setzero_pd();

    // Process 8 elements at a time, widened to two 4 x f64 accumulators
    for i in 0..chunks {
        let v = _mm256_loadu_ps(data.as_ptr().add(i * 8));
        lo = _mm256_add_pd(lo, _mm256_cvtps_pd(_mm256_castps256_ps128(v)));
        hi = _mm256_add_pd(hi, _mm256_cvtps_pd(_mm256_extractf128_ps::<1>(v)));
    }

    let mut sum = horizontal(_mm256_add_pd(lo, hi));
    for &x in &data[chunks * 8..] {
        sum += x as f64;
    }
    sum
}

#[target_feature(enable = "avx2")]
unsafe fn sum_f64(data: &[f64]) -> f64 {
    let chunks = data.len() / 4;
    let mut acc = _mm256_setzero_pd();

    for i in 0..chunks {
        acc = _mm256_add_pd(acc, _mm256_loadu_pd(data.as_ptr().add(i * 4)));
    }

    let mut sum = horizontal(acc);
    for &x in &data[chunks * 4..] {
        sum += x;
    }
    sum
}
