// SPDX-License-Identifier: LGPL-3.0-or-later

//! Exponential level smoothing via a finite convolution kernel.
//!
//! Models the single-pole IIR smoother
//!
//! ```text
//! s_i = alpha * x_i + (1 - alpha) * s_{i-1}
//! ```
//!
//! but evaluates it as an explicit finite sum over a precomputed kernel of
//! decay weights, so the result is deterministic for any block-size split
//! of the same stream and warm-up requires no special casing. `alpha` is
//! chosen so that the `n` most recent samples carry a fixed fraction `w`
//! of the output energy:
//!
//! ```text
//! alpha = 1 - (1 - w)^(1 / (n + 1)),    n = response_time * sample_rate
//! ```
//!
//! The kernel holds the last `5n` weights `(1-alpha)^k` in stream order
//! (oldest first); anything older has decayed to insignificance and the
//! previous smoothed value substitutes for it exactly.
//!
//! # Examples
//!
//! ```
//! use levels_dsp::meters::smoother::SmoothingKernel;
//!
//! let kernel = SmoothingKernel::new(0.300, 48000.0);
//! let squared = vec![0.25f32; 1200];
//! let mut rms = 0.0f32;
//! for _ in 0..200 {
//!     rms = kernel.smoothed_value(&squared, rms);
//! }
//! assert!((rms - 0.25).abs() < 0.01);
//! ```

use crate::consts::{KERNEL_LENGTH_FACTOR, RECENT_ENERGY_FRACTION};

/// Exponential smoothing kernel, shared by all channels of an engine.
///
/// Immutable after construction; the per-channel state is the single
/// previous smoothed value threaded through [`smoothed_value`].
///
/// [`smoothed_value`]: SmoothingKernel::smoothed_value
#[derive(Debug, Clone)]
pub struct SmoothingKernel {
    alpha: f32,
    /// Decay weights in stream order: kernel[i] = (1-alpha)^(len-1-i),
    /// so the newest sample is weighted 1.0.
    kernel: Vec<f32>,
}

impl SmoothingKernel {
    /// Build the kernel for a response time and sample rate.
    ///
    /// # Arguments
    /// * `response_time` - Smoothing response time in seconds
    /// * `sample_rate` - Sample rate in Hz
    ///
    /// # Panics
    ///
    /// Panics if `response_time` or `sample_rate` is not positive.
    pub fn new(response_time: f32, sample_rate: f32) -> Self {
        assert!(
            response_time > 0.0 && sample_rate > 0.0,
            "response time and sample rate must be positive"
        );

        let n = (response_time as f64) * (sample_rate as f64);
        let w = RECENT_ENERGY_FRACTION as f64;
        let alpha = 1.0 - (1.0 - w).powf(1.0 / (n + 1.0));

        let len = ((n * KERNEL_LENGTH_FACTOR as f64) as usize).max(1);
        let one_minus_alpha = 1.0 - alpha;
        let kernel = (0..len)
            .map(|i| one_minus_alpha.powi((len - 1 - i) as i32) as f32)
            .collect();

        Self {
            alpha: alpha as f32,
            kernel,
        }
    }

    /// Smoothing coefficient alpha.
    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    /// Kernel length in samples (`5n`).
    pub fn len(&self) -> usize {
        self.kernel.len()
    }

    /// Whether the kernel is empty (never true for a constructed kernel).
    pub fn is_empty(&self) -> bool {
        self.kernel.is_empty()
    }

    /// Advance the smoothed mean-square value by one block of squared
    /// samples.
    ///
    /// An empty block represents zero elapsed samples and returns
    /// `previous` unchanged. A block longer than the kernel uses only the
    /// most recent kernel-length samples; the previous value has fully
    /// decayed out by then. The result is non-negative whenever the inputs
    /// are.
    ///
    /// # Arguments
    /// * `squared` - Block of squared sample values
    /// * `previous` - Previous smoothed value for this channel
    ///
    /// # Returns
    /// The new smoothed value
    pub fn smoothed_value(&self, squared: &[f32], previous: f32) -> f32 {
        let n = squared.len();
        if n == 0 {
            return previous;
        }

        let nk = self.kernel.len();
        let alpha = self.alpha as f64;
        let one_minus_alpha = 1.0 - alpha;

        if n <= nk {
            let weights = &self.kernel[nk - n..];
            let sum: f64 = weights
                .iter()
                .zip(squared)
                .map(|(&k, &x)| (k as f64) * (x as f64))
                .sum();
            let decayed = (previous as f64) * one_minus_alpha.powi(n as i32);
            (alpha * sum + decayed) as f32
        } else {
            let recent = &squared[n - nk..];
            let sum: f64 = self
                .kernel
                .iter()
                .zip(recent)
                .map(|(&k, &x)| (k as f64) * (x as f64))
                .sum();
            (alpha * sum) as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;
    const RESPONSE: f32 = 0.300;

    fn make_kernel() -> SmoothingKernel {
        SmoothingKernel::new(RESPONSE, SR)
    }

    #[test]
    fn test_construction() {
        let kernel = make_kernel();
        let n = RESPONSE * SR;
        assert_eq!(kernel.len(), (n as usize) * 5);
        assert!(kernel.alpha() > 0.0 && kernel.alpha() < 1.0);
        assert!(!kernel.is_empty());
    }

    #[test]
    fn test_alpha_formula() {
        let kernel = make_kernel();
        let n = (RESPONSE * SR) as f64;
        let expected = 1.0 - 0.35_f64.powf(1.0 / (n + 1.0));
        assert!(
            (kernel.alpha() as f64 - expected).abs() < 1e-9,
            "alpha should be {expected}, got {}",
            kernel.alpha()
        );
    }

    #[test]
    fn test_kernel_weights_increase_toward_newest() {
        let kernel = make_kernel();
        for pair in kernel.kernel.windows(2) {
            assert!(
                pair[0] <= pair[1],
                "Kernel weights must grow toward the newest sample"
            );
        }
        let last = *kernel.kernel.last().unwrap();
        assert!(
            (last - 1.0).abs() < 1e-7,
            "Newest weight should be 1.0, got {last}"
        );
    }

    #[test]
    fn test_empty_block_returns_previous() {
        let kernel = make_kernel();
        assert_eq!(kernel.smoothed_value(&[], 0.42), 0.42);
    }

    #[test]
    fn test_result_non_negative() {
        let kernel = make_kernel();
        let squared = vec![0.0f32; 1200];
        let value = kernel.smoothed_value(&squared, 0.0);
        assert!(value >= 0.0);
    }

    #[test]
    fn test_converges_to_constant_input() {
        // Feeding constant squared amplitude must converge to that value.
        let kernel = make_kernel();
        let squared = vec![0.25f32; 1200];
        let mut value = 0.0f32;
        // 300 blocks of 25 ms = 7.5 s, far beyond the 300 ms response.
        for _ in 0..300 {
            value = kernel.smoothed_value(&squared, value);
        }
        assert!(
            (value - 0.25).abs() < 0.005,
            "Smoothed value should converge to 0.25, got {value}"
        );
    }

    #[test]
    fn test_convergence_is_monotone_from_below() {
        let kernel = make_kernel();
        let squared = vec![0.5f32; 1200];
        let mut value = 0.0f32;
        for _ in 0..100 {
            let next = kernel.smoothed_value(&squared, value);
            assert!(
                next >= value,
                "Rising input should give monotone convergence: {value} then {next}"
            );
            value = next;
        }
    }

    #[test]
    fn test_block_size_invariance() {
        // One call with 2400 samples must match two calls with 1200 each.
        let kernel = make_kernel();
        let squared: Vec<f32> = (0..2400).map(|i| ((i % 7) as f32) * 0.01).collect();

        let whole = kernel.smoothed_value(&squared, 0.1);

        let half = kernel.smoothed_value(&squared[..1200], 0.1);
        let split = kernel.smoothed_value(&squared[1200..], half);

        assert!(
            (whole - split).abs() < 1e-6,
            "Block-size split should not change the result: {whole} vs {split}"
        );
    }

    #[test]
    fn test_previous_value_decays() {
        let kernel = make_kernel();
        let silence = vec![0.0f32; 1200];
        let mut value = 1.0f32;
        for _ in 0..10 {
            let next = kernel.smoothed_value(&silence, value);
            assert!(
                next < value,
                "Silence should decay the smoothed value: {value} then {next}"
            );
            value = next;
        }
        assert!(value > 0.0, "Decay never reaches exactly zero");
    }

    #[test]
    fn test_oversized_block_uses_recent_tail() {
        // A block longer than the kernel discards the previous value and
        // everything older than the kernel window.
        let kernel = SmoothingKernel::new(0.001, 1000.0); // tiny kernel (5 samples)
        assert_eq!(kernel.len(), 5);

        let mut squared = vec![100.0f32; 20];
        let tail = [0.1f32, 0.1, 0.1, 0.1, 0.1];
        squared.extend_from_slice(&tail);

        let with_history = kernel.smoothed_value(&squared, 1e6);
        let tail_only = kernel.smoothed_value(&tail, 0.0);
        assert!(
            (with_history - tail_only).abs() < 1e-6,
            "Only the kernel-length tail should matter: {with_history} vs {tail_only}"
        );
    }

    #[test]
    fn test_short_response_converges_faster() {
        let fast = SmoothingKernel::new(0.025, SR);
        let slow = SmoothingKernel::new(0.300, SR);
        let squared = vec![1.0f32; 1200];

        let fast_value = fast.smoothed_value(&squared, 0.0);
        let slow_value = slow.smoothed_value(&squared, 0.0);
        assert!(
            fast_value > slow_value,
            "Shorter response time should react faster: fast={fast_value}, slow={slow_value}"
        );
    }
}
