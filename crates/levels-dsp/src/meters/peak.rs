// SPDX-License-Identifier: LGPL-3.0-or-later

//! Block peak tracker with instant attack and exponential decay.
//!
//! Tracks the absolute sample peak of a signal at block (display tick)
//! cadence. A block whose peak exceeds the decayed running value is
//! adopted immediately; otherwise the running value decays exponentially
//! toward a strictly positive floor, so the subsequent logarithm is
//! always finite.
//!
//! # Examples
//!
//! ```
//! use levels_dsp::meters::peak::PeakTracker;
//!
//! let mut tracker = PeakTracker::new(0.025, 0.025);
//! tracker.track(&[0.1, -0.8, 0.3]);
//! assert_eq!(tracker.peak(), 0.8);
//! ```

use crate::consts::{PEAK_AMP_FLOOR, RECENT_ENERGY_FRACTION};

/// Peak tracker for one channel.
#[derive(Debug, Clone)]
pub struct PeakTracker {
    /// Running peak magnitude, always >= the amplitude floor.
    peak: f32,
    /// Per-block decay coefficient.
    decay_alpha: f32,
}

impl PeakTracker {
    /// Create a peak tracker.
    ///
    /// The decay coefficient is derived from the peak response time and
    /// the block (tick) period with the same recency-fraction formula the
    /// RMS smoother uses: `alpha = 1 - (1-w)^(1/(n+1))` with
    /// `n = response_time / tick_period` blocks.
    ///
    /// # Arguments
    /// * `response_time` - Peak release response time in seconds
    /// * `tick_period` - Block/tick period in seconds
    pub fn new(response_time: f32, tick_period: f32) -> Self {
        let n = (response_time as f64) / (tick_period as f64);
        let w = RECENT_ENERGY_FRACTION as f64;
        let decay_alpha = 1.0 - (1.0 - w).powf(1.0 / (n + 1.0));

        Self {
            peak: PEAK_AMP_FLOOR,
            decay_alpha: decay_alpha as f32,
        }
    }

    /// Per-block decay coefficient.
    pub fn decay_alpha(&self) -> f32 {
        self.decay_alpha
    }

    /// Update the tracker with one block of samples and return the new
    /// peak.
    ///
    /// Attack is instantaneous: a block peak above the decayed running
    /// value replaces it exactly. Otherwise the running value decays by
    /// one block's worth. An empty block also decays one block's worth --
    /// the meter keeps falling during a data gap instead of freezing or
    /// dropping to zero.
    pub fn track(&mut self, samples: &[f32]) -> f32 {
        let decayed = (self.peak * (1.0 - self.decay_alpha)).max(PEAK_AMP_FLOOR);

        let block_peak = samples.iter().fold(0.0f32, |m, &x| m.max(x.abs()));
        if !samples.is_empty() && block_peak > decayed {
            self.peak = block_peak;
        } else {
            self.peak = decayed;
        }
        self.peak
    }

    /// Current peak magnitude (linear amplitude).
    pub fn peak(&self) -> f32 {
        self.peak
    }

    /// Reset the running peak to the amplitude floor.
    pub fn reset(&mut self) {
        self.peak = PEAK_AMP_FLOOR;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK_S: f32 = 0.025;

    fn make_tracker() -> PeakTracker {
        PeakTracker::new(0.025, TICK_S)
    }

    #[test]
    fn test_decay_alpha_formula() {
        // n = 1 block, so alpha = 1 - 0.35^(1/2).
        let tracker = make_tracker();
        let expected = 1.0 - 0.35f64.sqrt();
        assert!(
            (tracker.decay_alpha() as f64 - expected).abs() < 1e-7,
            "decay alpha should be {expected}, got {}",
            tracker.decay_alpha()
        );
    }

    #[test]
    fn test_instant_attack_is_exact() {
        let mut tracker = make_tracker();
        tracker.track(&[0.2]);
        let new_peak = tracker.track(&[0.1, -0.9, 0.5]);
        assert_eq!(
            new_peak, 0.9,
            "A louder block peak must be adopted exactly"
        );
    }

    #[test]
    fn test_negative_peak_detected() {
        let mut tracker = make_tracker();
        tracker.track(&[-0.7, 0.3]);
        assert_eq!(tracker.peak(), 0.7);
    }

    #[test]
    fn test_decay_on_quiet_block() {
        let mut tracker = make_tracker();
        tracker.track(&[1.0]);
        let one_minus = 1.0 - tracker.decay_alpha();
        let decayed = tracker.track(&[0.0]);
        assert!(
            (decayed - one_minus).abs() < 1e-7,
            "One quiet block should decay by (1 - alpha): expected {one_minus}, got {decayed}"
        );
    }

    #[test]
    fn test_decay_monotone_never_zero() {
        let mut tracker = make_tracker();
        tracker.track(&[1.0]);
        let mut prev = tracker.peak();
        for _ in 0..10_000 {
            let current = tracker.track(&[0.0]);
            assert!(
                current <= prev,
                "Decay must be monotone non-increasing: {prev} then {current}"
            );
            assert!(current > 0.0, "Peak must never reach exactly zero");
            prev = current;
        }
        assert_eq!(
            prev, PEAK_AMP_FLOOR,
            "Long silence should settle at the amplitude floor"
        );
    }

    #[test]
    fn test_empty_block_decays_one_tick() {
        let mut tracker = make_tracker();
        tracker.track(&[1.0]);
        let expected = 1.0 - tracker.decay_alpha();
        let after_gap = tracker.track(&[]);
        assert!(
            (after_gap - expected).abs() < 1e-7,
            "A data gap should decay one tick's worth: expected {expected}, got {after_gap}"
        );
    }

    #[test]
    fn test_attack_threshold_boundary() {
        // A block peak below old * (1 - alpha) must not be adopted.
        let mut tracker = make_tracker();
        tracker.track(&[1.0]);
        let decayed = 1.0 - tracker.decay_alpha();
        let below = decayed - 1e-3;
        let peak = tracker.track(&[below]);
        assert!(
            (peak - decayed).abs() < 1e-7,
            "A sub-threshold block should leave the decayed value: expected {decayed}, got {peak}"
        );
    }

    #[test]
    fn test_slower_response_decays_slower() {
        let mut fast = PeakTracker::new(0.025, TICK_S);
        let mut slow = PeakTracker::new(0.250, TICK_S);
        fast.track(&[1.0]);
        slow.track(&[1.0]);
        for _ in 0..20 {
            fast.track(&[0.0]);
            slow.track(&[0.0]);
        }
        assert!(
            slow.peak() > fast.peak(),
            "Longer response time should release slower: slow={}, fast={}",
            slow.peak(),
            fast.peak()
        );
    }

    #[test]
    fn test_reset() {
        let mut tracker = make_tracker();
        tracker.track(&[0.9]);
        tracker.reset();
        assert_eq!(tracker.peak(), PEAK_AMP_FLOOR);
    }
}
