// SPDX-License-Identifier: LGPL-3.0-or-later

//! A-weighting filter per IEC 61672.
//!
//! Applies the A-weighting loudness curve to raw samples as a cascade of
//! three biquads (second-order sections), designed once for the configured
//! sample rate via bilinear transform of the analog prototype. Filter state
//! persists across blocks so a continuous stream can be processed in
//! arbitrary block sizes.
//!
//! # Examples
//!
//! ```
//! use levels_dsp::filters::weighting::AWeightingFilter;
//!
//! let mut filter = AWeightingFilter::new(48000.0);
//! let mut block: Vec<f32> = (0..4800)
//!     .map(|i| (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / 48000.0).sin())
//!     .collect();
//! filter.process(&mut block);
//! ```

/// Analog prototype pole frequencies in Hz (IEC 61672).
const F1_HZ: f64 = 20.598997;
const F2_HZ: f64 = 107.65265;
const F3_HZ: f64 = 737.86223;
const F4_HZ: f64 = 12194.217;

/// Normalization gain in dB so the curve is 0 dB at 1 kHz.
const A1000_DB: f64 = 1.9997;

/// Number of second-order sections in the cascade.
const SECTIONS: usize = 3;

/// Biquad filter section with persistent state.
///
/// Coefficients use the pre-negated convention for a1/a2, so the
/// difference equation is:
///   y = b0*x + d0
///   d0 = b1*x + a1*y + d1
///   d1 = b2*x + a2*y
#[derive(Debug, Clone)]
struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,
    d0: f32,
    d1: f32,
}

impl Biquad {
    fn new(b0: f32, b1: f32, b2: f32, a1: f32, a2: f32) -> Self {
        Self {
            b0,
            b1,
            b2,
            a1,
            a2,
            d0: 0.0,
            d1: 0.0,
        }
    }

    /// Process a single sample through the biquad.
    #[inline]
    fn process(&mut self, x: f32) -> f32 {
        let y = self.b0 * x + self.d0;
        let p1 = self.b1 * x + self.a1 * y;
        let p2 = self.b2 * x + self.a2 * y;
        self.d0 = self.d1 + p1;
        self.d1 = p2;
        y
    }

    /// Reset the filter state.
    fn reset(&mut self) {
        self.d0 = 0.0;
        self.d1 = 0.0;
    }
}

/// First-order digital filter factor from the bilinear transform,
/// H(z) = (b0 + b1*z^-1) / (1 + a1*z^-1). Design-time only.
struct FirstOrder {
    b0: f64,
    b1: f64,
    a1: f64,
}

/// Bilinear transform of the analog highpass factor s / (s + w).
///
/// `c` is the bilinear constant 2*fs.
fn bilinear_highpass(w: f64, c: f64) -> FirstOrder {
    let k = c + w;
    FirstOrder {
        b0: c / k,
        b1: -c / k,
        a1: (w - c) / k,
    }
}

/// Bilinear transform of the analog lowpass factor w / (s + w).
fn bilinear_lowpass(w: f64, c: f64) -> FirstOrder {
    let k = c + w;
    FirstOrder {
        b0: w / k,
        b1: w / k,
        a1: (w - c) / k,
    }
}

/// Combine two first-order factors and a scalar gain into one biquad.
fn cascade(f: &FirstOrder, g: &FirstOrder, gain: f64) -> Biquad {
    Biquad::new(
        (gain * f.b0 * g.b0) as f32,
        (gain * (f.b0 * g.b1 + f.b1 * g.b0)) as f32,
        (gain * f.b1 * g.b1) as f32,
        // Pre-negated a1/a2
        (-(f.a1 + g.a1)) as f32,
        (-(f.a1 * g.a1)) as f32,
    )
}

/// Design the A-weighting second-order sections for the given sample rate.
///
/// The analog prototype is
///   H(s) = k * s^4 / ((s+w1)^2 (s+w2) (s+w3) (s+w4)^2)
/// with k chosen for 0 dB at 1 kHz. Each first-order factor is mapped
/// through the bilinear transform and the factors are paired into three
/// biquads: (w1, w1) highpass, (w2, w3) highpass, (w4, w4) lowpass carrying
/// the normalization gain.
fn design_a_weighting(sample_rate: f64) -> [Biquad; SECTIONS] {
    let tau = 2.0 * std::f64::consts::PI;
    let w1 = tau * F1_HZ;
    let w2 = tau * F2_HZ;
    let w3 = tau * F3_HZ;
    let w4 = tau * F4_HZ;
    let c = 2.0 * sample_rate;

    let gain = 10.0_f64.powf(A1000_DB / 20.0);

    let hp1 = bilinear_highpass(w1, c);
    let hp2 = bilinear_highpass(w2, c);
    let hp3 = bilinear_highpass(w3, c);
    let lp4 = bilinear_lowpass(w4, c);

    [
        cascade(&hp1, &hp1, 1.0),
        cascade(&hp2, &hp3, 1.0),
        cascade(&lp4, &lp4, gain),
    ]
}

/// A-weighting filter with persistent per-channel state.
///
/// One instance serves one channel; the biquad states carry across calls
/// for the lifetime of the filter.
#[derive(Debug, Clone)]
pub struct AWeightingFilter {
    sample_rate: f32,
    sections: [Biquad; SECTIONS],
}

impl AWeightingFilter {
    /// Create an A-weighting filter designed for the given sample rate.
    pub fn new(sample_rate: f32) -> Self {
        Self {
            sample_rate,
            sections: design_a_weighting(sample_rate as f64),
        }
    }

    /// Return the configured sample rate in Hz.
    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Minimum block length below which a data-sufficiency warning is due.
    ///
    /// Blocks shorter than the section count still filter correctly, but
    /// the caller should log that the block undershoots the filter length.
    pub fn min_block_len(&self) -> usize {
        SECTIONS
    }

    /// Filter a block of samples in place.
    ///
    /// The filter state is updated and carried into the next call.
    pub fn process(&mut self, samples: &mut [f32]) {
        for sample in samples {
            let mut x = *sample;
            for section in &mut self.sections {
                x = section.process(x);
            }
            *sample = x;
        }
    }

    /// Reset the filter state (initial conditions).
    ///
    /// Only needed on explicit reconfiguration; normal streaming keeps
    /// state across blocks.
    pub fn reset(&mut self) {
        for section in &mut self.sections {
            section.reset();
        }
    }
}
