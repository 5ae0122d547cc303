// SPDX-License-Identifier: LGPL-3.0-or-later

//! Timing, calibration, and numeric-floor constants.
//!
//! This module provides the fixed cadences and calibration offsets of the
//! metering engine, plus the strictly positive floors that keep every
//! logarithm finite.

/// Default sample rate in Hz.
pub const DEFAULT_SAMPLE_RATE: f32 = 48000.0;

/// Display tick period in milliseconds.
pub const TICK_PERIOD_MS: f32 = 25.0;

/// Slow text-label refresh period in milliseconds.
pub const LABEL_PERIOD_MS: f32 = 250.0;

/// RMS smoothing response time in seconds (common VU meter value).
pub const DEFAULT_RESPONSE_TIME_S: f32 = 0.300;

/// Peak tracker response time in seconds (instantaneous peaks).
pub const PEAK_RESPONSE_TIME_S: f32 = 0.025;

/// Fraction of output energy carried by the n most recent samples of the
/// exponential smoother.
pub const RECENT_ENERGY_FRACTION: f32 = 0.65;

/// Smoothing kernel length as a multiple of the response-time sample count.
pub const KERNEL_LENGTH_FACTOR: usize = 5;

/// SPL produced by a 1 kHz calibration tone at the microphone reference
/// sensitivity (dB SPL).
pub const SPL_REFERENCE_DB: f32 = 94.0;

/// Crest-factor correction applied to peak readings in SPL mode (dB).
///
/// A full-scale sine peaks 3 dB above its RMS; the peak scale is shifted
/// down so both needles agree on a calibration tone.
pub const PEAK_CREST_CORRECTION_DB: f32 = 3.0;

/// Top of the linear SPL display scale (dB SPL).
pub const SPL_SCALE_MAX_DB: f32 = 120.0;

/// Floor for mean-square (power) values before 10*log10 (-120 dB).
pub const RMS_POWER_FLOOR: f32 = 1e-12;

/// Floor for peak amplitude values before 20*log10 (-200 dBFS).
pub const PEAK_AMP_FLOOR: f32 = 1e-10;

/// Ballistic needle integration (attack) time constant in seconds.
pub const BALLISTIC_ATTACK_S: f32 = 0.005;

/// Ballistic needle return time in seconds for a 20 dB fall
/// (IEC 60268-10 Type I).
pub const BALLISTIC_RETURN_TIME_S: f32 = 1.7;

/// Maximum number of metered channels.
pub const MAX_CHANNELS: usize = 2;
