// SPDX-License-Identifier: LGPL-3.0-or-later

//! Error types.
//!
//! Errors are reported only for invalid configuration at construction
//! time. The processing path never fails: degraded inputs are logged and
//! metering continues with floored, finite values.

use thiserror::Error;

/// Metering engine configuration error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MeterError {
    /// Sample rate is zero, negative, or non-finite.
    #[error("sample rate must be positive and finite, got {0}")]
    InvalidSampleRate(f32),

    /// Smoothing or peak response time is zero, negative, or non-finite.
    #[error("response time must be positive and finite, got {0} s")]
    InvalidResponseTime(f32),

    /// Display tick period is zero, negative, or non-finite.
    #[error("tick period must be positive and finite, got {0} ms")]
    InvalidTickPeriod(f32),

    /// Slow-label period is not a whole multiple of the tick period.
    #[error("label period {label_ms} ms must be a positive multiple of tick period {tick_ms} ms")]
    InvalidLabelPeriod { label_ms: f32, tick_ms: f32 },

    /// Metering mode label not recognized by the mode provider boundary.
    #[error("unrecognized metering mode {0:?}")]
    InvalidMode(String),
}
