// SPDX-License-Identifier: LGPL-3.0-or-later

//! Unit conversion functions.
//!
//! Conversions between decibels and linear gain/power ratios, plus the
//! mappings from dB values to normalized meter-scale positions (IEC
//! 60268-18 scale for full-scale readings, linear scale for SPL readings).

use crate::consts::SPL_SCALE_MAX_DB;

/// Convert decibels to linear gain (amplitude ratio).
///
/// # Arguments
/// * `db` - Level in decibels
///
/// # Returns
/// Linear gain (amplitude ratio)
#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    (db * (std::f32::consts::LN_10 / 20.0)).exp()
}

/// Convert decibels to power ratio.
///
/// # Arguments
/// * `db` - Level in decibels
///
/// # Returns
/// Power ratio
#[inline]
pub fn db_to_power(db: f32) -> f32 {
    (db * (std::f32::consts::LN_10 / 10.0)).exp()
}

/// Convert linear gain (amplitude ratio) to decibels.
///
/// # Arguments
/// * `gain` - Linear gain (amplitude ratio)
///
/// # Returns
/// Level in decibels
#[inline]
pub fn gain_to_db(gain: f32) -> f32 {
    20.0 * gain.log10()
}

/// Convert power ratio to decibels.
///
/// # Arguments
/// * `pwr` - Power ratio
///
/// # Returns
/// Level in decibels
#[inline]
pub fn power_to_db(pwr: f32) -> f32 {
    10.0 * pwr.log10()
}

/// Meter display scale selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeterScale {
    /// IEC 60268-18 piecewise scale for dBFS readings.
    Iec,
    /// Linear 0..120 dB scale for SPL readings.
    Spl,
}

/// Map a dBFS value to a normalized IEC 60268-18 scale position.
///
/// The scale is piecewise linear with progressively finer resolution
/// toward full scale:
///
/// | dB   | position |
/// |------|----------|
/// | -70  | 0.0      |
/// | -60  | 0.025    |
/// | -50  | 0.075    |
/// | -40  | 0.15     |
/// | -30  | 0.3      |
/// | -20  | 0.5      |
/// |  0   | 1.0      |
///
/// # Arguments
/// * `db` - Level in dBFS
///
/// # Returns
/// Normalized position in [0, 1]
pub fn db_to_iec(db: f32) -> f32 {
    let pos = if db < -70.0 {
        0.0
    } else if db < -60.0 {
        (db + 70.0) * 0.0025
    } else if db < -50.0 {
        (db + 60.0) * 0.005 + 0.025
    } else if db < -40.0 {
        (db + 50.0) * 0.0075 + 0.075
    } else if db < -30.0 {
        (db + 40.0) * 0.015 + 0.15
    } else if db < -20.0 {
        (db + 30.0) * 0.02 + 0.3
    } else {
        (db + 20.0) * 0.025 + 0.5
    };
    pos.clamp(0.0, 1.0)
}

/// Map a dB SPL value to a normalized position on the linear SPL scale.
///
/// # Arguments
/// * `db` - Level in dB SPL
///
/// # Returns
/// Normalized position in [0, 1]
#[inline]
pub fn db_to_spl_position(db: f32) -> f32 {
    (db / SPL_SCALE_MAX_DB).clamp(0.0, 1.0)
}

/// Map a dB value to a normalized position on the given scale.
///
/// # Arguments
/// * `db` - Level in dB (dBFS for [`MeterScale::Iec`], dB SPL for
///   [`MeterScale::Spl`])
/// * `scale` - Display scale to map onto
///
/// # Returns
/// Normalized position in [0, 1]
#[inline]
pub fn db_to_position(db: f32, scale: MeterScale) -> f32 {
    match scale {
        MeterScale::Iec => db_to_iec(db),
        MeterScale::Spl => db_to_spl_position(db),
    }
}
