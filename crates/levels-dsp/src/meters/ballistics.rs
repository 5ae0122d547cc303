// SPDX-License-Identifier: LGPL-3.0-or-later

//! Display needle ballistics per IEC 60268-10.
//!
//! Models the mechanical inertia of an analog peak-programme meter
//! needle: the dB reading is mapped to a normalized scale position, then
//! smoothed with asymmetric attack/release time constants. This smooths
//! the *display needle*, not the signal -- it sits after the RMS/peak
//! measurement stage.
//!
//! The attack follows the 5 ms integration time of an IEC Type I meter;
//! the release time constant is chosen so an exponential fall sweeps
//! 20 dB of scale in 1.7 s (the Type I return time).

use crate::consts::{BALLISTIC_ATTACK_S, BALLISTIC_RETURN_TIME_S};
use crate::units::{db_to_position, MeterScale};

/// Ballistic needle state for one channel.
#[derive(Debug, Clone)]
pub struct BallisticPeak {
    /// Current needle position in [0, 1].
    position: f32,
    /// Per-tick attack coefficient.
    attack_coeff: f32,
    /// Per-tick release coefficient.
    release_coeff: f32,
}

impl BallisticPeak {
    /// Create a ballistic needle updated once per display tick.
    ///
    /// # Arguments
    /// * `tick_period` - Display tick period in seconds
    pub fn new(tick_period: f32) -> Self {
        let tick = tick_period as f64;
        let attack_tau = BALLISTIC_ATTACK_S as f64;
        // Exponential release sweeping 20 dB (a factor of 10) of scale
        // in the configured return time.
        let release_tau = (BALLISTIC_RETURN_TIME_S as f64) / std::f64::consts::LN_10;

        Self {
            position: 0.0,
            attack_coeff: (1.0 - (-tick / attack_tau).exp()) as f32,
            release_coeff: (1.0 - (-tick / release_tau).exp()) as f32,
        }
    }

    /// Advance the needle one tick toward the given dB reading.
    ///
    /// The reading is mapped onto `scale` and the needle moves toward the
    /// resulting target with the attack coefficient when rising and the
    /// release coefficient when falling.
    ///
    /// # Arguments
    /// * `db` - Level reading in dB (dBFS or dB SPL depending on `scale`)
    /// * `scale` - Display scale mapping for the current mode
    ///
    /// # Returns
    /// The new needle position in [0, 1]
    pub fn update(&mut self, db: f32, scale: MeterScale) -> f32 {
        let target = db_to_position(db, scale);
        let coeff = if target > self.position {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.position += coeff * (target - self.position);
        self.position = self.position.clamp(0.0, 1.0);
        self.position
    }

    /// Current needle position in [0, 1].
    pub fn position(&self) -> f32 {
        self.position
    }

    /// Return the needle to rest.
    pub fn reset(&mut self) {
        self.position = 0.0;
    }
}
