// SPDX-License-Identifier: LGPL-3.0-or-later

//! Measurement mode selection.

use std::str::FromStr;

use crate::error::MeterError;
use crate::units::MeterScale;

/// Level measurement mode.
///
/// The mode is polled from an external provider and passed explicitly
/// into every processing call; the engine holds no mode state of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeteringMode {
    /// Plain RMS/peak in dBFS on the IEC scale.
    #[default]
    Rms,
    /// A-weighted, SPL-calibrated (dBA).
    AWeighted,
    /// Unweighted, SPL-calibrated.
    Spl,
}

impl MeteringMode {
    /// Whether the A-weighting filter runs in this mode.
    pub fn applies_weighting(self) -> bool {
        matches!(self, MeteringMode::AWeighted)
    }

    /// Whether levels are calibrated to SPL via the microphone
    /// sensitivity (dBA and SPL modes) rather than reported in dBFS.
    pub fn spl_calibrated(self) -> bool {
        !matches!(self, MeteringMode::Rms)
    }

    /// Display scale used for the ballistic needle in this mode.
    pub fn scale(self) -> MeterScale {
        match self {
            MeteringMode::Rms => MeterScale::Iec,
            MeteringMode::AWeighted | MeteringMode::Spl => MeterScale::Spl,
        }
    }
}

impl FromStr for MeteringMode {
    type Err = MeterError;

    /// Parse a mode provider label.
    ///
    /// Accepts `"RMS"`, `"dbA"`/`"dBA"`, and `"SPL"`, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rms" => Ok(MeteringMode::Rms),
            "dba" => Ok(MeteringMode::AWeighted),
            "spl" => Ok(MeteringMode::Spl),
            _ => Err(MeterError::InvalidMode(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_labels() {
        assert_eq!("RMS".parse::<MeteringMode>().unwrap(), MeteringMode::Rms);
        assert_eq!("rms".parse::<MeteringMode>().unwrap(), MeteringMode::Rms);
        assert_eq!(
            "dbA".parse::<MeteringMode>().unwrap(),
            MeteringMode::AWeighted
        );
        assert_eq!(
            "dBA".parse::<MeteringMode>().unwrap(),
            MeteringMode::AWeighted
        );
        assert_eq!("SPL".parse::<MeteringMode>().unwrap(), MeteringMode::Spl);
    }

    #[test]
    fn test_parse_invalid_label() {
        let err = "loudness".parse::<MeteringMode>().unwrap_err();
        assert_eq!(err, MeterError::InvalidMode("loudness".to_string()));
    }

    #[test]
    fn test_mode_properties() {
        assert!(!MeteringMode::Rms.applies_weighting());
        assert!(MeteringMode::AWeighted.applies_weighting());
        assert!(!MeteringMode::Spl.applies_weighting());

        assert!(!MeteringMode::Rms.spl_calibrated());
        assert!(MeteringMode::AWeighted.spl_calibrated());
        assert!(MeteringMode::Spl.spl_calibrated());

        assert_eq!(MeteringMode::Rms.scale(), MeterScale::Iec);
        assert_eq!(MeteringMode::AWeighted.scale(), MeterScale::Spl);
        assert_eq!(MeteringMode::Spl.scale(), MeterScale::Spl);
    }

    #[test]
    fn test_default_is_rms() {
        assert_eq!(MeteringMode::default(), MeteringMode::Rms);
    }
}
