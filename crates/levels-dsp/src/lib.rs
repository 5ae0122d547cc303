// SPDX-License-Identifier: LGPL-3.0-or-later

//! Real-time audio level metering.
//!
//! This crate measures per-channel levels of a live audio stream the way
//! a studio level meter does: an exponentially smoothed RMS reading, an
//! instant-attack peak reading with exponential release, and a ballistic
//! needle position for drawing. Three metering modes are supported:
//!
//! * **RMS**: unweighted levels in dBFS on an IEC 60268-18 meter scale.
//! * **dBA**: A-weighted (IEC 61672-1) levels, calibrated to dB SPL.
//! * **SPL**: unweighted levels calibrated to dB SPL.
//!
//! The entry point is [`LevelMeterEngine`]: feed it sample blocks with
//! [`process_block`](LevelMeterEngine::process_block), drive
//! [`tick`](LevelMeterEngine::tick) at display cadence, and read the
//! results directly, through a [`LevelSink`], or via the lock-free
//! [`LevelsHandle`] snapshot from another thread.
//!
//! The building blocks are exposed for standalone use:
//!
//! * [`filters`]: the A-weighting biquad cascade.
//! * [`meters`]: RMS smoothing kernel, peak tracker, needle ballistics.
//! * [`units`]: dB conversions and meter scale mappings.

pub mod consts;
pub mod engine;
pub mod error;
pub mod filters;
pub mod meters;
pub mod mode;
pub mod snapshot;
pub mod units;

pub use engine::{EngineConfig, LevelMeterEngine, LevelRecord, LevelSink};
pub use error::MeterError;
pub use filters::AWeightingFilter;
pub use meters::{BallisticPeak, PeakTracker, SmoothingKernel};
pub use mode::MeteringMode;
pub use snapshot::{LevelSnapshot, LevelsHandle};
pub use units::MeterScale;
