// SPDX-License-Identifier: LGPL-3.0-or-later

//! Level measurement primitives.
//!
//! - **SmoothingKernel**: exponential RMS smoothing as a finite convolution
//! - **PeakTracker**: fast-attack / exponential-decay block peak
//! - **BallisticPeak**: IEC 60268-10-style display needle ballistics

pub mod ballistics;
pub mod peak;
pub mod smoother;

pub use ballistics::BallisticPeak;
pub use peak::PeakTracker;
pub use smoother::SmoothingKernel;
