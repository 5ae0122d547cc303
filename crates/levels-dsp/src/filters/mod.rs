// SPDX-License-Identifier: LGPL-3.0-or-later

//! Frequency-weighting filters.

pub mod weighting;

pub use weighting::AWeightingFilter;
