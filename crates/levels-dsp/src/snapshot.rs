// SPDX-License-Identifier: LGPL-3.0-or-later

//! Lock-free level snapshot publication.
//!
//! The engine is the single writer: after every processed block and every
//! display tick it stores an immutable [`LevelSnapshot`] into an
//! [`ArcSwap`]. Any number of reader threads (typically the display layer)
//! load the latest snapshot without locking, so the audio-rate producer
//! and the UI-rate consumer never contend on shared mutable state.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::consts::MAX_CHANNELS;
use crate::engine::LevelRecord;

/// Immutable copy of all per-channel meter readings at one instant.
#[derive(Debug, Clone, Default)]
pub struct LevelSnapshot {
    /// Whether two channels are currently active.
    pub two_channels: bool,
    /// Current fast (per-tick) level records, one per channel slot.
    pub levels: [LevelRecord; MAX_CHANNELS],
    /// Slow (text-label cadence) level records, one per channel slot.
    pub slow_levels: [LevelRecord; MAX_CHANNELS],
}

/// Cloneable read handle onto the engine's published snapshots.
#[derive(Debug, Clone)]
pub struct LevelsHandle {
    inner: Arc<ArcSwap<LevelSnapshot>>,
}

impl LevelsHandle {
    /// Create a handle holding a default (silent) snapshot.
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(LevelSnapshot::default())),
        }
    }

    /// Load the most recently published snapshot.
    pub fn load(&self) -> Arc<LevelSnapshot> {
        self.inner.load_full()
    }

    /// Publish a new snapshot (engine side).
    pub(crate) fn publish(&self, snapshot: LevelSnapshot) {
        self.inner.store(Arc::new(snapshot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_snapshot_is_silent() {
        let handle = LevelsHandle::new();
        let snapshot = handle.load();
        assert!(!snapshot.two_channels);
        for record in &snapshot.levels {
            assert!(record.level_rms_db.is_finite());
            assert!(record.level_max_db.is_finite());
            assert_eq!(record.peak_iec, 0.0);
        }
    }

    #[test]
    fn test_publish_visible_through_clone() {
        let handle = LevelsHandle::new();
        let reader = handle.clone();

        let mut snapshot = LevelSnapshot::default();
        snapshot.two_channels = true;
        snapshot.levels[0].level_rms_db = -9.0;
        handle.publish(snapshot);

        let seen = reader.load();
        assert!(seen.two_channels);
        assert_eq!(seen.levels[0].level_rms_db, -9.0);
    }

    #[test]
    fn test_load_is_a_stable_copy() {
        let handle = LevelsHandle::new();
        let before = handle.load();

        let mut snapshot = LevelSnapshot::default();
        snapshot.levels[1].level_max_db = -3.0;
        handle.publish(snapshot);

        // The previously loaded Arc still sees the old values.
        assert_ne!(before.levels[1].level_max_db, -3.0);
    }
}
