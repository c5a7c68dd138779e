//! The track entity: per-target kinematic and identity state.
//!
//! Tracks are owned exclusively by [`crate::manager::TrackManager`] and
//! addressed everywhere else by [`TrackId`] — an arena-with-handles layout
//! rather than owning pointers passed around a heterogeneous container.

use cuas_core::constants::TRACK_HISTORY_CAPACITY;
use cuas_core::enums::{Classification, DetectionSource, TrackLifecycle};
use cuas_core::types::{BoundingBox, GeoPosition, NedVelocity, TimestampMs, TrackId};
use std::collections::VecDeque;

/// One (position, timestamp) sample in a track's history.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionSample {
    pub position: GeoPosition,
    pub timestamp_ms: TimestampMs,
}

/// Per-target fused state.
#[derive(Debug, Clone)]
pub struct Track {
    pub id: TrackId,
    pub created_at_ms: TimestampMs,
    pub last_update_ms: TimestampMs,

    pub position: GeoPosition,
    pub velocity: NedVelocity,
    history: VecDeque<PositionSample>,

    pub sources: Vec<DetectionSource>,
    pub associated_camera_id: Option<String>,
    pub bounding_box: Option<BoundingBox>,
    pub visually_tracked: bool,

    pub classification: Classification,
    pub classification_confidence: f64,

    pub quality: f64,
    pub coast_count: u32,
    pub lifecycle: TrackLifecycle,

    pub threat_level: u8,
    pub engaged: bool,
}

impl Track {
    pub fn new(id: TrackId, position: GeoPosition, source: DetectionSource, now_ms: TimestampMs) -> Self {
        let mut history = VecDeque::with_capacity(TRACK_HISTORY_CAPACITY);
        history.push_back(PositionSample { position, timestamp_ms: now_ms });
        Self {
            id,
            created_at_ms: now_ms,
            last_update_ms: now_ms,
            position,
            velocity: NedVelocity::ZERO,
            history,
            sources: vec![source],
            associated_camera_id: None,
            bounding_box: None,
            visually_tracked: false,
            classification: Classification::Pending,
            classification_confidence: 0.0,
            quality: 0.0,
            coast_count: 0,
            lifecycle: TrackLifecycle::Initiated,
            threat_level: 0,
            engaged: false,
        }
    }

    /// Records a fresh measurement: updates position, appends bounded
    /// history, resets the coast clock. Does not touch classification.
    pub fn apply_measurement(&mut self, position: GeoPosition, now_ms: TimestampMs) {
        self.position = position;
        self.last_update_ms = now_ms;
        self.coast_count = 0;
        if self.history.len() == TRACK_HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(PositionSample { position, timestamp_ms: now_ms });
        if self.lifecycle != TrackLifecycle::Dropped {
            self.lifecycle = TrackLifecycle::Active;
        }
    }

    pub fn add_source(&mut self, source: DetectionSource) {
        if !self.sources.contains(&source) {
            self.sources.push(source);
        }
    }

    pub fn history(&self) -> impl Iterator<Item = &PositionSample> {
        self.history.iter()
    }

    pub fn is_dropped(&self) -> bool {
        self.lifecycle == TrackLifecycle::Dropped
    }

    pub fn age_ms(&self, now_ms: TimestampMs) -> u64 {
        now_ms.saturating_sub(self.last_update_ms)
    }

    pub fn is_high_threat(&self) -> bool {
        self.classification == Classification::Hostile
            && self.threat_level >= cuas_core::constants::HIGH_THREAT_LEVEL
    }

    pub fn bounding_box_is_fresh(&self, now_ms: TimestampMs) -> bool {
        match &self.bounding_box {
            Some(bbox) => {
                now_ms.saturating_sub(bbox.observed_at_ms)
                    < cuas_core::constants::BOUNDING_BOX_FRESHNESS_MS
            }
            None => false,
        }
    }
}
