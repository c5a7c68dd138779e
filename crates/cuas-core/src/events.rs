//! Typed event egress.
//!
//! Subscribers never see these while a core lock is held — every producer
//! in this workspace collects events locally and emits them only after its
//! write lock has been released, mirroring the audio-event buffering the
//! ECS systems used to avoid re-entrant borrow conflicts.

use crate::enums::{AlertSeverity, BdaResult, Classification, EngagementState, TrackLifecycle};
use crate::types::{AlertId, EffectorId, EngagementId, GeoPosition, TimestampMs, TrackId};
use serde::{Deserialize, Serialize};

/// A single alert raised by the threat assessor. Append-only, capped at
/// `ALERT_HISTORY_CAPACITY` entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: AlertId,
    pub track_id: TrackId,
    pub timestamp_ms: TimestampMs,
    pub severity: AlertSeverity,
    pub message: String,
    pub asset_id: Option<String>,
}

/// Events produced by the track manager.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrackEvent {
    Created { track_id: TrackId },
    Updated { track_id: TrackId },
    Dropped { track_id: TrackId },
    StateChanged { track_id: TrackId, state: TrackLifecycle },
    ClassificationChanged { track_id: TrackId, classification: Classification },
    ThreatLevelChanged { track_id: TrackId, level: u8 },
    HighThreatDetected { track_id: TrackId, level: u8 },
}

/// Events produced by the engagement manager's workflow state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EngagementEvent {
    TrackSelected { track_id: TrackId },
    VideoSwitch { camera_id: String },
    EffectorRecommended { engagement_id: Option<EngagementId>, effector_id: EffectorId },
    AuthorizationRequested { engagement_id: EngagementId },
    Authorized { engagement_id: EngagementId, operator_id: String },
    Denied { engagement_id: EngagementId, reason: String },
    AuthorizationTimeout { engagement_id: EngagementId },
    Engaging { engagement_id: EngagementId },
    Completed { engagement_id: EngagementId, bda: BdaResult },
    Aborted { engagement_id: EngagementId, reason: String },
    Failed { engagement_id: EngagementId, reason: String },
    StateChanged { engagement_id: EngagementId, state: EngagementState },
}

/// Everything a subscriber may observe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "domain", rename_all = "snake_case")]
pub enum Event {
    Track(TrackEvent),
    Alert(AlertRecord),
    Engagement(EngagementEvent),
}

/// Where the core sends outbound events. Implementations must not call back
/// into the core synchronously; the contract only guarantees events are
/// emitted after the producing operation has released its locks.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: Event);
}

/// Forwards every event over an `mpsc` channel — the same transport the
/// rest of this workspace uses to move state out of a background thread.
pub struct ChannelEventSink {
    sender: std::sync::mpsc::Sender<Event>,
}

impl ChannelEventSink {
    pub fn new(sender: std::sync::mpsc::Sender<Event>) -> Self {
        Self { sender }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: Event) {
        let _ = self.sender.send(event);
    }
}

/// Discards every event. Useful in tests that only assert on return values.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn emit(&self, _event: Event) {}
}

/// Collects every event in memory, in emission order. Useful in tests that
/// need to assert on the sequence of events a call produced.
#[derive(Default)]
pub struct RecordingEventSink {
    events: std::sync::Mutex<Vec<Event>>,
}

impl RecordingEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<Event> {
        std::mem::take(&mut self.events.lock().expect("recording sink poisoned"))
    }
}

impl EventSink for RecordingEventSink {
    fn emit(&self, event: Event) {
        self.events.lock().expect("recording sink poisoned").push(event);
    }
}

/// Named geodetic location of interest, referenced by track position
/// snapshots carried in engagement records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSnapshot {
    pub position: GeoPosition,
    pub classification: Classification,
}
