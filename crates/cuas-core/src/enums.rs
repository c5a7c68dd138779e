//! Shared enumerations for the track, threat and engagement subsystems.

use serde::{Deserialize, Serialize};

/// Origin of a detection that was fused into a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionSource {
    Radar,
    Rf,
    Camera,
}

/// Identity classification of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Pending,
    Unknown,
    Friendly,
    Neutral,
    Hostile,
}

/// Track lifecycle state. `Dropped` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackLifecycle {
    Initiated,
    Active,
    Coasting,
    Dropped,
}

/// Alert severity as emitted by the threat assessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Info,
    Warn,
    Critical,
}

/// Effector family tag. Dispatch replaces the source's inheritance hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectorType {
    RfJammer,
    Kinetic,
    DirectedEnergy,
}

/// Effector readiness state, shared by all families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectorStatus {
    Unknown,
    Offline,
    Initializing,
    Ready,
    Engaged,
    Reloading,
    Cooldown,
    Maintenance,
    Fault,
}

/// Engagement workflow state. See the manager's transition table for the
/// edges between these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngagementState {
    Idle,
    TrackSelected,
    EffectorRecommended,
    AwaitingAuthorization,
    Authorized,
    Engaging,
    Completed,
    Aborted,
    Failed,
}

impl EngagementState {
    /// Terminal states accept no further workflow events except `select_track`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Aborted | Self::Failed)
    }
}

/// Battle damage assessment recorded against a finalized engagement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BdaResult {
    Unknown,
    TargetDestroyed,
    TargetDamaged,
    TargetMissed,
    TargetEvaded,
    AssessmentPending,
}

/// Severity of an entry written through the logging port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}
