//! The engagement record and the running statistics derived from it.
//!
//! Records are append-only: nothing in this crate offers a mutator once a
//! record is pushed into [`crate::manager::EngagementManager`]'s history.
//! `state` and `bda` serialize as the ordinal of their variant list rather
//! than the snake_case strings `cuas_core::enums` uses elsewhere — this is
//! the one stable wire format §6 pins down explicitly for this type.

use cuas_core::enums::{BdaResult, EngagementState};
use cuas_core::events::TargetSnapshot;
use cuas_core::types::{EffectorId, EngagementId, TimestampMs, TrackId};
use serde::{Deserialize, Serialize};

mod state_ordinal {
    use cuas_core::enums::EngagementState;
    use serde::{Deserialize, Deserializer, Serializer};

    const ORDER: [EngagementState; 9] = [
        EngagementState::Idle,
        EngagementState::TrackSelected,
        EngagementState::EffectorRecommended,
        EngagementState::AwaitingAuthorization,
        EngagementState::Authorized,
        EngagementState::Engaging,
        EngagementState::Completed,
        EngagementState::Aborted,
        EngagementState::Failed,
    ];

    pub fn serialize<S: Serializer>(state: &EngagementState, s: S) -> Result<S::Ok, S::Error> {
        let ordinal = ORDER.iter().position(|v| v == state).expect("exhaustive");
        s.serialize_u8(ordinal as u8)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<EngagementState, D::Error> {
        let ordinal = u8::deserialize(d)?;
        ORDER
            .get(ordinal as usize)
            .copied()
            .ok_or_else(|| serde::de::Error::custom(format!("invalid engagement state ordinal {ordinal}")))
    }
}

mod bda_ordinal {
    use cuas_core::enums::BdaResult;
    use serde::{Deserialize, Deserializer, Serializer};

    const ORDER: [BdaResult; 6] = [
        BdaResult::Unknown,
        BdaResult::TargetDestroyed,
        BdaResult::TargetDamaged,
        BdaResult::TargetMissed,
        BdaResult::TargetEvaded,
        BdaResult::AssessmentPending,
    ];

    pub fn serialize<S: Serializer>(bda: &BdaResult, s: S) -> Result<S::Ok, S::Error> {
        let ordinal = ORDER.iter().position(|v| v == bda).expect("exhaustive");
        s.serialize_u8(ordinal as u8)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<BdaResult, D::Error> {
        let ordinal = u8::deserialize(d)?;
        ORDER
            .get(ordinal as usize)
            .copied()
            .ok_or_else(|| serde::de::Error::custom(format!("invalid bda ordinal {ordinal}")))
    }
}

/// An immutable, finalized engagement. Constructed only by
/// [`crate::manager::EngagementManager`] on workflow finalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementRecord {
    pub engagement_id: EngagementId,
    pub track_id: TrackId,
    pub effector_id: EffectorId,
    pub operator_id: Option<String>,

    pub started_at_ms: TimestampMs,
    pub authorized_at_ms: Option<TimestampMs>,
    pub executed_at_ms: Option<TimestampMs>,
    pub completed_at_ms: Option<TimestampMs>,

    #[serde(with = "state_ordinal")]
    pub state: EngagementState,
    #[serde(with = "bda_ordinal")]
    pub bda: BdaResult,

    pub target_snapshot: TargetSnapshot,
    pub notes: String,
    pub aborted: bool,
    pub abort_reason: Option<String>,
}

impl EngagementRecord {
    /// Wall-clock duration from request to finalization, if both ends are
    /// known. `None` for a record finalized before `completed_at_ms` was
    /// stamped, which should never happen in practice.
    pub fn duration_ms(&self) -> Option<u64> {
        self.completed_at_ms.map(|end| end.saturating_sub(self.started_at_ms))
    }
}

/// Running counters across every finalized engagement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngagementStats {
    pub total: u64,
    pub successful: u64,
    pub aborted: u64,
    pub failed: u64,
    pub mean_duration_ms: f64,
}

impl Default for EngagementStats {
    fn default() -> Self {
        Self { total: 0, successful: 0, aborted: 0, failed: 0, mean_duration_ms: 0.0 }
    }
}

impl EngagementStats {
    /// Folds one finalized record into the running statistics, updating
    /// the mean duration incrementally (Welford-free since we keep the sum).
    pub fn record(&mut self, outcome: EngagementState, duration_ms: u64) {
        self.total += 1;
        match outcome {
            EngagementState::Completed => self.successful += 1,
            EngagementState::Aborted => self.aborted += 1,
            EngagementState::Failed => self.failed += 1,
            _ => {}
        }
        let prior_sum = self.mean_duration_ms * (self.total - 1) as f64;
        self.mean_duration_ms = (prior_sum + duration_ms as f64) / self.total as f64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuas_core::enums::Classification;
    use cuas_core::types::GeoPosition;

    fn sample() -> EngagementRecord {
        EngagementRecord {
            engagement_id: EngagementId(1),
            track_id: TrackId(7),
            effector_id: EffectorId("rf-1".into()),
            operator_id: Some("op1".into()),
            started_at_ms: 0,
            authorized_at_ms: Some(100),
            executed_at_ms: Some(200),
            completed_at_ms: Some(30_200),
            state: EngagementState::Completed,
            bda: BdaResult::Unknown,
            target_snapshot: TargetSnapshot {
                position: GeoPosition::new(34.05, -118.24, 100.0),
                classification: Classification::Hostile,
            },
            notes: String::new(),
            aborted: false,
            abort_reason: None,
        }
    }

    #[test]
    fn test_json_round_trip_is_byte_for_byte_identical() {
        let record = sample();
        let json = serde_json::to_string(&record).unwrap();
        let back: EngagementRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
        let json_again = serde_json::to_string(&back).unwrap();
        assert_eq!(json, json_again);
    }

    #[test]
    fn test_state_serializes_as_ordinal() {
        let record = sample();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["state"], 6); // Completed is index 6
        assert_eq!(json["bda"], 0); // Unknown is index 0
    }

    #[test]
    fn test_duration_ms_uses_start_and_completion() {
        let record = sample();
        assert_eq!(record.duration_ms(), Some(30_200));
    }

    #[test]
    fn test_stats_running_mean_across_three_outcomes() {
        let mut stats = EngagementStats::default();
        stats.record(EngagementState::Completed, 1_000);
        stats.record(EngagementState::Aborted, 3_000);
        stats.record(EngagementState::Failed, 2_000);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.successful, 1);
        assert_eq!(stats.aborted, 1);
        assert_eq!(stats.failed, 1);
        assert!((stats.mean_duration_ms - 2_000.0).abs() < 1e-9);
    }
}
