//! The shared effector contract.
//!
//! Each family (RF jammer, kinetic interceptor, directed energy) implements
//! this trait directly rather than inheriting from a common base class —
//! a tagged sum type with dispatch at the boundary, per the redesign away
//! from deep object inheritance. All three share range-check and
//! readiness logic as default trait methods; only the timed internal
//! state machine differs per family.

use cuas_core::enums::{EffectorStatus, EffectorType};
use cuas_core::types::{EffectorId, GeoPosition, TimestampMs};
use cuas_geo::geodesy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Point-in-time health snapshot of one effector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectorHealth {
    pub status: EffectorStatus,
    pub readiness: f64,
    /// -1 for unlimited (RF jammer, directed energy); a magazine count for kinetic.
    pub remaining_shots: i32,
    pub total_engagements: u64,
    pub fault_message: Option<String>,
    pub last_engagement_time: Option<TimestampMs>,
}

/// Typed reasons `engage` can fail, backing the Precondition/Reference/Fault
/// error kinds where the core needs more than a bare boolean.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum EffectorError {
    #[error("effector not ready (status: {status:?})")]
    NotReady { status: EffectorStatus },
    #[error("target out of range: {distance:.1}m not in [{min:.1}, {max:.1}]m")]
    OutOfRange { distance: f64, min: f64, max: f64 },
    #[error("effector fault: {message}")]
    Fault { message: String },
}

/// The polymorphic effector contract. Implementors own a per-instance lock
/// around their internal state machine; the engagement manager holds no
/// lock of its own while calling these methods.
pub trait Effector: Send + Sync {
    fn id(&self) -> &EffectorId;
    fn effector_type(&self) -> EffectorType;
    fn position(&self) -> GeoPosition;
    fn health(&self) -> EffectorHealth;

    fn min_range_m(&self) -> f64;
    fn max_range_m(&self) -> f64;
    fn effectiveness(&self) -> f64;

    fn status(&self) -> EffectorStatus {
        self.health().status
    }

    fn is_ready(&self) -> bool {
        self.status() == EffectorStatus::Ready
    }

    fn is_engaged(&self) -> bool {
        self.status() == EffectorStatus::Engaged
    }

    fn distance_to(&self, target: GeoPosition) -> f64 {
        geodesy::distance(&self.position(), &target)
    }

    fn can_engage(&self, target: GeoPosition) -> bool {
        if !self.is_ready() {
            return false;
        }
        let d = self.distance_to(target);
        d >= self.min_range_m() && d <= self.max_range_m()
    }

    /// Simulated boot sequence; ends in `Ready` once `tick` carries the
    /// clock past the simulated delay.
    fn initialize(&self, now_ms: TimestampMs);

    /// Disengages if currently engaged, then goes `Offline`.
    fn shutdown(&self, now_ms: TimestampMs);

    /// Only effective from `Fault`; re-runs the initialization sequence.
    fn reset(&self, now_ms: TimestampMs);

    /// Begins the family's engagement sequence. Precondition: `can_engage`.
    fn engage(&self, target: GeoPosition, now_ms: TimestampMs) -> Result<(), EffectorError>;

    /// Ends an in-progress engagement where the family allows it; a no-op
    /// (possibly logged by the caller) where it does not.
    fn disengage(&self, now_ms: TimestampMs);

    /// Advances the internal timed state machine to `now_ms`. Must be
    /// called periodically (the engagement manager's completion-check
    /// cadence drives this); never blocks.
    fn tick(&self, now_ms: TimestampMs);

    /// Reports a hardware fault: transitions to `Fault` regardless of
    /// current state, aborting whatever engagement was in progress.
    fn report_fault(&self, message: String);
}
