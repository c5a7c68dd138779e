//! Directed energy: `Ready -> Engaged` (tracking, accumulating dwell time)
//! `-> Cooldown -> Ready`. Unlike the jammer, completion is driven by
//! accumulated dwell rather than a fixed engagement timer: `tick` must be
//! called often enough that dwell time approximates wall-clock time spent
//! on target.

use cuas_core::constants::{DE_COOLDOWN_SECS, DE_MAX_RANGE_M, DE_MIN_RANGE_M, DE_REQUIRED_DWELL_SECS};
use cuas_core::enums::{EffectorStatus, EffectorType};
use cuas_core::types::{EffectorId, GeoPosition, TimestampMs};
use std::sync::Mutex;

use crate::contract::{Effector, EffectorError, EffectorHealth};

const INITIALIZE_MS: u64 = 2_000;
const RESET_MS: u64 = 1_000;
const EFFECTIVENESS: f64 = 0.75;

/// Tunables for one directed-energy emitter instance.
#[derive(Debug, Clone)]
pub struct DirectedEnergyConfig {
    pub min_range_m: f64,
    pub max_range_m: f64,
    pub required_dwell_secs: f64,
    pub cooldown_secs: f64,
    pub power_kw: f64,
    pub beam_divergence_mrad: f64,
}

impl Default for DirectedEnergyConfig {
    fn default() -> Self {
        Self {
            min_range_m: DE_MIN_RANGE_M,
            max_range_m: DE_MAX_RANGE_M,
            required_dwell_secs: DE_REQUIRED_DWELL_SECS,
            cooldown_secs: DE_COOLDOWN_SECS,
            power_kw: 30.0,
            beam_divergence_mrad: 0.5,
        }
    }
}

struct State {
    status: EffectorStatus,
    deadline_ms: Option<TimestampMs>,
    engaged_since_ms: Option<TimestampMs>,
    dwell_accumulated_ms: u64,
    last_effect_emitted: bool,
    total_engagements: u64,
    last_engagement_time: Option<TimestampMs>,
    fault_message: Option<String>,
}

pub struct DirectedEnergy {
    id: EffectorId,
    position: GeoPosition,
    config: DirectedEnergyConfig,
    state: Mutex<State>,
}

impl DirectedEnergy {
    pub fn new(id: EffectorId, position: GeoPosition, config: DirectedEnergyConfig) -> Self {
        Self {
            id,
            position,
            config,
            state: Mutex::new(State {
                status: EffectorStatus::Offline,
                deadline_ms: None,
                engaged_since_ms: None,
                dwell_accumulated_ms: 0,
                last_effect_emitted: false,
                total_engagements: 0,
                last_engagement_time: None,
                fault_message: None,
            }),
        }
    }

    /// Whether the most recently completed engagement reached its required
    /// dwell and emitted a target effect (as opposed to being disengaged
    /// early).
    pub fn last_effect_emitted(&self) -> bool {
        self.state.lock().expect("directed energy state poisoned").last_effect_emitted
    }

    pub fn dwell_accumulated_ms(&self) -> u64 {
        self.state.lock().expect("directed energy state poisoned").dwell_accumulated_ms
    }
}

impl Effector for DirectedEnergy {
    fn id(&self) -> &EffectorId {
        &self.id
    }

    fn effector_type(&self) -> EffectorType {
        EffectorType::DirectedEnergy
    }

    fn position(&self) -> GeoPosition {
        self.position
    }

    fn health(&self) -> EffectorHealth {
        let s = self.state.lock().expect("directed energy state poisoned");
        EffectorHealth {
            status: s.status,
            readiness: if s.status == EffectorStatus::Ready { 1.0 } else { 0.0 },
            remaining_shots: -1,
            total_engagements: s.total_engagements,
            fault_message: s.fault_message.clone(),
            last_engagement_time: s.last_engagement_time,
        }
    }

    fn min_range_m(&self) -> f64 {
        self.config.min_range_m
    }

    fn max_range_m(&self) -> f64 {
        self.config.max_range_m
    }

    fn effectiveness(&self) -> f64 {
        EFFECTIVENESS
    }

    fn initialize(&self, now_ms: TimestampMs) {
        let mut s = self.state.lock().expect("directed energy state poisoned");
        s.status = EffectorStatus::Initializing;
        s.deadline_ms = Some(now_ms + INITIALIZE_MS);
    }

    fn shutdown(&self, _now_ms: TimestampMs) {
        let mut s = self.state.lock().expect("directed energy state poisoned");
        s.status = EffectorStatus::Offline;
        s.deadline_ms = None;
        s.engaged_since_ms = None;
    }

    fn reset(&self, now_ms: TimestampMs) {
        let mut s = self.state.lock().expect("directed energy state poisoned");
        if s.status != EffectorStatus::Fault {
            return;
        }
        s.fault_message = None;
        s.status = EffectorStatus::Initializing;
        s.deadline_ms = Some(now_ms + RESET_MS);
    }

    fn engage(&self, target: GeoPosition, now_ms: TimestampMs) -> Result<(), EffectorError> {
        let distance = self.distance_to(target);
        let mut s = self.state.lock().expect("directed energy state poisoned");
        if s.status != EffectorStatus::Ready {
            return Err(EffectorError::NotReady { status: s.status });
        }
        if distance < self.config.min_range_m || distance > self.config.max_range_m {
            return Err(EffectorError::OutOfRange {
                distance,
                min: self.config.min_range_m,
                max: self.config.max_range_m,
            });
        }
        s.status = EffectorStatus::Engaged;
        s.engaged_since_ms = Some(now_ms);
        s.dwell_accumulated_ms = 0;
        s.last_effect_emitted = false;
        s.total_engagements += 1;
        s.last_engagement_time = Some(now_ms);
        Ok(())
    }

    fn disengage(&self, now_ms: TimestampMs) {
        let mut s = self.state.lock().expect("directed energy state poisoned");
        if s.status != EffectorStatus::Engaged {
            return;
        }
        s.status = EffectorStatus::Cooldown;
        s.engaged_since_ms = None;
        s.deadline_ms = Some(now_ms + (self.config.cooldown_secs * 1000.0) as u64);
    }

    fn tick(&self, now_ms: TimestampMs) {
        let mut s = self.state.lock().expect("directed energy state poisoned");

        if s.status == EffectorStatus::Engaged {
            if let Some(since) = s.engaged_since_ms {
                s.dwell_accumulated_ms = now_ms.saturating_sub(since);
            }
            let required_ms = (self.config.required_dwell_secs * 1000.0) as u64;
            if s.dwell_accumulated_ms >= required_ms {
                s.last_effect_emitted = true;
                s.status = EffectorStatus::Cooldown;
                s.engaged_since_ms = None;
                s.deadline_ms = Some(now_ms + (self.config.cooldown_secs * 1000.0) as u64);
            }
            return;
        }

        let Some(deadline) = s.deadline_ms else { return };
        if now_ms < deadline {
            return;
        }
        match s.status {
            EffectorStatus::Initializing | EffectorStatus::Cooldown => {
                s.status = EffectorStatus::Ready;
                s.deadline_ms = None;
            }
            _ => {}
        }
    }

    fn report_fault(&self, message: String) {
        let mut s = self.state.lock().expect("directed energy state poisoned");
        s.status = EffectorStatus::Fault;
        s.deadline_ms = None;
        s.engaged_since_ms = None;
        s.fault_message = Some(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_laser() -> DirectedEnergy {
        let laser = DirectedEnergy::new(
            EffectorId("de-1".into()),
            GeoPosition::new(0.0, 0.0, 0.0),
            DirectedEnergyConfig::default(),
        );
        laser.initialize(0);
        laser.tick(INITIALIZE_MS);
        assert_eq!(laser.status(), EffectorStatus::Ready);
        laser
    }

    fn target_at(meters_east: f64) -> GeoPosition {
        GeoPosition::new(0.0, meters_east / 111_000.0, 0.0)
    }

    #[test]
    fn test_engage_rejects_out_of_range_target() {
        let laser = ready_laser();
        let far = GeoPosition::new(1.0, 0.0, 0.0);
        let err = laser.engage(far, 0).unwrap_err();
        assert!(matches!(err, EffectorError::OutOfRange { .. }));
    }

    #[test]
    fn test_sustained_dwell_emits_effect_then_cools_down() {
        let laser = ready_laser();
        laser.engage(target_at(500.0), 0).unwrap();

        let required_ms = (DE_REQUIRED_DWELL_SECS * 1000.0) as u64;
        laser.tick(required_ms - 1);
        assert_eq!(laser.status(), EffectorStatus::Engaged);
        assert!(!laser.last_effect_emitted());

        laser.tick(required_ms);
        assert_eq!(laser.status(), EffectorStatus::Cooldown);
        assert!(laser.last_effect_emitted());

        laser.tick(required_ms + (DE_COOLDOWN_SECS * 1000.0) as u64);
        assert_eq!(laser.status(), EffectorStatus::Ready);
    }

    #[test]
    fn test_disengage_before_required_dwell_skips_effect() {
        let laser = ready_laser();
        laser.engage(target_at(500.0), 0).unwrap();
        laser.tick(500);
        laser.disengage(500);
        assert_eq!(laser.status(), EffectorStatus::Cooldown);
        assert!(!laser.last_effect_emitted());
    }

    #[test]
    fn test_dwell_resets_on_next_engagement() {
        let laser = ready_laser();
        laser.engage(target_at(500.0), 0).unwrap();
        laser.tick(1_000);
        laser.disengage(1_000);
        laser.tick(1_000 + (DE_COOLDOWN_SECS * 1000.0) as u64);
        assert_eq!(laser.status(), EffectorStatus::Ready);

        let now = 1_000 + (DE_COOLDOWN_SECS * 1000.0) as u64;
        laser.engage(target_at(500.0), now).unwrap();
        assert_eq!(laser.dwell_accumulated_ms(), 0);
    }
}
