//! RF jammer: `Ready -> Engaged -> Cooldown -> Ready`, or `Engaged ->
//! Cooldown` early via `disengage`.

use cuas_core::constants::{RF_JAMMER_COOLDOWN_SECS, RF_JAMMER_ENGAGEMENT_SECS, RF_JAMMER_MAX_RANGE_M, RF_JAMMER_MIN_RANGE_M};
use cuas_core::enums::{EffectorStatus, EffectorType};
use cuas_core::types::{EffectorId, GeoPosition, TimestampMs};
use std::sync::Mutex;

use crate::contract::{Effector, EffectorError, EffectorHealth};

const INITIALIZE_MS: u64 = 2_000;
const RESET_MS: u64 = 1_000;
const EFFECTIVENESS: f64 = 0.85;

/// Tunables for one jammer instance.
#[derive(Debug, Clone)]
pub struct RfJammerConfig {
    pub min_range_m: f64,
    pub max_range_m: f64,
    pub engagement_secs: f64,
    pub cooldown_secs: f64,
    pub frequencies_mhz: Vec<f64>,
    pub max_power_w: f64,
}

impl Default for RfJammerConfig {
    fn default() -> Self {
        Self {
            min_range_m: RF_JAMMER_MIN_RANGE_M,
            max_range_m: RF_JAMMER_MAX_RANGE_M,
            engagement_secs: RF_JAMMER_ENGAGEMENT_SECS,
            cooldown_secs: RF_JAMMER_COOLDOWN_SECS,
            frequencies_mhz: vec![2_400.0, 5_800.0],
            max_power_w: 100.0,
        }
    }
}

struct State {
    status: EffectorStatus,
    deadline_ms: Option<TimestampMs>,
    total_engagements: u64,
    last_engagement_time: Option<TimestampMs>,
    fault_message: Option<String>,
}

pub struct RfJammer {
    id: EffectorId,
    position: GeoPosition,
    config: RfJammerConfig,
    state: Mutex<State>,
}

impl RfJammer {
    pub fn new(id: EffectorId, position: GeoPosition, config: RfJammerConfig) -> Self {
        Self {
            id,
            position,
            config,
            state: Mutex::new(State {
                status: EffectorStatus::Offline,
                deadline_ms: None,
                total_engagements: 0,
                last_engagement_time: None,
                fault_message: None,
            }),
        }
    }
}

impl Effector for RfJammer {
    fn id(&self) -> &EffectorId {
        &self.id
    }

    fn effector_type(&self) -> EffectorType {
        EffectorType::RfJammer
    }

    fn position(&self) -> GeoPosition {
        self.position
    }

    fn health(&self) -> EffectorHealth {
        let s = self.state.lock().expect("rf jammer state poisoned");
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
        let mut s = self.state.lock().expect("rf jammer state poisoned");
        s.status = EffectorStatus::Initializing;
        s.deadline_ms = Some(now_ms + INITIALIZE_MS);
    }

    fn shutdown(&self, _now_ms: TimestampMs) {
        let mut s = self.state.lock().expect("rf jammer state poisoned");
        s.status = EffectorStatus::Offline;
        s.deadline_ms = None;
    }

    fn reset(&self, now_ms: TimestampMs) {
        let mut s = self.state.lock().expect("rf jammer state poisoned");
        if s.status != EffectorStatus::Fault {
            return;
        }
        s.fault_message = None;
        s.status = EffectorStatus::Initializing;
        s.deadline_ms = Some(now_ms + RESET_MS);
    }

    fn engage(&self, target: GeoPosition, now_ms: TimestampMs) -> Result<(), EffectorError> {
        let distance = self.distance_to(target);
        let mut s = self.state.lock().expect("rf jammer state poisoned");
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
        s.deadline_ms = Some(now_ms + (self.config.engagement_secs * 1000.0) as u64);
        s.total_engagements += 1;
        s.last_engagement_time = Some(now_ms);
        Ok(())
    }

    fn disengage(&self, now_ms: TimestampMs) {
        let mut s = self.state.lock().expect("rf jammer state poisoned");
        if s.status != EffectorStatus::Engaged {
            return;
        }
        s.status = EffectorStatus::Cooldown;
        s.deadline_ms = Some(now_ms + (self.config.cooldown_secs * 1000.0) as u64);
    }

    fn tick(&self, now_ms: TimestampMs) {
        let mut s = self.state.lock().expect("rf jammer state poisoned");
        let Some(deadline) = s.deadline_ms else { return };
        if now_ms < deadline {
            return;
        }
        match s.status {
            EffectorStatus::Initializing => {
                s.status = EffectorStatus::Ready;
                s.deadline_ms = None;
            }
            EffectorStatus::Engaged => {
                s.status = EffectorStatus::Cooldown;
                s.deadline_ms = Some(now_ms + (self.config.cooldown_secs * 1000.0) as u64);
            }
            EffectorStatus::Cooldown => {
                s.status = EffectorStatus::Ready;
                s.deadline_ms = None;
            }
            _ => {}
        }
    }

    fn report_fault(&self, message: String) {
        let mut s = self.state.lock().expect("rf jammer state poisoned");
        s.status = EffectorStatus::Fault;
        s.deadline_ms = None;
        s.fault_message = Some(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ready_jammer() -> RfJammer {
        let jammer = RfJammer::new(EffectorId("rf-1".into()), GeoPosition::new(0.0, 0.0, 0.0), RfJammerConfig::default());
        jammer.initialize(0);
        jammer.tick(INITIALIZE_MS);
        assert_eq!(jammer.status(), EffectorStatus::Ready);
        jammer
    }

    #[test]
    fn test_engage_rejects_out_of_range_target() {
        let jammer = ready_jammer();
        let far = GeoPosition::new(1.0, 0.0, 0.0);
        let err = jammer.engage(far, 0).unwrap_err();
        assert!(matches!(err, EffectorError::OutOfRange { .. }));
    }

    #[test]
    fn test_engage_then_timeout_enters_cooldown_then_ready() {
        let jammer = ready_jammer();
        let target = GeoPosition::new(0.0, 0.009, 0.0); // ~900m east
        jammer.engage(target, 0).unwrap();
        assert_eq!(jammer.status(), EffectorStatus::Engaged);

        jammer.tick((RF_JAMMER_ENGAGEMENT_SECS * 1000.0) as u64);
        assert_eq!(jammer.status(), EffectorStatus::Cooldown);

        jammer.tick(((RF_JAMMER_ENGAGEMENT_SECS + RF_JAMMER_COOLDOWN_SECS) * 1000.0) as u64);
        assert_eq!(jammer.status(), EffectorStatus::Ready);
    }

    #[test]
    fn test_disengage_before_timeout_skips_to_cooldown() {
        let jammer = ready_jammer();
        let target = GeoPosition::new(0.0, 0.009, 0.0);
        jammer.engage(target, 0).unwrap();
        jammer.disengage(1_000);
        assert_eq!(jammer.status(), EffectorStatus::Cooldown);
    }

    #[test]
    fn test_disengage_while_not_engaged_is_a_no_op() {
        let jammer = ready_jammer();
        jammer.disengage(0);
        assert_eq!(jammer.status(), EffectorStatus::Ready);
    }

    #[test]
    fn test_fault_then_reset_returns_to_ready() {
        let jammer = ready_jammer();
        jammer.report_fault("overheat".to_string());
        assert_eq!(jammer.status(), EffectorStatus::Fault);
        jammer.reset(0);
        jammer.tick(RESET_MS);
        assert_eq!(jammer.status(), EffectorStatus::Ready);
    }
}
