//! Kinetic interceptor: a multi-phase engagement sequence layered on top
//! of the shared `Engaged` status. `Arming` is the only phase `disengage`
//! can interrupt; once a round has launched it cannot be recalled.

use cuas_core::constants::{
    KINETIC_ARMING_MS, KINETIC_CLOSING_SPEED_MPS, KINETIC_COMPLETE_MS, KINETIC_DEFAULT_PK,
    KINETIC_DEFAULT_ROUNDS, KINETIC_LAUNCH_MS, KINETIC_MAX_FLIGHT_MS, KINETIC_MAX_RANGE_M,
    KINETIC_MIN_RANGE_M, KINETIC_RELOAD_MS, KINETIC_TERMINAL_MS,
};
use cuas_core::enums::{EffectorStatus, EffectorType};
use cuas_core::types::{EffectorId, GeoPosition, TimestampMs};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Mutex;

use crate::contract::{Effector, EffectorError, EffectorHealth};

const INITIALIZE_MS: u64 = 2_000;
const RESET_MS: u64 = 1_000;
const EFFECTIVENESS: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Arming,
    Launching,
    InFlight,
    Terminal,
    Complete,
}

/// Tunables for one interceptor instance.
#[derive(Debug, Clone)]
pub struct KineticConfig {
    pub min_range_m: f64,
    pub max_range_m: f64,
    pub magazine_capacity: i32,
    pub intercept_probability: f64,
    pub reload_ms: u64,
}

impl Default for KineticConfig {
    fn default() -> Self {
        Self {
            min_range_m: KINETIC_MIN_RANGE_M,
            max_range_m: KINETIC_MAX_RANGE_M,
            magazine_capacity: KINETIC_DEFAULT_ROUNDS,
            intercept_probability: KINETIC_DEFAULT_PK,
            reload_ms: KINETIC_RELOAD_MS,
        }
    }
}

struct State {
    status: EffectorStatus,
    phase: Phase,
    deadline_ms: Option<TimestampMs>,
    remaining_rounds: i32,
    engaged_distance_m: f64,
    last_intercept_success: Option<bool>,
    total_engagements: u64,
    last_engagement_time: Option<TimestampMs>,
    fault_message: Option<String>,
}

pub struct KineticInterceptor {
    id: EffectorId,
    position: GeoPosition,
    config: KineticConfig,
    state: Mutex<State>,
    rng: Mutex<ChaCha8Rng>,
}

impl KineticInterceptor {
    pub fn new(id: EffectorId, position: GeoPosition, config: KineticConfig, rng_seed: u64) -> Self {
        let capacity = config.magazine_capacity;
        Self {
            id,
            position,
            config,
            state: Mutex::new(State {
                status: EffectorStatus::Offline,
                phase: Phase::Idle,
                deadline_ms: None,
                remaining_rounds: capacity,
                engaged_distance_m: 0.0,
                last_intercept_success: None,
                total_engagements: 0,
                last_engagement_time: None,
                fault_message: None,
            }),
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(rng_seed)),
        }
    }

    /// The outcome of the most recently completed intercept attempt, if any.
    pub fn last_intercept_success(&self) -> Option<bool> {
        self.state.lock().expect("kinetic state poisoned").last_intercept_success
    }

    /// Manual reload outside an engagement; rejected while engaged or full.
    pub fn reload(&self) -> bool {
        let mut s = self.state.lock().expect("kinetic state poisoned");
        if s.status == EffectorStatus::Engaged || s.remaining_rounds >= self.config.magazine_capacity {
            return false;
        }
        s.remaining_rounds = self.config.magazine_capacity;
        if s.status == EffectorStatus::Reloading {
            s.status = EffectorStatus::Ready;
            s.deadline_ms = None;
        }
        true
    }

    /// Simulated time-to-intercept for a launch at `distance_m`, clamped to
    /// `[1s, KINETIC_MAX_FLIGHT_MS]`.
    fn flight_ms(distance_m: f64) -> u64 {
        let raw = (distance_m / KINETIC_CLOSING_SPEED_MPS * 1000.0) as u64;
        raw.clamp(1_000, KINETIC_MAX_FLIGHT_MS)
    }
}

impl Effector for KineticInterceptor {
    fn id(&self) -> &EffectorId {
        &self.id
    }

    fn effector_type(&self) -> EffectorType {
        EffectorType::Kinetic
    }

    fn position(&self) -> GeoPosition {
        self.position
    }

    fn health(&self) -> EffectorHealth {
        let s = self.state.lock().expect("kinetic state poisoned");
        EffectorHealth {
            status: s.status,
            readiness: if s.status == EffectorStatus::Ready && s.remaining_rounds > 0 { 1.0 } else { 0.0 },
            remaining_shots: s.remaining_rounds,
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

    fn is_ready(&self) -> bool {
        let s = self.state.lock().expect("kinetic state poisoned");
        s.status == EffectorStatus::Ready && s.remaining_rounds > 0
    }

    fn initialize(&self, now_ms: TimestampMs) {
        let mut s = self.state.lock().expect("kinetic state poisoned");
        s.status = EffectorStatus::Initializing;
        s.deadline_ms = Some(now_ms + INITIALIZE_MS);
    }

    fn shutdown(&self, _now_ms: TimestampMs) {
        let mut s = self.state.lock().expect("kinetic state poisoned");
        s.status = EffectorStatus::Offline;
        s.phase = Phase::Idle;
        s.deadline_ms = None;
    }

    fn reset(&self, now_ms: TimestampMs) {
        let mut s = self.state.lock().expect("kinetic state poisoned");
        if s.status != EffectorStatus::Fault {
            return;
        }
        s.fault_message = None;
        s.status = EffectorStatus::Initializing;
        s.deadline_ms = Some(now_ms + RESET_MS);
    }

    fn engage(&self, target: GeoPosition, now_ms: TimestampMs) -> Result<(), EffectorError> {
        let distance = self.distance_to(target);
        let mut s = self.state.lock().expect("kinetic state poisoned");
        if s.status != EffectorStatus::Ready || s.remaining_rounds <= 0 {
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
        s.phase = Phase::Arming;
        s.deadline_ms = Some(now_ms + KINETIC_ARMING_MS);
        s.engaged_distance_m = distance;
        s.last_intercept_success = None;
        s.total_engagements += 1;
        s.last_engagement_time = Some(now_ms);
        Ok(())
    }

    /// Only effective during `Arming`; once a round has launched it cannot
    /// be recalled and this becomes a no-op.
    fn disengage(&self, _now_ms: TimestampMs) {
        let mut s = self.state.lock().expect("kinetic state poisoned");
        if s.phase != Phase::Arming {
            return;
        }
        s.phase = Phase::Idle;
        s.status = EffectorStatus::Ready;
        s.deadline_ms = None;
    }

    fn tick(&self, now_ms: TimestampMs) {
        let mut s = self.state.lock().expect("kinetic state poisoned");
        let Some(deadline) = s.deadline_ms else { return };
        if now_ms < deadline {
            return;
        }
        match s.status {
            EffectorStatus::Initializing => {
                s.status = EffectorStatus::Ready;
                s.deadline_ms = None;
            }
            EffectorStatus::Reloading => {
                s.status = EffectorStatus::Ready;
                s.deadline_ms = None;
                s.remaining_rounds = self.config.magazine_capacity;
            }
            EffectorStatus::Engaged => match s.phase {
                Phase::Arming => {
                    s.phase = Phase::Launching;
                    s.deadline_ms = Some(now_ms + KINETIC_LAUNCH_MS);
                }
                Phase::Launching => {
                    s.remaining_rounds -= 1;
                    s.phase = Phase::InFlight;
                    s.deadline_ms = Some(now_ms + Self::flight_ms(s.engaged_distance_m));
                }
                Phase::InFlight => {
                    s.phase = Phase::Terminal;
                    s.deadline_ms = Some(now_ms + KINETIC_TERMINAL_MS);
                }
                Phase::Terminal => {
                    let roll: f64 = self.rng.lock().expect("kinetic rng poisoned").gen();
                    s.last_intercept_success = Some(roll < self.config.intercept_probability);
                    s.phase = Phase::Complete;
                    s.deadline_ms = Some(now_ms + KINETIC_COMPLETE_MS);
                }
                Phase::Complete => {
                    s.phase = Phase::Idle;
                    if s.remaining_rounds > 0 {
                        s.status = EffectorStatus::Ready;
                        s.deadline_ms = None;
                    } else {
                        s.status = EffectorStatus::Reloading;
                        s.deadline_ms = Some(now_ms + self.config.reload_ms);
                    }
                }
                Phase::Idle => {}
            },
            _ => {}
        }
    }

    fn report_fault(&self, message: String) {
        let mut s = self.state.lock().expect("kinetic state poisoned");
        s.status = EffectorStatus::Fault;
        s.phase = Phase::Idle;
        s.deadline_ms = None;
        s.fault_message = Some(message);
    }
}
