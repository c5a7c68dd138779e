//! Continuous per-track threat scoring and alert generation.
//!
//! The composite score blends proximity to the nearest defended asset,
//! closing speed, detection-source diversity and warning-radius dwell
//! time, then applies a classification multiplier (hostile boosts,
//! friendly zeros) before discretizing to the 0-5 integer level the
//! track manager stores. Alerts fire on upward level transitions and on
//! zone-of-asset entry, never on de-escalation.

use cuas_core::config::ThreatAssessorConfig;
use cuas_core::constants::*;
use cuas_core::enums::{AlertSeverity, Classification};
use cuas_core::events::{AlertRecord, Event, EventSink};
use cuas_core::ports::{Clock, LogSink};
use cuas_core::sched::PeriodicTask;
use cuas_core::types::{AlertId, GeoPosition, TimestampMs, TrackId};
use cuas_geo::geodesy;
use cuas_track::TrackManager;

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

/// A fixed installation the assessor protects. Mutable only through this
/// crate's CRUD surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefendedAsset {
    pub id: String,
    pub name: String,
    pub position: GeoPosition,
    pub critical_radius_m: f64,
    pub warning_radius_m: f64,
    pub priority: u8,
}

/// Snapshot of fleet-wide threat posture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThreatMetrics {
    pub hostile_count: usize,
    pub high_threat_count: usize,
    pub critical_count: usize,
    pub avg_threat: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    None,
    Warning,
    Critical,
}

struct TrackScoringState {
    last_level: u8,
    zone: Zone,
    warning_since_ms: Option<TimestampMs>,
}

impl Default for TrackScoringState {
    fn default() -> Self {
        Self { last_level: 0, zone: Zone::None, warning_since_ms: None }
    }
}

pub struct ThreatAssessor {
    tracks: Arc<TrackManager>,
    assets: RwLock<HashMap<String, DefendedAsset>>,
    alerts: Mutex<VecDeque<AlertRecord>>,
    next_alert_id: AtomicU64,
    scoring: Mutex<HashMap<TrackId, TrackScoringState>>,
    config: RwLock<ThreatAssessorConfig>,
    clock: Arc<dyn Clock>,
    log: Arc<dyn LogSink>,
    events: Arc<dyn EventSink>,
    cycle: Mutex<Option<PeriodicTask>>,
}

impl ThreatAssessor {
    pub fn new(
        tracks: Arc<TrackManager>,
        config: ThreatAssessorConfig,
        clock: Arc<dyn Clock>,
        log: Arc<dyn LogSink>,
        events: Arc<dyn EventSink>,
    ) -> Arc<Self> {
        Arc::new(Self {
            tracks,
            assets: RwLock::new(HashMap::new()),
            alerts: Mutex::new(VecDeque::new()),
            next_alert_id: AtomicU64::new(1),
            scoring: Mutex::new(HashMap::new()),
            config: RwLock::new(config),
            clock,
            log,
            events,
            cycle: Mutex::new(None),
        })
    }

    pub fn config(&self) -> ThreatAssessorConfig {
        self.config.read().expect("threat config poisoned").clone()
    }

    pub fn set_config(&self, config: ThreatAssessorConfig) {
        *self.config.write().expect("threat config poisoned") = config;
    }

    pub fn start(self: &Arc<Self>) {
        let mut guard = self.cycle.lock().expect("cycle handle poisoned");
        if guard.is_some() {
            return;
        }
        let rate_hz = self.config().score_rate_hz;
        let assessor = Arc::clone(self);
        *guard = Some(PeriodicTask::spawn("threat-cycle", rate_hz, move || assessor.run_cycle()));
    }

    pub fn stop(&self) {
        if let Some(task) = self.cycle.lock().expect("cycle handle poisoned").take() {
            task.stop();
        }
    }

    // --- defended asset CRUD --------------------------------------------

    pub fn add_defended_asset(&self, asset: DefendedAsset) {
        self.assets.write().expect("assets poisoned").insert(asset.id.clone(), asset);
    }

    pub fn remove_defended_asset(&self, id: &str) -> Option<DefendedAsset> {
        self.assets.write().expect("assets poisoned").remove(id)
    }

    pub fn defended_asset(&self, id: &str) -> Option<DefendedAsset> {
        self.assets.read().expect("assets poisoned").get(id).cloned()
    }

    pub fn defended_assets(&self) -> Vec<DefendedAsset> {
        self.assets.read().expect("assets poisoned").values().cloned().collect()
    }

    // --- alert history ----------------------------------------------------

    pub fn alerts(&self) -> Vec<AlertRecord> {
        self.alerts.lock().expect("alerts poisoned").iter().cloned().collect()
    }

    fn push_alert(&self, record: AlertRecord) {
        let cap = self.config().alert_history_capacity;
        let mut alerts = self.alerts.lock().expect("alerts poisoned");
        if alerts.len() >= cap {
            alerts.pop_front();
        }
        alerts.push_back(record.clone());
        drop(alerts);
        self.events.emit(Event::Alert(record));
    }

    fn next_alert_id(&self) -> AlertId {
        AlertId(self.next_alert_id.fetch_add(1, Ordering::SeqCst))
    }

    // --- metrics ------------------------------------------------------------

    pub fn metrics(&self) -> ThreatMetrics {
        let tracks = self.tracks.all();
        let hostile_count = tracks.iter().filter(|t| t.classification == Classification::Hostile).count();
        let high_threat_count = tracks.iter().filter(|t| t.is_high_threat()).count();
        let scoring = self.scoring.lock().expect("scoring poisoned");
        let critical_count = tracks
            .iter()
            .filter(|t| matches!(scoring.get(&t.id), Some(s) if s.zone == Zone::Critical))
            .count();
        drop(scoring);
        let avg_threat = if tracks.is_empty() {
            0.0
        } else {
            tracks.iter().map(|t| t.threat_level as f64).sum::<f64>() / tracks.len() as f64
        };
        ThreatMetrics { hostile_count, high_threat_count, critical_count, avg_threat }
    }

    // --- scoring cycle --------------------------------------------------------

    fn run_cycle(&self) {
        let now = self.clock.now_ms();
        let assets = self.defended_assets();
        for track in self.tracks.all() {
            if track.is_dropped() {
                continue;
            }
            let nearest = nearest_asset(&assets, &track.position);

            let proximity_score = nearest.map_or(0.0, |(asset, distance)| {
                proximity_score(distance, asset.critical_radius_m, asset.warning_radius_m)
            });
            let closure_score = nearest.map_or(0.0, |(asset, _)| {
                closure_score(track.position, track.velocity, asset.position)
            });
            let diversity_score = (track.sources.len() as f64 / 3.0).min(1.0);

            let zone = nearest.map_or(Zone::None, |(asset, distance)| {
                if distance <= asset.critical_radius_m {
                    Zone::Critical
                } else if distance <= asset.warning_radius_m {
                    Zone::Warning
                } else {
                    Zone::None
                }
            });

            let mut scoring = self.scoring.lock().expect("scoring poisoned");
            let state = scoring.entry(track.id).or_default();
            if zone == Zone::Warning || zone == Zone::Critical {
                state.warning_since_ms.get_or_insert(now);
            } else {
                state.warning_since_ms = None;
            }
            let dwell_ms = state.warning_since_ms.map_or(0, |since| now.saturating_sub(since));
            let dwell_score = (dwell_ms as f64 / THREAT_MAX_WARNING_DWELL_MS as f64).min(1.0);

            let base = proximity_score * THREAT_WEIGHT_PROXIMITY
                + closure_score * THREAT_WEIGHT_CLOSURE
                + diversity_score * THREAT_WEIGHT_DIVERSITY
                + dwell_score * THREAT_WEIGHT_WARNING_DWELL;

            let multiplier = classification_multiplier(track.classification);
            let composite = (base * multiplier).clamp(0.0, 1.0);
            let level = ((composite * 5.0).round() as i64).clamp(0, 5) as u8;

            let old_level = state.last_level;
            let old_zone = state.zone;
            state.last_level = level;
            state.zone = zone;
            let asset_breach = nearest.filter(|_| zone != old_zone && zone != Zone::None).map(|(a, _)| a.clone());
            drop(scoring);

            self.tracks.set_threat(track.id, level);

            if level > old_level {
                let severity = severity_for(level);
                let record = AlertRecord {
                    id: self.next_alert_id(),
                    track_id: track.id,
                    timestamp_ms: now,
                    severity,
                    message: format!("{} threat level raised to {level}", track.id),
                    asset_id: None,
                };
                self.push_alert(record);
            }

            if let Some(asset) = asset_breach {
                let severity = if zone == Zone::Critical { AlertSeverity::Critical } else { AlertSeverity::Warn };
                let record = AlertRecord {
                    id: self.next_alert_id(),
                    track_id: track.id,
                    timestamp_ms: now,
                    severity,
                    message: format!("{} entered {:?} radius of {}", track.id, zone, asset.name),
                    asset_id: Some(asset.id.clone()),
                };
                self.push_alert(record);
            }
        }
    }
}

fn nearest_asset<'a>(assets: &'a [DefendedAsset], position: &GeoPosition) -> Option<(&'a DefendedAsset, f64)> {
    assets
        .iter()
        .map(|a| (a, geodesy::distance(&a.position, position)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

fn proximity_score(distance: f64, critical_radius_m: f64, warning_radius_m: f64) -> f64 {
    if distance <= critical_radius_m {
        1.0
    } else if distance <= warning_radius_m {
        let span = (warning_radius_m - critical_radius_m).max(1e-6);
        (warning_radius_m - distance) / span
    } else {
        0.0
    }
}

fn closure_score(position: GeoPosition, velocity: cuas_core::types::NedVelocity, asset: GeoPosition) -> f64 {
    let bearing_rad = geodesy::bearing(&position, &asset).to_radians();
    let closing_mps = velocity.north_mps * bearing_rad.cos() + velocity.east_mps * bearing_rad.sin();
    (closing_mps / THREAT_MAX_CLOSURE_MPS).clamp(0.0, 1.0)
}

fn classification_multiplier(classification: Classification) -> f64 {
    match classification {
        Classification::Hostile => THREAT_CLASSIFICATION_MULTIPLIER_HOSTILE,
        Classification::Unknown => THREAT_CLASSIFICATION_MULTIPLIER_UNKNOWN,
        Classification::Pending => THREAT_CLASSIFICATION_MULTIPLIER_PENDING,
        Classification::Neutral => THREAT_CLASSIFICATION_MULTIPLIER_NEUTRAL,
        Classification::Friendly => THREAT_CLASSIFICATION_MULTIPLIER_FRIENDLY,
    }
}

fn severity_for(level: u8) -> AlertSeverity {
    if level >= 4 {
        AlertSeverity::Critical
    } else if level >= 2 {
        AlertSeverity::Warn
    } else {
        AlertSeverity::Info
    }
}
