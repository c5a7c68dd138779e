//! Correlation, lifecycle and concurrent access for the track table.
//!
//! A single `RwLock` guards both the track table and the Kalman filter
//! table, matching §4.3's "a single shared lock protects the track table
//! and the filter table." Readers (queries) run concurrently; every
//! mutator takes the write half, mutates, drops the guard, and only then
//! emits events — so a subscriber can never re-enter under the lock.

use cuas_core::config::TrackManagerConfig;
use cuas_core::constants::*;
use cuas_core::enums::{Classification, DetectionSource, LogLevel, TrackLifecycle};
use cuas_core::events::{Event, EventSink, TrackEvent};
use cuas_core::ports::{Clock, LogSink};
use cuas_core::sched::PeriodicTask;
use cuas_core::types::{BoundingBox, GeoPosition, NedVelocity, TimestampMs, TrackId};
use cuas_geo::geodesy;
use cuas_geo::kalman::{KalmanFilter2D, KalmanNoise};

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::track::Track;

struct Tables {
    tracks: HashMap<TrackId, Track>,
    filters: HashMap<TrackId, KalmanFilter2D>,
}

impl Tables {
    fn new() -> Self {
        Self { tracks: HashMap::new(), filters: HashMap::new() }
    }
}

/// Owns every live track and its Kalman filter, and drives the periodic
/// lifecycle cycle. Addressed everywhere else by [`TrackId`] — tracks
/// themselves never leave this type except as snapshots.
pub struct TrackManager {
    tables: RwLock<Tables>,
    next_id: AtomicU64,
    config: RwLock<TrackManagerConfig>,
    clock: Arc<dyn Clock>,
    log: Arc<dyn LogSink>,
    events: Arc<dyn EventSink>,
    cycle: Mutex<Option<PeriodicTask>>,
}

impl TrackManager {
    pub fn new(
        config: TrackManagerConfig,
        clock: Arc<dyn Clock>,
        log: Arc<dyn LogSink>,
        events: Arc<dyn EventSink>,
    ) -> Arc<Self> {
        Arc::new(Self {
            tables: RwLock::new(Tables::new()),
            next_id: AtomicU64::new(1),
            config: RwLock::new(config),
            clock,
            log,
            events,
            cycle: Mutex::new(None),
        })
    }

    pub fn config(&self) -> TrackManagerConfig {
        self.config.read().expect("tracks config poisoned").clone()
    }

    pub fn set_config(&self, config: TrackManagerConfig) {
        *self.config.write().expect("tracks config poisoned") = config;
    }

    /// Starts the periodic lifecycle cycle at the configured rate. A
    /// second call while already running is a no-op.
    pub fn start(self: &Arc<Self>) {
        let mut guard = self.cycle.lock().expect("cycle handle poisoned");
        if guard.is_some() {
            return;
        }
        let rate_hz = self.config().update_rate_hz;
        let mgr = Arc::clone(self);
        *guard = Some(PeriodicTask::spawn("track-cycle", rate_hz, move || mgr.run_cycle()));
    }

    pub fn stop(&self) {
        if let Some(task) = self.cycle.lock().expect("cycle handle poisoned").take() {
            task.stop();
        }
    }

    // --- mutators -------------------------------------------------------

    /// Creates a new track. Returns `None` (issuing no id) if `maxTracks`
    /// has been reached.
    pub fn create(&self, pos: GeoPosition, source: DetectionSource) -> Option<TrackId> {
        let now = self.clock.now_ms();
        let cfg = self.config();
        let mut tables = self.tables.write().expect("tracks poisoned");
        if tables.tracks.len() >= cfg.max_tracks {
            drop(tables);
            self.log.log(LogLevel::Warn, "maximum track limit reached");
            return None;
        }
        let id = TrackId(self.next_id.fetch_add(1, Ordering::SeqCst));
        tables.tracks.insert(id, Track::new(id, pos, source, now));
        if cfg.enable_kalman_filter {
            tables.filters.insert(id, KalmanFilter2D::seed(pos, KalmanNoise::default()));
        }
        drop(tables);
        self.events.emit(Event::Track(TrackEvent::Created { track_id: id }));
        Some(id)
    }

    /// Applies a fresh position measurement. No-op if `id` is unknown or
    /// already `Dropped`.
    pub fn update(&self, id: TrackId, pos: GeoPosition) {
        let now = self.clock.now_ms();
        let enable_kalman = self.config().enable_kalman_filter;
        let mut tables = self.tables.write().expect("tracks poisoned");
        let Some(last_update_ms) = tables.tracks.get(&id).filter(|t| !t.is_dropped()).map(|t| t.last_update_ms) else {
            return;
        };
        let filtered = if enable_kalman {
            let dt = now.saturating_sub(last_update_ms) as f64 / 1000.0;
            let filter = tables
                .filters
                .entry(id)
                .or_insert_with(|| KalmanFilter2D::seed(pos, KalmanNoise::default()));
            if dt > 0.0 {
                filter.predict(dt);
            }
            filter.update(&pos);
            filter.position()
        } else {
            pos
        };
        tables.tracks.get_mut(&id).expect("checked live above").apply_measurement(filtered, now);
        drop(tables);
        self.events.emit(Event::Track(TrackEvent::Updated { track_id: id }));
    }

    /// Sets the engaged flag. Used by the engagement manager to mark a
    /// track as targeted while a non-terminal engagement selects it, and
    /// to clear it again on finalization. No-op on unknown or dropped
    /// tracks (dropped tracks may still have `engaged` cleared, per the
    /// terminal-state invariant in §3).
    pub fn set_engaged(&self, id: TrackId, engaged: bool) {
        let mut tables = self.tables.write().expect("tracks poisoned");
        let Some(track) = tables.tracks.get_mut(&id) else { return };
        if track.is_dropped() && engaged {
            return;
        }
        track.engaged = engaged;
    }

    pub fn update_velocity(&self, id: TrackId, velocity: NedVelocity) {
        let mut tables = self.tables.write().expect("tracks poisoned");
        let Some(track) = tables.tracks.get_mut(&id) else { return };
        if track.is_dropped() {
            return;
        }
        track.velocity = velocity;
        drop(tables);
        self.events.emit(Event::Track(TrackEvent::Updated { track_id: id }));
    }

    pub fn classify(&self, id: TrackId, classification: Classification, confidence: f64) {
        let mut tables = self.tables.write().expect("tracks poisoned");
        let Some(track) = tables.tracks.get_mut(&id) else { return };
        if track.is_dropped() {
            return;
        }
        track.classification = classification;
        track.classification_confidence = confidence.clamp(0.0, 1.0);
        drop(tables);
        self.events.emit(Event::Track(TrackEvent::ClassificationChanged {
            track_id: id,
            classification,
        }));
    }

    /// Sets the threat level. Emits `high_threat_detected` only when the
    /// new level is `>= HIGH_THREAT_LEVEL` *and* strictly greater than the
    /// level it replaces (open question in §9, decided: no re-emission on
    /// a same-level re-set).
    pub fn set_threat(&self, id: TrackId, level: u8) {
        let mut tables = self.tables.write().expect("tracks poisoned");
        let Some(track) = tables.tracks.get_mut(&id) else { return };
        if track.is_dropped() {
            return;
        }
        let old_level = track.threat_level;
        track.threat_level = level;
        drop(tables);
        self.events.emit(Event::Track(TrackEvent::ThreatLevelChanged { track_id: id, level }));
        if level >= HIGH_THREAT_LEVEL && level > old_level {
            self.events.emit(Event::Track(TrackEvent::HighThreatDetected { track_id: id, level }));
        }
    }

    /// Marks a track `Dropped`. Idempotent; a no-op for unknown ids.
    pub fn drop_track(&self, id: TrackId) {
        let mut tables = self.tables.write().expect("tracks poisoned");
        let Some(track) = tables.tracks.get_mut(&id) else { return };
        if track.is_dropped() {
            return;
        }
        track.lifecycle = TrackLifecycle::Dropped;
        track.engaged = false;
        drop(tables);
        self.events
            .emit(Event::Track(TrackEvent::StateChanged { track_id: id, state: TrackLifecycle::Dropped }));
        self.events.emit(Event::Track(TrackEvent::Dropped { track_id: id }));
    }

    /// `dst` absorbs `src`'s detection-source set; `src` is dropped. Per
    /// §9's decided open question, position history and classification are
    /// *not* transferred — only the source set.
    pub fn merge(&self, src: TrackId, dst: TrackId) {
        let mut tables = self.tables.write().expect("tracks poisoned");
        if tables.tracks.get(&dst).map(|t| t.is_dropped()).unwrap_or(true) {
            return;
        }
        let Some(source_track) = tables.tracks.get(&src) else { return };
        if source_track.is_dropped() {
            return;
        }
        let sources: Vec<DetectionSource> = source_track.sources.clone();
        for s in sources {
            tables.tracks.get_mut(&dst).expect("checked above").add_source(s);
        }
        tables.tracks.get_mut(&src).expect("checked above").lifecycle = TrackLifecycle::Dropped;
        drop(tables);
        self.events
            .emit(Event::Track(TrackEvent::StateChanged { track_id: src, state: TrackLifecycle::Dropped }));
        self.events.emit(Event::Track(TrackEvent::Dropped { track_id: src }));
    }

    /// Removes every `Dropped` track and its filter.
    pub fn prune_dropped(&self) {
        let mut tables = self.tables.write().expect("tracks poisoned");
        let dropped: Vec<TrackId> = tables
            .tracks
            .iter()
            .filter(|(_, t)| t.is_dropped())
            .map(|(id, _)| *id)
            .collect();
        for id in &dropped {
            tables.tracks.remove(id);
            tables.filters.remove(id);
        }
        let n = dropped.len();
        drop(tables);
        if n > 0 {
            self.log.log(LogLevel::Info, &format!("pruned {n} dropped track(s)"));
        }
    }

    // --- detection ingress -----------------------------------------------

    pub fn ingest_radar(&self, pos: GeoPosition, vel: NedVelocity, quality: f64, t_ms: TimestampMs) {
        let _ = t_ms;
        match self.correlate(pos, vel) {
            Some(id) => {
                self.update(id, pos);
                self.update_velocity(id, vel);
                self.add_source(id, DetectionSource::Radar);
                self.bump_quality(id, quality);
            }
            None => {
                if let Some(id) = self.create(pos, DetectionSource::Radar) {
                    self.update_velocity(id, vel);
                    self.bump_quality(id, quality);
                }
            }
        }
    }

    pub fn ingest_rf(&self, pos: GeoPosition, signal_strength: f64, t_ms: TimestampMs) {
        let _ = t_ms;
        match self.correlate(pos, NedVelocity::ZERO) {
            Some(id) => {
                self.update(id, pos);
                self.add_source(id, DetectionSource::Rf);
                if signal_strength > RF_HOSTILE_PROMOTION_STRENGTH {
                    let pending = matches!(self.get(id), Some(t) if t.classification == Classification::Pending);
                    if pending {
                        self.classify(id, Classification::Hostile, RF_HOSTILE_PROMOTION_CONFIDENCE);
                    }
                }
            }
            None => {
                self.create(pos, DetectionSource::Rf);
            }
        }
    }

    pub fn ingest_camera(
        &self,
        camera_id: &str,
        bounding_box: BoundingBox,
        estimated_pos: GeoPosition,
        t_ms: TimestampMs,
    ) {
        let _ = t_ms;
        match self.correlate(estimated_pos, NedVelocity::ZERO) {
            Some(id) => {
                self.set_camera_evidence(id, camera_id, bounding_box);
                self.add_source(id, DetectionSource::Camera);
            }
            None => {
                if let Some(id) = self.create(estimated_pos, DetectionSource::Camera) {
                    self.set_camera_evidence(id, camera_id, bounding_box);
                }
            }
        }
    }

    /// Generic dispatcher. Camera detections carry a bounding box and
    /// camera id that this signature has no room for, so — matching the
    /// source's own generic sensor-data entry point — only radar and RF
    /// are reachable here; route camera detections through
    /// [`Self::ingest_camera`] directly.
    pub fn ingest(&self, source: DetectionSource, pos: GeoPosition, vel: NedVelocity, t_ms: TimestampMs) {
        match source {
            DetectionSource::Radar => self.ingest_radar(pos, vel, 0.8, t_ms),
            DetectionSource::Rf => self.ingest_rf(pos, 0.5, t_ms),
            DetectionSource::Camera => {}
        }
    }

    fn add_source(&self, id: TrackId, source: DetectionSource) {
        let mut tables = self.tables.write().expect("tracks poisoned");
        if let Some(track) = tables.tracks.get_mut(&id) {
            if !track.is_dropped() {
                track.add_source(source);
            }
        }
    }

    fn bump_quality(&self, id: TrackId, quality: f64) {
        let mut tables = self.tables.write().expect("tracks poisoned");
        if let Some(track) = tables.tracks.get_mut(&id) {
            if !track.is_dropped() {
                track.quality = track.quality.max(quality.clamp(0.0, 1.0));
            }
        }
    }

    fn set_camera_evidence(&self, id: TrackId, camera_id: &str, bbox: BoundingBox) {
        let mut tables = self.tables.write().expect("tracks poisoned");
        if let Some(track) = tables.tracks.get_mut(&id) {
            if !track.is_dropped() {
                track.associated_camera_id = Some(camera_id.to_string());
                track.bounding_box = Some(bbox);
                track.visually_tracked = true;
            }
        }
    }

    /// Correlation score against every live track; the best scorer above
    /// `CORRELATION_ACCEPT_THRESHOLD` wins, ties broken by lower
    /// last-update age.
    fn correlate(&self, pos: GeoPosition, vel: NedVelocity) -> Option<TrackId> {
        let now = self.clock.now_ms();
        let cfg = self.config();
        let tables = self.tables.read().expect("tracks poisoned");
        let mut best: Option<(TrackId, f64, u64)> = None;
        for (id, track) in tables.tracks.iter() {
            if track.is_dropped() {
                continue;
            }
            let score = correlation_score(track, pos, vel, now, &cfg);
            let age = track.age_ms(now);
            let better = match &best {
                None => score > CORRELATION_ACCEPT_THRESHOLD,
                Some((_, best_score, best_age)) => {
                    score > CORRELATION_ACCEPT_THRESHOLD
                        && (score > *best_score || (score == *best_score && age < *best_age))
                }
            };
            if better {
                best = Some((*id, score, age));
            }
        }
        best.map(|(id, _, _)| id)
    }

    // --- queries ----------------------------------------------------------

    pub fn len(&self) -> usize {
        self.tables.read().expect("tracks poisoned").tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: TrackId) -> Option<Track> {
        self.tables.read().expect("tracks poisoned").tracks.get(&id).cloned()
    }

    pub fn all(&self) -> Vec<Track> {
        self.tables.read().expect("tracks poisoned").tracks.values().cloned().collect()
    }

    pub fn by_classification(&self, classification: Classification) -> Vec<Track> {
        self.tables
            .read()
            .expect("tracks poisoned")
            .tracks
            .values()
            .filter(|t| !t.is_dropped() && t.classification == classification)
            .cloned()
            .collect()
    }

    /// Tracks at or above `min_level`, sorted by threat level descending.
    pub fn by_threat(&self, min_level: u8) -> Vec<Track> {
        let mut out: Vec<Track> = self
            .tables
            .read()
            .expect("tracks poisoned")
            .tracks
            .values()
            .filter(|t| !t.is_dropped() && t.threat_level >= min_level)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.threat_level.cmp(&a.threat_level));
        out
    }

    pub fn within_radius(&self, center: GeoPosition, radius_m: f64) -> Vec<Track> {
        self.tables
            .read()
            .expect("tracks poisoned")
            .tracks
            .values()
            .filter(|t| !t.is_dropped() && geodesy::distance(&center, &t.position) <= radius_m)
            .cloned()
            .collect()
    }

    pub fn hostile(&self) -> Vec<Track> {
        self.by_classification(Classification::Hostile)
    }

    pub fn pending(&self) -> Vec<Track> {
        self.by_classification(Classification::Pending)
    }

    /// The hostile, non-dropped track with the highest threat level, if any
    /// have a nonzero level.
    pub fn highest_threat(&self) -> Option<Track> {
        self.tables
            .read()
            .expect("tracks poisoned")
            .tracks
            .values()
            .filter(|t| !t.is_dropped() && t.classification == Classification::Hostile)
            .max_by_key(|t| t.threat_level)
            .filter(|t| t.threat_level > 0)
            .cloned()
    }

    pub fn high_threat_set(&self) -> Vec<Track> {
        self.tables
            .read()
            .expect("tracks poisoned")
            .tracks
            .values()
            .filter(|t| !t.is_dropped() && t.is_high_threat())
            .cloned()
            .collect()
    }

    // --- periodic cycle -----------------------------------------------------

    /// Runs one lifecycle pass immediately, independent of `start`'s
    /// background cadence. Exposed publicly so embedders and tests can
    /// drive deterministic lifecycle transitions against a manual clock
    /// without spinning up the periodic thread.
    pub fn run_cycle(&self) {
        let now = self.clock.now_ms();
        let cfg = self.config();
        let mut transitions: Vec<(TrackId, TrackLifecycle)> = Vec::new();
        let mut dropped: Vec<TrackId> = Vec::new();

        {
            let mut tables = self.tables.write().expect("tracks poisoned");
            for track in tables.tracks.values_mut() {
                if track.is_dropped() {
                    continue;
                }
                let age = track.age_ms(now);
                match track.lifecycle {
                    TrackLifecycle::Active => {
                        if age > cfg.coasting_timeout_ms {
                            track.lifecycle = TrackLifecycle::Coasting;
                            track.coast_count += 1;
                            transitions.push((track.id, TrackLifecycle::Coasting));
                        }
                    }
                    TrackLifecycle::Coasting => {
                        if age > cfg.drop_timeout_ms || track.coast_count > cfg.max_coast_count {
                            track.lifecycle = TrackLifecycle::Dropped;
                            transitions.push((track.id, TrackLifecycle::Dropped));
                            dropped.push(track.id);
                        } else {
                            track.coast_count += 1;
                        }
                    }
                    TrackLifecycle::Initiated => {
                        if age < cfg.coasting_timeout_ms {
                            track.lifecycle = TrackLifecycle::Active;
                            transitions.push((track.id, TrackLifecycle::Active));
                        }
                    }
                    TrackLifecycle::Dropped => {}
                }
            }
        }

        for (id, state) in transitions {
            self.events.emit(Event::Track(TrackEvent::StateChanged { track_id: id, state }));
            if state == TrackLifecycle::Dropped {
                self.events.emit(Event::Track(TrackEvent::Dropped { track_id: id }));
            }
        }
        let _ = dropped;
    }
}

/// Correlation score in `[0, 1]`: `0.5` distance + `0.3` velocity + `0.2`
/// recency, evaluated against one candidate track.
fn correlation_score(
    track: &Track,
    pos: GeoPosition,
    vel: NedVelocity,
    now_ms: TimestampMs,
    cfg: &TrackManagerConfig,
) -> f64 {
    let distance = geodesy::distance(&track.position, &pos);
    let distance_score = if distance > cfg.correlation_distance_m {
        0.0
    } else {
        1.0 - distance / cfg.correlation_distance_m
    };

    let delta_v = track.velocity.delta(&vel);
    let velocity_score = if delta_v > cfg.correlation_velocity_mps {
        0.5
    } else {
        1.0 - delta_v / (2.0 * cfg.correlation_velocity_mps)
    };

    let age = track.age_ms(now_ms) as f64;
    let recency_score = if age > cfg.coasting_timeout_ms as f64 {
        0.3
    } else {
        1.0 - (age / cfg.coasting_timeout_ms as f64) * 0.5
    };

    distance_score * CORRELATION_WEIGHT_DISTANCE
        + velocity_score * CORRELATION_WEIGHT_VELOCITY
        + recency_score * CORRELATION_WEIGHT_RECENCY
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuas_core::events::RecordingEventSink;
    use cuas_core::ports::{ManualClock, NullLogSink};

    fn manager(cfg: TrackManagerConfig) -> (Arc<TrackManager>, Arc<ManualClock>, Arc<RecordingEventSink>) {
        let clock = Arc::new(ManualClock::new(0));
        let events = Arc::new(RecordingEventSink::new());
        let mgr = TrackManager::new(cfg, clock.clone(), Arc::new(NullLogSink), events.clone());
        (mgr, clock, events)
    }

    fn pos() -> GeoPosition {
        GeoPosition::new(34.0525, -118.2440, 100.0)
    }

    #[test]
    fn test_create_rejects_beyond_max_tracks() {
        let mut cfg = TrackManagerConfig::default();
        cfg.max_tracks = 1;
        let (mgr, _clock, _events) = manager(cfg);
        assert!(mgr.create(pos(), DetectionSource::Radar).is_some());
        assert!(mgr.create(pos(), DetectionSource::Radar).is_none());
    }

    #[test]
    fn test_update_unknown_id_is_silent_no_op() {
        let (mgr, _clock, events) = manager(TrackManagerConfig::default());
        mgr.update(TrackId(999), pos());
        assert!(events.drain().is_empty());
    }

    #[test]
    fn test_update_on_dropped_track_is_no_op() {
        let (mgr, _clock, events) = manager(TrackManagerConfig::default());
        let id = mgr.create(pos(), DetectionSource::Radar).unwrap();
        mgr.drop_track(id);
        events.drain();
        mgr.update(id, pos());
        assert!(events.drain().is_empty());
    }

    #[test]
    fn test_radar_correlation_reuses_existing_track() {
        let (mgr, _clock, _events) = manager(TrackManagerConfig::default());
        mgr.ingest_radar(pos(), NedVelocity::new(10.0, 0.0, 0.0), 0.8, 0);
        assert_eq!(mgr.len(), 1);
        let nearby = GeoPosition::new(34.05251, -118.24401, 100.0);
        mgr.ingest_rf(nearby, 0.8, 500);
        assert_eq!(mgr.len(), 1, "RF detection near the radar track should correlate, not create");
        let track = mgr.all().into_iter().next().unwrap();
        assert!(track.sources.contains(&DetectionSource::Radar));
        assert!(track.sources.contains(&DetectionSource::Rf));
        assert_eq!(track.classification, Classification::Hostile);
        assert_eq!(track.classification_confidence, RF_HOSTILE_PROMOTION_CONFIDENCE);
    }

    #[test]
    fn test_far_rf_detection_creates_new_track() {
        let (mgr, _clock, _events) = manager(TrackManagerConfig::default());
        mgr.create(pos(), DetectionSource::Radar);
        let far = GeoPosition::new(34.08, -118.24, 100.0);
        mgr.ingest_rf(far, 0.8, 0);
        assert_eq!(mgr.len(), 2);
    }

    #[test]
    fn test_set_threat_emits_high_threat_only_on_strict_increase() {
        let (mgr, _clock, events) = manager(TrackManagerConfig::default());
        let id = mgr.create(pos(), DetectionSource::Radar).unwrap();
        mgr.classify(id, Classification::Hostile, 0.9);
        events.drain();

        mgr.set_threat(id, 4);
        let evts = events.drain();
        assert!(evts.iter().any(|e| matches!(e, Event::Track(TrackEvent::HighThreatDetected { .. }))));

        mgr.set_threat(id, 4);
        let evts = events.drain();
        assert!(!evts.iter().any(|e| matches!(e, Event::Track(TrackEvent::HighThreatDetected { .. }))));
    }

    #[test]
    fn test_lifecycle_initiated_to_active_to_coasting_to_dropped() {
        let mut cfg = TrackManagerConfig::default();
        cfg.coasting_timeout_ms = 200;
        cfg.drop_timeout_ms = 500;
        cfg.max_coast_count = 100;
        let (mgr, clock, events) = manager(cfg);
        let id = mgr.create(pos(), DetectionSource::Radar).unwrap();
        events.drain();

        clock.advance(100);
        mgr.run_cycle();
        assert_eq!(mgr.get(id).unwrap().lifecycle, TrackLifecycle::Active);

        clock.advance(300);
        mgr.run_cycle();
        assert_eq!(mgr.get(id).unwrap().lifecycle, TrackLifecycle::Coasting);

        clock.advance(600);
        mgr.run_cycle();
        assert_eq!(mgr.get(id).unwrap().lifecycle, TrackLifecycle::Dropped);
    }

    #[test]
    fn test_merge_unions_sources_without_touching_dst_classification() {
        let (mgr, _clock, _events) = manager(TrackManagerConfig::default());
        let src = mgr.create(pos(), DetectionSource::Camera).unwrap();
        let dst = mgr.create(pos(), DetectionSource::Radar).unwrap();
        mgr.classify(dst, Classification::Friendly, 0.9);

        mgr.merge(src, dst);

        let dst_track = mgr.get(dst).unwrap();
        assert!(dst_track.sources.contains(&DetectionSource::Camera));
        assert!(dst_track.sources.contains(&DetectionSource::Radar));
        assert_eq!(dst_track.classification, Classification::Friendly);
        assert!(mgr.get(src).unwrap().is_dropped());
    }

    #[test]
    fn test_merge_into_dropped_dst_is_a_no_op() {
        let (mgr, _clock, _events) = manager(TrackManagerConfig::default());
        let src = mgr.create(pos(), DetectionSource::Camera).unwrap();
        let dst = mgr.create(pos(), DetectionSource::Radar).unwrap();
        mgr.drop_track(dst);

        mgr.merge(src, dst);

        assert!(!mgr.get(src).unwrap().is_dropped(), "src must be untouched when dst is already dropped");
        assert!(!mgr.get(dst).unwrap().sources.contains(&DetectionSource::Camera));
    }

    #[test]
    fn test_ingest_camera_sets_visually_tracked() {
        let (mgr, _clock, _events) = manager(TrackManagerConfig::default());
        let bbox = BoundingBox {
            x: 0.4,
            y: 0.4,
            w: 0.1,
            h: 0.1,
            camera_id: "cam-1".into(),
            observed_at_ms: 0,
        };
        mgr.ingest_camera("cam-1", bbox, pos(), 0);

        let track = mgr.all().into_iter().next().unwrap();
        assert!(track.visually_tracked);
        assert_eq!(track.associated_camera_id.as_deref(), Some("cam-1"));
    }

    #[test]
    fn test_prune_dropped_removes_track_and_filter() {
        let (mgr, _clock, _events) = manager(TrackManagerConfig::default());
        let id = mgr.create(pos(), DetectionSource::Radar).unwrap();
        mgr.drop_track(id);
        mgr.prune_dropped();
        assert!(mgr.get(id).is_none());
        assert_eq!(mgr.len(), 0);
    }

    #[test]
    fn test_correlation_boundary_at_exact_distance_threshold() {
        let mut cfg = TrackManagerConfig::default();
        cfg.correlation_distance_m = 100.0;
        let (mgr, _clock, _events) = manager(cfg.clone());
        let origin = GeoPosition::new(0.0, 0.0, 0.0);
        let id = mgr.create(origin, DetectionSource::Radar).unwrap();
        mgr.update_velocity(id, NedVelocity::ZERO);
        let track = mgr.get(id).unwrap();

        let one_degree = 111_000.0;
        let exact = GeoPosition::new(100.0 / one_degree, 0.0, 0.0);
        let score = correlation_score(&track, exact, NedVelocity::ZERO, 0, &cfg);
        // distance component is exactly 0 at the threshold; perfect velocity
        // and recency match still pushes the composite above 0.5.
        assert!(score > 0.5, "score was {score}");

        let beyond = GeoPosition::new(101.0 / one_degree, 0.0, 0.0);
        let score_beyond = correlation_score(&track, beyond, NedVelocity::ZERO, 0, &cfg);
        assert!(score_beyond < score);
    }
}
