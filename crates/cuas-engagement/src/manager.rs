//! The engagement workflow state machine (§4.6/C7).
//!
//! One `Mutex` guards the live workflow (current state, selections, the
//! in-progress record); history and statistics live behind their own
//! locks, mirroring the track manager's "one lock per large structure"
//! discipline. Every mutator collects the events it needs to emit locally,
//! drops its lock, and only then calls into the event sink — the
//! engagement manager holds no effector lock while emitting, either.

use cuas_core::config::EngagementConfig;
use cuas_core::constants::ENGAGEMENT_COMPLETION_CHECK_HZ;
use cuas_core::enums::{BdaResult, Classification, EngagementState, LogLevel, TrackLifecycle};
use cuas_core::events::{Event, EngagementEvent, EventSink, TargetSnapshot};
use cuas_core::ports::{Clock, LogSink};
use cuas_core::sched::PeriodicTask;
use cuas_core::types::{EffectorId, EngagementId, TimestampMs, TrackId};
use cuas_effectors::{recommend_best, Effector};
use cuas_track::TrackManager;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use crate::record::{EngagementRecord, EngagementStats};

/// The live workflow: current state plus whatever selections and
/// in-progress record go with it. Nothing here survives finalization
/// except as a pushed [`EngagementRecord`].
struct Workflow {
    state: EngagementState,
    selected_track: Option<TrackId>,
    selected_effector: Option<EffectorId>,
    record: Option<EngagementRecord>,
    auth_deadline_ms: Option<TimestampMs>,
}

impl Workflow {
    fn idle() -> Self {
        Self {
            state: EngagementState::Idle,
            selected_track: None,
            selected_effector: None,
            record: None,
            auth_deadline_ms: None,
        }
    }

    fn is_terminal(&self) -> bool {
        self.state.is_terminal() || self.state == EngagementState::Idle
    }
}

/// Drives the eleven-state engagement workflow against a registry of
/// effectors and the shared track table. Effectors are registered
/// explicitly; the manager holds only non-owning `Arc` references.
pub struct EngagementManager {
    tracks: Arc<TrackManager>,
    effectors: RwLock<HashMap<EffectorId, Arc<dyn Effector>>>,
    config: RwLock<EngagementConfig>,
    workflow: Mutex<Workflow>,
    history: Mutex<Vec<EngagementRecord>>,
    stats: Mutex<EngagementStats>,
    next_id: AtomicU32,
    clock: Arc<dyn Clock>,
    log: Arc<dyn LogSink>,
    events: Arc<dyn EventSink>,
    cycle: Mutex<Option<PeriodicTask>>,
}

impl EngagementManager {
    pub fn new(
        tracks: Arc<TrackManager>,
        config: EngagementConfig,
        clock: Arc<dyn Clock>,
        log: Arc<dyn LogSink>,
        events: Arc<dyn EventSink>,
    ) -> Arc<Self> {
        Arc::new(Self {
            tracks,
            effectors: RwLock::new(HashMap::new()),
            config: RwLock::new(config),
            workflow: Mutex::new(Workflow::idle()),
            history: Mutex::new(Vec::new()),
            stats: Mutex::new(EngagementStats::default()),
            next_id: AtomicU32::new(1),
            clock,
            log,
            events,
            cycle: Mutex::new(None),
        })
    }

    pub fn config(&self) -> EngagementConfig {
        self.config.read().expect("engagement config poisoned").clone()
    }

    pub fn set_config(&self, config: EngagementConfig) {
        *self.config.write().expect("engagement config poisoned") = config;
    }

    /// Starts the completion-check / authorization-timeout cycle at
    /// `ENGAGEMENT_COMPLETION_CHECK_HZ`. A second call while running is a
    /// no-op.
    pub fn start(self: &Arc<Self>) {
        let mut guard = self.cycle.lock().expect("cycle handle poisoned");
        if guard.is_some() {
            return;
        }
        let mgr = Arc::clone(self);
        *guard = Some(PeriodicTask::spawn("engagement-cycle", ENGAGEMENT_COMPLETION_CHECK_HZ, move || {
            mgr.run_cycle()
        }));
    }

    pub fn stop(&self) {
        if let Some(task) = self.cycle.lock().expect("cycle handle poisoned").take() {
            task.stop();
        }
    }

    // --- effector registry ------------------------------------------------

    pub fn register_effector(&self, effector: Arc<dyn Effector>) {
        self.effectors.write().expect("effectors poisoned").insert(effector.id().clone(), effector);
    }

    pub fn unregister_effector(&self, id: &EffectorId) -> Option<Arc<dyn Effector>> {
        self.effectors.write().expect("effectors poisoned").remove(id)
    }

    pub fn effector(&self, id: &EffectorId) -> Option<Arc<dyn Effector>> {
        self.effectors.read().expect("effectors poisoned").get(id).cloned()
    }

    pub fn effectors(&self) -> Vec<Arc<dyn Effector>> {
        self.effectors.read().expect("effectors poisoned").values().cloned().collect()
    }

    /// Transitions the named effector to `Fault` and aborts any engagement
    /// currently selecting it, per §7's Fault error kind.
    pub fn report_effector_fault(&self, id: &EffectorId, message: String) {
        let now = self.clock.now_ms();
        if let Some(effector) = self.effector(id) {
            effector.report_fault(message);
        }
        let mut workflow = self.workflow.lock().expect("workflow poisoned");
        if workflow.selected_effector.as_ref() == Some(id) && !workflow.is_terminal() {
            let events = self.abort_locked(&mut workflow, "Effector fault".to_string(), now);
            drop(workflow);
            self.emit_all(events);
        }
    }

    // --- queries -----------------------------------------------------------

    pub fn state(&self) -> EngagementState {
        self.workflow.lock().expect("workflow poisoned").state
    }

    pub fn selected_track(&self) -> Option<TrackId> {
        self.workflow.lock().expect("workflow poisoned").selected_track
    }

    pub fn selected_effector(&self) -> Option<EffectorId> {
        self.workflow.lock().expect("workflow poisoned").selected_effector.clone()
    }

    pub fn current_record(&self) -> Option<EngagementRecord> {
        self.workflow.lock().expect("workflow poisoned").record.clone()
    }

    pub fn history(&self) -> Vec<EngagementRecord> {
        self.history.lock().expect("history poisoned").clone()
    }

    pub fn stats(&self) -> EngagementStats {
        *self.stats.lock().expect("stats poisoned")
    }

    // --- workflow events -----------------------------------------------------

    /// `select_track` is reachable from any state, including terminal
    /// ones. It aborts a non-terminal engagement on a different track
    /// first, then moves to `TrackSelected` and, if auto-recommend is on,
    /// straight on to `EffectorRecommended`.
    pub fn select_track(&self, track_id: TrackId) {
        let now = self.clock.now_ms();
        let Some(track) = self.tracks.get(track_id) else {
            self.log.log(LogLevel::Warn, &format!("select_track: unknown track {track_id}"));
            return;
        };
        let auto_recommend = self.config().auto_recommend_effector;

        let mut workflow = self.workflow.lock().expect("workflow poisoned");
        let mut events = Vec::new();
        if !workflow.is_terminal() {
            events.extend(self.abort_locked(&mut workflow, "New track selected".to_string(), now));
        }

        workflow.state = EngagementState::TrackSelected;
        workflow.selected_track = Some(track_id);
        workflow.selected_effector = None;
        workflow.record = None;
        workflow.auth_deadline_ms = None;

        events.push(Event::Engagement(EngagementEvent::TrackSelected { track_id }));
        if let Some(camera_id) = track.associated_camera_id.clone() {
            events.push(Event::Engagement(EngagementEvent::VideoSwitch { camera_id }));
        }
        events.push(Event::Engagement(EngagementEvent::StateChanged {
            engagement_id: EngagementId(0),
            state: EngagementState::TrackSelected,
        }));

        if auto_recommend {
            if let Some(effector_id) = self.recommend_for(&track) {
                workflow.state = EngagementState::EffectorRecommended;
                workflow.selected_effector = Some(effector_id.clone());
                events.push(Event::Engagement(EngagementEvent::EffectorRecommended {
                    engagement_id: None,
                    effector_id,
                }));
            }
        }

        drop(workflow);
        self.emit_all(events);
    }

    pub fn select_effector(&self, effector_id: EffectorId) {
        let mut workflow = self.workflow.lock().expect("workflow poisoned");
        if !matches!(workflow.state, EngagementState::TrackSelected | EngagementState::EffectorRecommended) {
            self.log.log(LogLevel::Warn, "select_effector: invalid in current state");
            return;
        }
        workflow.state = EngagementState::EffectorRecommended;
        workflow.selected_effector = Some(effector_id.clone());
        drop(workflow);
        self.events.emit(Event::Engagement(EngagementEvent::EffectorRecommended {
            engagement_id: None,
            effector_id,
        }));
    }

    pub fn request_authorization(&self) {
        let now = self.clock.now_ms();
        let timeout_ms = (self.config().authorization_timeout_sec * 1000.0) as u64;

        let mut workflow = self.workflow.lock().expect("workflow poisoned");
        if workflow.state != EngagementState::EffectorRecommended {
            self.log.log(LogLevel::Warn, "request_authorization: invalid in current state");
            return;
        }
        let (Some(track_id), Some(effector_id)) =
            (workflow.selected_track, workflow.selected_effector.clone())
        else {
            return;
        };
        let Some(track) = self.tracks.get(track_id) else { return };

        let engagement_id = EngagementId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let record = EngagementRecord {
            engagement_id,
            track_id,
            effector_id: effector_id.clone(),
            operator_id: None,
            started_at_ms: now,
            authorized_at_ms: None,
            executed_at_ms: None,
            completed_at_ms: None,
            state: EngagementState::AwaitingAuthorization,
            bda: BdaResult::Unknown,
            target_snapshot: TargetSnapshot { position: track.position, classification: track.classification },
            notes: String::new(),
            aborted: false,
            abort_reason: None,
        };
        workflow.state = EngagementState::AwaitingAuthorization;
        workflow.record = Some(record);
        workflow.auth_deadline_ms = Some(now + timeout_ms);
        drop(workflow);

        self.events.emit(Event::Engagement(EngagementEvent::AuthorizationRequested { engagement_id }));
    }

    pub fn authorize(&self, operator_id: impl Into<String>) {
        let now = self.clock.now_ms();
        let operator_id = operator_id.into();
        let mut workflow = self.workflow.lock().expect("workflow poisoned");
        if workflow.state != EngagementState::AwaitingAuthorization {
            self.log.log(LogLevel::Warn, "authorize: invalid in current state");
            return;
        }
        let Some(record) = workflow.record.as_mut() else { return };
        record.operator_id = Some(operator_id.clone());
        record.authorized_at_ms = Some(now);
        record.state = EngagementState::Authorized;
        let engagement_id = record.engagement_id;
        workflow.state = EngagementState::Authorized;
        workflow.auth_deadline_ms = None;
        drop(workflow);

        self.events.emit(Event::Engagement(EngagementEvent::Authorized { engagement_id, operator_id }));
    }

    pub fn deny(&self, reason: impl Into<String>) {
        let now = self.clock.now_ms();
        let reason = reason.into();
        let mut workflow = self.workflow.lock().expect("workflow poisoned");
        if workflow.state != EngagementState::AwaitingAuthorization {
            self.log.log(LogLevel::Warn, "deny: invalid in current state");
            return;
        }
        let engagement_id = workflow.record.as_ref().map(|r| r.engagement_id);
        let events = self.finalize_locked(&mut workflow, EngagementState::Aborted, BdaResult::Unknown, true, Some(reason.clone()), now);
        drop(workflow);
        if let Some(engagement_id) = engagement_id {
            self.events.emit(Event::Engagement(EngagementEvent::Denied { engagement_id, reason }));
        }
        self.emit_all(events);
    }

    pub fn execute(&self) {
        let now = self.clock.now_ms();
        let mut workflow = self.workflow.lock().expect("workflow poisoned");
        if workflow.state != EngagementState::Authorized {
            self.log.log(LogLevel::Warn, "execute: invalid in current state");
            return;
        }
        let Some(track_id) = workflow.selected_track else { return };
        let Some(effector_id) = workflow.selected_effector.clone() else { return };
        let Some(target) = self.tracks.get(track_id).map(|t| t.position) else { return };

        let effector = self.effector(&effector_id);
        let engage_result = effector.as_ref().map(|e| e.engage(target, now));

        match engage_result {
            Some(Ok(())) => {
                if let Some(record) = workflow.record.as_mut() {
                    record.executed_at_ms = Some(now);
                    record.state = EngagementState::Engaging;
                }
                workflow.state = EngagementState::Engaging;
                let engagement_id = workflow.record.as_ref().map(|r| r.engagement_id);
                drop(workflow);
                self.tracks.set_engaged(track_id, true);
                if let Some(engagement_id) = engagement_id {
                    self.events.emit(Event::Engagement(EngagementEvent::Engaging { engagement_id }));
                }
            }
            _ => {
                let events = self.finalize_locked(
                    &mut workflow,
                    EngagementState::Failed,
                    BdaResult::Unknown,
                    false,
                    Some("Effector not ready".to_string()),
                    now,
                );
                drop(workflow);
                self.emit_all(events);
            }
        }
    }

    /// Aborts the current non-terminal engagement with `reason`.
    /// Idempotent when already terminal: no-op, no event.
    pub fn abort(&self, reason: impl Into<String>) {
        let now = self.clock.now_ms();
        let mut workflow = self.workflow.lock().expect("workflow poisoned");
        if workflow.is_terminal() {
            return;
        }
        let events = self.abort_locked(&mut workflow, reason.into(), now);
        drop(workflow);
        self.emit_all(events);
    }

    // --- internals -----------------------------------------------------------

    fn recommend_for(&self, track: &cuas_track::Track) -> Option<EffectorId> {
        let effectors = self.effectors.read().expect("effectors poisoned");
        let refs: Vec<&dyn Effector> = effectors.values().map(|e| e.as_ref()).collect();
        recommend_best(refs, track.position, track.classification).map(|(e, _)| e.id().clone())
    }

    /// Aborts whatever is in progress, disengaging the effector first if
    /// `Engaging`. Caller holds the workflow lock; returns events to emit
    /// after release.
    fn abort_locked(&self, workflow: &mut Workflow, reason: String, now_ms: TimestampMs) -> Vec<Event> {
        if workflow.state == EngagementState::Engaging {
            if let Some(effector_id) = &workflow.selected_effector {
                if let Some(effector) = self.effector(effector_id) {
                    effector.disengage(now_ms);
                }
            }
        }
        self.finalize_locked(workflow, EngagementState::Aborted, BdaResult::Unknown, true, Some(reason), now_ms)
    }

    /// Common finalization path for Completed / Aborted / Failed: stamps
    /// completion, updates the record's terminal state, pushes it into
    /// history, folds it into statistics, clears selections and the
    /// track's engaged flag. Returns events to emit after the caller
    /// drops the workflow lock.
    fn finalize_locked(
        &self,
        workflow: &mut Workflow,
        final_state: EngagementState,
        bda: BdaResult,
        aborted: bool,
        note: Option<String>,
        now_ms: TimestampMs,
    ) -> Vec<Event> {
        let mut events = Vec::new();
        let track_id = workflow.selected_track;

        if let Some(mut record) = workflow.record.take() {
            record.completed_at_ms = Some(now_ms);
            record.state = final_state;
            record.bda = bda;
            record.aborted = aborted;
            record.abort_reason = note.clone();
            if let Some(n) = &note {
                record.notes = n.clone();
            }
            let engagement_id = record.engagement_id;
            let duration = record.duration_ms().unwrap_or(0);

            self.history.lock().expect("history poisoned").push(record);
            self.stats.lock().expect("stats poisoned").record(final_state, duration);

            events.push(Event::Engagement(EngagementEvent::StateChanged { engagement_id, state: final_state }));
            match final_state {
                EngagementState::Completed => {
                    events.push(Event::Engagement(EngagementEvent::Completed { engagement_id, bda }));
                }
                EngagementState::Aborted => {
                    events.push(Event::Engagement(EngagementEvent::Aborted {
                        engagement_id,
                        reason: note.clone().unwrap_or_default(),
                    }));
                }
                EngagementState::Failed => {
                    events.push(Event::Engagement(EngagementEvent::Failed {
                        engagement_id,
                        reason: note.clone().unwrap_or_default(),
                    }));
                }
                _ => {}
            }
        }

        if let Some(id) = track_id {
            self.tracks.set_engaged(id, false);
        }
        workflow.state = EngagementState::Idle;
        workflow.selected_track = None;
        workflow.selected_effector = None;
        workflow.auth_deadline_ms = None;
        events
    }

    fn emit_all(&self, events: Vec<Event>) {
        for event in events {
            self.events.emit(event);
        }
    }

    /// Periodic completion-check / authorization-timeout pass, run at
    /// `ENGAGEMENT_COMPLETION_CHECK_HZ`. Also ticks every registered
    /// effector so timed internal transitions (cooldown, flight phases)
    /// advance even when no caller is polling them directly. Exposed
    /// publicly so embedders and tests can drive one pass on demand
    /// without waiting on the background cadence.
    pub fn run_cycle(&self) {
        let now = self.clock.now_ms();
        for effector in self.effectors() {
            effector.tick(now);
        }

        let mut workflow = self.workflow.lock().expect("workflow poisoned");
        let events = match workflow.state {
            EngagementState::AwaitingAuthorization => {
                if workflow.auth_deadline_ms.is_some_and(|d| now >= d) {
                    let engagement_id = workflow.record.as_ref().map(|r| r.engagement_id);
                    let mut events = self.finalize_locked(
                        &mut workflow,
                        EngagementState::Aborted,
                        BdaResult::Unknown,
                        true,
                        Some("timeout".to_string()),
                        now,
                    );
                    if let Some(engagement_id) = engagement_id {
                        events.push(Event::Engagement(EngagementEvent::AuthorizationTimeout { engagement_id }));
                    }
                    events
                } else {
                    Vec::new()
                }
            }
            EngagementState::Engaging => {
                let track_dropped = workflow
                    .selected_track
                    .and_then(|id| self.tracks.get(id))
                    .map(|t| t.lifecycle == TrackLifecycle::Dropped)
                    .unwrap_or(true);
                let effector_disengaged = workflow
                    .selected_effector
                    .as_ref()
                    .and_then(|id| self.effector(id))
                    .map(|e| !e.is_engaged())
                    .unwrap_or(true);

                if track_dropped || effector_disengaged {
                    let bda = if track_dropped { BdaResult::AssessmentPending } else { BdaResult::Unknown };
                    self.finalize_locked(&mut workflow, EngagementState::Completed, bda, false, None, now)
                } else {
                    Vec::new()
                }
            }
            _ => Vec::new(),
        };
        drop(workflow);
        self.emit_all(events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuas_core::config::TrackManagerConfig;
    use cuas_core::enums::DetectionSource;
    use cuas_core::events::RecordingEventSink;
    use cuas_core::ports::{ManualClock, NullLogSink};
    use cuas_core::types::GeoPosition;
    use cuas_effectors::rf_jammer::{RfJammer, RfJammerConfig};
    use cuas_effectors::kinetic::{KineticConfig, KineticInterceptor};

    fn setup() -> (Arc<TrackManager>, Arc<EngagementManager>, Arc<RecordingEventSink>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(0));
        let events = Arc::new(RecordingEventSink::new());
        let tracks = TrackManager::new(
            TrackManagerConfig::default(),
            clock.clone(),
            Arc::new(NullLogSink),
            events.clone(),
        );
        let engagement = EngagementManager::new(
            tracks.clone(),
            EngagementConfig::default(),
            clock.clone(),
            Arc::new(NullLogSink),
            events.clone(),
        );
        (tracks, engagement, events, clock)
    }

    fn ready_jammer(id: &str, position: GeoPosition) -> Arc<RfJammer> {
        let jammer = Arc::new(RfJammer::new(EffectorId(id.into()), position, RfJammerConfig::default()));
        jammer.initialize(0);
        jammer.tick(10_000);
        jammer
    }

    #[test]
    fn test_happy_path_reaches_completed_with_history_and_stats() {
        let (tracks, engagement, events, clock) = setup();
        let jammer = ready_jammer("rf-1", GeoPosition::new(34.0, -118.0, 0.0));
        engagement.register_effector(jammer.clone());

        let target = GeoPosition::new(34.007, -118.0, 0.0); // ~780m north
        let track_id = tracks.create(target, DetectionSource::Radar).unwrap();
        tracks.classify(track_id, Classification::Hostile, 0.9);
        events.drain();

        engagement.select_track(track_id);
        assert_eq!(engagement.state(), EngagementState::EffectorRecommended);
        assert_eq!(engagement.selected_effector(), Some(EffectorId("rf-1".into())));

        engagement.request_authorization();
        assert_eq!(engagement.state(), EngagementState::AwaitingAuthorization);
        let engagement_id = engagement.current_record().unwrap().engagement_id;
        assert_eq!(engagement_id, EngagementId(1));

        engagement.authorize("op1");
        assert_eq!(engagement.state(), EngagementState::Authorized);

        engagement.execute();
        assert_eq!(engagement.state(), EngagementState::Engaging);
        assert!(tracks.get(track_id).unwrap().engaged);

        clock.advance(30_000);
        jammer.tick(30_000);
        engagement.run_cycle();

        assert_eq!(engagement.state(), EngagementState::Idle);
        assert!(!tracks.get(track_id).unwrap().engaged);

        let history = engagement.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].state, EngagementState::Completed);
        assert_eq!(history[0].bda, BdaResult::Unknown);

        let stats = engagement.stats();
        assert_eq!(stats.total, 1);
        assert_eq!(stats.successful, 1);

        let _ = events.drain();
    }

    #[test]
    fn test_authorization_timeout_aborts_and_emits_timeout_not_denied() {
        let (tracks, engagement, events, clock) = setup();
        let jammer = ready_jammer("rf-1", GeoPosition::new(34.0, -118.0, 0.0));
        engagement.register_effector(jammer);
        let track_id = tracks.create(GeoPosition::new(34.007, -118.0, 0.0), DetectionSource::Radar).unwrap();
        tracks.classify(track_id, Classification::Hostile, 0.9);

        engagement.select_track(track_id);
        engagement.request_authorization();
        events.drain();

        clock.advance(60_000);
        engagement.run_cycle();

        assert_eq!(engagement.state(), EngagementState::Idle);
        let evts = events.drain();
        assert!(evts.iter().any(|e| matches!(
            e,
            Event::Engagement(EngagementEvent::AuthorizationTimeout { .. })
        )));
        assert!(!evts.iter().any(|e| matches!(e, Event::Engagement(EngagementEvent::Denied { .. }))));
        assert_eq!(engagement.stats().aborted, 1);
    }

    #[test]
    fn test_selecting_new_track_aborts_prior_nonterminal_engagement() {
        let (tracks, engagement, events, _clock) = setup();
        let jammer = ready_jammer("rf-1", GeoPosition::new(34.0, -118.0, 0.0));
        engagement.register_effector(jammer);
        let t1 = tracks.create(GeoPosition::new(34.007, -118.0, 0.0), DetectionSource::Radar).unwrap();
        let t2 = tracks.create(GeoPosition::new(34.008, -118.0, 0.0), DetectionSource::Radar).unwrap();

        engagement.select_track(t1);
        events.drain();
        engagement.select_track(t2);

        let evts = events.drain();
        let abort_idx = evts.iter().position(|e| matches!(e, Event::Engagement(EngagementEvent::Aborted { .. })));
        let select_idx = evts
            .iter()
            .position(|e| matches!(e, Event::Engagement(EngagementEvent::TrackSelected { track_id }) if *track_id == t2));
        assert!(abort_idx.is_some());
        assert!(select_idx.is_some());
        assert!(abort_idx.unwrap() < select_idx.unwrap());
        assert_eq!(engagement.selected_track(), Some(t2));
    }

    #[test]
    fn test_execute_without_ready_effector_fails() {
        let (tracks, engagement, _events, _clock) = setup();
        let jammer = Arc::new(RfJammer::new(
            EffectorId("rf-1".into()),
            GeoPosition::new(34.0, -118.0, 0.0),
            RfJammerConfig::default(),
        )); // never initialized: stuck Offline
        engagement.register_effector(jammer);
        let track_id = tracks.create(GeoPosition::new(34.007, -118.0, 0.0), DetectionSource::Radar).unwrap();

        engagement.select_effector(EffectorId("rf-1".into())); // invalid: no track selected yet, no-op
        engagement.select_track(track_id);
        engagement.select_effector(EffectorId("rf-1".into()));
        engagement.request_authorization();
        engagement.authorize("op1");
        engagement.execute();

        assert_eq!(engagement.state(), EngagementState::Idle);
        assert_eq!(engagement.history().last().unwrap().state, EngagementState::Failed);
        assert_eq!(engagement.stats().failed, 1);
    }

    #[test]
    fn test_abort_during_engaging_disengages_effector() {
        let (tracks, engagement, _events, clock) = setup();
        let jammer = ready_jammer("rf-1", GeoPosition::new(34.0, -118.0, 0.0));
        engagement.register_effector(jammer.clone());
        let track_id = tracks.create(GeoPosition::new(34.007, -118.0, 0.0), DetectionSource::Radar).unwrap();

        engagement.select_track(track_id);
        engagement.select_effector(EffectorId("rf-1".into()));
        engagement.request_authorization();
        engagement.authorize("op1");
        engagement.execute();
        assert_eq!(jammer.status(), cuas_core::enums::EffectorStatus::Engaged);

        clock.advance(1_000);
        engagement.abort("operator abort");

        assert_eq!(engagement.state(), EngagementState::Idle);
        assert_eq!(jammer.status(), cuas_core::enums::EffectorStatus::Cooldown);
        assert_eq!(engagement.history().last().unwrap().abort_reason.as_deref(), Some("operator abort"));
    }

    #[test]
    fn test_abort_when_already_terminal_is_a_no_op() {
        let (_tracks, engagement, events, _clock) = setup();
        events.drain();
        engagement.abort("whatever");
        assert!(events.drain().is_empty());
    }

    #[test]
    fn test_recommend_prefers_rf_jammer_for_unclassified_short_range_track() {
        let (tracks, engagement, _events, _clock) = setup();
        let base = GeoPosition::new(0.0, 0.0, 0.0);
        let jammer = ready_jammer("rf-1", base);
        let kinetic = Arc::new(KineticInterceptor::new(
            EffectorId("kin-1".into()),
            base,
            KineticConfig { min_range_m: 100.0, max_range_m: 1_500.0, ..Default::default() },
            1,
        ));
        kinetic.initialize(0);
        kinetic.tick(10_000);
        engagement.register_effector(jammer);
        engagement.register_effector(kinetic);

        let target = GeoPosition::new(300.0 / 111_000.0, 0.0, 0.0);
        let track_id = tracks.create(target, DetectionSource::Radar).unwrap();

        engagement.select_track(track_id);
        assert_eq!(engagement.selected_effector(), Some(EffectorId("rf-1".into())));
    }

    #[test]
    fn test_effector_fault_aborts_selecting_engagement() {
        let (tracks, engagement, _events, _clock) = setup();
        let jammer = ready_jammer("rf-1", GeoPosition::new(34.0, -118.0, 0.0));
        engagement.register_effector(jammer);
        let track_id = tracks.create(GeoPosition::new(34.007, -118.0, 0.0), DetectionSource::Radar).unwrap();

        engagement.select_track(track_id);
        engagement.select_effector(EffectorId("rf-1".into()));
        engagement.request_authorization();
        engagement.authorize("op1");
        engagement.execute();
        assert_eq!(engagement.state(), EngagementState::Engaging);

        engagement.report_effector_fault(&EffectorId("rf-1".into()), "overheat".to_string());

        assert_eq!(engagement.state(), EngagementState::Idle);
        let last = engagement.history().last().unwrap().clone();
        assert_eq!(last.abort_reason.as_deref(), Some("Effector fault"));
    }
}
