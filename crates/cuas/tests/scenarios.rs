//! End-to-end scenarios driving the assembled [`cuas::System`] the way an
//! embedder would: one shared clock, one recording event sink, detections
//! and workflow calls issued in sequence.

use std::sync::Arc;

use cuas::{System, SystemConfig};
use cuas_core::config::{EngagementConfig, TrackManagerConfig};
use cuas_core::enums::{Classification, DetectionSource, EngagementState};
use cuas_core::events::{Event, EngagementEvent, RecordingEventSink, TrackEvent};
use cuas_core::ports::{ManualClock, NullLogSink};
use cuas_core::types::{EffectorId, GeoPosition, NedVelocity};
use cuas_effectors::rf_jammer::{RfJammer, RfJammerConfig};

fn system(config: SystemConfig, clock: Arc<ManualClock>, events: Arc<RecordingEventSink>) -> Arc<System> {
    System::with_ports(config, clock, Arc::new(NullLogSink), events).unwrap()
}

fn ready_jammer(id: &str, position: GeoPosition) -> Arc<RfJammer> {
    let jammer = Arc::new(RfJammer::new(EffectorId(id.into()), position, RfJammerConfig::default()));
    jammer.initialize(0);
    jammer.tick(10_000);
    jammer
}

#[test]
fn test_scenario_1_single_radar_contact_promoted_to_active() {
    let clock = Arc::new(ManualClock::new(0));
    let events = Arc::new(RecordingEventSink::new());
    let sys = system(SystemConfig::default(), clock.clone(), events.clone());

    let pos = GeoPosition::new(34.0525, -118.2440, 100.0);
    sys.tracks().ingest_radar(pos, NedVelocity::new(10.0, 0.0, 0.0), 0.8, 0);

    let track = sys.tracks().all().into_iter().next().unwrap();
    assert_eq!(track.id.0, 1);
    assert_eq!(track.lifecycle, cuas_core::enums::TrackLifecycle::Initiated);
    events.drain();

    clock.advance(200);
    sys.tracks().run_cycle();
    assert_eq!(sys.tracks().get(track.id).unwrap().lifecycle, cuas_core::enums::TrackLifecycle::Active);

    clock.advance(800);
    sys.tracks().run_cycle();
    assert_eq!(sys.tracks().get(track.id).unwrap().lifecycle, cuas_core::enums::TrackLifecycle::Active, "should not drop within 1s");
}

#[test]
fn test_scenario_2_correlation_across_sensors_promotes_to_hostile() {
    let clock = Arc::new(ManualClock::new(0));
    let events = Arc::new(RecordingEventSink::new());
    let sys = system(SystemConfig::default(), clock.clone(), events.clone());

    sys.tracks().ingest_radar(GeoPosition::new(34.0525, -118.2440, 100.0), NedVelocity::new(10.0, 0.0, 0.0), 0.8, 0);
    let track_id = sys.tracks().all().into_iter().next().unwrap().id;

    clock.advance(500);
    sys.tracks().ingest_rf(GeoPosition::new(34.05251, -118.24401, 100.0), 0.8, 500);

    assert_eq!(sys.tracks().len(), 1, "RF detection should correlate onto the radar track");
    let track = sys.tracks().get(track_id).unwrap();
    assert!(track.sources.contains(&DetectionSource::Rf));
    assert_eq!(track.classification, Classification::Hostile);
    assert_eq!(track.classification_confidence, 0.6);
}

#[test]
fn test_scenario_3_coast_and_drop() {
    let clock = Arc::new(ManualClock::new(0));
    let events = Arc::new(RecordingEventSink::new());
    let sys = system(SystemConfig::default(), clock.clone(), events.clone());

    sys.tracks().ingest_radar(GeoPosition::new(34.0525, -118.2440, 100.0), NedVelocity::new(10.0, 0.0, 0.0), 0.8, 0);
    let track_id = sys.tracks().all().into_iter().next().unwrap().id;
    events.drain();

    clock.set(2_500);
    sys.tracks().run_cycle();
    assert_eq!(sys.tracks().get(track_id).unwrap().lifecycle, cuas_core::enums::TrackLifecycle::Coasting);
    let evts = events.drain();
    assert!(evts.iter().any(|e| matches!(e, Event::Track(TrackEvent::StateChanged { state: cuas_core::enums::TrackLifecycle::Coasting, .. }))));

    clock.set(10_500);
    sys.tracks().run_cycle();
    assert_eq!(sys.tracks().get(track_id).unwrap().lifecycle, cuas_core::enums::TrackLifecycle::Dropped);
    let evts = events.drain();
    assert!(evts.iter().any(|e| matches!(e, Event::Track(TrackEvent::Dropped { .. }))));
}

#[test]
fn test_scenario_4_engagement_happy_path() {
    let clock = Arc::new(ManualClock::new(0));
    let events = Arc::new(RecordingEventSink::new());
    let mut config = SystemConfig::default();
    config.engagement = EngagementConfig { authorization_timeout_sec: 60.0, auto_recommend_effector: true };
    let sys = system(config, clock.clone(), events.clone());

    let jammer_pos = GeoPosition::new(0.0, 0.0, 0.0);
    let jammer = ready_jammer("rf-1", jammer_pos);
    sys.register_effector(jammer.clone());

    let target = GeoPosition::new(800.0 / 111_000.0, 0.0, 0.0); // ~800m north
    let track_id = sys.tracks().create(target, DetectionSource::Radar).unwrap();
    sys.tracks().classify(track_id, Classification::Hostile, 0.9);
    events.drain();

    sys.engagement().select_track(track_id);
    assert_eq!(sys.engagement().state(), EngagementState::EffectorRecommended);
    let evts = events.drain();
    assert!(evts.iter().any(|e| matches!(e, Event::Engagement(EngagementEvent::TrackSelected { .. }))));
    assert!(evts.iter().any(|e| matches!(e, Event::Engagement(EngagementEvent::EffectorRecommended { .. }))));

    sys.engagement().request_authorization();
    assert_eq!(sys.engagement().state(), EngagementState::AwaitingAuthorization);
    let engagement_id = sys.engagement().current_record().unwrap().engagement_id;
    assert_eq!(engagement_id.to_string(), "ENG-000001");

    sys.engagement().authorize("op1");
    assert_eq!(sys.engagement().state(), EngagementState::Authorized);

    sys.engagement().execute();
    assert_eq!(sys.engagement().state(), EngagementState::Engaging);
    assert!(sys.tracks().get(track_id).unwrap().engaged);

    clock.advance(30_000);
    jammer.tick(30_000);
    sys.engagement().run_cycle();

    let history = sys.engagement().history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].state, EngagementState::Completed);
    assert_eq!(history[0].bda, cuas_core::enums::BdaResult::Unknown);
    assert_eq!(sys.engagement().stats().successful, 1);
    assert!(!sys.tracks().get(track_id).unwrap().engaged);
}

#[test]
fn test_scenario_5_authorization_timeout_path() {
    let clock = Arc::new(ManualClock::new(0));
    let events = Arc::new(RecordingEventSink::new());
    let mut config = SystemConfig::default();
    config.engagement = EngagementConfig { authorization_timeout_sec: 60.0, auto_recommend_effector: true };
    let sys = system(config, clock.clone(), events.clone());

    let jammer = ready_jammer("rf-1", GeoPosition::new(0.0, 0.0, 0.0));
    sys.register_effector(jammer);
    let track_id = sys.tracks().create(GeoPosition::new(800.0 / 111_000.0, 0.0, 0.0), DetectionSource::Radar).unwrap();
    sys.tracks().classify(track_id, Classification::Hostile, 0.9);

    sys.engagement().select_track(track_id);
    sys.engagement().request_authorization();
    events.drain();

    clock.advance(60_000);
    sys.engagement().run_cycle();

    assert_eq!(sys.engagement().stats().aborted, 1);
    let evts = events.drain();
    assert!(evts.iter().any(|e| matches!(e, Event::Engagement(EngagementEvent::AuthorizationTimeout { .. }))));
    assert!(!evts.iter().any(|e| matches!(e, Event::Engagement(EngagementEvent::Engaging { .. }))), "no engagement_started should have been emitted");
}

#[test]
fn test_scenario_6_two_effectors_rf_jammer_wins_recommendation() {
    use cuas_effectors::kinetic::{KineticConfig, KineticInterceptor};

    let clock = Arc::new(ManualClock::new(0));
    let events = Arc::new(RecordingEventSink::new());
    let sys = system(SystemConfig::default(), clock.clone(), events.clone());

    let origin = GeoPosition::new(0.0, 0.0, 0.0);
    let jammer = ready_jammer("rf-1", origin);
    let kinetic = Arc::new(KineticInterceptor::new(
        EffectorId("kin-1".into()),
        origin,
        KineticConfig { min_range_m: 100.0, max_range_m: 1_500.0, ..Default::default() },
        7,
    ));
    kinetic.initialize(0);
    kinetic.tick(10_000);
    sys.register_effector(jammer);
    sys.register_effector(kinetic);

    let track_id = sys.tracks().create(GeoPosition::new(300.0 / 111_000.0, 0.0, 0.0), DetectionSource::Radar).unwrap();

    sys.engagement().select_track(track_id);
    assert_eq!(sys.engagement().selected_effector(), Some(EffectorId("rf-1".into())));
}

#[test]
fn test_scenario_7_merge_preserves_sources_not_history_or_classification() {
    let clock = Arc::new(ManualClock::new(0));
    let events = Arc::new(RecordingEventSink::new());
    let sys = system(SystemConfig::default(), clock.clone(), events.clone());

    let pos = GeoPosition::new(34.0, -118.0, 0.0);
    let src = sys.tracks().create(pos, DetectionSource::Camera).unwrap();
    let dst = sys.tracks().create(pos, DetectionSource::Radar).unwrap();
    sys.tracks().classify(dst, Classification::Friendly, 0.9);
    let dst_before = sys.tracks().get(dst).unwrap();

    sys.tracks().merge(src, dst);

    let dst_after = sys.tracks().get(dst).unwrap();
    assert!(dst_after.sources.contains(&DetectionSource::Camera));
    assert!(dst_after.sources.contains(&DetectionSource::Radar));
    assert_eq!(dst_after.classification, dst_before.classification);
    assert_eq!(dst_after.history().count(), dst_before.history().count());
    assert!(sys.tracks().get(src).unwrap().is_dropped());
}

#[test]
fn test_scenario_8_prune_dropped_frees_kalman_filter_and_id_is_not_reused() {
    let clock = Arc::new(ManualClock::new(0));
    let events = Arc::new(RecordingEventSink::new());
    let sys = system(SystemConfig::default(), clock.clone(), events.clone());

    let id = sys.tracks().create(GeoPosition::new(0.0, 0.0, 0.0), DetectionSource::Radar).unwrap();
    sys.tracks().drop_track(id);
    sys.tracks().prune_dropped();

    assert!(sys.tracks().get(id).is_none());
    assert_eq!(sys.tracks().len(), 0);

    let next_id = sys.tracks().create(GeoPosition::new(0.0, 0.0, 0.0), DetectionSource::Radar).unwrap();
    assert_ne!(next_id, id, "ids are monotonic and never aliased");
}

#[test]
fn test_scenario_9_effector_fault_aborts_its_engagement() {
    let clock = Arc::new(ManualClock::new(0));
    let events = Arc::new(RecordingEventSink::new());
    let sys = system(SystemConfig::default(), clock.clone(), events.clone());

    let jammer = ready_jammer("rf-1", GeoPosition::new(0.0, 0.0, 0.0));
    sys.register_effector(jammer.clone());
    let track_id = sys.tracks().create(GeoPosition::new(800.0 / 111_000.0, 0.0, 0.0), DetectionSource::Radar).unwrap();

    sys.engagement().select_track(track_id);
    sys.engagement().select_effector(EffectorId("rf-1".into()));
    sys.engagement().request_authorization();
    sys.engagement().authorize("op1");
    sys.engagement().execute();
    assert_eq!(sys.engagement().state(), EngagementState::Engaging);

    sys.engagement().report_effector_fault(&EffectorId("rf-1".into()), "overheat".to_string());

    assert_eq!(jammer.status(), cuas_core::enums::EffectorStatus::Fault);
    let last = sys.engagement().history().last().unwrap().clone();
    assert_eq!(last.state, EngagementState::Aborted);
    assert_eq!(last.abort_reason.as_deref(), Some("Effector fault"));
}
