//! Wires the track manager, threat assessor and engagement manager into
//! one facade, the way `deterrence-app`'s `AppState` wires the sim engine
//! and its IPC channel behind one owned handle.

use cuas_core::config::{EngagementConfig, ThreatAssessorConfig, TrackManagerConfig};
use cuas_core::errors::ConfigError;
use cuas_core::events::EventSink;
use cuas_core::ports::{Clock, LogSink, SystemClock, TracingLogSink};
use cuas_effectors::Effector;
use cuas_engagement::EngagementManager;
use cuas_threat::ThreatAssessor;
use cuas_track::TrackManager;

use std::sync::Arc;

/// Top-level configuration bundle, one field per component. Deserializes
/// from the same JSON shape an embedder would read off disk — each
/// nested struct owns its own `camelCase` keys.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemConfig {
    pub track_manager: TrackManagerConfig,
    pub threat_assessor: ThreatAssessorConfig,
    pub engagement: EngagementConfig,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            track_manager: TrackManagerConfig::default(),
            threat_assessor: ThreatAssessorConfig::default(),
            engagement: EngagementConfig::default(),
        }
    }
}

impl SystemConfig {
    /// Validates every nested config, short-circuiting on the first
    /// rejection. Matches §7's "Configuration" error kind: bad values are
    /// rejected at load time rather than clamped.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.track_manager.validate()?;
        self.threat_assessor.validate()?;
        self.engagement.validate()?;
        Ok(())
    }
}

/// The assembled C-UAS core: C4 (track manager), C5 (threat assessor) and
/// C7 (engagement manager) sharing one track table, one clock and one
/// event sink. Construction wires C1-C8 together; nothing here
/// duplicates state owned by a component.
pub struct System {
    tracks: Arc<TrackManager>,
    threat: Arc<ThreatAssessor>,
    engagement: Arc<EngagementManager>,
    clock: Arc<dyn Clock>,
    log: Arc<dyn LogSink>,
    events: Arc<dyn EventSink>,
}

impl System {
    /// Builds the system with the system clock and a `tracing`-backed log
    /// sink — the defaults an embedder gets without wiring its own ports.
    pub fn new(config: SystemConfig, events: Arc<dyn EventSink>) -> Result<Arc<Self>, ConfigError> {
        Self::with_ports(config, Arc::new(SystemClock), Arc::new(TracingLogSink), events)
    }

    /// Builds the system against caller-supplied clock and log ports —
    /// the seam tests use to drive everything with a [`cuas_core::ports::ManualClock`].
    pub fn with_ports(
        config: SystemConfig,
        clock: Arc<dyn Clock>,
        log: Arc<dyn LogSink>,
        events: Arc<dyn EventSink>,
    ) -> Result<Arc<Self>, ConfigError> {
        config.validate()?;

        let tracks = TrackManager::new(config.track_manager, clock.clone(), log.clone(), events.clone());
        let threat = ThreatAssessor::new(tracks.clone(), config.threat_assessor, clock.clone(), log.clone(), events.clone());
        let engagement = EngagementManager::new(tracks.clone(), config.engagement, clock.clone(), log.clone(), events.clone());

        Ok(Arc::new(Self { tracks, threat, engagement, clock, log, events }))
    }

    pub fn tracks(&self) -> &Arc<TrackManager> {
        &self.tracks
    }

    pub fn threat(&self) -> &Arc<ThreatAssessor> {
        &self.threat
    }

    pub fn engagement(&self) -> &Arc<EngagementManager> {
        &self.engagement
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn log(&self) -> &Arc<dyn LogSink> {
        &self.log
    }

    pub fn events(&self) -> &Arc<dyn EventSink> {
        &self.events
    }

    /// Registers an effector with the engagement manager. Thin
    /// passthrough kept here so callers don't need to reach past the
    /// facade into `cuas_engagement` for routine wiring.
    pub fn register_effector(&self, effector: Arc<dyn Effector>) {
        self.engagement.register_effector(effector);
    }

    /// Starts every component's periodic cycle: track lifecycle, threat
    /// scoring, engagement completion checks.
    pub fn start(self: &Arc<Self>) {
        self.tracks.start();
        self.threat.start();
        self.engagement.start();
    }

    pub fn stop(&self) {
        self.engagement.stop();
        self.threat.stop();
        self.tracks.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cuas_core::events::NullEventSink;

    #[test]
    fn test_rejects_invalid_config_before_wiring_anything() {
        let mut config = SystemConfig::default();
        config.track_manager.max_tracks = 0;
        let err = System::new(config, Arc::new(NullEventSink)).unwrap_err();
        assert!(matches!(err, ConfigError::NonPositiveMaxTracks(_)));
    }

    #[test]
    fn test_valid_config_wires_all_three_components() {
        let system = System::new(SystemConfig::default(), Arc::new(NullEventSink)).unwrap();
        assert_eq!(system.tracks().len(), 0);
        assert_eq!(system.threat().defended_assets().len(), 0);
        assert_eq!(system.engagement().history().len(), 0);
    }

    #[test]
    fn test_config_json_round_trip() {
        let mut config = SystemConfig::default();
        config.track_manager.max_tracks = 250;
        let json = serde_json::to_string(&config).unwrap();
        let back: SystemConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
