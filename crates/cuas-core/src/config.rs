//! Configuration structs. Parsing JSON off disk is the embedder's concern
//! (out of scope); these types only validate an already-parsed value.

use crate::constants::*;
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};

/// Track manager tuning. Field names match the JSON keys an embedder would
/// read from disk (`updateRateHz`, `maxTracks`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackManagerConfig {
    pub update_rate_hz: f64,
    pub max_tracks: usize,
    pub coasting_timeout_ms: u64,
    pub drop_timeout_ms: u64,
    pub max_coast_count: u32,
    pub correlation_distance_m: f64,
    pub correlation_velocity_mps: f64,
    pub enable_kalman_filter: bool,
}

impl Default for TrackManagerConfig {
    fn default() -> Self {
        Self {
            update_rate_hz: DEFAULT_UPDATE_RATE_HZ,
            max_tracks: DEFAULT_MAX_TRACKS,
            coasting_timeout_ms: DEFAULT_COASTING_TIMEOUT_MS,
            drop_timeout_ms: DEFAULT_DROP_TIMEOUT_MS,
            max_coast_count: DEFAULT_MAX_COAST_COUNT,
            correlation_distance_m: DEFAULT_CORRELATION_DISTANCE_M,
            correlation_velocity_mps: DEFAULT_CORRELATION_VELOCITY_MPS,
            enable_kalman_filter: true,
        }
    }
}

impl TrackManagerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.update_rate_hz <= 0.0 {
            return Err(ConfigError::NonPositiveRate(self.update_rate_hz));
        }
        if self.max_tracks == 0 {
            return Err(ConfigError::NonPositiveMaxTracks(0));
        }
        if self.correlation_distance_m <= 0.0 {
            return Err(ConfigError::InvalidCorrelationThreshold {
                field: "correlationDistanceM",
                value: self.correlation_distance_m,
            });
        }
        if self.correlation_velocity_mps <= 0.0 {
            return Err(ConfigError::InvalidCorrelationThreshold {
                field: "correlationVelocityMps",
                value: self.correlation_velocity_mps,
            });
        }
        Ok(())
    }
}

/// Engagement workflow tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementConfig {
    pub authorization_timeout_sec: f64,
    pub auto_recommend_effector: bool,
}

impl Default for EngagementConfig {
    fn default() -> Self {
        Self {
            authorization_timeout_sec: DEFAULT_AUTHORIZATION_TIMEOUT_SEC,
            auto_recommend_effector: true,
        }
    }
}

impl EngagementConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.authorization_timeout_sec < 0.0 {
            return Err(ConfigError::NegativeTimeout {
                field: "authorizationTimeoutSec",
                value: self.authorization_timeout_sec,
            });
        }
        Ok(())
    }
}

/// Threat assessor tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatAssessorConfig {
    pub score_rate_hz: f64,
    pub alert_history_capacity: usize,
}

impl Default for ThreatAssessorConfig {
    fn default() -> Self {
        Self {
            score_rate_hz: DEFAULT_THREAT_SCORE_RATE_HZ,
            alert_history_capacity: ALERT_HISTORY_CAPACITY,
        }
    }
}

impl ThreatAssessorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.score_rate_hz <= 0.0 {
            return Err(ConfigError::NonPositiveRate(self.score_rate_hz));
        }
        Ok(())
    }
}
