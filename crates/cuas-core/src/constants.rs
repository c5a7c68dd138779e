//! Tunable defaults for the track, threat, effector and engagement subsystems.

// --- Track manager cadence ---

/// Default track manager cycle rate (Hz).
pub const DEFAULT_UPDATE_RATE_HZ: f64 = 10.0;

/// Default hard cap on simultaneously live tracks.
pub const DEFAULT_MAX_TRACKS: usize = 500;

/// Active -> Coasting threshold (milliseconds since last update).
pub const DEFAULT_COASTING_TIMEOUT_MS: u64 = 2_000;

/// Coasting -> Dropped threshold (milliseconds since last update).
pub const DEFAULT_DROP_TIMEOUT_MS: u64 = 10_000;

/// Coasting -> Dropped threshold, alternate trigger (consecutive coast cycles).
pub const DEFAULT_MAX_COAST_COUNT: u32 = 5;

// --- Correlation ---

/// Correlation distance normalizer, D_max (meters).
pub const DEFAULT_CORRELATION_DISTANCE_M: f64 = 100.0;

/// Correlation velocity normalizer, V_max (m/s).
pub const DEFAULT_CORRELATION_VELOCITY_MPS: f64 = 20.0;

/// Minimum correlation score for a detection to join an existing track.
pub const CORRELATION_ACCEPT_THRESHOLD: f64 = 0.5;

/// Correlation score weight: distance component.
pub const CORRELATION_WEIGHT_DISTANCE: f64 = 0.5;

/// Correlation score weight: velocity component.
pub const CORRELATION_WEIGHT_VELOCITY: f64 = 0.3;

/// Correlation score weight: recency component.
pub const CORRELATION_WEIGHT_RECENCY: f64 = 0.2;

/// RF signal strength above which a Pending track is promoted to Hostile.
pub const RF_HOSTILE_PROMOTION_STRENGTH: f64 = 0.7;

/// Confidence assigned when RF promotes a track to Hostile.
pub const RF_HOSTILE_PROMOTION_CONFIDENCE: f64 = 0.6;

// --- Track history ---

/// Maximum number of (position, timestamp) samples retained per track.
pub const TRACK_HISTORY_CAPACITY: usize = 200;

/// Bounding-box freshness window (milliseconds) before it is considered stale.
pub const BOUNDING_BOX_FRESHNESS_MS: u64 = 1_000;

// --- Threat assessor ---

/// Default scoring cadence (Hz).
pub const DEFAULT_THREAT_SCORE_RATE_HZ: f64 = 2.0;

/// Threat level at or above which a track enters the high-threat set.
pub const HIGH_THREAT_LEVEL: u8 = 4;

/// Capacity of the alert history ring buffer.
pub const ALERT_HISTORY_CAPACITY: usize = 500;

/// Composite threat score weight: proximity to nearest defended asset.
pub const THREAT_WEIGHT_PROXIMITY: f64 = 0.45;

/// Composite threat score weight: rate of closure toward the nearest asset.
pub const THREAT_WEIGHT_CLOSURE: f64 = 0.25;

/// Composite threat score weight: detection-source diversity.
pub const THREAT_WEIGHT_DIVERSITY: f64 = 0.15;

/// Composite threat score weight: accumulated time inside a warning radius.
pub const THREAT_WEIGHT_WARNING_DWELL: f64 = 0.15;

/// Closing speed treated as maximally threatening, m/s.
pub const THREAT_MAX_CLOSURE_MPS: f64 = 50.0;

/// Warning-radius dwell time treated as maximally threatening, milliseconds.
pub const THREAT_MAX_WARNING_DWELL_MS: u64 = 30_000;

/// Classification multiplier applied to the composite score before scaling to 0-5.
pub const THREAT_CLASSIFICATION_MULTIPLIER_HOSTILE: f64 = 1.3;
pub const THREAT_CLASSIFICATION_MULTIPLIER_UNKNOWN: f64 = 0.8;
pub const THREAT_CLASSIFICATION_MULTIPLIER_PENDING: f64 = 0.6;
pub const THREAT_CLASSIFICATION_MULTIPLIER_NEUTRAL: f64 = 0.3;
pub const THREAT_CLASSIFICATION_MULTIPLIER_FRIENDLY: f64 = 0.0;

// --- Engagement workflow ---

/// Default authorization window (seconds).
pub const DEFAULT_AUTHORIZATION_TIMEOUT_SEC: f64 = 60.0;

/// Rate at which an Engaging workflow polls its effector for completion (Hz).
pub const ENGAGEMENT_COMPLETION_CHECK_HZ: f64 = 10.0;

// --- Effector recommender ---

/// Recommender score weight: normalized range fit.
pub const RECOMMEND_WEIGHT_RANGE: f64 = 0.4;

/// Recommender score weight: family effectiveness.
pub const RECOMMEND_WEIGHT_EFFECTIVENESS: f64 = 0.3;

/// Recommender score weight: readiness (0 or 1).
pub const RECOMMEND_WEIGHT_READY: f64 = 0.2;

/// Recommender bonus for an RF jammer against an unclassified track.
pub const RECOMMEND_RF_UNCLASSIFIED_BONUS: f64 = 0.1;

// --- RF jammer ---

/// Default RF jammer minimum effective range (meters).
pub const RF_JAMMER_MIN_RANGE_M: f64 = 50.0;

/// Default RF jammer maximum effective range (meters).
pub const RF_JAMMER_MAX_RANGE_M: f64 = 2_000.0;

/// Default RF jammer engagement timer (seconds).
pub const RF_JAMMER_ENGAGEMENT_SECS: f64 = 30.0;

/// Default RF jammer cooldown (seconds).
pub const RF_JAMMER_COOLDOWN_SECS: f64 = 5.0;

// --- Kinetic interceptor ---

/// Default kinetic interceptor minimum effective range (meters).
pub const KINETIC_MIN_RANGE_M: f64 = 100.0;

/// Default kinetic interceptor maximum effective range (meters).
pub const KINETIC_MAX_RANGE_M: f64 = 5_000.0;

/// Time spent in Arming before Launching (milliseconds).
pub const KINETIC_ARMING_MS: u64 = 500;

/// Time spent in Launching before InFlight (milliseconds).
pub const KINETIC_LAUNCH_MS: u64 = 1_500;

/// Hard cap on simulated flight time regardless of range (milliseconds).
pub const KINETIC_MAX_FLIGHT_MS: u64 = 10_000;

/// Time spent in Terminal before Complete (milliseconds).
pub const KINETIC_TERMINAL_MS: u64 = 500;

/// Time spent in Complete before returning to Ready or Reloading (milliseconds).
pub const KINETIC_COMPLETE_MS: u64 = 1_000;

/// Default magazine capacity.
pub const KINETIC_DEFAULT_ROUNDS: i32 = 10;

/// Default base probability of kill on intercept.
pub const KINETIC_DEFAULT_PK: f64 = 0.85;

/// Default reload duration once the magazine is empty (milliseconds).
pub const KINETIC_RELOAD_MS: u64 = 20_000;

/// Simulated missile closing speed used for time-to-intercept estimates (m/s).
pub const KINETIC_CLOSING_SPEED_MPS: f64 = 900.0;

// --- Directed energy ---

/// Default directed-energy minimum effective range (meters).
pub const DE_MIN_RANGE_M: f64 = 100.0;

/// Default directed-energy maximum effective range (meters).
pub const DE_MAX_RANGE_M: f64 = 1_000.0;

/// Dwell time required to achieve effect (seconds).
pub const DE_REQUIRED_DWELL_SECS: f64 = 2.0;

/// Default directed-energy cooldown (seconds).
pub const DE_COOLDOWN_SECS: f64 = 15.0;

// --- Geodesy ---

/// Meters per degree of latitude/longitude, flat-earth approximation.
pub const METERS_PER_DEGREE: f64 = 111_000.0;
