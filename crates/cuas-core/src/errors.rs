//! Typed error taxonomy for fallible, caller-facing boundaries.
//!
//! Most of the error kinds the system defines (Reference, Precondition,
//! Capacity, Timeout) are not raised as `Result::Err` — they are logged
//! through [`crate::ports::LogSink`] and surfaced as typed events, per the
//! propagation policy. `ConfigError` is the one kind that rejects outright,
//! since bad configuration should never silently degrade.

use thiserror::Error;

/// Rejected configuration value. Returned by every config struct's
/// `validate`/`TryFrom` rather than accepted and clamped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("maxTracks must be positive, got {0}")]
    NonPositiveMaxTracks(i64),

    #[error("{field} must not be negative, got {value}")]
    NegativeTimeout { field: &'static str, value: f64 },

    #[error("{field} must be positive, got {value}")]
    InvalidCorrelationThreshold { field: &'static str, value: f64 },

    #[error("updateRateHz must be positive, got {0}")]
    NonPositiveRate(f64),
}
