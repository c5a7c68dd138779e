//! Logging and clock ports.
//!
//! The core never binds to a concrete logging backend or reads the wall
//! clock directly; both are injected at construction so tests can run
//! deterministically and embedders can route logs wherever they like.

use crate::enums::LogLevel;
use crate::types::TimestampMs;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// A sink the core writes log lines to. Implementations must be cheap to
/// call from a lock-free context; they must not block on I/O for long.
pub trait LogSink: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
}

/// Emits through `tracing`, at a level matching the core's own. The default
/// sink; whatever subscriber the embedding binary installs (fmt, json,
/// otlp, ...) receives these the same way it receives every other crate's
/// spans and events — the core itself never picks a subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!("{message}"),
            LogLevel::Info => tracing::info!("{message}"),
            LogLevel::Warn => tracing::warn!("{message}"),
            LogLevel::Error => tracing::error!("{message}"),
        }
    }
}

/// Discards everything. Used in tests that don't care about log output.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullLogSink;

impl LogSink for NullLogSink {
    fn log(&self, _level: LogLevel, _message: &str) {}
}

/// A source of wall-clock time. Timeouts and periodic cadences read through
/// this instead of calling `Instant::now()` directly.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> TimestampMs;
}

/// Reads the system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> TimestampMs {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }
}

/// A clock whose value is set explicitly by the test driving it.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now_ms: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start_ms: u64) -> Self {
        Self { now_ms: Arc::new(AtomicU64::new(start_ms)) }
    }

    pub fn set(&self, now_ms: u64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_ms: u64) {
        self.now_ms.fetch_add(delta_ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> TimestampMs {
        self.now_ms.load(Ordering::SeqCst)
    }
}
