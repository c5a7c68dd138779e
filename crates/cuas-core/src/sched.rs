//! A small thread-per-cadence periodic task runner.
//!
//! Each of the track manager's cycle, the threat assessor's scoring pass,
//! and the engagement manager's completion/timeout checks needs its own
//! steady cadence with catch-up-spiral protection. Rather than reach for an
//! async runtime, this generalizes the `std::thread` + sleep-to-next-tick
//! pattern the game loop uses into one reusable runner per periodic concern.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// A running periodic task. Dropping this without calling [`PeriodicTask::stop`]
/// leaves the background thread running until the process exits; `stop` joins
/// it so callers can shut down cleanly.
pub struct PeriodicTask {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl PeriodicTask {
    /// Spawns `body` to run every `1/rate_hz` seconds on a named thread until
    /// [`stop`](Self::stop) is called. Mirrors the sleep-to-next-tick-with-
    /// catch-up-guard loop used by the rest of this workspace's background
    /// threads.
    pub fn spawn<F>(name: &str, rate_hz: f64, mut body: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let running = Arc::new(AtomicBool::new(true));
        let running_thread = Arc::clone(&running);
        let period = Duration::from_secs_f64(1.0 / rate_hz.max(0.001));

        let handle = std::thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                let mut next = Instant::now();
                while running_thread.load(Ordering::Acquire) {
                    body();

                    next += period;
                    let now = Instant::now();
                    if next > now {
                        std::thread::sleep(next - now);
                    } else if now - next > period * 2 {
                        next = now;
                    }
                }
            })
            .expect("failed to spawn periodic task thread");

        Self { running, handle: Some(handle) }
    }

    /// Signals the thread to stop after its current iteration and joins it.
    pub fn stop(mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}
