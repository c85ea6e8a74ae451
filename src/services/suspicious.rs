//! Repeated-failure tracking for signature verification.

use std::{
    collections::HashMap,
    env,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

/// Counts failed verifications per client IP inside a sliding window.
///
/// Crossing the threshold is only ever reported (audit log); it never
/// blocks a request, so verification stays stateless from the client's
/// point of view.
#[derive(Clone)]
pub struct SuspiciousActivityTracker {
    failures: Arc<Mutex<HashMap<String, (usize, Instant)>>>,
    max_failures: usize,
    window_seconds: u64,
}

impl Default for SuspiciousActivityTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SuspiciousActivityTracker {
    pub fn new() -> Self {
        let max_failures = env::var("SIGNATURE_MAX_FAILURES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);

        let window_seconds = env::var("SIGNATURE_FAILURE_WINDOW")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(300);

        Self::with_limits(max_failures, window_seconds)
    }

    pub fn with_limits(max_failures: usize, window_seconds: u64) -> Self {
        Self {
            failures: Arc::new(Mutex::new(HashMap::new())),
            max_failures,
            window_seconds,
        }
    }

    /// Record a failed verification for `ip`.
    ///
    /// Returns true when this failure reaches the reporting threshold.
    pub fn record_failure(&self, ip: &str) -> bool {
        let mut failures = self.failures.lock().unwrap();
        let now = Instant::now();
        let window = Duration::from_secs(self.window_seconds);

        failures.retain(|_, (_, seen)| now.duration_since(*seen) < window);

        match failures.get_mut(ip) {
            Some((count, seen)) => {
                if now.duration_since(*seen) < window {
                    *count += 1;
                    *count >= self.max_failures
                } else {
                    *count = 1;
                    *seen = now;
                    false
                }
            }
            None => {
                failures.insert(ip.to_string(), (1, now));
                self.max_failures <= 1
            }
        }
    }
}
