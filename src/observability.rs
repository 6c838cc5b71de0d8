//! Request counters and tracing setup

use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

/// Counters for a client's requests
#[derive(Debug, Default)]
pub struct Metrics {
    requests_dispatched: AtomicU64,
    requests_failed: AtomicU64,
    requests_rejected: AtomicU64,
    rows_parsed: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_dispatched(&self) {
        self.requests_dispatched.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "requests_dispatched", "Metric incremented");
    }

    pub fn request_failed(&self) {
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "requests_failed", "Metric incremented");
    }

    /// A request stopped by validation before dispatch.
    pub fn request_rejected(&self) {
        self.requests_rejected.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "requests_rejected", "Metric incremented");
    }

    /// Data rows only; the header row is not counted.
    pub fn rows_parsed(&self, count: usize) {
        self.rows_parsed.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_dispatched: self.requests_dispatched.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
            requests_rejected: self.requests_rejected.load(Ordering::Relaxed),
            rows_parsed: self.rows_parsed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct MetricsSnapshot {
    pub requests_dispatched: u64,
    pub requests_failed: u64,
    pub requests_rejected: u64,
    pub rows_parsed: u64,
}

/// Install the global subscriber. `RUST_LOG` wins over `default_directive`.
pub fn init_tracing(default_directive: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    // Ignore the error if a subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
