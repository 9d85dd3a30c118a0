//! Observability stubs (request counters)

use std::sync::atomic::{AtomicU64, Ordering};

/// Per-addon request counters.
#[derive(Debug, Default)]
pub struct Metrics {
    requests_dispatched: AtomicU64,
    handler_errors: AtomicU64,
    not_found: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_dispatched(&self) {
        self.requests_dispatched.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "requests_dispatched", "Metric incremented");
    }

    pub fn handler_error(&self) {
        self.handler_errors.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "handler_errors", "Metric incremented");
    }

    pub fn not_found(&self) {
        self.not_found.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(counter = "not_found", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_dispatched: self.requests_dispatched.load(Ordering::Relaxed),
            handler_errors: self.handler_errors.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub requests_dispatched: u64,
    pub handler_errors: u64,
    pub not_found: u64,
}
