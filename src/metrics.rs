//! Process-wide request counters.
//!
//! Counters are plain atomics rather than a locked struct: they sit on the
//! hot path of every request, and readers only ever want a point-in-time
//! snapshot. They are monotonic for the process lifetime and never reset.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use axum::{
    Json,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use serde::Serialize;

use crate::state::AppState;

const STATUS_MIN: u16 = 100;
const STATUS_SLOTS: usize = 500;

/// Request counters, one instance per process.
pub struct Metrics {
    requests_received: AtomicU64,
    responses_sent: AtomicU64,
    processing_time_micros: AtomicU64,
    // One slot per possible status code (100..=599), so recording a response
    // never takes a lock.
    responses_by_status: [AtomicU64; STATUS_SLOTS],
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            requests_received: AtomicU64::new(0),
            responses_sent: AtomicU64::new(0),
            processing_time_micros: AtomicU64::new(0),
            responses_by_status: std::array::from_fn(|_| AtomicU64::new(0)),
        }
    }

    pub fn request_received(&self) {
        self.requests_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn response_sent(&self, status: u16, elapsed: Duration) {
        self.responses_sent.fetch_add(1, Ordering::Relaxed);
        self.processing_time_micros
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);

        let slot = status.saturating_sub(STATUS_MIN) as usize;
        if status >= STATUS_MIN && slot < STATUS_SLOTS {
            self.responses_by_status[slot].fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Point-in-time copy of every counter. Status codes that were never
    /// written are omitted.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let responses_by_status = self
            .responses_by_status
            .iter()
            .enumerate()
            .filter_map(|(slot, counter)| {
                let count = counter.load(Ordering::Relaxed);
                (count > 0).then(|| ((STATUS_MIN as usize + slot).to_string(), count))
            })
            .collect();

        MetricsSnapshot {
            total_requests_received: self.requests_received.load(Ordering::Relaxed),
            total_responses_sent: self.responses_sent.load(Ordering::Relaxed),
            total_processing_time_micros: self.processing_time_micros.load(Ordering::Relaxed),
            responses_by_status,
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only view of the counters, served by the introspection endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests_received: u64,
    pub total_responses_sent: u64,
    pub total_processing_time_micros: u64,
    pub responses_by_status: BTreeMap<String, u64>,
}

/// Counts the request before delegating, then the response with the status
/// actually written and the wall-clock time spent producing it.
pub async fn record_metrics(State(state): State<AppState>, req: Request, next: Next) -> Response {
    state.metrics.request_received();
    let start = Instant::now();

    let response = next.run(req).await;

    state
        .metrics
        .response_sent(response.status().as_u16(), start.elapsed());
    response
}

/// GET /debug/metrics
pub async fn metrics_snapshot(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}
