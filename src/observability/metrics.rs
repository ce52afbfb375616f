//! Metrics collection and exposition.
//!
//! # Metrics
//! - `addon_stream_requests_total` (counter): stream requests by outcome
//! - `addon_stream_request_duration_seconds` (histogram): latency by outcome
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed, so tests need no setup
//! - The Prometheus listener is optional and off by default

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

pub const STREAM_REQUESTS_TOTAL: &str = "addon_stream_requests_total";
pub const STREAM_REQUEST_DURATION: &str = "addon_stream_request_duration_seconds";

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record a finished stream request.
pub fn record_stream_request(outcome: &'static str, start: Instant) {
    counter!(STREAM_REQUESTS_TOTAL, "outcome" => outcome).increment(1);
    histogram!(STREAM_REQUEST_DURATION, "outcome" => outcome)
        .record(start.elapsed().as_secs_f64());
}
