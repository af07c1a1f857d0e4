//! Metrics collection and exposition.
//!
//! # Metrics
//! - `nofakepng_responses_total` (counter): responses by status code
//! - `nofakepng_rejections_total` (counter): admission rejections by reason
//! - `nofakepng_request_duration_seconds` (histogram): successful pipeline latency
//! - `nofakepng_matting_duration_seconds` (histogram): collaborator call latency

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with an HTTP scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_response(status: u16) {
    counter!("nofakepng_responses_total", "status" => status.to_string()).increment(1);
}

pub fn record_rejected(reason: &'static str) {
    counter!("nofakepng_rejections_total", "reason" => reason).increment(1);
}

pub fn record_request_duration(started: Instant) {
    histogram!("nofakepng_request_duration_seconds").record(started.elapsed().as_secs_f64());
}

pub fn record_matting(started: Instant) {
    histogram!("nofakepng_matting_duration_seconds").record(started.elapsed().as_secs_f64());
}
