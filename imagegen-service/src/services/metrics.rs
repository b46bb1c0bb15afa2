//! Prometheus metrics for imagegen-service.

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder};
use std::sync::OnceLock;

// Global registry
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub static IMAGEGEN_REQUESTS_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();
pub static IMAGEGEN_UPSTREAM_LATENCY_SECONDS: OnceLock<Histogram> = OnceLock::new();
pub static IMAGEGEN_UPSTREAM_RESPONSES_TOTAL: OnceLock<IntCounterVec> = OnceLock::new();

/// Initialize all metrics. Later calls are no-ops.
pub fn init_metrics() {
    if REGISTRY.get().is_some() {
        return;
    }

    let registry = Registry::new();

    let requests_total = IntCounterVec::new(
        Opts::new("imagegen_requests_total", "Total generate requests by outcome"),
        &["outcome"],
    )
    .expect("Failed to create imagegen_requests_total metric");

    let upstream_latency = Histogram::with_opts(
        HistogramOpts::new(
            "imagegen_upstream_latency_seconds",
            "Image provider call latency in seconds",
        )
        .buckets(vec![0.5, 1.0, 2.0, 5.0, 10.0, 20.0, 30.0, 60.0, 120.0]),
    )
    .expect("Failed to create imagegen_upstream_latency_seconds metric");

    let upstream_responses = IntCounterVec::new(
        Opts::new(
            "imagegen_upstream_responses_total",
            "Image provider responses by HTTP status",
        ),
        &["status"],
    )
    .expect("Failed to create imagegen_upstream_responses_total metric");

    registry
        .register(Box::new(requests_total.clone()))
        .expect("Failed to register imagegen_requests_total");
    registry
        .register(Box::new(upstream_latency.clone()))
        .expect("Failed to register imagegen_upstream_latency_seconds");
    registry
        .register(Box::new(upstream_responses.clone()))
        .expect("Failed to register imagegen_upstream_responses_total");

    let _ = REGISTRY.set(registry);
    let _ = IMAGEGEN_REQUESTS_TOTAL.set(requests_total);
    let _ = IMAGEGEN_UPSTREAM_LATENCY_SECONDS.set(upstream_latency);
    let _ = IMAGEGEN_UPSTREAM_RESPONSES_TOTAL.set(upstream_responses);

    tracing::info!("Prometheus metrics initialized");
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();

    let registry = match REGISTRY.get() {
        Some(r) => r,
        None => {
            tracing::error!("Metrics registry not initialized");
            return "# Metrics registry not initialized\n".to_string();
        }
    };

    if let Err(e) = encoder.encode(&registry.gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return format!("# Failed to encode metrics: {}\n", e);
    }

    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Failed to convert metrics to UTF-8");
            format!("# Failed to convert metrics to UTF-8: {}\n", e)
        }
    }
}

/// Record the outcome of one generate request.
pub fn record_request(outcome: &str) {
    if let Some(counter) = IMAGEGEN_REQUESTS_TOTAL.get() {
        counter.with_label_values(&[outcome]).inc();
    }
}

pub fn observe_upstream_latency(duration_secs: f64) {
    if let Some(histogram) = IMAGEGEN_UPSTREAM_LATENCY_SECONDS.get() {
        histogram.observe(duration_secs);
    }
}

pub fn record_upstream_status(status: u16) {
    if let Some(counter) = IMAGEGEN_UPSTREAM_RESPONSES_TOTAL.get() {
        let status = status.to_string();
        counter.with_label_values(&[status.as_str()]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorded_request_is_exported() {
        init_metrics();
        init_metrics();
        record_request("success");
        record_upstream_status(200);
        observe_upstream_latency(1.5);

        let output = get_metrics();
        assert!(output.contains("imagegen_requests_total{outcome=\"success\"}"));
        assert!(output.contains("imagegen_upstream_responses_total{status=\"200\"}"));
        assert!(output.contains("imagegen_upstream_latency_seconds_count"));
    }
}
