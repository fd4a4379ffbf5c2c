//! Prometheus metrics registry and instruments.
//!
//! This module is framework-agnostic and can be used from any layer.

use lazy_static::lazy_static;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry};

lazy_static! {
    /// Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("chronoview_http_requests_total", "Total number of HTTP requests"),
        &["method", "endpoint", "status"]
    ).expect("metric can be created");

    // Store Metrics
    pub static ref STORE_QUERIES_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("chronoview_store_queries_total", "Total number of document store queries"),
        &["operation", "collection"]
    ).expect("metric can be created");
    pub static ref STORE_QUERY_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "chronoview_store_query_duration_seconds",
            "Document store query duration in seconds"
        ).buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        &["operation", "collection"]
    ).expect("metric can be created");

    // Auth Metrics
    pub static ref AUTH_EVENTS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("chronoview_auth_events_total", "Authentication events by stage and outcome"),
        &["stage", "outcome"]
    ).expect("metric can be created");

    // Error Metrics
    pub static ref ERRORS_TOTAL: IntCounterVec = IntCounterVec::new(
        Opts::new("chronoview_errors_total", "Total number of errors"),
        &["error_type"]
    ).expect("metric can be created");
}

/// Initialize metrics registry.
///
/// Safe to call more than once; repeated registration is ignored.
pub fn init_metrics() {
    let collectors: [Box<dyn prometheus::core::Collector>; 5] = [
        Box::new(HTTP_REQUESTS_TOTAL.clone()),
        Box::new(STORE_QUERIES_TOTAL.clone()),
        Box::new(STORE_QUERY_DURATION_SECONDS.clone()),
        Box::new(AUTH_EVENTS_TOTAL.clone()),
        Box::new(ERRORS_TOTAL.clone()),
    ];

    for collector in collectors {
        match REGISTRY.register(collector) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(error) => tracing::warn!(%error, "Failed to register metric"),
        }
    }

    tracing::info!("Metrics registry initialized");
}

/// Record a completed document store operation.
pub fn observe_store_query(operation: &str, collection: &str, elapsed: std::time::Duration) {
    STORE_QUERIES_TOTAL
        .with_label_values(&[operation, collection])
        .inc();
    STORE_QUERY_DURATION_SECONDS
        .with_label_values(&[operation, collection])
        .observe(elapsed.as_secs_f64());
}

/// Record one authentication event.
pub fn record_auth_event(stage: &str, outcome: &str) {
    AUTH_EVENTS_TOTAL.with_label_values(&[stage, outcome]).inc();
}
