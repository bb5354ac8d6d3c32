//! Prometheus metrics for boq-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, HistogramVec, TextEncoder,
};

/// Document counter by action.
pub static DOCUMENTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "boq_documents_total",
        "Total number of document operations",
        &["action"] // created, copied, updated, deleted
    )
    .expect("Failed to register documents_total")
});

/// Conversion counter by outcome.
pub static CONVERSIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "boq_conversions_total",
        "Total number of invoice conversions by outcome",
        &["outcome"] // success, rejected, partial
    )
    .expect("Failed to register conversions_total")
});

/// Error counter for alerting.
pub static ERRORS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "boq_errors_total",
        "Total number of errors by type",
        &["error_type"]
    )
    .expect("Failed to register errors_total")
});

/// Store call duration histogram.
pub static STORE_OP_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "boq_store_op_duration_seconds",
        "Record store call duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register store_op_duration")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&DOCUMENTS_TOTAL);
    Lazy::force(&CONVERSIONS_TOTAL);
    Lazy::force(&ERRORS_TOTAL);
    Lazy::force(&STORE_OP_DURATION);
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}
