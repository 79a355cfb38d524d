//! Prometheus metrics for core components.
//!
//! The server registers everything returned by [`all_metrics`] alongside its
//! own HTTP metrics.

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Catalog Metrics
// =============================================================================

/// Catalog query duration in seconds, by ordering criterion.
pub static CATALOG_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "magneticow_catalog_query_duration_seconds",
            "Duration of catalog page queries",
        )
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]),
        &["order_by"],
    )
    .unwrap()
});

/// Failed catalog queries, by ordering criterion.
pub static CATALOG_QUERY_ERRORS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "magneticow_catalog_query_errors_total",
            "Total failed catalog page queries",
        ),
        &["order_by"],
    )
    .unwrap()
});

/// Get all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(CATALOG_QUERY_DURATION.clone()),
        Box::new(CATALOG_QUERY_ERRORS.clone()),
    ]
}
