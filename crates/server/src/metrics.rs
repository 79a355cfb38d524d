//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the magneticow server:
//! - HTTP request metrics (latency, counts, in flight)
//! - Search outcome metrics (rejections, page sizes)
//! - Catalog size (collected dynamically)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use regex_lite::Regex;
use tracing::error;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "magneticow_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("magneticow_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "magneticow_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Search Metrics
// =============================================================================

/// Search requests rejected, by error kind.
pub static SEARCH_REJECTIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "magneticow_search_rejections_total",
            "Total search requests that failed, by error kind",
        ),
        &["kind"],
    )
    .unwrap()
});

/// Rows returned per search page.
pub static SEARCH_PAGE_ROWS: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "magneticow_search_page_rows",
            "Number of records returned per search page",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 20.0, 50.0, 100.0, 500.0, 1000.0]),
        &["order_by"],
    )
    .unwrap()
});

// =============================================================================
// Catalog Metrics (collected dynamically)
// =============================================================================

/// Torrents in the catalog.
pub static CATALOG_TORRENTS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "magneticow_catalog_torrents",
        "Number of torrents in the catalog",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Search
    registry
        .register(Box::new(SEARCH_REJECTIONS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(SEARCH_PAGE_ROWS.clone()))
        .unwrap();

    // Catalog
    registry
        .register(Box::new(CATALOG_TORRENTS.clone()))
        .unwrap();

    // Core metrics (catalog queries)
    for metric in magneticow_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Collect dynamic metrics from current application state.
///
/// This is called before encoding metrics to update gauges with current values
/// from the catalog.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    match state.catalog().stats() {
        Ok(stats) => CATALOG_TORRENTS.set(stats.n_torrents as i64),
        Err(e) => error!("Failed to collect catalog statistics: {}", e),
    }
}

static HASH_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[0-9a-fA-F]{40}").unwrap());
static NUMERIC_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());

/// Normalize a path for metric labels (replace info hashes and ids with placeholders).
pub fn normalize_path(path: &str) -> String {
    let result = HASH_REGEX.replace_all(path, "{hash}");
    let result = NUMERIC_REGEX.replace_all(&result, "/{id}$1");
    result.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_hash() {
        let path = "/api/v0.1/torrents/a94a8fe5ccb19ba61c4c0873d391e987982fbbd3";
        assert_eq!(normalize_path(path), "/api/v0.1/torrents/{hash}");
    }

    #[test]
    fn test_normalize_path_hash_with_suffix() {
        let path = "/api/v0.1/torrents/A94A8FE5CCB19BA61C4C0873D391E987982FBBD3/files";
        assert_eq!(normalize_path(path), "/api/v0.1/torrents/{hash}/files");
    }

    #[test]
    fn test_normalize_path_numeric() {
        let path = "/api/v0.1/torrents/12345";
        assert_eq!(normalize_path(path), "/api/v0.1/torrents/{id}");
    }

    #[test]
    fn test_normalize_path_no_ids() {
        assert_eq!(normalize_path("/api/v0.1/health"), "/api/v0.1/health");
        assert_eq!(normalize_path("/api/v0.1/torrents"), "/api/v0.1/torrents");
    }

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        // Access metrics to ensure they're initialized
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/test", "200"])
            .inc();

        let output = encode_metrics();
        assert!(output.contains("magneticow_http_requests_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_registry_contains_all_metrics() {
        // Touch all metrics to ensure they appear in output
        // (Prometheus only outputs metrics that have been accessed)
        HTTP_REQUEST_DURATION
            .with_label_values(&["GET", "/test", "200"])
            .observe(0.1);
        HTTP_REQUESTS_IN_FLIGHT.set(0);
        SEARCH_REJECTIONS_TOTAL
            .with_label_values(&["invalid_epoch"])
            .inc();
        SEARCH_PAGE_ROWS
            .with_label_values(&["DISCOVERED_ON"])
            .observe(20.0);
        CATALOG_TORRENTS.set(0);
        magneticow_core::metrics::CATALOG_QUERY_ERRORS
            .with_label_values(&["RELEVANCE"])
            .inc();

        let output = encode_metrics();

        // HTTP metrics
        assert!(output.contains("magneticow_http_request_duration_seconds"));
        assert!(output.contains("magneticow_http_requests_total"));
        assert!(output.contains("magneticow_http_requests_in_flight"));

        // Search metrics
        assert!(output.contains("magneticow_search_rejections_total"));
        assert!(output.contains("magneticow_search_page_rows"));

        // Catalog metrics
        assert!(output.contains("magneticow_catalog_torrents"));
        assert!(output.contains("magneticow_catalog_query_errors_total"));
    }
}
