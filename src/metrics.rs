// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for gameserver-dns.
//!
//! All metrics carry the namespace prefix `gameserver_dns_`.
//!
//! # Metrics Categories
//!
//! - **Listing Metrics** - Track endpoint listing passes and their duration
//! - **Endpoint Metrics** - Track endpoints synthesized per pass
//! - **Resource Metrics** - Track skipped and failed `GameServer` resources
//!
//! # Example
//!
//! ```rust,no_run
//! use gameserver_dns::metrics::{gather_metrics, record_listing_success};
//!
//! record_listing_success("default", 3, std::time::Duration::from_millis(2));
//! let text = gather_metrics().unwrap();
//! ```

use prometheus::{
    CounterVec, Encoder, GaugeVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all metrics (prometheus-safe)
const METRICS_NAMESPACE: &str = "gameserver_dns";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
///
/// All metrics are registered in this registry and exposed via `/metrics` endpoint.
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Listing Metrics
// ============================================================================

/// Total number of listing passes by namespace and outcome
///
/// Labels:
/// - `namespace`: Namespace scope of the pass (empty for all namespaces)
/// - `status`: Outcome (`success`, `error`)
pub static LISTINGS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_listings_total"),
        "Total number of endpoint listing passes by namespace and status",
    );
    let counter = CounterVec::new(opts, &["namespace", "status"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of listing passes in seconds
pub static LISTING_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_listing_duration_seconds"),
        "Duration of endpoint listing passes in seconds by namespace",
    )
    .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]);
    let histogram = HistogramVec::new(opts, &["namespace"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

// ============================================================================
// Endpoint Metrics
// ============================================================================

/// Number of SRV endpoints produced by the last successful pass
pub static ENDPOINTS_ACTIVE: LazyLock<GaugeVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_endpoints_active"),
        "Number of SRV endpoints produced by the last listing pass",
    );
    let gauge = GaugeVec::new(opts, &["namespace"]).unwrap();
    METRICS_REGISTRY.register(Box::new(gauge.clone())).unwrap();
    gauge
});

/// Total number of SRV endpoints synthesized across all passes
///
/// Labels:
/// - `namespace`: Namespace scope of the pass
pub static ENDPOINTS_SYNTHESIZED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_endpoints_synthesized_total"),
        "Total number of SRV endpoints synthesized by namespace",
    );
    let counter = CounterVec::new(opts, &["namespace"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Resource Metrics
// ============================================================================

/// Total number of `GameServer`s skipped as not publishable
///
/// Labels:
/// - `namespace`: Namespace of the pass
/// - `reason`: Why it was skipped (`no_hostname`, `pre_ready`, `no_service`)
pub static RESOURCES_SKIPPED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_resources_skipped_total"),
        "Total number of GameServers skipped as not publishable by reason",
    );
    let counter = CounterVec::new(opts, &["namespace", "reason"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of `GameServer`s that failed resolution
///
/// Labels:
/// - `namespace`: Namespace of the pass
/// - `error_type`: Resolution error kind (`no_status_ports`, `invalid_ttl`, ...)
pub static RESOLVE_ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_resolve_errors_total"),
        "Total number of GameServers that failed resolution by error type",
    );
    let counter = CounterVec::new(opts, &["namespace", "error_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record a successful listing pass
///
/// # Arguments
/// * `namespace` - Namespace scope of the pass
/// * `endpoints` - Number of endpoints produced
/// * `duration` - Duration of the pass
#[allow(clippy::cast_precision_loss)]
pub fn record_listing_success(namespace: &str, endpoints: usize, duration: Duration) {
    LISTINGS_TOTAL
        .with_label_values(&[namespace, "success"])
        .inc();
    LISTING_DURATION_SECONDS
        .with_label_values(&[namespace])
        .observe(duration.as_secs_f64());
    ENDPOINTS_ACTIVE
        .with_label_values(&[namespace])
        .set(endpoints as f64);
}

/// Record a listing pass that failed at the accessor
pub fn record_listing_error(namespace: &str, duration: Duration) {
    LISTINGS_TOTAL
        .with_label_values(&[namespace, "error"])
        .inc();
    LISTING_DURATION_SECONDS
        .with_label_values(&[namespace])
        .observe(duration.as_secs_f64());
}

/// Record a `GameServer` skipped as not publishable
///
/// # Arguments
/// * `namespace` - Namespace of the pass
/// * `reason` - Skip reason label
pub fn record_resource_skipped(namespace: &str, reason: &str) {
    RESOURCES_SKIPPED_TOTAL
        .with_label_values(&[namespace, reason])
        .inc();
}

/// Record one synthesized SRV endpoint
pub fn record_endpoint_synthesized(namespace: &str) {
    ENDPOINTS_SYNTHESIZED_TOTAL
        .with_label_values(&[namespace])
        .inc();
}

/// Record a `GameServer` that failed resolution
///
/// # Arguments
/// * `namespace` - Namespace of the pass
/// * `error_type` - Kind of resolution error
pub fn record_resolve_error(namespace: &str, error_type: &str) {
    RESOLVE_ERRORS_TOTAL
        .with_label_values(&[namespace, error_type])
        .inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Returns
/// Prometheus-formatted metrics as a String
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}
