//! Prometheus metrics for coordinator discovery.
//!
//! All metrics live on a custom registry with the "findcoord" prefix so they
//! never collide with the default Prometheus registry. A metric that fails to
//! register is still returned, unregistered, instead of panicking.

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, IntCounterVec, Registry, TextEncoder, opts};
use tracing::warn;

/// Custom Prometheus registry for discovery metrics.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    Registry::new_custom(Some("findcoord".to_string()), None).unwrap_or_else(|_| Registry::new())
});

/// Declare an IntCounterVec metric with labels.
macro_rules! define_counter_vec {
    ($name:ident, $metric_name:expr, $help:expr, [$($label:expr),+ $(,)?]) => {
        #[doc = $help]
        pub static $name: Lazy<IntCounterVec> = Lazy::new(|| {
            register_int_counter_vec_safe(&REGISTRY, $metric_name, $help, &[$($label),+])
        });
    };
}

/// Declare an IntCounter metric (no labels).
macro_rules! define_counter {
    ($name:ident, $metric_name:expr, $help:expr) => {
        #[doc = $help]
        pub static $name: Lazy<IntCounter> =
            Lazy::new(|| register_int_counter_safe(&REGISTRY, $metric_name, $help));
    };
}

// Labels: `outcome` is one of sent, success, retriable, fatal.
define_counter_vec!(
    DISCOVERY_REQUESTS,
    "discovery_requests_total",
    "FindCoordinator requests by outcome",
    ["outcome"]
);

define_counter!(
    COORDINATOR_UNKNOWN,
    "coordinator_unknown_total",
    "Times a known coordinator was marked unknown"
);

define_counter_vec!(
    FATAL_ERRORS,
    "fatal_errors_total",
    "Non-retriable discovery failures by error kind",
    ["kind"]
);

define_counter!(
    DISCONNECT_WARNINGS,
    "coordinator_disconnect_warnings_total",
    "Warnings logged for a coordinator unknown longer than the logging interval"
);

fn register_int_counter_vec_safe(
    registry: &Registry,
    name: &str,
    help: &str,
    labels: &[&str],
) -> IntCounterVec {
    let counter =
        IntCounterVec::new(opts!(name, help), labels).expect("metric opts should be valid");
    match registry.register(Box::new(counter.clone())) {
        Ok(()) => counter,
        Err(e) => {
            warn!(name, error = %e, "Failed to register IntCounterVec metric, using unregistered fallback");
            counter
        }
    }
}

fn register_int_counter_safe(registry: &Registry, name: &str, help: &str) -> IntCounter {
    let counter = IntCounter::new(name, help).expect("metric name/help should be valid");
    match registry.register(Box::new(counter.clone())) {
        Ok(()) => counter,
        Err(e) => {
            warn!(name, error = %e, "Failed to register IntCounter metric, using unregistered fallback");
            counter
        }
    }
}

/// Register every metric up front so they show in the first scrape.
///
/// Idempotent.
pub fn init_metrics() {
    let _ = &*DISCOVERY_REQUESTS;
    let _ = &*COORDINATOR_UNKNOWN;
    let _ = &*FATAL_ERRORS;
    let _ = &*DISCONNECT_WARNINGS;
}

/// Encode all metrics in Prometheus text format.
pub fn encode_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Gather all metric families from the registry.
pub fn gather_metrics() -> Vec<prometheus::proto::MetricFamily> {
    REGISTRY.gather()
}

pub fn record_request_sent() {
    DISCOVERY_REQUESTS.with_label_values(&["sent"]).inc();
}

pub fn record_discovery_success() {
    DISCOVERY_REQUESTS.with_label_values(&["success"]).inc();
}

pub fn record_retriable_failure() {
    DISCOVERY_REQUESTS.with_label_values(&["retriable"]).inc();
}

/// Record a failure that landed in the fatal error slot.
pub fn record_fatal_failure(kind: &str) {
    DISCOVERY_REQUESTS.with_label_values(&["fatal"]).inc();
    FATAL_ERRORS.with_label_values(&[kind]).inc();
}

pub fn record_coordinator_unknown() {
    COORDINATOR_UNKNOWN.inc();
}

pub fn record_disconnect_warning() {
    DISCONNECT_WARNINGS.inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_metrics_is_idempotent() {
        init_metrics();
        init_metrics();
    }

    #[test]
    fn test_encoded_names_carry_prefix() {
        init_metrics();
        record_request_sent();
        record_coordinator_unknown();

        let text = encode_metrics().unwrap();
        assert!(text.contains("findcoord_discovery_requests_total"));
        assert!(text.contains("findcoord_coordinator_unknown_total"));
    }

    #[test]
    fn test_fatal_failure_counts_both_series() {
        let before = FATAL_ERRORS.with_label_values(&["illegal_state"]).get();
        let fatal_before = DISCOVERY_REQUESTS.with_label_values(&["fatal"]).get();

        record_fatal_failure("illegal_state");

        assert!(FATAL_ERRORS.with_label_values(&["illegal_state"]).get() > before);
        assert!(DISCOVERY_REQUESTS.with_label_values(&["fatal"]).get() > fatal_before);
    }

    #[test]
    fn test_gather_returns_families() {
        init_metrics();
        record_disconnect_warning();
        assert!(!gather_metrics().is_empty());
        assert!(DISCONNECT_WARNINGS.get() >= 1);
    }
}
