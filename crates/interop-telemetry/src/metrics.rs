//! Prometheus metrics for the interoperability node.
//!
//! All metrics follow the naming convention: `qc_interop_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // ATOMIC SWAP METRICS
    // =========================================================================

    /// Swaps moved to expired by the watchdog
    pub static ref SWAPS_EXPIRED: IntCounter = IntCounter::new(
        "qc_interop_swaps_expired_total",
        "Total swaps expired by the watchdog sweep"
    ).expect("metric creation failed");

    /// Watchdog sweeps run
    pub static ref WATCHDOG_SWEEPS: IntCounter = IntCounter::new(
        "qc_interop_watchdog_sweeps_total",
        "Total expiry watchdog sweeps"
    ).expect("metric creation failed");

    // =========================================================================
    // ORACLE METRICS
    // =========================================================================

    /// Oracle fetches by outcome
    pub static ref ORACLE_FETCHES: IntCounterVec = IntCounterVec::new(
        Opts::new("qc_interop_oracle_fetches_total", "Oracle fetches by outcome"),
        &["outcome"]  // outcome: valid/error
    ).expect("metric creation failed");

    // =========================================================================
    // RELAY METRICS
    // =========================================================================

    /// Messages waiting for confirmation
    pub static ref MESSAGES_PENDING: IntGauge = IntGauge::new(
        "qc_interop_messages_pending",
        "Relay messages sent but not yet confirmed"
    ).expect("metric creation failed");
}

/// Proof that the metrics were registered.
#[derive(Debug, Clone, Copy)]
pub struct MetricsHandle {
    registered: usize,
}

impl MetricsHandle {
    /// Number of collectors this call registered.
    pub fn registered(&self) -> usize {
        self.registered
    }
}

/// Register all metrics with the global registry.
///
/// Collectors registered by an earlier call are skipped.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(SWAPS_EXPIRED.clone()),
        Box::new(WATCHDOG_SWEEPS.clone()),
        Box::new(ORACLE_FETCHES.clone()),
        Box::new(MESSAGES_PENDING.clone()),
    ];

    let mut registered = 0;
    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) => registered += 1,
            Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle { registered })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_metrics_is_repeatable() {
        assert!(register_metrics().is_ok());
        let again = register_metrics().unwrap();
        assert_eq!(again.registered(), 0);
    }

    #[test]
    fn test_counter_increment() {
        let before = SWAPS_EXPIRED.get();
        SWAPS_EXPIRED.inc_by(2);
        assert!(SWAPS_EXPIRED.get() >= before + 2);
    }

    #[test]
    fn test_oracle_outcome_labels() {
        ORACLE_FETCHES.with_label_values(&["valid"]).inc();
        assert!(ORACLE_FETCHES.with_label_values(&["valid"]).get() >= 1);
    }

    #[test]
    fn test_encode_contains_metric_names() {
        register_metrics().unwrap();
        WATCHDOG_SWEEPS.inc();
        ORACLE_FETCHES.with_label_values(&["error"]).inc();
        let text = encode_metrics().unwrap();
        assert!(text.contains("qc_interop_watchdog_sweeps_total"));
        assert!(text.contains("qc_interop_oracle_fetches_total{outcome=\"error\"}"));
    }
}
