//! # Oracle Poller
//!
//! Fetches every active oracle source on a fixed interval.

use interop_telemetry::ORACLE_FETCHES;
use qc_15_interop::{OracleApi, OracleIngestion};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

/// Outcome of one polling round.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PollSummary {
    /// Sources ingested successfully.
    pub valid: usize,
    /// Sources whose fetch or ledger write failed.
    pub failed: usize,
}

/// Interval-driven oracle fetcher.
#[derive(Clone)]
pub struct OraclePoller {
    oracle: Arc<OracleIngestion>,
    interval: Duration,
}

impl OraclePoller {
    /// Create a poller fetching every `interval`.
    pub fn new(oracle: Arc<OracleIngestion>, interval: Duration) -> Self {
        Self { oracle, interval }
    }

    /// Fetch each active source once.
    pub fn poll_once(&self) -> PollSummary {
        let mut summary = PollSummary::default();
        for name in self.oracle.active_sources() {
            match self.oracle.fetch(&name) {
                Ok(_) => {
                    ORACLE_FETCHES.with_label_values(&["valid"]).inc();
                    summary.valid += 1;
                }
                Err(e) => {
                    ORACLE_FETCHES.with_label_values(&["error"]).inc();
                    warn!(source = %name, "[qc-15] Oracle poll failed: {}", e);
                    summary.failed += 1;
                }
            }
        }
        summary
    }

    /// Poll until `shutdown` flips to true.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        info!("[qc-15] Oracle poller started (every {:?})", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let poller = self.clone();
                    match tokio::task::spawn_blocking(move || poller.poll_once()).await {
                        Ok(summary) if summary.failed > 0 => {
                            warn!("[qc-15] Oracle poll: {} ok, {} failed", summary.valid, summary.failed);
                        }
                        Ok(_) => {}
                        Err(e) => warn!("[qc-15] Oracle poll aborted: {}", e),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("[qc-15] Oracle poller shutdown signal received");
                        break;
                    }
                }
            }
        }
    }
}
