//! # Expiry Watchdog
//!
//! Periodically drives pending swaps past their deadline to `Expired` and
//! refreshes the relay pool gauge. Sweeps run on the blocking pool because the
//! engines take synchronous locks and write to the ledger.

use interop_telemetry::{MESSAGES_PENDING, SWAPS_EXPIRED, WATCHDOG_SWEEPS};
use qc_15_interop::{AtomicSwapApi, AtomicSwapEngine, MessageRelay, MessageRelayApi};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Swap expiry sweeper.
#[derive(Clone)]
pub struct ExpiryWatchdog {
    swaps: Arc<AtomicSwapEngine>,
    relay: Arc<MessageRelay>,
    interval: Duration,
}

impl ExpiryWatchdog {
    /// Create a watchdog sweeping every `interval`.
    pub fn new(swaps: Arc<AtomicSwapEngine>, relay: Arc<MessageRelay>, interval: Duration) -> Self {
        Self {
            swaps,
            relay,
            interval,
        }
    }

    /// Run one sweep. Returns the number of swaps expired.
    pub fn sweep_once(&self) -> usize {
        let expired = self.swaps.expire_due();
        WATCHDOG_SWEEPS.inc();
        SWAPS_EXPIRED.inc_by(expired.len() as u64);
        MESSAGES_PENDING.set(self.relay.pending_count() as i64);

        if expired.is_empty() {
            debug!("[qc-15] Watchdog sweep: nothing due");
        } else {
            info!("[qc-15] Watchdog expired {} swap(s)", expired.len());
        }
        expired.len()
    }

    /// Sweep until `shutdown` flips to true.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        info!("[qc-15] Expiry watchdog started (every {:?})", self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let watchdog = self.clone();
                    if let Err(e) = tokio::task::spawn_blocking(move || watchdog.sweep_once()).await {
                        warn!("[qc-15] Watchdog sweep aborted: {}", e);
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("[qc-15] Expiry watchdog shutdown signal received");
                        break;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qc_15_interop::{
        Collaborators, InMemoryLedger, InteropConfig, ManualClock, SwapLeg, SwapStatus,
        ThresholdValidatorSet, XChaChaSealer,
    };

    const T0: u64 = 1_700_000_000;

    fn setup() -> (ExpiryWatchdog, Arc<AtomicSwapEngine>, Arc<ManualClock>) {
        let config = InteropConfig::with_chains(["x", "y"]);
        let clock = Arc::new(ManualClock::new(T0));
        let validators =
            ThresholdValidatorSet::with_keys(vec![[1; 32], [2; 32], [3; 32]], 2, 64).unwrap();
        let deps = Collaborators::new(
            Arc::new(InMemoryLedger::new()),
            Arc::new(validators),
            Arc::new(XChaChaSealer::from_master_key(&[7; 32]).unwrap()),
            clock.clone(),
        );
        let swaps = Arc::new(AtomicSwapEngine::new(&config, deps.clone()));
        let relay = Arc::new(MessageRelay::new(&config, deps));
        let watchdog = ExpiryWatchdog::new(swaps.clone(), relay, Duration::from_millis(10));
        (watchdog, swaps, clock)
    }

    fn leg(chain: &str) -> SwapLeg {
        SwapLeg::new(chain, "SYN", 10, format!("alice@{}", chain))
    }

    #[test]
    fn test_sweep_expires_due_swaps() {
        let (watchdog, swaps, clock) = setup();
        let hash = AtomicSwapEngine::hash_secret(b"s1");
        let swap_id = swaps
            .initiate(leg("x"), leg("y"), hash, T0 + 60, "alice")
            .unwrap();

        assert_eq!(watchdog.sweep_once(), 0);
        clock.advance_time(61);
        assert_eq!(watchdog.sweep_once(), 1);
        assert_eq!(swaps.get(&swap_id).unwrap().status, SwapStatus::Expired);
        assert_eq!(watchdog.sweep_once(), 0);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let (watchdog, _, _) = setup();
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(watchdog.run(rx));
        tokio::time::sleep(Duration::from_millis(30)).await;
        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
