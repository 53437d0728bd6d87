//! # Node Runtime
//!
//! Starts the background tasks over a wired [`InteropContainer`] and stops
//! them on shutdown.

use crate::admin::{self, AdminState};
use crate::container::InteropContainer;
use crate::oracle_poller::OraclePoller;
use crate::watchdog::ExpiryWatchdog;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Grace period for background tasks to finish once shutdown is signalled.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// The running node.
pub struct InteropNode {
    container: Arc<InteropContainer>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: Vec<(&'static str, JoinHandle<()>)>,
    admin_addr: Option<SocketAddr>,
}

impl InteropNode {
    /// Create a node over `container`. Nothing runs until [`start`](Self::start).
    pub fn new(container: InteropContainer) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container: Arc::new(container),
            shutdown_tx,
            shutdown_rx,
            tasks: Vec::new(),
            admin_addr: None,
        }
    }

    /// Start the node runtime.
    ///
    /// ## Startup Sequence
    ///
    /// 1. Bind the admin endpoint (fails fast on a busy port)
    /// 2. Start the expiry watchdog
    /// 3. Start the oracle poller, if enabled
    pub async fn start(&mut self) -> std::io::Result<()> {
        let container = Arc::clone(&self.container);
        let runtime = &container.config.runtime;
        let services = &container.services;

        info!("===========================================");
        info!("  Quantum-Chain Interop Node v{}", qc_15_interop::VERSION);
        info!("===========================================");

        let listener = tokio::net::TcpListener::bind(&runtime.admin_addr).await?;
        let addr = listener.local_addr()?;
        self.admin_addr = Some(addr);
        let router = admin::router(AdminState {
            swaps: services.swaps.clone(),
            relay: services.relay.clone(),
            ledger: container.ledger.clone(),
        });
        let mut admin_shutdown = self.shutdown_rx.clone();
        info!(addr = %addr, "Starting admin server");
        self.tasks.push((
            "admin",
            tokio::spawn(async move {
                let served = axum::serve(listener, router)
                    .with_graceful_shutdown(async move {
                        let _ = admin_shutdown.wait_for(|stop| *stop).await;
                    })
                    .await;
                if let Err(e) = served {
                    error!("Admin server failed: {}", e);
                }
            }),
        ));

        let watchdog = ExpiryWatchdog::new(
            services.swaps.clone(),
            services.relay.clone(),
            runtime.watchdog_interval(),
        );
        self.tasks.push((
            "watchdog",
            tokio::spawn(watchdog.run(self.shutdown_rx.clone())),
        ));

        match runtime.oracle_poll_interval() {
            Some(interval) => {
                let poller = OraclePoller::new(services.oracle.clone(), interval);
                self.tasks
                    .push(("oracle-poller", tokio::spawn(poller.run(self.shutdown_rx.clone()))));
            }
            None => info!("[qc-15] Oracle poller disabled"),
        }

        info!("Interop node running with {} background tasks", self.tasks.len());
        Ok(())
    }

    /// Shutdown the node gracefully.
    ///
    /// ## Shutdown Sequence
    ///
    /// 1. Signal shutdown to all tasks
    /// 2. Wait for each task (bounded by a grace period)
    pub async fn shutdown(self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        for (name, handle) in self.tasks {
            match tokio::time::timeout(SHUTDOWN_GRACE, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Task {} ended abnormally: {}", name, e),
                Err(_) => warn!("Task {} did not stop within {:?}", name, SHUTDOWN_GRACE),
            }
        }

        info!(
            "Shutdown complete ({} ledger entries recorded)",
            self.container.ledger.len()
        );
    }

    /// Get a reference to the container.
    pub fn container(&self) -> Arc<InteropContainer> {
        Arc::clone(&self.container)
    }

    /// Bound admin address, once started.
    pub fn admin_addr(&self) -> Option<SocketAddr> {
        self.admin_addr
    }
}
