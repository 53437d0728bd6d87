//! # Interop Container
//!
//! Holds the collaborator adapters and the five components built on them.
//!
//! The ledger and validator set are kept as concrete handles so the runtime
//! can report on them; the components only see the port traits.

use crate::config::{ConfigError, NodeConfig};
use qc_15_interop::ports::{EncryptionError, OracleFetcher, QuorumValidator, ValidatorError};
use qc_15_interop::{
    Collaborators, InMemoryLedger, InteropServices, SystemClock, ThresholdValidatorSet,
    XChaChaSealer,
};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Wiring failures.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Configuration rejected.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Sealer could not be keyed.
    #[error("Failed to key payload sealer: {0}")]
    Sealer(#[from] EncryptionError),

    /// Validator set could not be built.
    #[error("Failed to build validator set: {0}")]
    Validators(#[from] ValidatorError),
}

/// Central container for the interoperability components.
pub struct InteropContainer {
    /// Node configuration.
    pub config: NodeConfig,
    /// Append-only ledger.
    pub ledger: Arc<InMemoryLedger>,
    /// k-of-n validator set.
    pub validators: Arc<ThresholdValidatorSet>,
    /// The five components.
    pub services: InteropServices,
}

impl InteropContainer {
    /// Wire adapters into the components.
    pub fn new(config: NodeConfig, fetcher: Arc<dyn OracleFetcher>) -> Result<Self, ContainerError> {
        config.validate()?;

        let ledger = Arc::new(InMemoryLedger::new());
        let validators = Arc::new(ThresholdValidatorSet::new(&config.quorum)?);
        let sealer = Arc::new(XChaChaSealer::from_master_key(&config.seal_key()?)?);
        let deps = Collaborators::new(
            ledger.clone(),
            validators.clone(),
            sealer,
            Arc::new(SystemClock),
        );
        let services = InteropServices::new(&config.interop, deps, fetcher);

        let quorum = validators.threshold();
        info!(
            "[qc-15] Container ready: {} chains, {}-of-{} validators, {} registry shards",
            config.interop.supported_chains.len(),
            quorum.required(),
            quorum.total(),
            config.interop.registry_shards
        );

        Ok(Self {
            config,
            ledger,
            validators,
            services,
        })
    }
}
