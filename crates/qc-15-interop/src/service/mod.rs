//! # Service Module
//!
//! The five interop engines plus the plumbing they share.
//!
//! ## Mutation Protocol
//!
//! Every mutating operation, under its component lock:
//!
//! 1. validates the request against the current state,
//! 2. builds the post-state on a copy,
//! 3. writes the sealed post-state to the ledger,
//! 4. only then replaces the in-memory entry.
//!
//! A failed ledger write therefore returns an error with memory untouched.
//! Cross-component sequences (transfer then relay announcement) are separate
//! critical sections; recover a gap between them from the ledger.

pub mod bridge;
pub mod coordinator;
pub mod oracle;
pub mod recorder;
pub mod registry;
pub mod relay;
pub mod swap;

pub use bridge::BridgeTransferManager;
pub use coordinator::CrossChainCoordinator;
pub use oracle::OracleIngestion;
pub use recorder::LedgerRecorder;
pub use registry::ShardedRegistry;
pub use relay::MessageRelay;
pub use swap::AtomicSwapEngine;

use crate::domain::{
    invariant_chains_supported, invariant_non_empty, invariant_positive_amount, ChainId,
    InteropConfig, InteropError, TransferTerms,
};
use crate::ports::{Clock, EncryptionService, Ledger, OracleFetcher, QuorumValidator};
use std::collections::HashSet;
use std::sync::Arc;

/// Outbound collaborators shared by the engines.
#[derive(Clone)]
pub struct Collaborators {
    /// Durable event store.
    pub ledger: Arc<dyn Ledger>,
    /// k-of-n attestation.
    pub validator: Arc<dyn QuorumValidator>,
    /// Payload sealing.
    pub sealer: Arc<dyn EncryptionService>,
    /// Time source.
    pub clock: Arc<dyn Clock>,
}

impl Collaborators {
    /// Bundle collaborators.
    pub fn new(
        ledger: Arc<dyn Ledger>,
        validator: Arc<dyn QuorumValidator>,
        sealer: Arc<dyn EncryptionService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            ledger,
            validator,
            sealer,
            clock,
        }
    }

    /// Recorder writing through these collaborators.
    pub fn recorder(&self) -> LedgerRecorder {
        LedgerRecorder::new(
            Arc::clone(&self.ledger),
            Arc::clone(&self.sealer),
            Arc::clone(&self.clock),
        )
    }
}

/// All five engines over one set of collaborators.
#[derive(Clone)]
pub struct InteropServices {
    /// Atomic swap engine.
    pub swaps: Arc<AtomicSwapEngine>,
    /// Custodial bridge.
    pub bridge: Arc<BridgeTransferManager>,
    /// Transaction coordinator (transactions, escrow, disputes).
    pub coordinator: Arc<CrossChainCoordinator>,
    /// Message relay.
    pub relay: Arc<MessageRelay>,
    /// Oracle ingestion.
    pub oracle: Arc<OracleIngestion>,
}

impl InteropServices {
    /// Build every engine from `config`.
    pub fn new(
        config: &InteropConfig,
        deps: Collaborators,
        fetcher: Arc<dyn OracleFetcher>,
    ) -> Self {
        Self {
            swaps: Arc::new(AtomicSwapEngine::new(config, deps.clone())),
            bridge: Arc::new(BridgeTransferManager::new(config, deps.clone())),
            coordinator: Arc::new(CrossChainCoordinator::new(config, deps.clone())),
            relay: Arc::new(MessageRelay::new(config, deps.clone())),
            oracle: Arc::new(OracleIngestion::new(config, deps, fetcher)),
        }
    }
}

pub(crate) fn supported_set(config: &InteropConfig) -> HashSet<ChainId> {
    config.supported_chains.iter().cloned().collect()
}

/// Shared request checks for bridge transfers and coordinator transactions.
pub(crate) fn validate_terms(
    terms: &TransferTerms,
    supported: &HashSet<ChainId>,
) -> Result<(), InteropError> {
    invariant_positive_amount(terms.amount)?;
    invariant_non_empty("token_symbol", &terms.token_symbol)?;
    invariant_non_empty("from_address", &terms.from_address)?;
    invariant_non_empty("to_address", &terms.to_address)?;
    invariant_chains_supported(supported, &[&terms.from_chain, &terms.to_chain])
}

/// Test fixtures shared by the engine unit tests.
#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::adapters::{InMemoryLedger, ManualClock, ThresholdValidatorSet, XChaChaSealer};

    pub const T0: u64 = 1_700_000_000;

    pub struct Harness {
        pub ledger: Arc<InMemoryLedger>,
        pub validator: Arc<ThresholdValidatorSet>,
        pub clock: Arc<ManualClock>,
        pub deps: Collaborators,
        pub config: InteropConfig,
    }

    pub fn harness() -> Harness {
        let ledger = Arc::new(InMemoryLedger::new());
        let keys = (0..4u8).map(|i| [i + 1; 32]).collect();
        let validator = Arc::new(ThresholdValidatorSet::with_keys(keys, 3, 1024).unwrap());
        let clock = Arc::new(ManualClock::new(T0));
        let sealer = Arc::new(XChaChaSealer::from_master_key(&[9u8; 32]).unwrap());
        let deps = Collaborators::new(ledger.clone(), validator.clone(), sealer, clock.clone());
        Harness {
            ledger,
            validator,
            clock,
            deps,
            config: InteropConfig::with_chains(["x", "y", "chain-a", "chain-b"]),
        }
    }

    pub fn terms(amount: u64, token: &str) -> TransferTerms {
        TransferTerms {
            from_chain: ChainId::new("x"),
            to_chain: ChainId::new("y"),
            amount,
            token_symbol: token.to_string(),
            from_address: "alice@x".to_string(),
            to_address: "bob@y".to_string(),
        }
    }
}
