//! # Integration Tests
//!
//! Flows that span more than one component. Each test wires the components
//! over one ledger, one validator set and one clock, the way the node does.

pub mod flows;
pub mod recovery;

use qc_15_interop::{
    ChainId, Collaborators, InMemoryLedger, InteropConfig, InteropServices, LedgerEntry,
    ManualClock, RecordKind, StaticOracleFetcher, ThresholdValidatorSet, TransferTerms,
    XChaChaSealer,
};
use std::sync::Arc;

/// Fixed start time for every flow.
pub const T0: u64 = 1_700_000_000;

/// Components plus the concrete handles tests inspect or fault.
pub struct Node {
    /// Shared ledger.
    pub ledger: Arc<InMemoryLedger>,
    /// Shared clock.
    pub clock: Arc<ManualClock>,
    /// Shared validator set.
    pub validators: Arc<ThresholdValidatorSet>,
    /// Collaborator bundle (for opening ledger records).
    pub deps: Collaborators,
    /// The five components.
    pub services: InteropServices,
}

impl Node {
    /// Wire a 3-of-4 node accepting `ethereum` and `polygon`.
    pub fn new() -> Self {
        let ledger = Arc::new(InMemoryLedger::new());
        let clock = Arc::new(ManualClock::new(T0));
        let keys = (0..4u8).map(|i| [0xA0 + i; 32]).collect();
        let validators = Arc::new(ThresholdValidatorSet::with_keys(keys, 3, 4096).unwrap());
        let sealer = Arc::new(XChaChaSealer::from_master_key(&[0x5A; 32]).unwrap());
        let deps = Collaborators::new(ledger.clone(), validators.clone(), sealer, clock.clone());
        let config = InteropConfig::with_chains(["ethereum", "polygon"]);
        let services =
            InteropServices::new(&config, deps.clone(), Arc::new(StaticOracleFetcher::new()));
        Self {
            ledger,
            clock,
            validators,
            deps,
            services,
        }
    }

    /// Ledger entries of `kind`, oldest first.
    pub fn records(&self, kind: RecordKind) -> Vec<LedgerEntry> {
        self.ledger.entries_of(kind)
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::new()
    }
}

/// Ethereum to Polygon transfer of `amount` SYN.
pub fn eth_to_polygon(amount: u64) -> TransferTerms {
    TransferTerms {
        from_chain: ChainId::new("ethereum"),
        to_chain: ChainId::new("polygon"),
        amount,
        token_symbol: "SYN".to_string(),
        from_address: "0xalice".to_string(),
        to_address: "0xbob".to_string(),
    }
}
