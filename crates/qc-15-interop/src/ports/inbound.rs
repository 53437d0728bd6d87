//! # Inbound Ports
//!
//! API traits defining what each interop component can do.

use crate::domain::{
    ArbitrationSummary, AtomicSwap, BridgeTransfer, ChainId, CrossChainTransaction, Dispute,
    EntityId, Escrow, Hash, InteropError, MessageStatus, OracleData, OracleDataSource,
    RollbackRecord, SwapLeg, SwapStatus, TransferTerms,
};
use serde::{Deserialize, Serialize};

/// Outcome of a read-only verification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationReport {
    /// Verification passed.
    pub valid: bool,
    /// Explanation when `valid` is false.
    pub reason: Option<String>,
}

impl VerificationReport {
    /// Passing report.
    pub fn valid() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    /// Failing report with an explanation.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
        }
    }
}

/// Atomic swap API - inbound port.
pub trait AtomicSwapApi: Send + Sync {
    /// Record a pending swap locked by `secret_hash`.
    fn initiate(
        &self,
        leg_a: SwapLeg,
        leg_b: SwapLeg,
        secret_hash: Hash,
        expiration_time: u64,
        initiator: &str,
    ) -> Result<EntityId, InteropError>;

    /// Complete with the revealed secret.
    fn complete(&self, swap_id: &str, secret: &[u8], responder: &str)
        -> Result<(), InteropError>;

    /// Expire a swap past its deadline.
    fn expire(&self, swap_id: &str) -> Result<(), InteropError>;

    /// Get swap by ID.
    fn get(&self, swap_id: &str) -> Result<AtomicSwap, InteropError>;

    /// Derived status (pending past deadline reads as expired).
    fn effective_status(&self, swap_id: &str) -> Result<SwapStatus, InteropError>;

    /// Expire every pending swap past its deadline. Returns the IDs expired.
    fn expire_due(&self) -> Vec<EntityId>;

    /// Number of swaps tracked.
    fn len(&self) -> usize;

    /// True if no swaps are tracked.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Custodial bridge API - inbound port.
pub trait BridgeApi: Send + Sync {
    /// Debit bridge liquidity and record a pending transfer.
    fn initiate_transfer(&self, terms: TransferTerms) -> Result<EntityId, InteropError>;

    /// Mark the destination credit as confirmed.
    fn complete_transfer(&self, transfer_id: &str) -> Result<(), InteropError>;

    /// Credit bridge liquidity. Returns the new balance.
    fn add_funds(&self, token_symbol: &str, amount: u64) -> Result<u64, InteropError>;

    /// Current liquidity for `token_symbol`.
    fn balance(&self, token_symbol: &str) -> u64;

    /// Get transfer by ID.
    fn transfer(&self, transfer_id: &str) -> Result<BridgeTransfer, InteropError>;

    /// Check if chain is supported.
    fn supports(&self, chain: &ChainId) -> bool;
}

/// Generic cross-chain transactions - inbound port.
pub trait TransactionApi: Send + Sync {
    /// Record a pending non-custodial transaction.
    fn initiate_transaction(&self, terms: TransferTerms) -> Result<EntityId, InteropError>;

    /// Mark the transaction completed.
    fn complete_transaction(&self, transaction_id: &str) -> Result<(), InteropError>;

    /// Get transaction by ID.
    fn transaction(&self, transaction_id: &str) -> Result<CrossChainTransaction, InteropError>;

    /// Record an audit-only rollback request.
    fn rollback_action(&self, action_id: &str, reason: &str) -> Result<EntityId, InteropError>;

    /// All rollback records, oldest first.
    fn rollbacks(&self) -> Vec<RollbackRecord>;

    /// Register contract code for later validation.
    fn register_contract(&self, contract_id: &str, code: &[u8]) -> Result<(), InteropError>;

    /// Re-validate a transaction against the ledger and validator set.
    fn verify_transaction(&self, transaction_id: &str)
        -> Result<VerificationReport, InteropError>;

    /// Validate a registered contract through the validator set.
    fn validate_contract(&self, contract_id: &str) -> Result<VerificationReport, InteropError>;
}

/// Escrow API - inbound port.
pub trait EscrowApi: Send + Sync {
    /// Create an escrow under a caller-chosen ID.
    fn initiate_escrow(
        &self,
        escrow_id: &str,
        asset_id: &str,
        source_chain: ChainId,
        target_chain: ChainId,
        amount: u64,
    ) -> Result<Escrow, InteropError>;

    /// Release escrowed funds to the target side.
    fn release_escrow(&self, escrow_id: &str) -> Result<Escrow, InteropError>;

    /// Return escrowed funds to the source side.
    fn return_escrow_funds(&self, escrow_id: &str) -> Result<Escrow, InteropError>;

    /// Get escrow by ID.
    fn escrow(&self, escrow_id: &str) -> Result<Escrow, InteropError>;
}

/// Dispute and arbitration API - inbound port.
pub trait DisputeApi: Send + Sync {
    /// File a dispute.
    fn initiate_dispute(&self, initiator_id: &str, reason: &str)
        -> Result<EntityId, InteropError>;

    /// Submit evidence. Rejected evidence is stored unvalidated and the call fails.
    fn submit_evidence(&self, dispute_id: &str, content: &str) -> Result<EntityId, InteropError>;

    /// Assign a mediator (initiated -> escalated).
    fn assign_mediator(&self, dispute_id: &str, mediator_id: &str) -> Result<(), InteropError>;

    /// Remove the mediator (escalated -> initiated).
    fn unassign_mediator(&self, dispute_id: &str) -> Result<(), InteropError>;

    /// Record the resolution. Moves no funds.
    fn resolve_dispute(&self, dispute_id: &str, resolution: &str) -> Result<(), InteropError>;

    /// Summarise the dispute for arbitration.
    fn generate_arbitration_summary(
        &self,
        dispute_id: &str,
    ) -> Result<ArbitrationSummary, InteropError>;

    /// Get dispute by ID.
    fn dispute(&self, dispute_id: &str) -> Result<Dispute, InteropError>;
}

/// Message relay API - inbound port.
pub trait MessageRelayApi: Send + Sync {
    /// Seal, attest and pool a message.
    fn send(
        &self,
        from_chain: ChainId,
        to_chain: ChainId,
        payload: &[u8],
    ) -> Result<EntityId, InteropError>;

    /// Confirm delivery and evict from the pool.
    fn confirm(&self, message_id: &str) -> Result<(), InteropError>;

    /// Pool lookup. Confirmed messages are `NotFound`.
    fn status(&self, message_id: &str) -> Result<MessageStatus, InteropError>;

    /// Unseal the payload of a pending message.
    fn open(&self, message_id: &str) -> Result<Vec<u8>, InteropError>;

    /// Messages awaiting confirmation.
    fn pending_count(&self) -> usize;
}

/// Oracle ingestion API - inbound port.
pub trait OracleApi: Send + Sync {
    /// Register an active source with a sealed URL.
    fn add_source(&self, name: &str, url: &str, data_format: &str)
        -> Result<EntityId, InteropError>;

    /// Fetch, hash and record the source's current content.
    fn fetch(&self, name: &str) -> Result<OracleData, InteropError>;

    /// Delete a source and its data.
    fn remove_source(&self, name: &str) -> Result<(), InteropError>;

    /// Enable or disable fetching.
    fn set_active(&self, name: &str, active: bool) -> Result<(), InteropError>;

    /// All sources, ordered by name.
    fn sources(&self) -> Vec<OracleDataSource>;

    /// Latest data for a source with its derived status, if any was fetched.
    fn latest(&self, name: &str) -> Result<Option<OracleData>, InteropError>;

    /// Recompute the content hash of `data`.
    fn verify(&self, data: &OracleData) -> bool;
}
