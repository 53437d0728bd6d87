//! # Domain Entities
//!
//! Core entities for the interoperability engine.
//!
//! Swaps, transfers, transactions and escrows are never deleted: they stay in
//! their registry and on the ledger as an audit trail. Relay messages are the
//! exception and are evicted once confirmed.

use super::errors::{EntityId, Hash, InteropError};
use super::invariants::invariant_secret_matches;
use super::value_objects::{
    ChainId, DisputeStatus, EntityKind, EscrowStatus, MessageStatus, OracleDataStatus, SwapStatus,
    TransferStatus,
};
use crate::algorithms::hashlock;
use serde::{Deserialize, Serialize};

/// One side of an atomic swap.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapLeg {
    /// Chain this leg settles on.
    pub chain: ChainId,
    /// Token descriptor.
    pub token: String,
    /// Amount of `token`.
    pub amount: u64,
    /// Party address on `chain`.
    pub address: String,
}

impl SwapLeg {
    /// Create a swap leg.
    pub fn new(
        chain: impl Into<ChainId>,
        token: impl Into<String>,
        amount: u64,
        address: impl Into<String>,
    ) -> Self {
        Self {
            chain: chain.into(),
            token: token.into(),
            amount,
            address: address.into(),
        }
    }
}

/// Hash-locked atomic swap (this chain's view of one leg pair).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtomicSwap {
    /// Unique swap identifier.
    pub swap_id: EntityId,
    /// Leg offered by the initiator.
    pub leg_a: SwapLeg,
    /// Leg offered by the responder.
    pub leg_b: SwapLeg,
    /// SHA-256 of the initiator's secret.
    pub secret_hash: Hash,
    /// Revealed secret (only set after completion).
    pub secret: Option<Vec<u8>>,
    /// Unix timestamp at which the swap stops being claimable.
    pub expiration_time: u64,
    /// Initiator identity.
    pub initiator: String,
    /// Responder identity (only set after completion).
    pub responder: Option<String>,
    /// Stored status.
    pub status: SwapStatus,
    /// Creation timestamp.
    pub created_at: u64,
}

impl AtomicSwap {
    /// Check if the deadline has passed.
    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.expiration_time
    }

    /// Status as seen by readers: a pending swap past its deadline reads as expired.
    pub fn effective_status(&self, now: u64) -> SwapStatus {
        if self.status == SwapStatus::Pending && self.is_expired(now) {
            SwapStatus::Expired
        } else {
            self.status
        }
    }

    /// Complete with the revealed secret.
    ///
    /// Checks run in order: status, deadline, hash-lock. The deadline wins over
    /// the secret so a late claim is `Expired` whatever secret it carries.
    pub fn complete(
        &mut self,
        secret: &[u8],
        responder: &str,
        now: u64,
    ) -> Result<(), InteropError> {
        self.ensure_transition(SwapStatus::Completed)?;
        if self.is_expired(now) {
            return Err(InteropError::Expired {
                swap_id: self.swap_id.clone(),
                expiration_time: self.expiration_time,
            });
        }
        if !invariant_secret_matches(secret, &self.secret_hash) {
            return Err(InteropError::InvalidSecret);
        }
        self.secret = Some(secret.to_vec());
        self.responder = Some(responder.to_string());
        self.status = SwapStatus::Completed;
        Ok(())
    }

    /// Mark as expired.
    pub fn expire(&mut self, now: u64) -> Result<(), InteropError> {
        self.ensure_transition(SwapStatus::Expired)?;
        if !self.is_expired(now) {
            return Err(InteropError::NotYetExpired {
                swap_id: self.swap_id.clone(),
                now,
                expiration_time: self.expiration_time,
            });
        }
        self.status = SwapStatus::Expired;
        Ok(())
    }

    fn ensure_transition(&self, next: SwapStatus) -> Result<(), InteropError> {
        if !self.status.can_transition_to(next) {
            return Err(InteropError::invalid_state(
                EntityKind::Swap,
                &self.swap_id,
                self.status,
                format!("{:?}", next),
            ));
        }
        Ok(())
    }
}

/// Fields shared by bridge transfers and coordinator transactions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferTerms {
    /// Source chain.
    pub from_chain: ChainId,
    /// Destination chain.
    pub to_chain: ChainId,
    /// Amount moved.
    pub amount: u64,
    /// Token symbol.
    pub token_symbol: String,
    /// Sender address on `from_chain`.
    pub from_address: String,
    /// Recipient address on `to_chain`.
    pub to_address: String,
}

/// Custodial bridge transfer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeTransfer {
    /// Unique transfer identifier.
    pub transfer_id: EntityId,
    /// Transfer terms.
    pub terms: TransferTerms,
    /// Initiation timestamp.
    pub timestamp: u64,
    /// Quorum digest over the canonical terms.
    pub validation_hash: Hash,
    /// Current status.
    pub status: TransferStatus,
}

/// Non-custodial cross-chain transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossChainTransaction {
    /// Unique transaction identifier.
    pub transaction_id: EntityId,
    /// Transaction terms.
    pub terms: TransferTerms,
    /// Initiation timestamp.
    pub timestamp: u64,
    /// Quorum digest over the canonical terms.
    pub validation_hash: Hash,
    /// Current status.
    pub status: TransferStatus,
}

/// Escrowed asset between two chains.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Escrow {
    /// Caller-chosen escrow identifier.
    pub escrow_id: EntityId,
    /// Escrowed asset.
    pub asset_id: String,
    /// Chain the asset is held on.
    pub source_chain: ChainId,
    /// Chain the asset is released to.
    pub target_chain: ChainId,
    /// Escrowed amount.
    pub amount: u64,
    /// Current status.
    pub status: EscrowStatus,
    /// Creation timestamp.
    pub created_at: u64,
    /// Release/return timestamp.
    pub settled_at: Option<u64>,
}

impl Escrow {
    /// Move to `Released` or `Returned`.
    pub fn settle(&mut self, next: EscrowStatus, now: u64) -> Result<(), InteropError> {
        if !self.status.can_transition_to(next) {
            return Err(InteropError::invalid_state(
                EntityKind::Escrow,
                &self.escrow_id,
                self.status,
                format!("{:?}", next),
            ));
        }
        self.status = next;
        self.settled_at = Some(now);
        Ok(())
    }
}

/// Evidence attached to a dispute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeEvidence {
    /// Evidence identifier.
    pub evidence_id: EntityId,
    /// Evidence content.
    pub content: String,
    /// Passed the validator-set evidence check.
    pub validated: bool,
    /// Submission timestamp.
    pub submitted_at: u64,
}

/// Summary produced for arbitration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArbitrationSummary {
    /// Dispute summarised.
    pub dispute_id: EntityId,
    /// Status at generation time.
    pub status: DisputeStatus,
    /// Evidence items submitted.
    pub total_evidence: usize,
    /// Evidence items that passed validation.
    pub validated_evidence: usize,
    /// Mediator at generation time.
    pub mediator_id: Option<String>,
    /// Resolution, if resolved.
    pub resolution: Option<String>,
    /// Generation timestamp.
    pub generated_at: u64,
}

/// Dispute record. Advisory: resolving it moves no funds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispute {
    /// Dispute identifier.
    pub dispute_id: EntityId,
    /// Party that filed.
    pub initiator_id: String,
    /// Stated reason.
    pub reason: String,
    /// Current status.
    pub status: DisputeStatus,
    /// Assigned mediator.
    pub mediator_id: Option<String>,
    /// Submitted evidence, in order.
    pub evidence: Vec<DisputeEvidence>,
    /// Recorded resolution.
    pub resolution: Option<String>,
    /// Last generated summary.
    pub summary: Option<ArbitrationSummary>,
    /// Creation timestamp.
    pub created_at: u64,
}

impl Dispute {
    /// Transition to new status.
    pub fn transition_to(&mut self, next: DisputeStatus) -> Result<(), InteropError> {
        if !self.status.can_transition_to(next) {
            return Err(InteropError::invalid_state(
                EntityKind::Dispute,
                &self.dispute_id,
                self.status,
                format!("{:?}", next),
            ));
        }
        self.status = next;
        Ok(())
    }

    /// Fail unless the dispute is still open.
    pub fn ensure_open(&self, action: &str) -> Result<(), InteropError> {
        if !self.status.is_open() {
            return Err(InteropError::invalid_state(
                EntityKind::Dispute,
                &self.dispute_id,
                self.status,
                action,
            ));
        }
        Ok(())
    }

    /// Build the arbitration summary for the current state.
    pub fn summarize(&self, now: u64) -> ArbitrationSummary {
        ArbitrationSummary {
            dispute_id: self.dispute_id.clone(),
            status: self.status,
            total_evidence: self.evidence.len(),
            validated_evidence: self.evidence.iter().filter(|e| e.validated).count(),
            mediator_id: self.mediator_id.clone(),
            resolution: self.resolution.clone(),
            generated_at: now,
        }
    }
}

/// Audit record of a rollback request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackRecord {
    /// Rollback identifier.
    pub rollback_id: EntityId,
    /// Action being rolled back.
    pub action_id: String,
    /// Stated reason.
    pub reason: String,
    /// Recording timestamp.
    pub recorded_at: u64,
}

/// Contract registered with the coordinator for validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredContract {
    /// Caller-chosen contract identifier.
    pub contract_id: String,
    /// Contract code as submitted.
    pub code: Vec<u8>,
    /// SHA-256 of `code` at registration.
    pub code_hash: Hash,
    /// Registration timestamp.
    pub registered_at: u64,
}

/// Message travelling through the relay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossChainMessage {
    /// Message identifier.
    pub message_id: EntityId,
    /// Source chain.
    pub from_chain: ChainId,
    /// Destination chain.
    pub to_chain: ChainId,
    /// Sealed payload bytes.
    pub payload: Vec<u8>,
    /// Quorum digest over (from, to, plaintext payload, timestamp).
    pub validation_hash: Hash,
    /// Send timestamp.
    pub timestamp: u64,
    /// Current status.
    pub status: MessageStatus,
}

/// Registered oracle data source.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleDataSource {
    /// Source identifier.
    pub source_id: EntityId,
    /// Unique source name.
    pub name: String,
    /// Sealed URL bytes.
    pub url: Vec<u8>,
    /// Inactive sources cannot be fetched.
    pub is_active: bool,
    /// Declared content format (e.g. "json").
    pub data_format: String,
    /// Timestamp of the last successful fetch.
    pub last_updated: Option<u64>,
}

/// One ingested external fact.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleData {
    /// Source the fact came from.
    pub source_id: EntityId,
    /// Raw content.
    pub content: Vec<u8>,
    /// Fetch timestamp.
    pub fetched_at: u64,
    /// SHA-256 of `content`.
    pub hash: Hash,
    /// Stored status.
    pub status: OracleDataStatus,
}

impl OracleData {
    /// Status as seen by readers: valid data older than `max_age_secs` reads as expired.
    pub fn effective_status(&self, now: u64, max_age_secs: u64) -> OracleDataStatus {
        if self.status == OracleDataStatus::Valid
            && now.saturating_sub(self.fetched_at) > max_age_secs
        {
            OracleDataStatus::Expired
        } else {
            self.status
        }
    }

    /// Recompute the content hash and compare.
    pub fn verify(&self) -> bool {
        hashlock::sha256(&self.content) == self.hash
    }
}
