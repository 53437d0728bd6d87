//! # Outbound Ports
//!
//! Traits for the collaborators the engines consume: the ledger, the
//! validator set, the encryption service, the oracle fetcher and the clock.
//!
//! All ports are synchronous. Nothing in the core awaits; schedulers and
//! network I/O live in the node runtime.

use crate::algorithms::QuorumThreshold;
use crate::domain::{ChainId, EntityId, Hash};
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Ledger
// =============================================================================

/// Kind of event written to the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordKind {
    /// Swap created (hash-lock only, never the secret).
    SwapInitiated,
    /// Swap completed with the revealed secret.
    SwapCompleted,
    /// Swap expired.
    SwapExpired,
    /// Bridge transfer initiated (balance debited).
    BridgeTransfer,
    /// Bridge transfer destination credit confirmed.
    BridgeTransferCompleted,
    /// Operator credited bridge liquidity.
    BridgeFunded,
    /// Coordinator transaction initiated.
    Transaction,
    /// Coordinator transaction completed.
    TransactionCompleted,
    /// Escrow created.
    EscrowInitiated,
    /// Escrow released or returned.
    EscrowSettled,
    /// Rollback requested.
    Rollback,
    /// Dispute filed.
    DisputeInitiated,
    /// Evidence submitted (validated or not).
    Evidence,
    /// Mediator assigned or unassigned.
    MediatorChanged,
    /// Dispute resolved.
    DisputeResolved,
    /// Arbitration summary generated.
    ArbitrationSummary,
    /// Contract registered for validation.
    Contract,
    /// Relay message sent.
    MessageSent,
    /// Relay message confirmed.
    MessageConfirmed,
    /// Oracle source registered, toggled or removed.
    OracleSource,
    /// Oracle fact ingested (or fetch failure).
    OracleData,
}

/// One append-only ledger record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Event kind.
    pub kind: RecordKind,
    /// Entity the event belongs to.
    pub id: EntityId,
    /// Chains touched by the event (indexed for `transactions_by_chain`).
    pub chains: Vec<ChainId>,
    /// Sealed, encoded entity snapshot.
    pub sealed_payload: Vec<u8>,
    /// Record timestamp.
    pub recorded_at: u64,
}

/// Ledger errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Store cannot accept or serve requests.
    #[error("Ledger unavailable: {0}")]
    Unavailable(String),

    /// Store refused the record.
    #[error("Ledger rejected record {id}: {reason}")]
    Rejected {
        /// Entity ID of the refused record.
        id: EntityId,
        /// Reason given by the store.
        reason: String,
    },
}

/// Append-only event store - outbound port.
pub trait Ledger: Send + Sync {
    /// Append a record.
    fn record(&self, entry: LedgerEntry) -> Result<(), LedgerError>;

    /// All records of `kind` for `id`, oldest first.
    fn records_for(&self, kind: RecordKind, id: &str) -> Result<Vec<LedgerEntry>, LedgerError>;

    /// Most recent record of `kind` for `id`.
    fn latest(&self, kind: RecordKind, id: &str) -> Result<Option<LedgerEntry>, LedgerError> {
        Ok(self.records_for(kind, id)?.pop())
    }

    /// Transaction and bridge-transfer initiations touching `chain`.
    fn transactions_by_chain(&self, chain: &ChainId) -> Result<Vec<LedgerEntry>, LedgerError>;

    /// Evidence record by evidence ID.
    fn evidence_by_id(&self, evidence_id: &str) -> Result<Option<LedgerEntry>, LedgerError> {
        self.latest(RecordKind::Evidence, evidence_id)
    }

    /// Contract registration by contract ID.
    fn contract_by_id(&self, contract_id: &str) -> Result<Option<LedgerEntry>, LedgerError> {
        self.latest(RecordKind::Contract, contract_id)
    }
}

// =============================================================================
// Validator Set
// =============================================================================

/// One member's signature over an attested digest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSignature {
    /// Member identity.
    pub validator_id: String,
    /// Member's MAC over the digest.
    pub signature: Hash,
}

/// Quorum attestation over a payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attestation {
    /// Digest used as the entity's validation hash.
    pub validation_hash: Hash,
    /// Signatures collected, at least `threshold().required()` of them.
    pub signatures: Vec<ValidatorSignature>,
}

/// Validator-set errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidatorError {
    /// Fewer than `required` members responded.
    #[error("Quorum not reached: got {got}, required {required}")]
    QuorumNotReached {
        /// Members that responded.
        got: usize,
        /// Members required.
        required: usize,
    },

    /// Validator set is not usable as configured.
    #[error("Validator set misconfigured: {0}")]
    Misconfigured(String),
}

/// k-of-n quorum capability - outbound port.
///
/// Engines only ever look at the returned digest or boolean, never at which
/// members signed.
pub trait QuorumValidator: Send + Sync {
    /// Acceptance threshold.
    fn threshold(&self) -> QuorumThreshold;

    /// Attest a canonical payload.
    fn attest(&self, payload: &[u8]) -> Result<Attestation, ValidatorError>;

    /// Re-check a stored validation hash against the canonical payload.
    fn validate_transaction(
        &self,
        transaction_id: &str,
        payload: &[u8],
        validation_hash: &Hash,
    ) -> Result<bool, ValidatorError>;

    /// Evidence check for dispute submissions.
    fn validate_evidence(&self, content: &[u8]) -> Result<bool, ValidatorError>;

    /// Contract check for registered contract code.
    fn validate_contract(&self, code: &[u8]) -> Result<bool, ValidatorError>;
}

// =============================================================================
// Encryption Service
// =============================================================================

/// Purpose-bound key selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyId {
    /// Oracle source URLs.
    OracleUrl,
    /// Relay message payloads.
    MessagePayload,
    /// Ledger entry snapshots.
    LedgerEntry,
}

impl KeyId {
    /// Derivation label for this purpose.
    pub fn label(&self) -> &'static str {
        match self {
            Self::OracleUrl => "qc15/oracle-url",
            Self::MessagePayload => "qc15/message-payload",
            Self::LedgerEntry => "qc15/ledger-entry",
        }
    }
}

/// Encryption errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncryptionError {
    /// Encryption failed.
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// Decryption or authentication failed.
    #[error("Decryption failed: {0}")]
    DecryptionFailed(String),

    /// Sealed blob shorter than its nonce.
    #[error("Sealed payload too short: {0} bytes")]
    Truncated(usize),

    /// Invalid key length.
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key length in bytes.
        expected: usize,
        /// Actual key length in bytes.
        actual: usize,
    },
}

/// Seal/unseal capability - outbound port.
pub trait EncryptionService: Send + Sync {
    /// Seal `plaintext` under the key for `key`.
    fn seal(&self, key: KeyId, plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError>;

    /// Unseal a blob produced by [`EncryptionService::seal`] with the same key.
    fn unseal(&self, key: KeyId, sealed: &[u8]) -> Result<Vec<u8>, EncryptionError>;
}

// =============================================================================
// Oracle Fetcher
// =============================================================================

/// Fetch errors. URLs are deliberately absent: they are sealed at rest.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Endpoint could not be reached.
    #[error("Source unreachable: {0}")]
    Unreachable(String),

    /// Endpoint answered with a non-success status.
    #[error("Source returned status {0}")]
    HttpStatus(u16),

    /// Request timed out.
    #[error("Fetch timed out")]
    Timeout,

    /// URL could not be parsed.
    #[error("Invalid source URL")]
    InvalidUrl,

    /// Response body exceeded the configured limit.
    #[error("Source content exceeds {limit} bytes")]
    TooLarge {
        /// Limit in bytes.
        limit: usize,
    },
}

/// External data retrieval - outbound port.
pub trait OracleFetcher: Send + Sync {
    /// Retrieve the raw content at `url`.
    fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

// =============================================================================
// Clock
// =============================================================================

/// Time source (Unix seconds).
pub trait Clock: Send + Sync {
    /// Current time.
    fn now(&self) -> u64;
}
