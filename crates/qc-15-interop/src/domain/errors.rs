//! # Domain Errors
//!
//! Error types for the interoperability engine.
//!
//! Every public operation returns `Result<_, InteropError>`. Callers that only
//! care about the failure class use [`InteropError::kind`].

use super::value_objects::{ChainId, EntityKind};
use crate::ports::outbound::{EncryptionError, FetchError, LedgerError, ValidatorError};
use thiserror::Error;

/// Hash type (32-byte SHA-256).
pub type Hash = [u8; 32];

/// Opaque entity identifier (hex of a salted content hash, or caller-chosen).
pub type EntityId = String;

/// Failure classes shared by all five components.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown ID.
    NotFound,
    /// Operation not legal for the current status.
    InvalidState,
    /// Time-bound entity past its deadline.
    Expired,
    /// Time-bound entity not yet past its deadline.
    NotYetExpired,
    /// Hash-lock check failed.
    InvalidSecret,
    /// Validator set rejected submitted evidence.
    EvidenceRejected,
    /// Custodial liquidity check failed.
    InsufficientBridgeBalance,
    /// Chain not configured.
    UnsupportedChain,
    /// Malformed request (zero amount, past expiry, empty field).
    InvalidInput,
    /// Ledger, validator, encryption or fetch collaborator failed.
    UnderlyingService,
}

/// Interoperability error types.
#[derive(Debug, Error)]
pub enum InteropError {
    /// Entity not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Kind of entity looked up.
        kind: EntityKind,
        /// Requested ID.
        id: EntityId,
    },

    /// Invalid status transition.
    #[error("Invalid {kind} transition for {id}: {from} -> {to}")]
    InvalidState {
        /// Kind of entity.
        kind: EntityKind,
        /// Entity ID.
        id: EntityId,
        /// Current status.
        from: String,
        /// Attempted status or action.
        to: String,
    },

    /// Entity already exists under a caller-chosen ID.
    #[error("{kind} already exists: {id}")]
    AlreadyExists {
        /// Kind of entity.
        kind: EntityKind,
        /// Duplicate ID.
        id: EntityId,
    },

    /// Swap has expired.
    #[error("Swap {swap_id} expired at {expiration_time}")]
    Expired {
        /// Swap ID.
        swap_id: EntityId,
        /// Deadline that passed.
        expiration_time: u64,
    },

    /// Swap has not expired yet (cannot expire).
    #[error("Swap {swap_id} not expired: now={now}, expires at {expiration_time}")]
    NotYetExpired {
        /// Swap ID.
        swap_id: EntityId,
        /// Current time.
        now: u64,
        /// Deadline.
        expiration_time: u64,
    },

    /// Secret does not match the hash-lock.
    #[error("Invalid secret")]
    InvalidSecret,

    /// Evidence failed the validator-set check.
    #[error("Evidence {evidence_id} rejected for dispute {dispute_id}")]
    EvidenceRejected {
        /// Dispute ID.
        dispute_id: EntityId,
        /// Evidence ID (stored with `validated = false`).
        evidence_id: EntityId,
    },

    /// Bridge does not hold enough liquidity.
    #[error("Insufficient bridge balance for {token}: available={available}, requested={requested}")]
    InsufficientBridgeBalance {
        /// Token symbol.
        token: String,
        /// Current custodial balance.
        available: u64,
        /// Requested amount.
        requested: u64,
    },

    /// Chain not configured.
    #[error("Unsupported chain: {0}")]
    UnsupportedChain(ChainId),

    /// Amount must be positive.
    #[error("Invalid amount: {0}")]
    InvalidAmount(u64),

    /// Expiry is not in the future.
    #[error("Invalid expiry: {expiration_time} is not after {now}")]
    InvalidExpiry {
        /// Requested deadline.
        expiration_time: u64,
        /// Current time.
        now: u64,
    },

    /// Malformed request field.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Ledger collaborator failed.
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Validator-set collaborator failed.
    #[error("Validator error: {0}")]
    Validator(#[from] ValidatorError),

    /// Encryption collaborator failed.
    #[error("Encryption error: {0}")]
    Encryption(#[from] EncryptionError),

    /// External fetch failed.
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Payload could not be encoded or decoded.
    #[error("Codec error: {0}")]
    Codec(String),
}

impl InteropError {
    /// Project onto the shared failure taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::InvalidState { .. } | Self::AlreadyExists { .. } => ErrorKind::InvalidState,
            Self::Expired { .. } => ErrorKind::Expired,
            Self::NotYetExpired { .. } => ErrorKind::NotYetExpired,
            Self::InvalidSecret => ErrorKind::InvalidSecret,
            Self::EvidenceRejected { .. } => ErrorKind::EvidenceRejected,
            Self::InsufficientBridgeBalance { .. } => ErrorKind::InsufficientBridgeBalance,
            Self::UnsupportedChain(_) => ErrorKind::UnsupportedChain,
            Self::InvalidAmount(_) | Self::InvalidExpiry { .. } | Self::InvalidInput(_) => {
                ErrorKind::InvalidInput
            }
            Self::Ledger(_)
            | Self::Validator(_)
            | Self::Encryption(_)
            | Self::Fetch(_)
            | Self::Codec(_) => ErrorKind::UnderlyingService,
        }
    }

    /// True when a collaborator, not the request, caused the failure.
    pub fn is_underlying_service(&self) -> bool {
        self.kind() == ErrorKind::UnderlyingService
    }

    pub(crate) fn not_found(kind: EntityKind, id: &str) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub(crate) fn invalid_state(
        kind: EntityKind,
        id: &str,
        from: impl std::fmt::Debug,
        to: impl Into<String>,
    ) -> Self {
        Self::InvalidState {
            kind,
            id: id.to_string(),
            from: format!("{:?}", from),
            to: to.into(),
        }
    }
}

impl From<bincode::Error> for InteropError {
    fn from(err: bincode::Error) -> Self {
        Self::Codec(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_chain_error() {
        let err = InteropError::UnsupportedChain(ChainId::new("solana"));
        assert!(err.to_string().contains("solana"));
        assert_eq!(err.kind(), ErrorKind::UnsupportedChain);
    }

    #[test]
    fn test_not_found_error() {
        let err = InteropError::not_found(EntityKind::Swap, "abc");
        assert!(err.to_string().contains("swap not found: abc"));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_insufficient_balance_error() {
        let err = InteropError::InsufficientBridgeBalance {
            token: "SYN".to_string(),
            available: 100,
            requested: 150,
        };
        assert!(err.to_string().contains("available=100"));
        assert_eq!(err.kind(), ErrorKind::InsufficientBridgeBalance);
    }

    #[test]
    fn test_collaborator_errors_are_underlying_service() {
        let err: InteropError = LedgerError::Unavailable("disk".into()).into();
        assert!(err.is_underlying_service());

        let err: InteropError = ValidatorError::QuorumNotReached { got: 1, required: 3 }.into();
        assert!(err.is_underlying_service());
    }

    #[test]
    fn test_already_exists_is_invalid_state() {
        let err = InteropError::AlreadyExists {
            kind: EntityKind::Escrow,
            id: "esc-1".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }
}
