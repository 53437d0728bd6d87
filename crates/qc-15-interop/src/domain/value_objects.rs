//! # Domain Value Objects
//!
//! Immutable value types and status state machines.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Chain identifier, as configured by the operator.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(String);

impl ChainId {
    /// Create a chain identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow as string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ChainId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Kinds of entity tracked by the engine (used in errors and IDs).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// Atomic swap.
    Swap,
    /// Bridge transfer.
    Transfer,
    /// Generic cross-chain transaction.
    Transaction,
    /// Escrow.
    Escrow,
    /// Dispute.
    Dispute,
    /// Dispute evidence.
    Evidence,
    /// Rollback record.
    Rollback,
    /// Registered contract.
    Contract,
    /// Relay message.
    Message,
    /// Oracle data source.
    OracleSource,
}

impl EntityKind {
    /// Short prefix used in generated IDs.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Swap => "swp",
            Self::Transfer => "btx",
            Self::Transaction => "xtx",
            Self::Escrow => "esc",
            Self::Dispute => "dsp",
            Self::Evidence => "evd",
            Self::Rollback => "rbk",
            Self::Contract => "ctr",
            Self::Message => "msg",
            Self::OracleSource => "src",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Swap => "swap",
            Self::Transfer => "transfer",
            Self::Transaction => "transaction",
            Self::Escrow => "escrow",
            Self::Dispute => "dispute",
            Self::Evidence => "evidence",
            Self::Rollback => "rollback",
            Self::Contract => "contract",
            Self::Message => "message",
            Self::OracleSource => "oracle source",
        };
        f.write_str(name)
    }
}

/// Atomic swap state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwapStatus {
    /// Created, awaiting secret reveal or expiry.
    #[default]
    Pending,
    /// Secret revealed before the deadline.
    Completed,
    /// Deadline passed without a valid claim.
    Expired,
}

impl SwapStatus {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: SwapStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Completed) | (Self::Pending, Self::Expired)
        )
    }

    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Expired)
    }
}

/// Status shared by bridge transfers and coordinator transactions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferStatus {
    /// Initiated, destination credit not yet confirmed.
    #[default]
    Pending,
    /// Destination credit externally confirmed.
    Completed,
}

/// Escrow state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscrowStatus {
    /// Funds held.
    #[default]
    Initiated,
    /// Funds released to the target side.
    Released,
    /// Funds returned to the source side.
    Returned,
}

impl EscrowStatus {
    /// Check if transition is valid. Released and returned are mutually exclusive.
    pub fn can_transition_to(&self, next: EscrowStatus) -> bool {
        matches!(
            (self, next),
            (Self::Initiated, Self::Released) | (Self::Initiated, Self::Returned)
        )
    }
}

/// Dispute state machine.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisputeStatus {
    /// Filed, no mediator.
    #[default]
    Initiated,
    /// Mediator assigned.
    Escalated,
    /// Resolution recorded. Terminal.
    Resolved,
}

impl DisputeStatus {
    /// Check if transition is valid.
    pub fn can_transition_to(&self, next: DisputeStatus) -> bool {
        match (self, next) {
            (Self::Initiated, Self::Escalated) => true,
            (Self::Escalated, Self::Initiated) => true,
            (Self::Initiated, Self::Resolved) => true,
            (Self::Escalated, Self::Resolved) => true,
            _ => false,
        }
    }

    /// Open disputes accept evidence and mediator changes.
    pub fn is_open(&self) -> bool {
        !matches!(self, Self::Resolved)
    }
}

/// Relay message status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageStatus {
    /// In the transient pool.
    #[default]
    Sent,
    /// Delivery confirmed (evicted from the pool).
    Confirmed,
}

/// Oracle data status.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OracleDataStatus {
    /// Freshly fetched and hashed.
    #[default]
    Valid,
    /// Older than the configured maximum age.
    Expired,
    /// Fetch failed.
    Error,
}
