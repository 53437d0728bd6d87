//! # QC-15 Cross-Chain Interoperability
//!
//! Moves value and data between independent ledgers without a single trusted
//! intermediary holding the assets outright.
//!
//! **Subsystem ID:** 15  
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Components
//!
//! | Component | Role |
//! |-----------|------|
//! | [`AtomicSwapEngine`] | Hash-locked peer-to-peer swaps, lazy expiry |
//! | [`BridgeTransferManager`] | Custodial transfers against per-token liquidity |
//! | [`CrossChainCoordinator`] | Non-custodial transactions, escrow, rollback, disputes |
//! | [`MessageRelay`] | Sealed, attested payloads in a transient pool |
//! | [`OracleIngestion`] | Hashed external facts from registered sources |
//!
//! Components never call into each other's locks. Composition is a sequence
//! of independent calls; the ledger is the durable record of what happened.
//!
//! ## Security Properties
//!
//! | Defense | Description |
//! |---------|-------------|
//! | SHA-256 hash-locks | `complete` succeeds iff `SHA-256(secret) == secret_hash` |
//! | Deadline first | A late claim fails `Expired` whatever the secret |
//! | k-of-n attestation | Validation hashes require a validator quorum |
//! | Ledger-first writes | A failed ledger write leaves memory untouched |
//! | Sealed at rest | URLs, payloads and ledger snapshots use XChaCha20-Poly1305 |
//!
//! ## Module Structure
//!
//! ```text
//! qc-15-interop/
//! ├── domain/          # Entities, status machines, errors, config
//! ├── algorithms/      # Hash-locks, IDs, canonical encoding, quorum
//! ├── ports/           # Inbound APIs, outbound collaborators
//! ├── adapters/        # In-memory ledger, validator set, sealer, clocks
//! └── service/         # The five engines, sharded registry, recorder
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{
    InMemoryLedger, ManualClock, MemberBehavior, StaticOracleFetcher, SystemClock,
    ThresholdValidatorSet, XChaChaSealer,
};
pub use algorithms::{
    create_hash_lock, generate_random_secret, sha256, verify_secret, QuorumThreshold,
};
pub use domain::{
    ArbitrationSummary, AtomicSwap, BridgeTransfer, ChainId, CrossChainMessage,
    CrossChainTransaction, Dispute, DisputeEvidence, DisputeStatus, EntityId, EntityKind,
    ErrorKind, Escrow, EscrowStatus, Hash, InteropConfig, InteropError, MessageStatus, OracleData,
    OracleDataSource, OracleDataStatus, QuorumConfig, RegisteredContract, RollbackRecord,
    SecureSecret, SwapLeg, SwapStatus, TransferStatus, TransferTerms,
};
pub use ports::{
    AtomicSwapApi, BridgeApi, Clock, DisputeApi, EncryptionService, EscrowApi, KeyId, Ledger,
    LedgerEntry, LedgerError, MessageRelayApi, OracleApi, OracleFetcher, QuorumValidator,
    RecordKind, TransactionApi, VerificationReport,
};
pub use service::{
    AtomicSwapEngine, BridgeTransferManager, Collaborators, CrossChainCoordinator,
    InteropServices, LedgerRecorder, MessageRelay, OracleIngestion, ShardedRegistry,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
