//! # Algorithms Module
//!
//! Hash-locks, IDs, canonical encoding and quorum arithmetic.

pub mod canonical;
pub mod hashlock;
pub mod ids;
pub mod quorum;

pub use canonical::{canonical_message, canonical_terms};
pub use hashlock::{create_hash_lock, generate_random_secret, sha256, verify_secret};
pub use ids::derive_entity_id;
pub use quorum::{count_approvals, QuorumThreshold};
