//! # Entity Identifiers
//!
//! IDs are a truncated SHA-256 over the entity's defining fields, salted with
//! the creation timestamp and a process-wide nonce so that two identical
//! requests in the same second still get distinct IDs.

use crate::domain::{EntityId, EntityKind};
use sha2::{Digest, Sha256};
use std::sync::atomic::{AtomicU64, Ordering};

/// Bytes of digest kept in the ID (128 bits).
const ID_DIGEST_BYTES: usize = 16;

static ID_NONCE: AtomicU64 = AtomicU64::new(0);

/// Derive a fresh ID for `kind` from its defining fields.
pub fn derive_entity_id(kind: EntityKind, fields: &[&[u8]], timestamp: u64) -> EntityId {
    let nonce = ID_NONCE.fetch_add(1, Ordering::Relaxed);

    let mut hasher = Sha256::new();
    hasher.update(kind.prefix().as_bytes());
    for field in fields {
        // Length prefix so ("ab","c") and ("a","bc") differ
        hasher.update((field.len() as u64).to_le_bytes());
        hasher.update(field);
    }
    hasher.update(timestamp.to_le_bytes());
    hasher.update(nonce.to_le_bytes());
    let digest = hasher.finalize();

    format!("{}-{}", kind.prefix(), hex::encode(&digest[..ID_DIGEST_BYTES]))
}
