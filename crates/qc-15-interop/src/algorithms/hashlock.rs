//! # Hash-Lock Secrets
//!
//! SHA-256 hash-locks and secret generation for atomic swaps.
//!
//! SHA-256 only: the counterparty chain must be able to recompute the same
//! lock from the revealed secret.

use crate::domain::{Hash, SecureSecret};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Secret length produced by [`generate_random_secret`].
pub const SECRET_LEN: usize = 32;

/// One-shot SHA-256.
pub fn sha256(data: &[u8]) -> Hash {
    Sha256::digest(data).into()
}

/// Generate a cryptographically secure random secret.
pub fn generate_random_secret() -> SecureSecret {
    let mut secret = vec![0u8; SECRET_LEN];
    rand::thread_rng().fill_bytes(&mut secret);
    SecureSecret::new(secret)
}

/// Create a hash-lock from a secret.
pub fn create_hash_lock(secret: &[u8]) -> Hash {
    sha256(secret)
}

/// Verify that a secret matches a hash-lock.
pub fn verify_secret(secret: &[u8], hash_lock: &Hash) -> bool {
    create_hash_lock(secret) == *hash_lock
}
