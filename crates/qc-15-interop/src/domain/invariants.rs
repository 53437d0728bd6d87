//! # Domain Invariants
//!
//! Business rules checked before any state change.

use super::errors::{Hash, InteropError};
use super::value_objects::ChainId;
use std::collections::HashSet;

/// Invariant: amounts are strictly positive.
pub fn invariant_positive_amount(amount: u64) -> Result<(), InteropError> {
    if amount == 0 {
        return Err(InteropError::InvalidAmount(amount));
    }
    Ok(())
}

/// Invariant: a new swap's deadline lies in the future.
pub fn invariant_future_expiry(expiration_time: u64, now: u64) -> Result<(), InteropError> {
    if expiration_time <= now {
        return Err(InteropError::InvalidExpiry {
            expiration_time,
            now,
        });
    }
    Ok(())
}

/// Invariant: both chains are configured.
pub fn invariant_chains_supported(
    supported: &HashSet<ChainId>,
    chains: &[&ChainId],
) -> Result<(), InteropError> {
    for chain in chains {
        if !supported.contains(*chain) {
            return Err(InteropError::UnsupportedChain((*chain).clone()));
        }
    }
    Ok(())
}

/// Invariant: the bridge never goes negative.
///
/// `balance[token] >= amount` before a transfer is created.
pub fn invariant_sufficient_balance(
    token: &str,
    available: u64,
    requested: u64,
) -> Result<(), InteropError> {
    if available < requested {
        return Err(InteropError::InsufficientBridgeBalance {
            token: token.to_string(),
            available,
            requested,
        });
    }
    Ok(())
}

/// Invariant: SHA-256(secret) equals the hash-lock.
pub fn invariant_secret_matches(secret: &[u8], secret_hash: &Hash) -> bool {
    crate::algorithms::hashlock::verify_secret(secret, secret_hash)
}

/// Invariant: identifier-like fields are non-empty.
pub fn invariant_non_empty(field: &str, value: &str) -> Result<(), InteropError> {
    if value.trim().is_empty() {
        return Err(InteropError::InvalidInput(format!("{} must not be empty", field)));
    }
    Ok(())
}

/// Invariant: quorum threshold satisfies `1 <= k <= n`.
pub fn invariant_quorum_threshold(threshold: usize, size: usize) -> Result<(), InteropError> {
    if threshold == 0 || threshold > size {
        return Err(InteropError::InvalidInput(format!(
            "quorum threshold {} out of range for {} validators",
            threshold, size
        )));
    }
    Ok(())
}
