//! # Canonical Encoding
//!
//! Deterministic byte encoding of the fields a validation hash covers.
//!
//! Each payload starts with a domain tag so a bridge transfer can never hash
//! to the same digest as a coordinator transaction with identical terms.

use crate::domain::{ChainId, InteropError, TransferTerms};
use serde::Serialize;

/// Domain tag for bridge transfers.
pub const BRIDGE_TRANSFER_DOMAIN: &str = "qc15/bridge-transfer/v1";
/// Domain tag for coordinator transactions.
pub const TRANSACTION_DOMAIN: &str = "qc15/xchain-transaction/v1";
/// Domain tag for relay messages.
pub const MESSAGE_DOMAIN: &str = "qc15/relay-message/v1";

#[derive(Serialize)]
struct CanonicalTerms<'a> {
    domain: &'a str,
    from_chain: &'a str,
    to_chain: &'a str,
    amount: u64,
    token_symbol: &'a str,
    from_address: &'a str,
    to_address: &'a str,
    timestamp: u64,
}

#[derive(Serialize)]
struct CanonicalMessage<'a> {
    domain: &'a str,
    from_chain: &'a str,
    to_chain: &'a str,
    payload: &'a [u8],
    timestamp: u64,
}

/// Encode transfer terms under `domain`.
pub fn canonical_terms(
    domain: &str,
    terms: &TransferTerms,
    timestamp: u64,
) -> Result<Vec<u8>, InteropError> {
    let canonical = CanonicalTerms {
        domain,
        from_chain: terms.from_chain.as_str(),
        to_chain: terms.to_chain.as_str(),
        amount: terms.amount,
        token_symbol: &terms.token_symbol,
        from_address: &terms.from_address,
        to_address: &terms.to_address,
        timestamp,
    };
    Ok(bincode::serialize(&canonical)?)
}

/// Encode the (from, to, payload, timestamp) tuple of a relay message.
pub fn canonical_message(
    from_chain: &ChainId,
    to_chain: &ChainId,
    payload: &[u8],
    timestamp: u64,
) -> Result<Vec<u8>, InteropError> {
    let canonical = CanonicalMessage {
        domain: MESSAGE_DOMAIN,
        from_chain: from_chain.as_str(),
        to_chain: to_chain.as_str(),
        payload,
        timestamp,
    };
    Ok(bincode::serialize(&canonical)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms() -> TransferTerms {
        TransferTerms {
            from_chain: ChainId::new("x"),
            to_chain: ChainId::new("y"),
            amount: 60,
            token_symbol: "SYN".to_string(),
            from_address: "alice".to_string(),
            to_address: "bob".to_string(),
        }
    }

    #[test]
    fn test_canonical_terms_deterministic() {
        let a = canonical_terms(BRIDGE_TRANSFER_DOMAIN, &terms(), 7).unwrap();
        let b = canonical_terms(BRIDGE_TRANSFER_DOMAIN, &terms(), 7).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_domain_separation() {
        let bridge = canonical_terms(BRIDGE_TRANSFER_DOMAIN, &terms(), 7).unwrap();
        let tx = canonical_terms(TRANSACTION_DOMAIN, &terms(), 7).unwrap();
        assert_ne!(bridge, tx);
    }

    #[test]
    fn test_each_field_changes_encoding() {
        let base = canonical_terms(TRANSACTION_DOMAIN, &terms(), 7).unwrap();

        let mut t = terms();
        t.amount = 61;
        assert_ne!(base, canonical_terms(TRANSACTION_DOMAIN, &t, 7).unwrap());

        let mut t = terms();
        t.to_address = "mallory".to_string();
        assert_ne!(base, canonical_terms(TRANSACTION_DOMAIN, &t, 7).unwrap());

        assert_ne!(base, canonical_terms(TRANSACTION_DOMAIN, &terms(), 8).unwrap());
    }

    #[test]
    fn test_canonical_message_covers_payload() {
        let x = ChainId::new("x");
        let y = ChainId::new("y");
        let a = canonical_message(&x, &y, b"hello", 1).unwrap();
        let b = canonical_message(&x, &y, b"hellp", 1).unwrap();
        let c = canonical_message(&y, &x, b"hello", 1).unwrap();
        assert_ne!(a, b);
        assert_ne!(a, c);
    }
}
