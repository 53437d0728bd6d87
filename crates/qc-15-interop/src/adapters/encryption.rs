//! # XChaCha20-Poly1305 Sealer
//!
//! [`EncryptionService`] backed by XChaCha20-Poly1305.
//!
//! ## Key Schedule
//!
//! One 256-bit master key. Each [`KeyId`] gets its own subkey,
//! `HMAC-SHA256(master, label)`, so a leaked message key cannot open oracle
//! URLs or ledger snapshots.
//!
//! ## Sealed Format
//!
//! `nonce (24 bytes) || ciphertext+tag`. The 192-bit nonce is random per seal.

use crate::ports::{EncryptionError, EncryptionService, KeyId};
use chacha20poly1305::{
    aead::{Aead, KeyInit},
    XChaCha20Poly1305, XNonce,
};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Master key length in bytes.
pub const MASTER_KEY_LEN: usize = 32;

/// XChaCha20 nonce length in bytes.
pub const NONCE_LEN: usize = 24;

type HmacSha256 = Hmac<Sha256>;

#[derive(Clone, Zeroize, ZeroizeOnDrop)]
struct SubKey([u8; 32]);

/// Purpose-keyed XChaCha20-Poly1305 sealer.
#[derive(Clone)]
pub struct XChaChaSealer {
    oracle_url: SubKey,
    message_payload: SubKey,
    ledger_entry: SubKey,
}

impl XChaChaSealer {
    /// Derive all subkeys from a 32-byte master key.
    pub fn from_master_key(master: &[u8]) -> Result<Self, EncryptionError> {
        if master.len() != MASTER_KEY_LEN {
            return Err(EncryptionError::InvalidKeyLength {
                expected: MASTER_KEY_LEN,
                actual: master.len(),
            });
        }
        Ok(Self {
            oracle_url: derive_subkey(master, KeyId::OracleUrl)?,
            message_payload: derive_subkey(master, KeyId::MessagePayload)?,
            ledger_entry: derive_subkey(master, KeyId::LedgerEntry)?,
        })
    }

    /// Sealer with a random master key (ephemeral, for tests and dev nodes).
    pub fn generate() -> Result<Self, EncryptionError> {
        let mut master = [0u8; MASTER_KEY_LEN];
        rand::thread_rng().fill_bytes(&mut master);
        let sealer = Self::from_master_key(&master);
        master.zeroize();
        sealer
    }

    fn subkey(&self, key: KeyId) -> &SubKey {
        match key {
            KeyId::OracleUrl => &self.oracle_url,
            KeyId::MessagePayload => &self.message_payload,
            KeyId::LedgerEntry => &self.ledger_entry,
        }
    }
}

fn derive_subkey(master: &[u8], key: KeyId) -> Result<SubKey, EncryptionError> {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(master).map_err(|_| {
        EncryptionError::InvalidKeyLength {
            expected: MASTER_KEY_LEN,
            actual: master.len(),
        }
    })?;
    mac.update(key.label().as_bytes());
    Ok(SubKey(mac.finalize().into_bytes().into()))
}

impl EncryptionService for XChaChaSealer {
    fn seal(&self, key: KeyId, plaintext: &[u8]) -> Result<Vec<u8>, EncryptionError> {
        let cipher = XChaCha20Poly1305::new((&self.subkey(key).0).into());

        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let ciphertext = cipher
            .encrypt(XNonce::from_slice(&nonce), plaintext)
            .map_err(|e| EncryptionError::EncryptionFailed(e.to_string()))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    fn unseal(&self, key: KeyId, sealed: &[u8]) -> Result<Vec<u8>, EncryptionError> {
        if sealed.len() < NONCE_LEN {
            return Err(EncryptionError::Truncated(sealed.len()));
        }
        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);
        let cipher = XChaCha20Poly1305::new((&self.subkey(key).0).into());

        cipher
            .decrypt(XNonce::from_slice(nonce), ciphertext)
            .map_err(|e| EncryptionError::DecryptionFailed(e.to_string()))
    }
}
