//! # Threshold Validator Set
//!
//! k-of-n [`QuorumValidator`] with HMAC-SHA256 member keys.
//!
//! `attest` signs the SHA-256 of the payload; the digest becomes the entity's
//! validation hash once at least `k` members have signed. Checks
//! (`validate_*`) are member votes tallied against the same `k`: offline
//! members abstain, and if fewer than `k` members respond the set cannot
//! decide and returns `QuorumNotReached`.

use crate::algorithms::{count_approvals, sha256, QuorumThreshold};
use crate::domain::{Hash, QuorumConfig};
use crate::ports::{Attestation, QuorumValidator, ValidatorError, ValidatorSignature};
use hmac::{Hmac, Mac};
use parking_lot::RwLock;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

type HmacSha256 = Hmac<Sha256>;

/// How a member reacts to requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MemberBehavior {
    /// Signs and votes on the merits.
    #[default]
    Honest,
    /// Does not respond.
    Offline,
    /// Responds but refuses to sign and votes no.
    Dissenting,
}

struct Member {
    id: String,
    key: Zeroizing<[u8; 32]>,
    behavior: MemberBehavior,
}

impl Member {
    fn sign(&self, digest: &Hash) -> Result<Hash, ValidatorError> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.key[..])
            .map_err(|e| ValidatorError::Misconfigured(e.to_string()))?;
        mac.update(digest);
        Ok(mac.finalize().into_bytes().into())
    }
}

/// In-process k-of-n validator set.
pub struct ThresholdValidatorSet {
    members: RwLock<Vec<Member>>,
    threshold: QuorumThreshold,
    max_evidence_bytes: usize,
}

impl ThresholdValidatorSet {
    /// Create `config.validators` honest members with random keys.
    pub fn new(config: &QuorumConfig) -> Result<Self, ValidatorError> {
        let keys = (0..config.validators)
            .map(|_| {
                let mut key = [0u8; 32];
                rand::thread_rng().fill_bytes(&mut key);
                key
            })
            .collect();
        Self::with_keys(keys, config.threshold, config.max_evidence_bytes)
    }

    /// Create members from explicit keys.
    pub fn with_keys(
        keys: Vec<[u8; 32]>,
        threshold: usize,
        max_evidence_bytes: usize,
    ) -> Result<Self, ValidatorError> {
        let threshold = QuorumThreshold::new(threshold, keys.len())
            .map_err(|e| ValidatorError::Misconfigured(e.to_string()))?;
        let members = keys
            .into_iter()
            .enumerate()
            .map(|(i, key)| Member {
                id: format!("validator-{}", i),
                key: Zeroizing::new(key),
                behavior: MemberBehavior::Honest,
            })
            .collect();
        Ok(Self {
            members: RwLock::new(members),
            threshold,
            max_evidence_bytes,
        })
    }

    /// Change a member's behaviour. Returns false for an unknown index.
    pub fn set_behavior(&self, index: usize, behavior: MemberBehavior) -> bool {
        match self.members.write().get_mut(index) {
            Some(member) => {
                member.behavior = behavior;
                true
            }
            None => false,
        }
    }

    /// Validator-set size.
    pub fn size(&self) -> usize {
        self.members.read().len()
    }

    /// Verify a member signature over `digest`.
    pub fn verify_signature(&self, signature: &ValidatorSignature, digest: &Hash) -> bool {
        self.members
            .read()
            .iter()
            .find(|m| m.id == signature.validator_id)
            .and_then(|m| m.sign(digest).ok())
            .map(|expected| expected == signature.signature)
            .unwrap_or(false)
    }

    /// Tally a yes/no check. `honest_vote` is what an honest member answers.
    fn vote(&self, honest_vote: bool) -> Result<bool, ValidatorError> {
        let members = self.members.read();
        let votes: Vec<bool> = members
            .iter()
            .filter_map(|m| match m.behavior {
                MemberBehavior::Honest => Some(honest_vote),
                MemberBehavior::Dissenting => Some(false),
                MemberBehavior::Offline => None,
            })
            .collect();

        if votes.len() < self.threshold.required() {
            return Err(ValidatorError::QuorumNotReached {
                got: votes.len(),
                required: self.threshold.required(),
            });
        }
        Ok(self.threshold.is_met(count_approvals(votes)))
    }
}

impl QuorumValidator for ThresholdValidatorSet {
    fn threshold(&self) -> QuorumThreshold {
        self.threshold
    }

    fn attest(&self, payload: &[u8]) -> Result<Attestation, ValidatorError> {
        let digest = sha256(payload);
        let members = self.members.read();

        let mut signatures = Vec::with_capacity(members.len());
        for member in members.iter() {
            if member.behavior != MemberBehavior::Honest {
                continue;
            }
            signatures.push(ValidatorSignature {
                validator_id: member.id.clone(),
                signature: member.sign(&digest)?,
            });
        }

        if !self.threshold.is_met(signatures.len()) {
            tracing::warn!(
                "[qc-15] Attestation failed: {}/{} signatures",
                signatures.len(),
                self.threshold.required()
            );
            return Err(ValidatorError::QuorumNotReached {
                got: signatures.len(),
                required: self.threshold.required(),
            });
        }

        Ok(Attestation {
            validation_hash: digest,
            signatures,
        })
    }

    fn validate_transaction(
        &self,
        transaction_id: &str,
        payload: &[u8],
        validation_hash: &Hash,
    ) -> Result<bool, ValidatorError> {
        let matches = sha256(payload) == *validation_hash;
        tracing::debug!(
            "[qc-15] Validating transaction {}: digest match = {}",
            transaction_id,
            matches
        );
        self.vote(matches)
    }

    fn validate_evidence(&self, content: &[u8]) -> Result<bool, ValidatorError> {
        self.vote(!content.is_empty() && content.len() <= self.max_evidence_bytes)
    }

    fn validate_contract(&self, code: &[u8]) -> Result<bool, ValidatorError> {
        self.vote(!code.is_empty())
    }
}
