//! # Interop Configuration
//!
//! Component and validator-set settings. Both deserialize from the node's
//! TOML file; missing fields take the defaults below.

use super::value_objects::ChainId;
use serde::{Deserialize, Serialize};

/// Engine configuration shared by the five components.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteropConfig {
    /// Chains the bridge, coordinator and relay accept.
    pub supported_chains: Vec<ChainId>,
    /// Independent lock shards for the swap and relay registries (1 = single lock).
    pub registry_shards: usize,
    /// Largest relay payload accepted, in bytes.
    pub max_payload_bytes: usize,
    /// Age after which ingested oracle data reads as expired.
    pub oracle_max_age_secs: u64,
    /// Largest oracle response accepted, in bytes.
    pub oracle_max_content_bytes: usize,
}

impl Default for InteropConfig {
    fn default() -> Self {
        Self {
            supported_chains: vec![
                ChainId::new("quantumchain"),
                ChainId::new("ethereum"),
                ChainId::new("bitcoin"),
                ChainId::new("polygon"),
                ChainId::new("arbitrum"),
            ],
            registry_shards: 16,
            max_payload_bytes: 64 * 1024,
            oracle_max_age_secs: 300,
            oracle_max_content_bytes: 1024 * 1024,
        }
    }
}

impl InteropConfig {
    /// Config accepting exactly `chains`.
    pub fn with_chains<I, C>(chains: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<ChainId>,
    {
        Self {
            supported_chains: chains.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }
}

/// k-of-n validator-set settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuorumConfig {
    /// Validator-set size `n`.
    pub validators: usize,
    /// Attestations required `k`.
    pub threshold: usize,
    /// Largest evidence item a validator will approve, in bytes.
    pub max_evidence_bytes: usize,
}

impl Default for QuorumConfig {
    fn default() -> Self {
        Self {
            validators: 4,
            threshold: 3, // 2f+1 for f=1
            max_evidence_bytes: 16 * 1024,
        }
    }
}
