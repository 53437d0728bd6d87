//! # Node Configuration
//!
//! TOML file plus environment overrides.
//!
//! ## Security Requirements
//!
//! - `seal_key` MUST NOT be the default zero value in production
//! - The quorum threshold must satisfy `1 <= k <= n`

use qc_15_interop::{InteropConfig, QuorumConfig, QuorumThreshold};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use zeroize::Zeroizing;

/// Length of the master seal key in bytes.
pub const SEAL_KEY_LEN: usize = 32;

/// Complete node configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Engine settings shared by the five components.
    pub interop: InteropConfig,
    /// Validator set.
    pub quorum: QuorumConfig,
    /// Key material.
    pub security: SecurityConfig,
    /// Background task schedule.
    pub runtime: RuntimeConfig,
}

/// Key material.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Hex-encoded master key for the payload sealer (32 bytes).
    /// MUST NOT be default in production.
    pub seal_key: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            seal_key: "00".repeat(SEAL_KEY_LEN), // MUST be overridden in production
        }
    }
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("seal_key", &"***")
            .finish()
    }
}

/// Background task schedule.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Seconds between swap expiry sweeps.
    pub watchdog_interval_secs: u64,
    /// Seconds between oracle polls (0 disables the poller).
    pub oracle_poll_interval_secs: u64,
    /// Per-request timeout for HTTP oracle sources.
    pub oracle_timeout_secs: u64,
    /// Admin endpoint bind address (`/health`, `/metrics`).
    pub admin_addr: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            watchdog_interval_secs: 5,
            oracle_poll_interval_secs: 30,
            oracle_timeout_secs: 10,
            admin_addr: "127.0.0.1:9100".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Watchdog period.
    pub fn watchdog_interval(&self) -> Duration {
        Duration::from_secs(self.watchdog_interval_secs.max(1))
    }

    /// Poller period, `None` when disabled.
    pub fn oracle_poll_interval(&self) -> Option<Duration> {
        (self.oracle_poll_interval_secs > 0)
            .then(|| Duration::from_secs(self.oracle_poll_interval_secs))
    }

    /// HTTP fetch timeout.
    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_secs(self.oracle_timeout_secs.max(1))
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML for this schema.
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Seal key is not 32 hex-encoded bytes.
    #[error("Seal key must be 32 bytes (64 hex chars)")]
    InvalidSealKey,

    /// Seal key is the default zero value.
    #[error(
        "SECURITY VIOLATION: seal key is default zero value. \
         Set QC_SEAL_KEY environment variable or provide in config."
    )]
    InsecureSealKey,

    /// Quorum or registry settings out of range.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl NodeConfig {
    /// Load from `path`, or defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_toml_str(&std::fs::read_to_string(path)?),
            None => Ok(Self::default()),
        }
    }

    /// Parse a TOML document; missing sections take defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// Apply `QC_SEAL_KEY` and `QC_QUORUM_THRESHOLD` from the process environment.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn apply_overrides_from<F>(&mut self, get: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = get("QC_SEAL_KEY") {
            self.security.seal_key = key;
            tracing::info!("Loaded seal key from environment");
        }
        if let Some(raw) = get("QC_QUORUM_THRESHOLD") {
            match raw.parse() {
                Ok(threshold) => self.quorum.threshold = threshold,
                Err(_) => tracing::warn!("Ignoring QC_QUORUM_THRESHOLD={:?}: not a number", raw),
            }
        }
    }

    /// Structural checks every deployment must pass.
    pub fn validate(&self) -> Result<(), ConfigError> {
        QuorumThreshold::new(self.quorum.threshold, self.quorum.validators)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.interop.registry_shards == 0 {
            return Err(ConfigError::Invalid("registry_shards must be at least 1".into()));
        }
        if self.interop.supported_chains.is_empty() {
            return Err(ConfigError::Invalid("supported_chains must not be empty".into()));
        }
        if self.interop.oracle_max_content_bytes == 0 {
            return Err(ConfigError::Invalid(
                "oracle_max_content_bytes must be at least 1".into(),
            ));
        }
        self.seal_key().map(|_| ())
    }

    /// Validate configuration for production readiness.
    ///
    /// # Returns
    ///
    /// Returns `Err` if:
    /// - the structural checks fail
    /// - the seal key is the default zero value
    pub fn validate_for_production(&self) -> Result<(), ConfigError> {
        self.validate()?;
        if self.seal_key()?.iter().all(|b| *b == 0) {
            return Err(ConfigError::InsecureSealKey);
        }
        Ok(())
    }

    /// Decoded master seal key.
    pub fn seal_key(&self) -> Result<Zeroizing<Vec<u8>>, ConfigError> {
        let bytes = Zeroizing::new(
            hex::decode(self.security.seal_key.trim()).map_err(|_| ConfigError::InvalidSealKey)?,
        );
        if bytes.len() != SEAL_KEY_LEN {
            return Err(ConfigError::InvalidSealKey);
        }
        Ok(bytes)
    }
}
