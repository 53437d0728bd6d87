//! # Oracle Ingestion
//!
//! Registers external data sources and ingests hashed facts from them.
//!
//! `fetch` runs in three steps so external I/O never holds the registry lock:
//! snapshot the source under the lock, unseal and fetch without it, then
//! re-lock and store only if the same source is still registered.

use super::{Collaborators, LedgerRecorder};
use crate::algorithms::{derive_entity_id, sha256};
use crate::domain::{
    invariant_non_empty, EntityId, EntityKind, InteropConfig, InteropError, OracleData,
    OracleDataSource, OracleDataStatus,
};
use crate::ports::{
    Clock, EncryptionService, FetchError, KeyId, OracleApi, OracleFetcher, RecordKind,
};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Default)]
struct OracleState {
    /// Keyed by unique source name.
    sources: BTreeMap<String, OracleDataSource>,
    /// Latest data, keyed by source ID.
    data: HashMap<EntityId, OracleData>,
}

#[derive(Serialize)]
enum SourceAction {
    Added,
    Activated,
    Deactivated,
    Removed,
}

#[derive(Serialize)]
struct SourceRecord<'a> {
    action: SourceAction,
    source: &'a OracleDataSource,
}

/// Oracle ingestion pipeline.
pub struct OracleIngestion {
    max_age_secs: u64,
    max_content_bytes: usize,
    state: Mutex<OracleState>,
    fetcher: Arc<dyn OracleFetcher>,
    sealer: Arc<dyn EncryptionService>,
    recorder: LedgerRecorder,
    clock: Arc<dyn Clock>,
}

impl OracleIngestion {
    /// Create an empty pipeline fetching through `fetcher`.
    pub fn new(
        config: &InteropConfig,
        deps: Collaborators,
        fetcher: Arc<dyn OracleFetcher>,
    ) -> Self {
        Self {
            max_age_secs: config.oracle_max_age_secs,
            max_content_bytes: config.oracle_max_content_bytes,
            state: Mutex::new(OracleState::default()),
            fetcher,
            recorder: deps.recorder(),
            sealer: deps.sealer,
            clock: deps.clock,
        }
    }

    /// Names of sources that can currently be fetched.
    pub fn active_sources(&self) -> Vec<String> {
        self.state
            .lock()
            .sources
            .values()
            .filter(|s| s.is_active)
            .map(|s| s.name.clone())
            .collect()
    }

    fn record_source(
        &self,
        action: SourceAction,
        source: &OracleDataSource,
    ) -> Result<(), InteropError> {
        self.recorder.record(
            RecordKind::OracleSource,
            &source.source_id,
            &[],
            &SourceRecord { action, source },
        )
    }
}

impl OracleApi for OracleIngestion {
    fn add_source(
        &self,
        name: &str,
        url: &str,
        data_format: &str,
    ) -> Result<EntityId, InteropError> {
        invariant_non_empty("name", name)?;
        invariant_non_empty("url", url)?;
        invariant_non_empty("data_format", data_format)?;
        let now = self.clock.now();

        let mut state = self.state.lock();
        if state.sources.contains_key(name) {
            return Err(InteropError::AlreadyExists {
                kind: EntityKind::OracleSource,
                id: name.to_string(),
            });
        }

        let source_id = derive_entity_id(EntityKind::OracleSource, &[name.as_bytes()], now);
        let source = OracleDataSource {
            source_id: source_id.clone(),
            name: name.to_string(),
            url: self.sealer.seal(KeyId::OracleUrl, url.as_bytes())?,
            is_active: true,
            data_format: data_format.to_string(),
            last_updated: None,
        };
        self.record_source(SourceAction::Added, &source)?;
        state.sources.insert(name.to_string(), source);

        info!("[qc-15] Oracle source {} registered as {}", name, source_id);
        Ok(source_id)
    }

    fn fetch(&self, name: &str) -> Result<OracleData, InteropError> {
        let source = {
            let state = self.state.lock();
            let source = state
                .sources
                .get(name)
                .ok_or_else(|| InteropError::not_found(EntityKind::OracleSource, name))?;
            if !source.is_active {
                return Err(InteropError::InvalidState {
                    kind: EntityKind::OracleSource,
                    id: name.to_string(),
                    from: "Inactive".to_string(),
                    to: "Fetch".to_string(),
                });
            }
            source.clone()
        };

        let url = self.sealer.unseal(KeyId::OracleUrl, &source.url)?;
        let url = String::from_utf8(url)
            .map_err(|_| InteropError::Codec("sealed oracle URL is not UTF-8".into()))?;
        let limit = self.max_content_bytes;
        let fetched = self.fetcher.fetch(&url).and_then(|content| {
            if content.len() > limit {
                Err(FetchError::TooLarge { limit })
            } else {
                Ok(content)
            }
        });
        let now = self.clock.now();

        let mut state = self.state.lock();
        let current = match state.sources.get_mut(name) {
            Some(s) if s.source_id == source.source_id => s,
            _ => {
                warn!("[qc-15] Oracle source {} removed during fetch, discarding", name);
                return Err(InteropError::not_found(EntityKind::OracleSource, name));
            }
        };

        match fetched {
            Ok(content) => {
                let data = OracleData {
                    source_id: source.source_id.clone(),
                    hash: sha256(&content),
                    content,
                    fetched_at: now,
                    status: OracleDataStatus::Valid,
                };
                self.recorder
                    .record(RecordKind::OracleData, &source.source_id, &[], &data)?;
                current.last_updated = Some(now);
                state.data.insert(source.source_id.clone(), data.clone());

                info!(
                    "[qc-15] Oracle source {} ingested {} bytes, hash {}",
                    name,
                    data.content.len(),
                    hex::encode(&data.hash[..8])
                );
                Ok(data)
            }
            Err(fetch_err) => {
                let data = OracleData {
                    source_id: source.source_id.clone(),
                    content: Vec::new(),
                    fetched_at: now,
                    hash: sha256(&[]),
                    status: OracleDataStatus::Error,
                };
                self.recorder
                    .record(RecordKind::OracleData, &source.source_id, &[], &data)?;
                state.data.insert(source.source_id.clone(), data);

                warn!("[qc-15] Oracle fetch for {} failed: {}", name, fetch_err);
                Err(fetch_err.into())
            }
        }
    }

    fn remove_source(&self, name: &str) -> Result<(), InteropError> {
        let mut state = self.state.lock();
        let source = state
            .sources
            .get(name)
            .ok_or_else(|| InteropError::not_found(EntityKind::OracleSource, name))?;

        self.record_source(SourceAction::Removed, source)?;
        if let Some(removed) = state.sources.remove(name) {
            state.data.remove(&removed.source_id);
        }

        info!("[qc-15] Oracle source {} removed", name);
        Ok(())
    }

    fn set_active(&self, name: &str, active: bool) -> Result<(), InteropError> {
        let mut state = self.state.lock();
        let stored = state
            .sources
            .get_mut(name)
            .ok_or_else(|| InteropError::not_found(EntityKind::OracleSource, name))?;

        let mut next = stored.clone();
        next.is_active = active;
        let action = if active {
            SourceAction::Activated
        } else {
            SourceAction::Deactivated
        };
        self.record_source(action, &next)?;
        *stored = next;

        info!("[qc-15] Oracle source {} active = {}", name, active);
        Ok(())
    }

    fn sources(&self) -> Vec<OracleDataSource> {
        self.state.lock().sources.values().cloned().collect()
    }

    fn latest(&self, name: &str) -> Result<Option<OracleData>, InteropError> {
        let now = self.clock.now();
        let state = self.state.lock();
        let source = state
            .sources
            .get(name)
            .ok_or_else(|| InteropError::not_found(EntityKind::OracleSource, name))?;

        Ok(state.data.get(&source.source_id).cloned().map(|mut data| {
            data.status = data.effective_status(now, self.max_age_secs);
            data
        }))
    }

    fn verify(&self, data: &OracleData) -> bool {
        data.verify()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::StaticOracleFetcher;
    use crate::ports::Ledger;
    use crate::service::fixtures::{harness, Harness};

    const URL: &str = "https://feeds.example/price";

    fn create_oracle(h: &Harness) -> (OracleIngestion, Arc<StaticOracleFetcher>) {
        let fetcher = Arc::new(StaticOracleFetcher::new());
        let oracle = OracleIngestion::new(&h.config, h.deps.clone(), fetcher.clone());
        (oracle, fetcher)
    }

    #[test]
    fn test_add_and_fetch() {
        let h = harness();
        let (oracle, fetcher) = create_oracle(&h);
        fetcher.set_response(URL, b"{\"price\":42}".to_vec());

        let source_id = oracle.add_source("price", URL, "json").unwrap();
        let data = oracle.fetch("price").unwrap();
        assert_eq!(data.status, OracleDataStatus::Valid);
        assert_eq!(data.hash, sha256(b"{\"price\":42}"));
        assert!(oracle.verify(&data));
        assert!(h.ledger.latest(RecordKind::OracleData, &source_id).unwrap().is_some());
        assert!(oracle.sources()[0].last_updated.is_some());
    }

    #[test]
    fn test_url_sealed_at_rest() {
        let h = harness();
        let (oracle, _) = create_oracle(&h);
        oracle.add_source("price", URL, "json").unwrap();
        let source = &oracle.sources()[0];
        assert!(!source
            .url
            .windows(URL.len())
            .any(|w| w == URL.as_bytes()));
    }

    #[test]
    fn test_unknown_and_duplicate_sources() {
        let h = harness();
        let (oracle, _) = create_oracle(&h);
        assert!(matches!(oracle.fetch("nope"), Err(InteropError::NotFound { .. })));
        assert!(matches!(oracle.remove_source("nope"), Err(InteropError::NotFound { .. })));

        oracle.add_source("price", URL, "json").unwrap();
        assert!(matches!(
            oracle.add_source("price", URL, "json"),
            Err(InteropError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn test_remove_source() {
        let h = harness();
        let (oracle, fetcher) = create_oracle(&h);
        fetcher.set_response(URL, b"1".to_vec());
        oracle.add_source("price", URL, "json").unwrap();
        oracle.fetch("price").unwrap();

        oracle.remove_source("price").unwrap();
        assert!(oracle.sources().is_empty());
        assert!(matches!(oracle.latest("price"), Err(InteropError::NotFound { .. })));
    }

    #[test]
    fn test_failed_fetch_recorded_as_error() {
        let h = harness();
        let (oracle, fetcher) = create_oracle(&h);
        fetcher.set_failure(URL, FetchError::HttpStatus(503));
        oracle.add_source("price", URL, "json").unwrap();

        let err = oracle.fetch("price").unwrap_err();
        assert!(matches!(err, InteropError::Fetch(FetchError::HttpStatus(503))));
        assert!(err.is_underlying_service());

        let latest = oracle.latest("price").unwrap().unwrap();
        assert_eq!(latest.status, OracleDataStatus::Error);
    }

    #[test]
    fn test_inactive_source_cannot_fetch() {
        let h = harness();
        let (oracle, fetcher) = create_oracle(&h);
        fetcher.set_response(URL, b"1".to_vec());
        oracle.add_source("price", URL, "json").unwrap();

        oracle.set_active("price", false).unwrap();
        let err = oracle.fetch("price").unwrap_err();
        assert!(matches!(err, InteropError::InvalidState { .. }));
        assert_eq!(
            err.to_string(),
            "Invalid oracle source transition for price: Inactive -> Fetch"
        );
        assert!(oracle.active_sources().is_empty());
        assert_eq!(fetcher.calls(), 0);

        oracle.set_active("price", true).unwrap();
        assert!(oracle.fetch("price").is_ok());
    }

    #[test]
    fn test_oversized_content_stored_as_error() {
        let mut h = harness();
        h.config.oracle_max_content_bytes = 4;
        let (oracle, fetcher) = create_oracle(&h);
        oracle.add_source("price", URL, "json").unwrap();

        fetcher.set_response(URL, b"1234".to_vec());
        assert!(oracle.fetch("price").is_ok());

        fetcher.set_response(URL, b"12345".to_vec());
        let result = oracle.fetch("price");
        assert!(matches!(
            result,
            Err(InteropError::Fetch(FetchError::TooLarge { limit: 4 }))
        ));
        let latest = oracle.latest("price").unwrap().unwrap();
        assert_eq!(latest.status, OracleDataStatus::Error);
        assert!(latest.content.is_empty());
    }

    #[test]
    fn test_latest_expires_with_age() {
        let h = harness();
        let (oracle, fetcher) = create_oracle(&h);
        fetcher.set_response(URL, b"1".to_vec());
        oracle.add_source("price", URL, "json").unwrap();
        assert!(oracle.latest("price").unwrap().is_none());

        oracle.fetch("price").unwrap();
        h.clock.advance_time(h.config.oracle_max_age_secs);
        assert_eq!(oracle.latest("price").unwrap().unwrap().status, OracleDataStatus::Valid);
        h.clock.advance_time(1);
        assert_eq!(oracle.latest("price").unwrap().unwrap().status, OracleDataStatus::Expired);
    }

    #[test]
    fn test_tampered_data_fails_verify() {
        let h = harness();
        let (oracle, fetcher) = create_oracle(&h);
        fetcher.set_response(URL, b"100".to_vec());
        oracle.add_source("price", URL, "json").unwrap();
        let mut data = oracle.fetch("price").unwrap();
        data.content = b"999".to_vec();
        assert!(!oracle.verify(&data));
    }
}
