//! # Ledger Recorder
//!
//! Encodes an entity snapshot with bincode, seals it under the ledger key and
//! appends it to the ledger.

use crate::domain::{ChainId, InteropError};
use crate::ports::{Clock, EncryptionService, KeyId, Ledger, LedgerEntry, RecordKind};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Writes sealed snapshots to the ledger and reads them back.
#[derive(Clone)]
pub struct LedgerRecorder {
    ledger: Arc<dyn Ledger>,
    sealer: Arc<dyn EncryptionService>,
    clock: Arc<dyn Clock>,
}

impl LedgerRecorder {
    /// Create a recorder.
    pub fn new(
        ledger: Arc<dyn Ledger>,
        sealer: Arc<dyn EncryptionService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            ledger,
            sealer,
            clock,
        }
    }

    /// Append a sealed snapshot of `snapshot`.
    pub fn record<T: Serialize>(
        &self,
        kind: RecordKind,
        id: &str,
        chains: &[&ChainId],
        snapshot: &T,
    ) -> Result<(), InteropError> {
        let encoded = bincode::serialize(snapshot)?;
        let sealed_payload = self.sealer.seal(KeyId::LedgerEntry, &encoded)?;
        self.ledger.record(LedgerEntry {
            kind,
            id: id.to_string(),
            chains: chains.iter().map(|c| (*c).clone()).collect(),
            sealed_payload,
            recorded_at: self.clock.now(),
        })?;
        Ok(())
    }

    /// Unseal and decode an entry written by [`LedgerRecorder::record`].
    pub fn open<T: DeserializeOwned>(&self, entry: &LedgerEntry) -> Result<T, InteropError> {
        let encoded = self.sealer.unseal(KeyId::LedgerEntry, &entry.sealed_payload)?;
        Ok(bincode::deserialize(&encoded)?)
    }
}
