//! # In-Memory Ledger
//!
//! Append-only [`Ledger`] held in process memory.
//!
//! Suitable for tests and single-process deployments. A fault switch makes
//! subsequent writes fail so callers can exercise the ledger-failure path.

use crate::domain::ChainId;
use crate::ports::{Ledger, LedgerEntry, LedgerError, RecordKind};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// Append-only in-memory event store.
#[derive(Default)]
pub struct InMemoryLedger {
    entries: RwLock<Vec<LedgerEntry>>,
    unavailable: AtomicBool,
}

impl InMemoryLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent writes fail (`true`) or succeed again (`false`).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of every record, oldest first.
    pub fn entries(&self) -> Vec<LedgerEntry> {
        self.entries.read().clone()
    }

    /// Records of `kind`, oldest first.
    pub fn entries_of(&self, kind: RecordKind) -> Vec<LedgerEntry> {
        self.entries
            .read()
            .iter()
            .filter(|e| e.kind == kind)
            .cloned()
            .collect()
    }
}

impl Ledger for InMemoryLedger {
    fn record(&self, entry: LedgerEntry) -> Result<(), LedgerError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(LedgerError::Unavailable("ledger marked unavailable".into()));
        }
        if entry.id.is_empty() {
            return Err(LedgerError::Rejected {
                id: entry.id,
                reason: "empty entity id".into(),
            });
        }
        self.entries.write().push(entry);
        Ok(())
    }

    fn records_for(&self, kind: RecordKind, id: &str) -> Result<Vec<LedgerEntry>, LedgerError> {
        Ok(self
            .entries
            .read()
            .iter()
            .filter(|e| e.kind == kind && e.id == id)
            .cloned()
            .collect())
    }

    fn transactions_by_chain(&self, chain: &ChainId) -> Result<Vec<LedgerEntry>, LedgerError> {
        Ok(self
            .entries
            .read()
            .iter()
            .filter(|e| matches!(e.kind, RecordKind::Transaction | RecordKind::BridgeTransfer))
            .filter(|e| e.chains.contains(chain))
            .cloned()
            .collect())
    }
}
