//! # Bridge Transfer Manager
//!
//! Custodial transfers backed by the bridge's own per-token liquidity.
//!
//! `initiate_transfer` debits the balance; `complete_transfer` only records
//! that the destination credit was confirmed and never moves funds again.
//! Balances and transfers share one lock: the debit and the transfer record
//! must commit together.

use super::{supported_set, validate_terms, Collaborators, LedgerRecorder};
use crate::algorithms::canonical::{canonical_terms, BRIDGE_TRANSFER_DOMAIN};
use crate::algorithms::derive_entity_id;
use crate::domain::{
    invariant_non_empty, invariant_positive_amount, invariant_sufficient_balance, BridgeTransfer,
    ChainId, EntityId, EntityKind, InteropConfig, InteropError, TransferStatus, TransferTerms,
};
use crate::ports::{BridgeApi, Clock, QuorumValidator, RecordKind};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Default)]
struct BridgeState {
    balances: HashMap<String, u64>,
    transfers: HashMap<EntityId, BridgeTransfer>,
}

/// Ledger snapshot of an operator credit.
#[derive(Serialize)]
struct FundingRecord<'a> {
    token_symbol: &'a str,
    amount: u64,
    new_balance: u64,
}

/// Custodial bridge.
pub struct BridgeTransferManager {
    supported: HashSet<ChainId>,
    state: Mutex<BridgeState>,
    validator: Arc<dyn QuorumValidator>,
    recorder: LedgerRecorder,
    clock: Arc<dyn Clock>,
}

impl BridgeTransferManager {
    /// Create a bridge with zero liquidity.
    pub fn new(config: &InteropConfig, deps: Collaborators) -> Self {
        Self {
            supported: supported_set(config),
            state: Mutex::new(BridgeState::default()),
            recorder: deps.recorder(),
            validator: deps.validator,
            clock: deps.clock,
        }
    }
}

impl BridgeApi for BridgeTransferManager {
    fn initiate_transfer(&self, terms: TransferTerms) -> Result<EntityId, InteropError> {
        validate_terms(&terms, &self.supported)?;
        let now = self.clock.now();

        let mut state = self.state.lock();
        let available = state
            .balances
            .get(&terms.token_symbol)
            .copied()
            .unwrap_or(0);
        if let Err(e) = invariant_sufficient_balance(&terms.token_symbol, available, terms.amount) {
            warn!("[qc-15] Bridge transfer rejected: {}", e);
            return Err(e);
        }

        let canonical = canonical_terms(BRIDGE_TRANSFER_DOMAIN, &terms, now)?;
        let attestation = self.validator.attest(&canonical)?;
        let transfer_id = derive_entity_id(EntityKind::Transfer, &[&canonical], now);

        let transfer = BridgeTransfer {
            transfer_id: transfer_id.clone(),
            terms,
            timestamp: now,
            validation_hash: attestation.validation_hash,
            status: TransferStatus::Pending,
        };
        self.recorder.record(
            RecordKind::BridgeTransfer,
            &transfer_id,
            &[&transfer.terms.from_chain, &transfer.terms.to_chain],
            &transfer,
        )?;

        let remaining = available - transfer.terms.amount;
        state
            .balances
            .insert(transfer.terms.token_symbol.clone(), remaining);
        info!(
            "[qc-15] Bridge transfer {} initiated: {} {} {} -> {}, balance now {}",
            transfer_id,
            transfer.terms.amount,
            transfer.terms.token_symbol,
            transfer.terms.from_chain,
            transfer.terms.to_chain,
            remaining
        );
        state.transfers.insert(transfer_id.clone(), transfer);
        Ok(transfer_id)
    }

    fn complete_transfer(&self, transfer_id: &str) -> Result<(), InteropError> {
        let mut state = self.state.lock();
        let stored = state
            .transfers
            .get_mut(transfer_id)
            .ok_or_else(|| InteropError::not_found(EntityKind::Transfer, transfer_id))?;

        if stored.status != TransferStatus::Pending {
            return Err(InteropError::invalid_state(
                EntityKind::Transfer,
                transfer_id,
                stored.status,
                "Completed",
            ));
        }
        let mut next = stored.clone();
        next.status = TransferStatus::Completed;
        self.recorder.record(
            RecordKind::BridgeTransferCompleted,
            transfer_id,
            &[&next.terms.from_chain, &next.terms.to_chain],
            &next,
        )?;
        *stored = next;

        info!("[qc-15] Bridge transfer {} completed", transfer_id);
        Ok(())
    }

    fn add_funds(&self, token_symbol: &str, amount: u64) -> Result<u64, InteropError> {
        invariant_non_empty("token_symbol", token_symbol)?;
        invariant_positive_amount(amount)?;

        let mut state = self.state.lock();
        let current = state.balances.get(token_symbol).copied().unwrap_or(0);
        let new_balance = current.checked_add(amount).ok_or_else(|| {
            InteropError::InvalidInput(format!("{} balance would overflow", token_symbol))
        })?;

        self.recorder.record(
            RecordKind::BridgeFunded,
            token_symbol,
            &[],
            &FundingRecord {
                token_symbol,
                amount,
                new_balance,
            },
        )?;
        state.balances.insert(token_symbol.to_string(), new_balance);

        info!(
            "[qc-15] Bridge funded with {} {}, balance now {}",
            amount, token_symbol, new_balance
        );
        Ok(new_balance)
    }

    fn balance(&self, token_symbol: &str) -> u64 {
        self.state
            .lock()
            .balances
            .get(token_symbol)
            .copied()
            .unwrap_or(0)
    }

    fn transfer(&self, transfer_id: &str) -> Result<BridgeTransfer, InteropError> {
        debug!("[qc-15] Looking up bridge transfer {}", transfer_id);
        self.state
            .lock()
            .transfers
            .get(transfer_id)
            .cloned()
            .ok_or_else(|| InteropError::not_found(EntityKind::Transfer, transfer_id))
    }

    fn supports(&self, chain: &ChainId) -> bool {
        self.supported.contains(chain)
    }
}
