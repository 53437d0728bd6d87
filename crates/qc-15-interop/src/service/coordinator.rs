//! # Cross-Chain Transaction Coordinator
//!
//! Non-custodial transactions, escrow, rollback records and dispute
//! arbitration.
//!
//! The coordinator never checks a balance: the asset is assumed locked on the
//! source chain by means outside this platform. Rollbacks and dispute
//! resolutions are records only; the compensating escrow return or transfer is
//! a separate call made by whoever reads them.

use super::{supported_set, validate_terms, Collaborators, LedgerRecorder};
use crate::algorithms::canonical::{canonical_terms, TRANSACTION_DOMAIN};
use crate::algorithms::{derive_entity_id, sha256};
use crate::domain::{
    invariant_chains_supported, invariant_non_empty, invariant_positive_amount,
    ArbitrationSummary, ChainId, CrossChainTransaction, Dispute, DisputeEvidence, DisputeStatus,
    EntityId, EntityKind, Escrow, EscrowStatus, InteropConfig, InteropError, RegisteredContract,
    RollbackRecord, TransferStatus, TransferTerms,
};
use crate::ports::{
    Clock, DisputeApi, EscrowApi, Ledger, QuorumValidator, RecordKind, TransactionApi,
    VerificationReport,
};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Default)]
struct CoordinatorState {
    transactions: HashMap<EntityId, CrossChainTransaction>,
    escrows: HashMap<EntityId, Escrow>,
    disputes: HashMap<EntityId, Dispute>,
    contracts: HashMap<String, RegisteredContract>,
    rollbacks: Vec<RollbackRecord>,
}

/// Ledger snapshot of one evidence submission.
#[derive(Serialize)]
struct EvidenceRecord<'a> {
    dispute_id: &'a str,
    evidence: &'a DisputeEvidence,
}

/// Cross-chain transaction coordinator.
pub struct CrossChainCoordinator {
    supported: HashSet<ChainId>,
    state: Mutex<CoordinatorState>,
    validator: Arc<dyn QuorumValidator>,
    ledger: Arc<dyn Ledger>,
    recorder: LedgerRecorder,
    clock: Arc<dyn Clock>,
}

impl CrossChainCoordinator {
    /// Create an empty coordinator.
    pub fn new(config: &InteropConfig, deps: Collaborators) -> Self {
        Self {
            supported: supported_set(config),
            state: Mutex::new(CoordinatorState::default()),
            recorder: deps.recorder(),
            validator: deps.validator,
            ledger: deps.ledger,
            clock: deps.clock,
        }
    }

    fn settle_escrow(
        &self,
        escrow_id: &str,
        next_status: EscrowStatus,
    ) -> Result<Escrow, InteropError> {
        let now = self.clock.now();
        let mut state = self.state.lock();
        let stored = state
            .escrows
            .get_mut(escrow_id)
            .ok_or_else(|| InteropError::not_found(EntityKind::Escrow, escrow_id))?;

        let mut next = stored.clone();
        next.settle(next_status, now)?;
        self.recorder.record(
            RecordKind::EscrowSettled,
            escrow_id,
            &[&next.source_chain, &next.target_chain],
            &next,
        )?;
        *stored = next.clone();

        info!("[qc-15] Escrow {} settled as {:?}", escrow_id, next_status);
        Ok(next)
    }

    /// Apply `change` to a copy of the dispute, record it under `kind`, then commit.
    fn update_dispute<F>(
        &self,
        dispute_id: &str,
        kind: RecordKind,
        change: F,
    ) -> Result<Dispute, InteropError>
    where
        F: FnOnce(&mut Dispute) -> Result<(), InteropError>,
    {
        let mut state = self.state.lock();
        let stored = state
            .disputes
            .get_mut(dispute_id)
            .ok_or_else(|| InteropError::not_found(EntityKind::Dispute, dispute_id))?;

        let mut next = stored.clone();
        change(&mut next)?;
        self.recorder.record(kind, dispute_id, &[], &next)?;
        *stored = next.clone();
        Ok(next)
    }
}

impl TransactionApi for CrossChainCoordinator {
    fn initiate_transaction(&self, terms: TransferTerms) -> Result<EntityId, InteropError> {
        validate_terms(&terms, &self.supported)?;
        let now = self.clock.now();

        let canonical = canonical_terms(TRANSACTION_DOMAIN, &terms, now)?;
        let attestation = self.validator.attest(&canonical)?;
        let transaction_id = derive_entity_id(EntityKind::Transaction, &[&canonical], now);

        let transaction = CrossChainTransaction {
            transaction_id: transaction_id.clone(),
            terms,
            timestamp: now,
            validation_hash: attestation.validation_hash,
            status: TransferStatus::Pending,
        };

        let mut state = self.state.lock();
        self.recorder.record(
            RecordKind::Transaction,
            &transaction_id,
            &[&transaction.terms.from_chain, &transaction.terms.to_chain],
            &transaction,
        )?;
        state
            .transactions
            .insert(transaction_id.clone(), transaction);

        info!("[qc-15] Transaction {} initiated", transaction_id);
        Ok(transaction_id)
    }

    fn complete_transaction(&self, transaction_id: &str) -> Result<(), InteropError> {
        let mut state = self.state.lock();
        let stored = state
            .transactions
            .get_mut(transaction_id)
            .ok_or_else(|| InteropError::not_found(EntityKind::Transaction, transaction_id))?;

        if stored.status != TransferStatus::Pending {
            return Err(InteropError::invalid_state(
                EntityKind::Transaction,
                transaction_id,
                stored.status,
                "Completed",
            ));
        }
        let mut next = stored.clone();
        next.status = TransferStatus::Completed;
        self.recorder.record(
            RecordKind::TransactionCompleted,
            transaction_id,
            &[&next.terms.from_chain, &next.terms.to_chain],
            &next,
        )?;
        *stored = next;

        info!("[qc-15] Transaction {} completed", transaction_id);
        Ok(())
    }

    fn transaction(&self, transaction_id: &str) -> Result<CrossChainTransaction, InteropError> {
        self.state
            .lock()
            .transactions
            .get(transaction_id)
            .cloned()
            .ok_or_else(|| InteropError::not_found(EntityKind::Transaction, transaction_id))
    }

    fn rollback_action(&self, action_id: &str, reason: &str) -> Result<EntityId, InteropError> {
        invariant_non_empty("action_id", action_id)?;
        let now = self.clock.now();
        let rollback_id = derive_entity_id(
            EntityKind::Rollback,
            &[action_id.as_bytes(), reason.as_bytes()],
            now,
        );
        let record = RollbackRecord {
            rollback_id: rollback_id.clone(),
            action_id: action_id.to_string(),
            reason: reason.to_string(),
            recorded_at: now,
        };

        let mut state = self.state.lock();
        self.recorder
            .record(RecordKind::Rollback, &rollback_id, &[], &record)?;
        state.rollbacks.push(record);

        info!("[qc-15] Rollback {} recorded for {}", rollback_id, action_id);
        Ok(rollback_id)
    }

    fn rollbacks(&self) -> Vec<RollbackRecord> {
        self.state.lock().rollbacks.clone()
    }

    fn register_contract(&self, contract_id: &str, code: &[u8]) -> Result<(), InteropError> {
        invariant_non_empty("contract_id", contract_id)?;
        let now = self.clock.now();

        let mut state = self.state.lock();
        if state.contracts.contains_key(contract_id) {
            return Err(InteropError::AlreadyExists {
                kind: EntityKind::Contract,
                id: contract_id.to_string(),
            });
        }
        let contract = RegisteredContract {
            contract_id: contract_id.to_string(),
            code: code.to_vec(),
            code_hash: sha256(code),
            registered_at: now,
        };
        self.recorder
            .record(RecordKind::Contract, contract_id, &[], &contract)?;
        state.contracts.insert(contract_id.to_string(), contract);

        info!("[qc-15] Contract {} registered", contract_id);
        Ok(())
    }

    fn verify_transaction(
        &self,
        transaction_id: &str,
    ) -> Result<VerificationReport, InteropError> {
        let transaction = self.transaction(transaction_id)?;

        if self
            .ledger
            .latest(RecordKind::Transaction, transaction_id)?
            .is_none()
        {
            warn!("[qc-15] Transaction {} has no ledger record", transaction_id);
            return Ok(VerificationReport::rejected("no ledger record for transaction"));
        }

        let canonical =
            canonical_terms(TRANSACTION_DOMAIN, &transaction.terms, transaction.timestamp)?;
        let approved = self.validator.validate_transaction(
            transaction_id,
            &canonical,
            &transaction.validation_hash,
        )?;
        debug!(
            "[qc-15] Transaction {} verification: {}",
            transaction_id, approved
        );

        Ok(if approved {
            VerificationReport::valid()
        } else {
            VerificationReport::rejected("validator quorum rejected the transaction digest")
        })
    }

    fn validate_contract(&self, contract_id: &str) -> Result<VerificationReport, InteropError> {
        let contract = self
            .state
            .lock()
            .contracts
            .get(contract_id)
            .cloned()
            .ok_or_else(|| InteropError::not_found(EntityKind::Contract, contract_id))?;

        if self.ledger.contract_by_id(contract_id)?.is_none() {
            return Ok(VerificationReport::rejected("no ledger record for contract"));
        }
        if sha256(&contract.code) != contract.code_hash {
            return Ok(VerificationReport::rejected("contract code hash mismatch"));
        }

        Ok(if self.validator.validate_contract(&contract.code)? {
            VerificationReport::valid()
        } else {
            VerificationReport::rejected("validator quorum rejected the contract")
        })
    }
}

impl EscrowApi for CrossChainCoordinator {
    fn initiate_escrow(
        &self,
        escrow_id: &str,
        asset_id: &str,
        source_chain: ChainId,
        target_chain: ChainId,
        amount: u64,
    ) -> Result<Escrow, InteropError> {
        invariant_non_empty("escrow_id", escrow_id)?;
        invariant_non_empty("asset_id", asset_id)?;
        invariant_positive_amount(amount)?;
        invariant_chains_supported(&self.supported, &[&source_chain, &target_chain])?;
        let now = self.clock.now();

        let mut state = self.state.lock();
        if state.escrows.contains_key(escrow_id) {
            return Err(InteropError::AlreadyExists {
                kind: EntityKind::Escrow,
                id: escrow_id.to_string(),
            });
        }
        let escrow = Escrow {
            escrow_id: escrow_id.to_string(),
            asset_id: asset_id.to_string(),
            source_chain,
            target_chain,
            amount,
            status: EscrowStatus::Initiated,
            created_at: now,
            settled_at: None,
        };
        self.recorder.record(
            RecordKind::EscrowInitiated,
            escrow_id,
            &[&escrow.source_chain, &escrow.target_chain],
            &escrow,
        )?;
        state.escrows.insert(escrow_id.to_string(), escrow.clone());

        info!("[qc-15] Escrow {} initiated for {} of {}", escrow_id, amount, asset_id);
        Ok(escrow)
    }

    fn release_escrow(&self, escrow_id: &str) -> Result<Escrow, InteropError> {
        self.settle_escrow(escrow_id, EscrowStatus::Released)
    }

    fn return_escrow_funds(&self, escrow_id: &str) -> Result<Escrow, InteropError> {
        self.settle_escrow(escrow_id, EscrowStatus::Returned)
    }

    fn escrow(&self, escrow_id: &str) -> Result<Escrow, InteropError> {
        self.state
            .lock()
            .escrows
            .get(escrow_id)
            .cloned()
            .ok_or_else(|| InteropError::not_found(EntityKind::Escrow, escrow_id))
    }
}

impl DisputeApi for CrossChainCoordinator {
    fn initiate_dispute(
        &self,
        initiator_id: &str,
        reason: &str,
    ) -> Result<EntityId, InteropError> {
        invariant_non_empty("initiator_id", initiator_id)?;
        invariant_non_empty("reason", reason)?;
        let now = self.clock.now();

        let dispute_id = derive_entity_id(
            EntityKind::Dispute,
            &[initiator_id.as_bytes(), reason.as_bytes()],
            now,
        );
        let dispute = Dispute {
            dispute_id: dispute_id.clone(),
            initiator_id: initiator_id.to_string(),
            reason: reason.to_string(),
            status: DisputeStatus::Initiated,
            mediator_id: None,
            evidence: Vec::new(),
            resolution: None,
            summary: None,
            created_at: now,
        };

        let mut state = self.state.lock();
        self.recorder
            .record(RecordKind::DisputeInitiated, &dispute_id, &[], &dispute)?;
        state.disputes.insert(dispute_id.clone(), dispute);

        info!("[qc-15] Dispute {} filed by {}", dispute_id, initiator_id);
        Ok(dispute_id)
    }

    fn submit_evidence(&self, dispute_id: &str, content: &str) -> Result<EntityId, InteropError> {
        let now = self.clock.now();
        let mut state = self.state.lock();
        let stored = state
            .disputes
            .get_mut(dispute_id)
            .ok_or_else(|| InteropError::not_found(EntityKind::Dispute, dispute_id))?;
        stored.ensure_open("SubmitEvidence")?;

        let validated = self.validator.validate_evidence(content.as_bytes())?;
        let evidence_id = derive_entity_id(
            EntityKind::Evidence,
            &[dispute_id.as_bytes(), content.as_bytes()],
            now,
        );
        let evidence = DisputeEvidence {
            evidence_id: evidence_id.clone(),
            content: content.to_string(),
            validated,
            submitted_at: now,
        };
        self.recorder.record(
            RecordKind::Evidence,
            &evidence_id,
            &[],
            &EvidenceRecord {
                dispute_id,
                evidence: &evidence,
            },
        )?;
        stored.evidence.push(evidence);

        if !validated {
            warn!(
                "[qc-15] Evidence {} for dispute {} rejected by validator set",
                evidence_id, dispute_id
            );
            return Err(InteropError::EvidenceRejected {
                dispute_id: dispute_id.to_string(),
                evidence_id,
            });
        }
        info!("[qc-15] Evidence {} accepted for dispute {}", evidence_id, dispute_id);
        Ok(evidence_id)
    }

    fn assign_mediator(&self, dispute_id: &str, mediator_id: &str) -> Result<(), InteropError> {
        invariant_non_empty("mediator_id", mediator_id)?;
        self.update_dispute(dispute_id, RecordKind::MediatorChanged, |d| {
            // Re-assignment while escalated replaces the mediator
            if d.status != DisputeStatus::Escalated {
                d.transition_to(DisputeStatus::Escalated)?;
            }
            d.mediator_id = Some(mediator_id.to_string());
            Ok(())
        })?;
        info!("[qc-15] Mediator {} assigned to dispute {}", mediator_id, dispute_id);
        Ok(())
    }

    fn unassign_mediator(&self, dispute_id: &str) -> Result<(), InteropError> {
        self.update_dispute(dispute_id, RecordKind::MediatorChanged, |d| {
            d.transition_to(DisputeStatus::Initiated)?;
            d.mediator_id = None;
            Ok(())
        })?;
        info!("[qc-15] Mediator removed from dispute {}", dispute_id);
        Ok(())
    }

    fn resolve_dispute(&self, dispute_id: &str, resolution: &str) -> Result<(), InteropError> {
        invariant_non_empty("resolution", resolution)?;
        self.update_dispute(dispute_id, RecordKind::DisputeResolved, |d| {
            d.transition_to(DisputeStatus::Resolved)?;
            d.resolution = Some(resolution.to_string());
            Ok(())
        })?;
        info!("[qc-15] Dispute {} resolved", dispute_id);
        Ok(())
    }

    fn generate_arbitration_summary(
        &self,
        dispute_id: &str,
    ) -> Result<ArbitrationSummary, InteropError> {
        let now = self.clock.now();
        let dispute = self.update_dispute(dispute_id, RecordKind::ArbitrationSummary, |d| {
            d.summary = Some(d.summarize(now));
            Ok(())
        })?;
        dispute
            .summary
            .ok_or_else(|| InteropError::not_found(EntityKind::Dispute, dispute_id))
    }

    fn dispute(&self, dispute_id: &str) -> Result<Dispute, InteropError> {
        self.state
            .lock()
            .disputes
            .get(dispute_id)
            .cloned()
            .ok_or_else(|| InteropError::not_found(EntityKind::Dispute, dispute_id))
    }
}
