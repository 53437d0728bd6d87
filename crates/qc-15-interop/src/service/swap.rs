//! # Atomic Swap Engine
//!
//! Hash-locked exchange between two parties on two chains. This engine only
//! tracks this side's leg: revealing the secret here is what lets the
//! counterparty claim on the other chain, and nothing here observes that
//! chain. The guarantee is "this leg is safe once the secret is learned",
//! not end-to-end atomicity.
//!
//! Expiry is lazy. A stored `Pending` swap past its deadline reads as
//! `Expired` through [`AtomicSwapApi::effective_status`]; the stored status
//! only flips on `expire`, on a late `complete`, or on an external
//! [`AtomicSwapApi::expire_due`] sweep.

use super::{supported_set, Collaborators, LedgerRecorder, ShardedRegistry};
use crate::algorithms::{create_hash_lock, derive_entity_id, generate_random_secret};
use crate::domain::{
    invariant_chains_supported, invariant_future_expiry, invariant_non_empty,
    invariant_positive_amount, AtomicSwap, ChainId, EntityId, EntityKind, Hash, InteropConfig,
    InteropError, SecureSecret, SwapLeg, SwapStatus,
};
use crate::ports::{AtomicSwapApi, Clock, RecordKind};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Atomic swap engine.
pub struct AtomicSwapEngine {
    supported: HashSet<ChainId>,
    swaps: ShardedRegistry<AtomicSwap>,
    recorder: LedgerRecorder,
    clock: Arc<dyn Clock>,
}

impl AtomicSwapEngine {
    /// Create an engine with `config.registry_shards` shards.
    pub fn new(config: &InteropConfig, deps: Collaborators) -> Self {
        Self {
            supported: supported_set(config),
            swaps: ShardedRegistry::new(config.registry_shards),
            recorder: deps.recorder(),
            clock: deps.clock,
        }
    }

    /// Fresh random secret for an initiator.
    pub fn generate_secret() -> SecureSecret {
        generate_random_secret()
    }

    /// Hash-lock for `secret`.
    pub fn hash_secret(secret: &[u8]) -> Hash {
        create_hash_lock(secret)
    }

    fn commit(
        &self,
        kind: RecordKind,
        stored: &mut AtomicSwap,
        next: AtomicSwap,
    ) -> Result<(), InteropError> {
        self.recorder
            .record(kind, &next.swap_id, &[&next.leg_a.chain, &next.leg_b.chain], &next)?;
        *stored = next;
        Ok(())
    }
}

impl AtomicSwapApi for AtomicSwapEngine {
    fn initiate(
        &self,
        leg_a: SwapLeg,
        leg_b: SwapLeg,
        secret_hash: Hash,
        expiration_time: u64,
        initiator: &str,
    ) -> Result<EntityId, InteropError> {
        invariant_positive_amount(leg_a.amount)?;
        invariant_positive_amount(leg_b.amount)?;
        invariant_non_empty("initiator", initiator)?;
        invariant_non_empty("leg_a.address", &leg_a.address)?;
        invariant_non_empty("leg_b.address", &leg_b.address)?;
        invariant_chains_supported(&self.supported, &[&leg_a.chain, &leg_b.chain])?;

        let now = self.clock.now();
        invariant_future_expiry(expiration_time, now)?;

        let swap_id = derive_entity_id(
            EntityKind::Swap,
            &[
                leg_a.chain.as_str().as_bytes(),
                leg_a.address.as_bytes(),
                leg_b.chain.as_str().as_bytes(),
                leg_b.address.as_bytes(),
                &secret_hash,
                initiator.as_bytes(),
            ],
            now,
        );

        let swap = AtomicSwap {
            swap_id: swap_id.clone(),
            leg_a,
            leg_b,
            secret_hash,
            secret: None,
            expiration_time,
            initiator: initiator.to_string(),
            responder: None,
            status: SwapStatus::Pending,
            created_at: now,
        };

        let mut shard = self.swaps.lock_shard(&swap_id);
        if shard.contains_key(&swap_id) {
            return Err(InteropError::AlreadyExists {
                kind: EntityKind::Swap,
                id: swap_id,
            });
        }
        self.recorder.record(
            RecordKind::SwapInitiated,
            &swap_id,
            &[&swap.leg_a.chain, &swap.leg_b.chain],
            &swap,
        )?;
        shard.insert(swap_id.clone(), swap);

        info!(
            "[qc-15] Swap {} initiated, expires at {}",
            swap_id, expiration_time
        );
        Ok(swap_id)
    }

    fn complete(
        &self,
        swap_id: &str,
        secret: &[u8],
        responder: &str,
    ) -> Result<(), InteropError> {
        invariant_non_empty("responder", responder)?;
        let now = self.clock.now();

        let mut shard = self.swaps.lock_shard(swap_id);
        let stored = shard
            .get_mut(swap_id)
            .ok_or_else(|| InteropError::not_found(EntityKind::Swap, swap_id))?;

        let mut next = stored.clone();
        match next.complete(secret, responder, now) {
            Ok(()) => {
                self.commit(RecordKind::SwapCompleted, stored, next)?;
                info!("[qc-15] Swap {} completed by {}", swap_id, responder);
                Ok(())
            }
            Err(err @ InteropError::Expired { .. }) => {
                // A late claim flips the stored status to expired
                let mut expired = stored.clone();
                expired.expire(now)?;
                self.commit(RecordKind::SwapExpired, stored, expired)?;
                warn!("[qc-15] Late claim on swap {}, marked expired", swap_id);
                Err(err)
            }
            Err(err) => {
                warn!("[qc-15] Completion of swap {} rejected: {}", swap_id, err);
                Err(err)
            }
        }
    }

    fn expire(&self, swap_id: &str) -> Result<(), InteropError> {
        let now = self.clock.now();

        let mut shard = self.swaps.lock_shard(swap_id);
        let stored = shard
            .get_mut(swap_id)
            .ok_or_else(|| InteropError::not_found(EntityKind::Swap, swap_id))?;

        let mut next = stored.clone();
        next.expire(now)?;
        self.commit(RecordKind::SwapExpired, stored, next)?;

        info!("[qc-15] Swap {} expired", swap_id);
        Ok(())
    }

    fn get(&self, swap_id: &str) -> Result<AtomicSwap, InteropError> {
        debug!("[qc-15] Looking up swap {}", swap_id);
        self.swaps
            .get_cloned(swap_id)
            .ok_or_else(|| InteropError::not_found(EntityKind::Swap, swap_id))
    }

    fn effective_status(&self, swap_id: &str) -> Result<SwapStatus, InteropError> {
        Ok(self.get(swap_id)?.effective_status(self.clock.now()))
    }

    fn expire_due(&self) -> Vec<EntityId> {
        let now = self.clock.now();
        let due = self
            .swaps
            .ids_where(|s| !s.status.is_terminal() && s.is_expired(now));

        let mut expired = Vec::with_capacity(due.len());
        for swap_id in due {
            // Re-checked under the shard lock; a concurrent complete/expire wins
            match self.expire(&swap_id) {
                Ok(()) => expired.push(swap_id),
                Err(e) => warn!(swap_id = %swap_id, error = %e, "[qc-15] Expiry sweep skipped swap"),
            }
        }
        if !expired.is_empty() {
            info!("[qc-15] Expiry sweep expired {} swaps", expired.len());
        }
        expired
    }

    fn len(&self) -> usize {
        self.swaps.len()
    }
}
