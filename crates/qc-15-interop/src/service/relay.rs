//! # Message Relay
//!
//! Moves sealed, attested payloads between chains.
//!
//! The pool is transient: a confirmed message is evicted and `status` then
//! reports `NotFound`. Post-confirmation history lives on the ledger
//! (`MessageConfirmed` records).

use super::{supported_set, Collaborators, LedgerRecorder, ShardedRegistry};
use crate::algorithms::{canonical_message, derive_entity_id};
use crate::domain::{
    invariant_chains_supported, ChainId, CrossChainMessage, EntityId, EntityKind, InteropConfig,
    InteropError, MessageStatus,
};
use crate::ports::{Clock, EncryptionService, KeyId, MessageRelayApi, QuorumValidator, RecordKind};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Cross-chain message relay.
pub struct MessageRelay {
    supported: HashSet<ChainId>,
    max_payload_bytes: usize,
    pool: ShardedRegistry<CrossChainMessage>,
    validator: Arc<dyn QuorumValidator>,
    sealer: Arc<dyn EncryptionService>,
    recorder: LedgerRecorder,
    clock: Arc<dyn Clock>,
}

impl MessageRelay {
    /// Create an empty relay.
    pub fn new(config: &InteropConfig, deps: Collaborators) -> Self {
        Self {
            supported: supported_set(config),
            max_payload_bytes: config.max_payload_bytes,
            pool: ShardedRegistry::new(config.registry_shards),
            recorder: deps.recorder(),
            validator: deps.validator,
            sealer: deps.sealer,
            clock: deps.clock,
        }
    }

    fn pooled(&self, message_id: &str) -> Result<CrossChainMessage, InteropError> {
        self.pool
            .get_cloned(message_id)
            .ok_or_else(|| InteropError::not_found(EntityKind::Message, message_id))
    }
}

impl MessageRelayApi for MessageRelay {
    fn send(
        &self,
        from_chain: ChainId,
        to_chain: ChainId,
        payload: &[u8],
    ) -> Result<EntityId, InteropError> {
        invariant_chains_supported(&self.supported, &[&from_chain, &to_chain])?;
        if payload.is_empty() {
            return Err(InteropError::InvalidInput("payload must not be empty".into()));
        }
        if payload.len() > self.max_payload_bytes {
            return Err(InteropError::InvalidInput(format!(
                "payload of {} bytes exceeds limit of {}",
                payload.len(),
                self.max_payload_bytes
            )));
        }
        let now = self.clock.now();

        let sealed = self.sealer.seal(KeyId::MessagePayload, payload)?;
        let canonical = canonical_message(&from_chain, &to_chain, payload, now)?;
        let attestation = self.validator.attest(&canonical)?;
        let message_id = derive_entity_id(
            EntityKind::Message,
            &[
                from_chain.as_str().as_bytes(),
                to_chain.as_str().as_bytes(),
                &attestation.validation_hash,
            ],
            now,
        );

        let message = CrossChainMessage {
            message_id: message_id.clone(),
            from_chain,
            to_chain,
            payload: sealed,
            validation_hash: attestation.validation_hash,
            timestamp: now,
            status: MessageStatus::Sent,
        };

        let mut shard = self.pool.lock_shard(&message_id);
        self.recorder.record(
            RecordKind::MessageSent,
            &message_id,
            &[&message.from_chain, &message.to_chain],
            &message,
        )?;
        info!(
            "[qc-15] Message {} sent {} -> {} ({} bytes)",
            message_id,
            message.from_chain,
            message.to_chain,
            payload.len()
        );
        shard.insert(message_id.clone(), message);
        Ok(message_id)
    }

    fn confirm(&self, message_id: &str) -> Result<(), InteropError> {
        let mut shard = self.pool.lock_shard(message_id);
        let pooled = shard
            .get(message_id)
            .ok_or_else(|| InteropError::not_found(EntityKind::Message, message_id))?;

        let mut confirmed = pooled.clone();
        confirmed.status = MessageStatus::Confirmed;
        self.recorder.record(
            RecordKind::MessageConfirmed,
            message_id,
            &[&confirmed.from_chain, &confirmed.to_chain],
            &confirmed,
        )?;
        shard.remove(message_id);

        info!("[qc-15] Message {} confirmed and evicted", message_id);
        Ok(())
    }

    fn status(&self, message_id: &str) -> Result<MessageStatus, InteropError> {
        debug!("[qc-15] Status lookup for message {}", message_id);
        Ok(self.pooled(message_id)?.status)
    }

    fn open(&self, message_id: &str) -> Result<Vec<u8>, InteropError> {
        let message = self.pooled(message_id)?;
        Ok(self.sealer.unseal(KeyId::MessagePayload, &message.payload)?)
    }

    fn pending_count(&self) -> usize {
        self.pool.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::Ledger;
    use crate::service::fixtures::{harness, Harness};

    fn create_relay(h: &Harness) -> MessageRelay {
        MessageRelay::new(&h.config, h.deps.clone())
    }

    fn x() -> ChainId {
        ChainId::new("x")
    }

    fn y() -> ChainId {
        ChainId::new("y")
    }

    #[test]
    fn test_send_confirm_evicts() {
        let h = harness();
        let relay = create_relay(&h);
        let id = relay.send(x(), y(), b"hello").unwrap();

        assert_eq!(relay.status(&id).unwrap(), MessageStatus::Sent);
        assert_eq!(relay.pending_count(), 1);

        relay.confirm(&id).unwrap();
        assert!(matches!(relay.status(&id), Err(InteropError::NotFound { .. })));
        assert_eq!(relay.pending_count(), 0);
        assert!(h.ledger.latest(RecordKind::MessageConfirmed, &id).unwrap().is_some());
        assert!(matches!(relay.confirm(&id), Err(InteropError::NotFound { .. })));
    }

    #[test]
    fn test_payload_sealed_in_pool() {
        let h = harness();
        let relay = create_relay(&h);
        let id = relay.send(x(), y(), b"plaintext-payload").unwrap();

        let pooled = relay.pooled(&id).unwrap();
        assert_ne!(pooled.payload, b"plaintext-payload");
        assert_eq!(relay.open(&id).unwrap(), b"plaintext-payload");

        let canonical =
            canonical_message(&x(), &y(), b"plaintext-payload", pooled.timestamp).unwrap();
        assert_eq!(pooled.validation_hash, crate::algorithms::sha256(&canonical));
    }

    #[test]
    fn test_rejects_bad_sends() {
        let h = harness();
        let mut config = h.config.clone();
        config.max_payload_bytes = 8;
        let relay = MessageRelay::new(&config, h.deps.clone());

        assert!(matches!(
            relay.send(x(), ChainId::new("solana"), b"hi"),
            Err(InteropError::UnsupportedChain(_))
        ));
        assert!(matches!(relay.send(x(), y(), b""), Err(InteropError::InvalidInput(_))));
        assert!(matches!(
            relay.send(x(), y(), b"123456789"),
            Err(InteropError::InvalidInput(_))
        ));
        assert_eq!(relay.pending_count(), 0);
    }

    #[test]
    fn test_ledger_failure_keeps_message_pooled() {
        let h = harness();
        let relay = create_relay(&h);
        let id = relay.send(x(), y(), b"hello").unwrap();

        h.ledger.set_unavailable(true);
        assert!(relay.confirm(&id).unwrap_err().is_underlying_service());
        assert_eq!(relay.status(&id).unwrap(), MessageStatus::Sent);
    }

    #[test]
    fn test_send_failure_pools_nothing() {
        let h = harness();
        let relay = create_relay(&h);
        h.ledger.set_unavailable(true);
        assert!(relay.send(x(), y(), b"hello").is_err());
        assert_eq!(relay.pending_count(), 0);
    }
}
