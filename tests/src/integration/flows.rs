//! # Integration Test Flows
//!
//! Components working together over shared collaborators.
//!
//! ## Flows Tested:
//!
//! 1. **Bridge → Relay**: a transfer is announced to the destination chain,
//!    which opens the payload, confirms the credit and acknowledges the message
//! 2. **Quorum loss**: neither step commits while the validator set is short
//! 3. **Watchdog**: the node's expiry sweep drives due swaps to `Expired`
//! 4. **Escrow + dispute**: arbitration runs alongside a held escrow

use super::{eth_to_polygon, Node, T0};
use interop_node::ExpiryWatchdog;
use qc_15_interop::{
    AtomicSwapApi, AtomicSwapEngine, BridgeApi, ChainId, DisputeApi, DisputeStatus, EscrowApi,
    EscrowStatus, ErrorKind, Ledger, MemberBehavior, MessageRelayApi, MessageStatus, RecordKind,
    SwapLeg, SwapStatus, TransferStatus,
};
use std::time::Duration;

// =============================================================================
// BRIDGE → RELAY
// =============================================================================

#[test]
fn test_bridge_transfer_announced_over_relay() {
    let node = Node::new();
    let bridge = &node.services.bridge;
    let relay = &node.services.relay;

    bridge.add_funds("SYN", 1_000).unwrap();
    let transfer_id = bridge.initiate_transfer(eth_to_polygon(250)).unwrap();
    assert_eq!(bridge.balance("SYN"), 750);

    let message_id = relay
        .send(
            ChainId::new("ethereum"),
            ChainId::new("polygon"),
            transfer_id.as_bytes(),
        )
        .unwrap();
    assert_eq!(relay.pending_count(), 1);

    // Destination side
    let announced = String::from_utf8(relay.open(&message_id).unwrap()).unwrap();
    assert_eq!(announced, transfer_id);
    bridge.complete_transfer(&announced).unwrap();
    relay.confirm(&message_id).unwrap();

    assert_eq!(
        bridge.transfer(&transfer_id).unwrap().status,
        TransferStatus::Completed
    );
    assert_eq!(relay.status(&message_id).unwrap_err().kind(), ErrorKind::NotFound);
    assert_eq!(relay.pending_count(), 0);

    let kinds: Vec<RecordKind> = node.ledger.entries().iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            RecordKind::BridgeFunded,
            RecordKind::BridgeTransfer,
            RecordKind::MessageSent,
            RecordKind::BridgeTransferCompleted,
            RecordKind::MessageConfirmed,
        ]
    );

    let on_polygon = node
        .ledger
        .transactions_by_chain(&ChainId::new("polygon"))
        .unwrap();
    assert!(on_polygon.iter().any(|e| e.id == transfer_id));
}

#[test]
fn test_confirmed_message_history_stays_on_ledger() {
    let node = Node::new();
    let relay = &node.services.relay;
    let message_id = relay
        .send(ChainId::new("polygon"), ChainId::new("ethereum"), b"ping")
        .unwrap();
    relay.confirm(&message_id).unwrap();

    let recorder = node.deps.recorder();
    let history = node
        .ledger
        .records_for(RecordKind::MessageConfirmed, &message_id)
        .unwrap();
    assert_eq!(history.len(), 1);
    let confirmed: qc_15_interop::CrossChainMessage = recorder.open(&history[0]).unwrap();
    assert_eq!(confirmed.status, MessageStatus::Confirmed);
    assert_eq!(confirmed.timestamp, T0);
}

// =============================================================================
// QUORUM LOSS
// =============================================================================

#[test]
fn test_quorum_loss_blocks_transfer_and_announcement() {
    let node = Node::new();
    node.services.bridge.add_funds("SYN", 100).unwrap();
    node.validators.set_behavior(0, MemberBehavior::Offline);
    node.validators.set_behavior(1, MemberBehavior::Dissenting);

    let err = node
        .services
        .bridge
        .initiate_transfer(eth_to_polygon(40))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnderlyingService);
    assert_eq!(node.services.bridge.balance("SYN"), 100);

    let err = node
        .services
        .relay
        .send(ChainId::new("ethereum"), ChainId::new("polygon"), b"hello")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnderlyingService);
    assert_eq!(node.services.relay.pending_count(), 0);

    assert!(node.records(RecordKind::BridgeTransfer).is_empty());
    assert!(node.records(RecordKind::MessageSent).is_empty());

    // Members come back; the same request now commits.
    node.validators.set_behavior(0, MemberBehavior::Honest);
    node.services.bridge.initiate_transfer(eth_to_polygon(40)).unwrap();
    assert_eq!(node.services.bridge.balance("SYN"), 60);
}

// =============================================================================
// WATCHDOG
// =============================================================================

#[test]
fn test_watchdog_expires_due_swaps_only() {
    let node = Node::new();
    let swaps = &node.services.swaps;
    let hash = AtomicSwapEngine::hash_secret(b"s1");

    let short: Vec<_> = (0..20)
        .map(|i| {
            swaps
                .initiate(
                    SwapLeg::new("ethereum", "ETH", 1 + i, "0xalice"),
                    SwapLeg::new("polygon", "MATIC", 10, "0xbob"),
                    hash,
                    T0 + 60,
                    "alice",
                )
                .unwrap()
        })
        .collect();
    let long = swaps
        .initiate(
            SwapLeg::new("ethereum", "ETH", 5, "0xalice"),
            SwapLeg::new("polygon", "MATIC", 50, "0xbob"),
            hash,
            T0 + 3_600,
            "alice",
        )
        .unwrap();

    let watchdog = ExpiryWatchdog::new(
        swaps.clone(),
        node.services.relay.clone(),
        Duration::from_secs(1),
    );
    node.clock.advance_time(61);
    assert_eq!(watchdog.sweep_once(), short.len());

    for id in &short {
        assert_eq!(swaps.get(id).unwrap().status, SwapStatus::Expired);
    }
    assert_eq!(swaps.get(&long).unwrap().status, SwapStatus::Pending);
    assert_eq!(node.records(RecordKind::SwapExpired).len(), short.len());

    // The long swap can still be claimed.
    swaps.complete(&long, b"s1", "bob").unwrap();
    assert_eq!(watchdog.sweep_once(), 0);
}

// =============================================================================
// ESCROW + DISPUTE
// =============================================================================

#[test]
fn test_escrow_held_through_dispute() {
    let node = Node::new();
    let coordinator = &node.services.coordinator;

    coordinator
        .initiate_escrow(
            "esc-42",
            "SYN",
            ChainId::new("ethereum"),
            ChainId::new("polygon"),
            500,
        )
        .unwrap();

    let dispute_id = coordinator
        .initiate_dispute("0xbob", "credit not received")
        .unwrap();
    coordinator
        .submit_evidence(&dispute_id, "tx receipt 0xdeadbeef")
        .unwrap();
    coordinator.assign_mediator(&dispute_id, "mediator-1").unwrap();
    coordinator
        .resolve_dispute(&dispute_id, "return funds to source")
        .unwrap();

    let summary = coordinator.generate_arbitration_summary(&dispute_id).unwrap();
    assert_eq!(summary.status, DisputeStatus::Resolved);
    assert_eq!(summary.total_evidence, 1);
    assert_eq!(summary.validated_evidence, 1);
    assert_eq!(summary.mediator_id.as_deref(), Some("mediator-1"));

    // Resolution moves no funds on its own.
    assert_eq!(coordinator.escrow("esc-42").unwrap().status, EscrowStatus::Initiated);
    let escrow = coordinator.return_escrow_funds("esc-42").unwrap();
    assert_eq!(escrow.status, EscrowStatus::Returned);
    assert_eq!(
        coordinator.release_escrow("esc-42").unwrap_err().kind(),
        ErrorKind::InvalidState
    );
}
