//! # Crash-Window Recovery
//!
//! A bridge transfer and its relay announcement are two ledger writes. If the
//! process dies (or the ledger fails) between them, the transfer is committed
//! but unannounced. The ledger alone is enough to find and repair that gap.

use super::{eth_to_polygon, Node};
use qc_15_interop::{
    BridgeApi, BridgeTransfer, ChainId, CrossChainMessage, EntityId, ErrorKind, InteropError,
    KeyId, MessageRelayApi, RecordKind,
};
use std::collections::HashSet;

/// Committed transfers with no `MessageSent` record carrying their ID.
fn unannounced_transfers(node: &Node) -> Vec<EntityId> {
    let recorder = node.deps.recorder();

    let announced: HashSet<String> = node
        .records(RecordKind::MessageSent)
        .iter()
        .map(|entry| {
            let message: CrossChainMessage = recorder.open(entry).unwrap();
            let payload = node
                .deps
                .sealer
                .unseal(KeyId::MessagePayload, &message.payload)
                .unwrap();
            String::from_utf8(payload).unwrap()
        })
        .collect();

    node.records(RecordKind::BridgeTransfer)
        .iter()
        .map(|entry| recorder.open::<BridgeTransfer>(entry).unwrap().transfer_id)
        .filter(|id| !announced.contains(id))
        .collect()
}

fn announce(node: &Node, transfer_id: &str) -> Result<EntityId, InteropError> {
    node.services.relay.send(
        ChainId::new("ethereum"),
        ChainId::new("polygon"),
        transfer_id.as_bytes(),
    )
}

#[test]
fn test_crash_between_transfer_and_announcement_is_recoverable() {
    let node = Node::new();
    node.services.bridge.add_funds("SYN", 500).unwrap();

    let announced = node.services.bridge.initiate_transfer(eth_to_polygon(100)).unwrap();
    announce(&node, &announced).unwrap();

    let stranded = node.services.bridge.initiate_transfer(eth_to_polygon(150)).unwrap();
    node.ledger.set_unavailable(true);
    let err = announce(&node, &stranded).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnderlyingService);
    assert_eq!(node.services.relay.pending_count(), 1);

    // The transfer itself committed and debited.
    assert_eq!(node.services.bridge.balance("SYN"), 250);
    assert_eq!(unannounced_transfers(&node), vec![stranded.clone()]);

    // Ledger back: re-announce what the scan found.
    node.ledger.set_unavailable(false);
    for transfer_id in unannounced_transfers(&node) {
        announce(&node, &transfer_id).unwrap();
    }
    assert!(unannounced_transfers(&node).is_empty());
    assert_eq!(node.services.relay.pending_count(), 2);
}

#[test]
fn test_failed_transfer_write_leaves_nothing_to_recover() {
    let node = Node::new();
    node.services.bridge.add_funds("SYN", 500).unwrap();

    node.ledger.set_unavailable(true);
    let err = node.services.bridge.initiate_transfer(eth_to_polygon(100)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnderlyingService);
    node.ledger.set_unavailable(false);

    assert_eq!(node.services.bridge.balance("SYN"), 500);
    assert!(node.records(RecordKind::BridgeTransfer).is_empty());
    assert!(unannounced_transfers(&node).is_empty());
}

#[test]
fn test_ledger_records_replay_bridge_balance() {
    let node = Node::new();
    let bridge = &node.services.bridge;
    bridge.add_funds("SYN", 300).unwrap();
    bridge.add_funds("SYN", 200).unwrap();
    bridge.initiate_transfer(eth_to_polygon(120)).unwrap();
    bridge.initiate_transfer(eth_to_polygon(80)).unwrap();

    let recorder = node.deps.recorder();
    let debited: u64 = node
        .records(RecordKind::BridgeTransfer)
        .iter()
        .map(|entry| recorder.open::<BridgeTransfer>(entry).unwrap().terms.amount)
        .sum();

    assert_eq!(node.records(RecordKind::BridgeFunded).len(), 2);
    assert_eq!(500 - debited, bridge.balance("SYN"));
}
