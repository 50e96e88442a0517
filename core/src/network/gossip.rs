//! # Gossip Engine
//!
//! Three independent drivers keep the overlay's membership and metadata
//! converging: a one-shot bootstrap join, a periodic broadcast to every
//! known peer, and a forward-on-first-sight rule applied to inbound GOSSIP.
//!
//! Deduplication is by message id (a random 128-bit value minted at the
//! gossip's origin), not by TTL — the overlay tolerates unbounded
//! propagation depth because the seen-id set makes every node forward a
//! given id at most once.

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config;
use crate::identity::Endpoint;
use crate::network::messages::{Gossip, GossipReply, Message};
use crate::network::node::Node;
use crate::network::transport;

fn fresh_gossip_id() -> String {
    Uuid::new_v4().to_string()
}

/// Sends exactly one GOSSIP to the well-known bootstrap endpoint. Fires
/// unconditionally: an unreachable bootstrap is not an error, just a wasted
/// send, since the overlay otherwise has no way in.
pub async fn bootstrap_join(node: &Node, bootstrap: &Endpoint) {
    let gossip = Gossip {
        host: node.endpoint.host.clone(),
        port: node.endpoint.port,
        id: fresh_gossip_id(),
        peer_id: node.peer_id.clone(),
    };
    node.mark_gossip_seen(&gossip.id);
    if let Err(e) = transport::send(bootstrap, &Message::Gossip(gossip)).await {
        warn!(endpoint = %bootstrap, error = %e, "bootstrap GOSSIP failed, continuing anyway");
    } else {
        info!(endpoint = %bootstrap, "sent bootstrap GOSSIP");
    }
}

/// Broadcasts a freshly-minted GOSSIP to every peer currently in the Peer
/// Table. Called on a `GOSSIP_INTERVAL` timer.
pub async fn broadcast(node: &Node) {
    let peers = node.peers.all();
    if peers.is_empty() {
        return;
    }

    let gossip = Gossip {
        host: node.endpoint.host.clone(),
        port: node.endpoint.port,
        id: fresh_gossip_id(),
        peer_id: node.peer_id.clone(),
    };
    node.mark_gossip_seen(&gossip.id);

    for peer in peers {
        let msg = Message::Gossip(gossip.clone());
        if let Err(e) = transport::send(&peer.endpoint, &msg).await {
            debug!(peer = %peer.peer_id, error = %e, "periodic gossip send failed, evicting peer");
            node.peers.remove(&peer.peer_id);
        }
    }
}

/// Handles an inbound GOSSIP: if this id is new, records it, touches the
/// sender, replies with our local files, and forwards it to a random sample
/// of peers. A repeat sighting of an already-seen id produces no outbound
/// traffic at all.
pub async fn handle_gossip(node: &Node, gossip: Gossip) {
    if !node.mark_gossip_seen(&gossip.id) {
        return;
    }

    node.peers
        .touch(gossip.peer_id.clone(), gossip.host.clone(), gossip.port);

    let sender_endpoint = Endpoint::new(gossip.host.clone(), gossip.port);
    let reply = Message::GossipReply(GossipReply {
        host: node.endpoint.host.clone(),
        port: node.endpoint.port,
        peer_id: node.peer_id.clone(),
        files: node.store.list_local(&node.blob_dir),
    });
    if let Err(e) = transport::send(&sender_endpoint, &reply).await {
        debug!(peer = %gossip.peer_id, error = %e, "GOSSIP_REPLY send failed");
    }

    let origin = gossip.peer_id.clone();
    let fanout = node
        .peers
        .sample(config::GOSSIP_PEER_COUNT + 1)
        .into_iter()
        .filter(|p| p.peer_id != node.peer_id && p.peer_id != origin)
        .take(config::GOSSIP_PEER_COUNT);

    for peer in fanout {
        let msg = Message::Gossip(gossip.clone());
        if let Err(e) = transport::send(&peer.endpoint, &msg).await {
            debug!(peer = %peer.peer_id, error = %e, "gossip forward failed, evicting peer");
            node.peers.remove(&peer.peer_id);
        }
    }
}

/// Handles an inbound GOSSIP_REPLY: touches the sender and merges every
/// listed file into the local Metadata Store. Never forwarded.
pub async fn handle_gossip_reply(node: &Node, reply: GossipReply) {
    node.peers
        .touch(reply.peer_id.clone(), reply.host.clone(), reply.port);

    for record in reply.files {
        let content_id = record.content_id.clone();
        if let Err(e) = node.store.upsert(record) {
            warn!(content_id, error = %e, "failed to merge record from GOSSIP_REPLY");
            continue;
        }
        if let Err(e) = node.store.add_replica(&content_id, reply.peer_id.clone()) {
            warn!(content_id, error = %e, "failed to record replica from GOSSIP_REPLY");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::PeerId;
    use crate::storage::MetadataStore;
    use tempfile::tempdir;

    fn node(peer: &str, port: u16) -> (tempfile::TempDir, Node) {
        let dir = tempdir().unwrap();
        let store = MetadataStore::load(dir.path().join("metadata.json")).unwrap();
        let node = Node::new(
            PeerId::new(peer),
            Endpoint::new("127.0.0.1", port),
            dir.path().to_path_buf(),
            dir.path().join("FileUploads"),
            store,
        );
        (dir, node)
    }

    #[tokio::test]
    async fn handle_gossip_touches_sender_and_marks_seen() {
        let (_dir, node) = node("self", 9100);
        let gossip = Gossip {
            host: "127.0.0.1".into(),
            port: 1, // nothing listening; reply send will fail harmlessly
            id: "g1".into(),
            peer_id: PeerId::new("origin"),
        };
        handle_gossip(&node, gossip).await;
        assert!(node.peers.contains(&PeerId::new("origin")));
        assert!(!node.mark_gossip_seen("g1"));
    }

    #[tokio::test]
    async fn duplicate_gossip_id_triggers_no_outbound_traffic() {
        let (_dir, node) = node("self", 9101);
        assert!(node.mark_gossip_seen("dup"));
        let gossip = Gossip {
            host: "127.0.0.1".into(),
            port: 1, // nothing listening; a reply attempt would fail silently either way
            id: "dup".into(),
            peer_id: PeerId::new("origin"),
        };
        // Second sighting of "dup": the function must return before touching
        // the sender or sending a GOSSIP_REPLY. The sender never being
        // touched is the distinguishable side effect that proves it.
        handle_gossip(&node, gossip).await;
        assert!(!node.peers.contains(&PeerId::new("origin")));
        assert!(!node.mark_gossip_seen("dup"));
    }

    #[tokio::test]
    async fn gossip_reply_merges_files_and_adds_replica() {
        let (_dir, node) = node("self", 9102);
        let record = crate::storage::FileRecord {
            content_id: "c1".into(),
            file_name: "a".into(),
            file_size: 1,
            file_owner: PeerId::new("owner"),
            file_timestamp: 100,
            replicas: Default::default(),
        };
        let reply = GossipReply {
            host: "127.0.0.1".into(),
            port: 9200,
            peer_id: PeerId::new("sender"),
            files: vec![record],
        };
        handle_gossip_reply(&node, reply).await;
        let stored = node.store.get("c1").unwrap();
        assert!(stored.replicas.contains(&PeerId::new("sender")));
        assert!(node.peers.contains(&PeerId::new("sender")));
    }
}
