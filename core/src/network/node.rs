//! # Node
//!
//! The composition root: one [`Node`] per process, constructed once in
//! `main` and shared as an `Arc` across the accept loop, the periodic
//! gossip task, the peer-reaper task, and the HTTP status server.

use std::path::PathBuf;

use dashmap::DashSet;

use crate::identity::{Endpoint, PeerId};
use crate::network::peer_table::PeerTable;
use crate::storage::MetadataStore;

/// Shared state for one running node.
pub struct Node {
    pub peer_id: PeerId,
    pub endpoint: Endpoint,
    pub base_path: PathBuf,
    pub blob_dir: PathBuf,
    pub peers: PeerTable,
    pub store: MetadataStore,
    /// Gossip ids already seen, so a forwarded GOSSIP isn't re-forwarded
    /// forever. Never pruned: the process lifetime bounds its size in
    /// practice, and correctness only needs "seen at all", not "seen recently".
    seen_gossip_ids: DashSet<String>,
}

impl Node {
    pub fn new(
        peer_id: PeerId,
        endpoint: Endpoint,
        base_path: PathBuf,
        blob_dir: PathBuf,
        store: MetadataStore,
    ) -> Self {
        Self {
            peer_id,
            endpoint,
            base_path,
            blob_dir,
            peers: PeerTable::new(),
            store,
            seen_gossip_ids: DashSet::new(),
        }
    }

    /// Records `id` as seen. Returns `true` if this is the first time.
    pub fn mark_gossip_seen(&self, id: &str) -> bool {
        self.seen_gossip_ids.insert(id.to_string())
    }
}
