//! # Peer Table
//!
//! In-memory directory of live peers with liveness timestamps. Guarded by
//! a `parking_lot::RwLock` rather than an async mutex: critical sections
//! here are short, non-blocking map operations, and reads (peer sampling
//! for gossip fanout) vastly outnumber writes.

use std::collections::HashMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use parking_lot::RwLock;
use rand::seq::SliceRandom;

use crate::identity::{Endpoint, PeerId};
use crate::storage::MetadataStore;

/// A peer known to be (recently) alive, with where to reach it and when it
/// was last heard from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerRecord {
    pub peer_id: PeerId,
    pub endpoint: Endpoint,
    pub last_seen: u64,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// In-memory table of live peers.
#[derive(Default)]
pub struct PeerTable {
    peers: RwLock<HashMap<PeerId, PeerRecord>>,
}

impl PeerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates or refreshes a peer's entry, setting `last_seen` to now.
    pub fn touch(&self, peer_id: PeerId, host: impl Into<String>, port: u16) {
        let mut peers = self.peers.write();
        peers.insert(
            peer_id.clone(),
            PeerRecord {
                peer_id,
                endpoint: Endpoint::new(host, port),
                last_seen: now_secs(),
            },
        );
    }

    /// Removes a peer unconditionally (used on fast eviction after a failed send).
    pub fn remove(&self, peer_id: &PeerId) {
        self.peers.write().remove(peer_id);
    }

    /// Finds the peer whose endpoint matches `endpoint`, if any.
    pub fn find_by_endpoint(&self, endpoint: &Endpoint) -> Option<PeerId> {
        self.peers
            .read()
            .values()
            .find(|p| &p.endpoint == endpoint)
            .map(|p| p.peer_id.clone())
    }

    pub fn get(&self, peer_id: &PeerId) -> Option<PeerRecord> {
        self.peers.read().get(peer_id).cloned()
    }

    pub fn contains(&self, peer_id: &PeerId) -> bool {
        self.peers.read().contains_key(peer_id)
    }

    /// Removes entries whose `last_seen` is strictly older than `timeout`,
    /// cascading removal into `store`'s replica sets. A peer whose last_seen
    /// is exactly `timeout` old is not yet reaped.
    pub fn reap(&self, timeout: Duration, store: &MetadataStore) {
        let now = now_secs();
        let timeout_secs = timeout.as_secs();
        let expired: Vec<PeerId> = {
            let peers = self.peers.read();
            peers
                .values()
                .filter(|p| now.saturating_sub(p.last_seen) > timeout_secs)
                .map(|p| p.peer_id.clone())
                .collect()
        };

        if expired.is_empty() {
            return;
        }

        let mut peers = self.peers.write();
        for peer_id in &expired {
            peers.remove(peer_id);
        }
        drop(peers);

        for peer_id in &expired {
            if let Err(e) = store.remove_peer(peer_id) {
                tracing::warn!(peer = %peer_id, error = %e, "failed to evict reaped peer from metadata store");
            }
            tracing::info!(peer = %peer_id, "peer reaped after timeout");
        }
    }

    /// Returns up to `n` peers in uniformly random order.
    pub fn sample(&self, n: usize) -> Vec<PeerRecord> {
        let peers = self.peers.read();
        let mut all: Vec<PeerRecord> = peers.values().cloned().collect();
        all.shuffle(&mut rand::thread_rng());
        all.truncate(n);
        all
    }

    /// All currently tracked peers.
    pub fn all(&self) -> Vec<PeerRecord> {
        self.peers.read().values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.peers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn store() -> (tempfile::TempDir, MetadataStore) {
        let dir = tempdir().unwrap();
        let store = MetadataStore::load(dir.path().join("metadata.json")).unwrap();
        (dir, store)
    }

    #[test]
    fn touch_then_get() {
        let table = PeerTable::new();
        table.touch(PeerId::new("p1"), "localhost", 9000);
        assert!(table.contains(&PeerId::new("p1")));
        assert_eq!(table.get(&PeerId::new("p1")).unwrap().endpoint.port, 9000);
    }

    #[test]
    fn reap_respects_exact_boundary() {
        let table = PeerTable::new();
        let (_dir, store) = store();
        table.touch(PeerId::new("p1"), "localhost", 9000);

        // Force last_seen to exactly `timeout` seconds old.
        {
            let mut peers = table.peers.write();
            let now = now_secs();
            peers.get_mut(&PeerId::new("p1")).unwrap().last_seen = now - 60;
        }
        table.reap(Duration::from_secs(60), &store);
        assert!(table.contains(&PeerId::new("p1")), "exactly-at-timeout peer must survive");

        {
            let mut peers = table.peers.write();
            let now = now_secs();
            peers.get_mut(&PeerId::new("p1")).unwrap().last_seen = now - 61;
        }
        table.reap(Duration::from_secs(60), &store);
        assert!(!table.contains(&PeerId::new("p1")), "strictly-older peer must be reaped");
    }

    #[test]
    fn reap_cascades_into_metadata_store() {
        let table = PeerTable::new();
        let (_dir, store) = store();
        table.touch(PeerId::new("p1"), "localhost", 9000);

        let mut record = crate::storage::FileRecord {
            content_id: "c1".into(),
            file_name: "a".into(),
            file_size: 1,
            file_owner: PeerId::new("owner"),
            file_timestamp: 1,
            replicas: Default::default(),
        };
        record.replicas.insert(PeerId::new("p1"));
        store.upsert(record).unwrap();

        {
            let mut peers = table.peers.write();
            let now = now_secs();
            peers.get_mut(&PeerId::new("p1")).unwrap().last_seen = now - 100;
        }
        table.reap(Duration::from_secs(60), &store);

        assert!(!store.get("c1").unwrap().replicas.contains(&PeerId::new("p1")));
    }

    #[test]
    fn sample_never_exceeds_n() {
        let table = PeerTable::new();
        for i in 0..10 {
            table.touch(PeerId::new(format!("p{i}")), "localhost", 9000 + i);
        }
        assert_eq!(table.sample(3).len(), 3);
        assert_eq!(table.sample(100).len(), 10);
    }
}
