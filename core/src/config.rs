//! # Protocol Tunables
//!
//! Every timing and fanout constant the overlay depends on lives here.
//! Nothing here changes wire compatibility — these are local knobs a node
//! operator could in principle override, but the defaults are what every
//! node in the overlay is expected to run with.

use std::time::Duration;

/// How long a peer can go without being heard from before it's reaped from
/// the peer table (and evicted from every `replicas` set it appears in).
pub const PEER_TIMEOUT: Duration = Duration::from_secs(60);

/// How often the peer-reaper task sweeps the peer table for expired entries.
pub const PEER_CLEANUP_INTERVAL: Duration = Duration::from_secs(10);

/// How often the gossip engine broadcasts a fresh GOSSIP to every tracked peer.
pub const GOSSIP_INTERVAL: Duration = Duration::from_secs(30);

/// Number of peers a forwarded GOSSIP is fanned out to.
pub const GOSSIP_PEER_COUNT: usize = 3;

/// Number of eligible remote records fetched during join-time replication.
pub const NUM_FILES_ON_JOIN: usize = 3;

/// TCP connect timeout for dialing a peer.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// How long a GET_FILE request waits for the matching FILE_DATA response
/// on the same connection before giving up.
pub const FETCH_RESPONSE_TIMEOUT: Duration = Duration::from_secs(30);

/// Poll timeout on the listener's `accept()` loop so it can observe shutdown
/// without blocking indefinitely.
pub const ACCEPT_POLL_TIMEOUT: Duration = Duration::from_secs(1);

/// How long join-time replication polls for gossip replies to arrive before
/// giving up on seeding the local store from the rest of the overlay.
pub const JOIN_REPLICATION_WINDOW: Duration = Duration::from_secs(10);

/// Name of the persisted metadata document, relative to the node's base path.
pub const METADATA_FILE: &str = "metadata.json";

/// Name of the blob directory, relative to the node's base path.
pub const BLOB_DIR: &str = "FileUploads";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_is_longer_than_cleanup_interval() {
        // Otherwise the reaper would spin without anything new to reap.
        assert!(PEER_TIMEOUT > PEER_CLEANUP_INTERVAL);
    }

    #[test]
    fn gossip_fanout_is_positive() {
        assert!(GOSSIP_PEER_COUNT > 0);
        assert!(NUM_FILES_ON_JOIN > 0);
    }
}
