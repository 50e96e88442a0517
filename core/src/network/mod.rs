//! # Network Module
//!
//! The P2P networking layer: wire messages, framing, connection handling,
//! the gossip engine, request dispatch, and the node that ties them
//! together.
//!
//! ```text
//! messages.rs    — wire message schemas (GOSSIP, ANNOUNCE, FILE_DATA, ...)
//! codec.rs       — incremental JSON framing over a byte stream
//! transport.rs   — listener/dialer, fire-and-forget and request/response sends
//! peer_table.rs  — in-memory directory of live peers
//! gossip.rs       — bootstrap join, periodic broadcast, forwarding, reply fan-in
//! handlers.rs    — per-message-type request handling
//! server.rs      — accept loop, periodic-gossip task, peer-reaper task
//! node.rs        — the shared Node composition root
//! ```

pub mod codec;
pub mod gossip;
pub mod handlers;
pub mod messages;
pub mod node;
pub mod peer_table;
pub mod server;
pub mod transport;

pub use messages::Message;
pub use node::Node;
pub use peer_table::{PeerRecord, PeerTable};
