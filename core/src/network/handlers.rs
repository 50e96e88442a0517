//! # Request Handlers
//!
//! Dispatch for the four request-shaped message types. Each handler takes
//! the shared [`Node`] and the decoded message and returns the frame (if
//! any) to write back on the same connection before it closes.

use tracing::{debug, info, warn};

use crate::network::messages::{Announce, Delete, FileData, GetFile, Message};
use crate::network::node::Node;
use crate::network::transport;
use crate::storage::blobs;

/// `ANNOUNCE`: merge the embedded record and record the announcer as a replica.
pub async fn handle_announce(node: &Node, announce: Announce) {
    let from = announce.from.clone();
    let record = announce.clone().into_record();
    let content_id = record.content_id.clone();
    if let Err(e) = node.store.upsert(record) {
        warn!(content_id, error = %e, "failed to upsert ANNOUNCE");
        return;
    }
    if let Err(e) = node.store.add_replica(&content_id, from) {
        warn!(content_id, error = %e, "failed to record announcer as replica");
    }
}

/// `GET_FILE`: returns the `FILE_DATA` frame to send back on the same
/// connection — populated if the blob is local, the "not available"
/// sentinel otherwise.
pub fn handle_get_file(node: &Node, request: GetFile) -> FileData {
    let Some(record) = node.store.get(&request.file_id) else {
        return FileData::unavailable();
    };
    if !record.is_local(&node.blob_dir) {
        return FileData::unavailable();
    }
    match blobs::read_blob(&node.blob_dir, &request.file_id) {
        Ok(bytes) => FileData::from_record(&record, &bytes),
        Err(e) => {
            warn!(content_id = %request.file_id, error = %e, "failed to read local blob for GET_FILE");
            FileData::unavailable()
        }
    }
}

/// `FILE_DATA`: response to our own `GET_FILE`, or an unsolicited push.
/// Writes the blob, merges the record, marks both the owner and ourselves as
/// replicas, and re-announces to every tracked peer so the new copy becomes
/// discoverable.
pub async fn handle_file_data(node: &Node, file_data: FileData) {
    let Some((record, bytes)) = file_data.into_record_and_bytes() else {
        debug!("dropping FILE_DATA with null scalars");
        return;
    };

    let content_id = record.content_id.clone();
    let owner = record.file_owner.clone();

    if let Err(e) = blobs::write_blob(&node.blob_dir, &content_id, &bytes) {
        warn!(content_id, error = %e, "failed to write blob from FILE_DATA");
        return;
    }
    if let Err(e) = node.store.upsert(record) {
        warn!(content_id, error = %e, "failed to upsert record from FILE_DATA");
        return;
    }
    if let Err(e) = node.store.add_replica(&content_id, owner.clone()) {
        warn!(content_id, error = %e, "failed to mark owner as replica");
    }
    if let Err(e) = node.store.add_replica(&content_id, node.peer_id.clone()) {
        warn!(content_id, error = %e, "failed to mark self as replica");
    }

    let Some(record) = node.store.get(&content_id) else {
        return;
    };
    let announce = Announce::from_record(node.peer_id.clone(), &record);
    for peer in node.peers.all() {
        let msg = Message::Announce(announce.clone());
        if let Err(e) = transport::send(&peer.endpoint, &msg).await {
            debug!(peer = %peer.peer_id, error = %e, "re-announce send failed, evicting peer");
            node.peers.remove(&peer.peer_id);
        }
    }
}

/// `DELETE`: honored only when `from` matches the record's `file_owner`.
/// Not forwarded — the owner fans DELETE out directly to every peer it
/// tracks, so a receiving handler never needs to propagate it further.
pub fn handle_delete(node: &Node, delete: Delete) {
    let Some(record) = node.store.get(&delete.file_id) else {
        debug!(content_id = %delete.file_id, "DELETE for unknown record, ignoring");
        return;
    };
    if record.file_owner != delete.from {
        warn!(
            content_id = %delete.file_id,
            from = %delete.from,
            owner = %record.file_owner,
            "refusing DELETE from non-owner"
        );
        return;
    }

    if let Err(e) = blobs::delete_blob(&node.blob_dir, &delete.file_id) {
        warn!(content_id = %delete.file_id, error = %e, "failed to delete local blob");
        return;
    }
    if let Err(e) = node.store.drop_record(&delete.file_id) {
        warn!(content_id = %delete.file_id, error = %e, "failed to drop record");
        return;
    }
    info!(content_id = %delete.file_id, "honored DELETE");
}

/// Dispatches one inbound message on an accepted connection, returning the
/// reply frame (if the message type expects one) to send back before close.
pub async fn dispatch(node: &Node, message: Message, peer_addr: std::net::SocketAddr) -> Option<Message> {
    match message {
        Message::Gossip(gossip) => {
            crate::network::gossip::handle_gossip(node, gossip).await;
            None
        }
        Message::GossipReply(reply) => {
            crate::network::gossip::handle_gossip_reply(node, reply).await;
            None
        }
        Message::Announce(announce) => {
            handle_announce(node, announce).await;
            None
        }
        Message::FileData(file_data) => {
            handle_file_data(node, file_data).await;
            None
        }
        Message::Delete(delete) => {
            handle_delete(node, delete);
            None
        }
        Message::GetFile(request) => {
            debug!(peer = %peer_addr, file_id = %request.file_id, "GET_FILE");
            Some(Message::FileData(handle_get_file(node, request)))
        }
    }
}
