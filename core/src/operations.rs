//! # Operations
//!
//! The four user-facing actions a node performs, built on top of the
//! Metadata Store, the blob directory, and the transport. Each returns an
//! [`OperationError`] rather than panicking — these are called directly
//! from the interactive shell, where a failure is a single diagnostic line,
//! not a crash.

use std::path::Path;

use rand::seq::SliceRandom;
use tracing::info;

use crate::config;
use crate::crypto::content_id;
use crate::error::OperationError;
use crate::identity::PeerId;
use crate::network::messages::{Announce, Delete, GetFile, Message};
use crate::network::node::Node;
use crate::network::transport;
use crate::storage::{blobs, FileRecord};

fn now_secs() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Publishes a local file: hashes it, writes it into the blob directory
/// under its content id, pushes it unsolicited to one random peer, and
/// announces it to every tracked peer.
pub async fn push(node: &Node, path: &Path) -> Result<FileRecord, OperationError> {
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let timestamp = now_secs();
    let content_id = content_id(&bytes, timestamp);

    blobs::write_blob(&node.blob_dir, &content_id, &bytes)?;

    let record = FileRecord {
        content_id: content_id.clone(),
        file_name,
        file_size: bytes.len() as u64,
        file_owner: node.peer_id.clone(),
        file_timestamp: timestamp,
        replicas: std::collections::HashSet::from([node.peer_id.clone()]),
    };
    node.store.upsert(record.clone())?;

    let peers = node.peers.all();
    if let Some(target) = peers.choose(&mut rand::thread_rng()) {
        let data = Message::FileData(crate::network::messages::FileData::from_record(&record, &bytes));
        if let Err(e) = transport::send(&target.endpoint, &data).await {
            tracing::debug!(peer = %target.peer_id, error = %e, "unsolicited push send failed, evicting peer");
            node.peers.remove(&target.peer_id);
        }
    }

    let announce = Announce::from_record(node.peer_id.clone(), &record);
    for peer in node.peers.all() {
        let msg = Message::Announce(announce.clone());
        if let Err(e) = transport::send(&peer.endpoint, &msg).await {
            tracing::debug!(peer = %peer.peer_id, error = %e, "announce send failed, evicting peer");
            node.peers.remove(&peer.peer_id);
        }
    }

    info!(content_id = %record.content_id, "published file");
    Ok(record)
}

/// Fetches a file by content id. A no-op if already local. Otherwise picks
/// a live replica at random and requests it over GET_FILE.
pub async fn fetch(node: &Node, content_id: &str) -> Result<(), OperationError> {
    let record = node
        .store
        .get(content_id)
        .ok_or_else(|| OperationError::UnknownContentId(content_id.to_string()))?;

    if record.is_local(&node.blob_dir) {
        return Ok(());
    }

    let live_replicas: Vec<PeerId> = record
        .replicas
        .iter()
        .filter(|p| node.peers.contains(p))
        .cloned()
        .collect();

    let chosen = live_replicas
        .choose(&mut rand::thread_rng())
        .ok_or(OperationError::NoSource)?;
    let peer = node.peers.get(chosen).ok_or(OperationError::NoSource)?;

    let request = Message::GetFile(GetFile { file_id: content_id.to_string() });
    let response = match transport::request(&peer.endpoint, &request).await {
        Ok(response) => response,
        Err(e) => {
            node.peers.remove(&peer.peer_id);
            return Err(e.into());
        }
    };

    match response {
        Message::FileData(file_data) => {
            crate::network::handlers::handle_file_data(node, file_data).await;
            Ok(())
        }
        _ => Err(OperationError::NoSource),
    }
}

/// Deletes a file this node owns: unlinks the blob, drops the record, and
/// fans DELETE out to every tracked peer.
pub async fn delete(node: &Node, content_id: &str) -> Result<(), OperationError> {
    let record = node
        .store
        .get(content_id)
        .ok_or_else(|| OperationError::UnknownContentId(content_id.to_string()))?;

    if record.file_owner != node.peer_id {
        return Err(OperationError::NotOwner {
            content_id: content_id.to_string(),
            owner: record.file_owner.to_string(),
        });
    }

    blobs::delete_blob(&node.blob_dir, content_id)?;
    node.store.drop_record(content_id)?;

    let delete_msg = Delete { from: node.peer_id.clone(), file_id: content_id.to_string() };
    for peer in node.peers.all() {
        let msg = Message::Delete(delete_msg.clone());
        if let Err(e) = transport::send(&peer.endpoint, &msg).await {
            tracing::debug!(peer = %peer.peer_id, error = %e, "DELETE send failed, evicting peer");
            node.peers.remove(&peer.peer_id);
        }
    }

    info!(content_id, "deleted owned file");
    Ok(())
}

/// Polls for up to [`config::JOIN_REPLICATION_WINDOW`] for gossip replies to
/// populate the Metadata Store, then fetches up to
/// [`config::NUM_FILES_ON_JOIN`] eligible remote records (not local, with at
/// least one known replica).
pub async fn join_time_replication(node: &Node) {
    let deadline = tokio::time::Instant::now() + config::JOIN_REPLICATION_WINDOW;
    let mut eligible = Vec::new();

    while tokio::time::Instant::now() < deadline {
        eligible = eligible_records(node);
        if !eligible.is_empty() {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    }

    eligible.shuffle(&mut rand::thread_rng());
    eligible.truncate(config::NUM_FILES_ON_JOIN);

    for record in eligible {
        if let Err(e) = fetch(node, &record.content_id).await {
            tracing::debug!(content_id = %record.content_id, error = %e, "join-time replication fetch failed");
        }
    }
}

fn eligible_records(node: &Node) -> Vec<FileRecord> {
    node.store
        .list_remote(&node.blob_dir)
        .into_iter()
        .filter(|r| !r.replicas.is_empty())
        .collect()
}

/// Rewrites the Metadata Store keeping only locally-held records, resetting
/// their `replicas` to `{self}`. Run on clean shell exit.
pub fn clean_exit(node: &Node) -> Result<(), OperationError> {
    node.store.collapse_to_local(&node.blob_dir, &node.peer_id)?;
    Ok(())
}
