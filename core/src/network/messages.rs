//! # Wire Messages
//!
//! One JSON object per message, UTF-8 encoded, each carrying a `"type"`
//! discriminator. Modeled as a single tagged enum so a received JSON value
//! decodes directly into the right variant and dispatch is a single `match`.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::identity::PeerId;
use crate::storage::FileRecord;

/// Every message this node sends or receives on the P2P wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    #[serde(rename = "GOSSIP")]
    Gossip(Gossip),
    #[serde(rename = "GOSSIP_REPLY")]
    GossipReply(GossipReply),
    #[serde(rename = "ANNOUNCE")]
    Announce(Announce),
    #[serde(rename = "FILE_DATA")]
    FileData(FileData),
    #[serde(rename = "DELETE")]
    Delete(Delete),
    #[serde(rename = "GET_FILE")]
    GetFile(GetFile),
}

/// Carries a random 128-bit id so duplicate-suppression can recognize a
/// message it has already forwarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gossip {
    pub host: String,
    pub port: u16,
    pub id: String,
    #[serde(rename = "peerId")]
    pub peer_id: PeerId,
}

/// Response to a GOSSIP: the sender's own local files, for anti-entropy
/// fan-in into the receiver's metadata store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GossipReply {
    pub host: String,
    pub port: u16,
    #[serde(rename = "peerId")]
    pub peer_id: PeerId,
    pub files: Vec<FileRecord>,
}

/// Unsolicited notice that a peer just acquired a blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announce {
    pub from: PeerId,
    pub file_name: String,
    pub file_size: u64,
    pub file_id: String,
    pub file_owner: PeerId,
    pub file_timestamp: u64,
}

impl Announce {
    pub fn from_record(from: PeerId, record: &FileRecord) -> Self {
        Self {
            from,
            file_name: record.file_name.clone(),
            file_size: record.file_size,
            file_id: record.content_id.clone(),
            file_owner: record.file_owner.clone(),
            file_timestamp: record.file_timestamp,
        }
    }

    pub fn into_record(self) -> FileRecord {
        FileRecord {
            content_id: self.file_id,
            file_name: self.file_name,
            file_size: self.file_size,
            file_owner: self.file_owner,
            file_timestamp: self.file_timestamp,
            replicas: HashSet::new(),
        }
    }
}

/// Response to GET_FILE, or an unsolicited push from a publisher. A `None`
/// scalar (all scalars are null together) means "I no longer have it".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileData {
    pub file_name: Option<String>,
    pub file_size: Option<u64>,
    pub file_id: Option<String>,
    pub file_owner: Option<PeerId>,
    pub file_timestamp: Option<u64>,
    /// Hex-encoded blob payload.
    pub data: Option<String>,
}

impl FileData {
    /// Builds the "I no longer have it" response.
    pub fn unavailable() -> Self {
        Self {
            file_name: None,
            file_size: None,
            file_id: None,
            file_owner: None,
            file_timestamp: None,
            data: None,
        }
    }

    /// Builds a populated response carrying the full blob.
    pub fn from_record(record: &FileRecord, bytes: &[u8]) -> Self {
        Self {
            file_name: Some(record.file_name.clone()),
            file_size: Some(record.file_size),
            file_id: Some(record.content_id.clone()),
            file_owner: Some(record.file_owner.clone()),
            file_timestamp: Some(record.file_timestamp),
            data: Some(hex::encode(bytes)),
        }
    }

    /// True if every scalar field is null — the explicit "not available" response.
    pub fn is_unavailable(&self) -> bool {
        self.file_id.is_none() || self.data.is_none()
    }

    /// Converts a populated response into its record and decoded bytes.
    /// Returns `None` if this response is the "unavailable" sentinel or the
    /// hex payload fails to decode.
    pub fn into_record_and_bytes(self) -> Option<(FileRecord, Vec<u8>)> {
        if self.is_unavailable() {
            return None;
        }
        let bytes = hex::decode(self.data?).ok()?;
        let record = FileRecord {
            content_id: self.file_id?,
            file_name: self.file_name?,
            file_size: self.file_size?,
            file_owner: self.file_owner?,
            file_timestamp: self.file_timestamp?,
            replicas: HashSet::new(),
        };
        Some((record, bytes))
    }
}

/// Requests deletion of a file. Honored only if `from == file_owner`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delete {
    pub from: PeerId,
    pub file_id: String,
}

/// Requests the blob for `file_id` on the same connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetFile {
    pub file_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gossip_round_trips_through_json() {
        let msg = Message::Gossip(Gossip {
            host: "localhost".into(),
            port: 8270,
            id: "abc-123".into(),
            peer_id: PeerId::new("p1"),
        });
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"GOSSIP\""));
        let decoded: Message = serde_json::from_str(&json).unwrap();
        assert!(matches!(decoded, Message::Gossip(_)));
    }

    #[test]
    fn unavailable_file_data_round_trips() {
        let fd = FileData::unavailable();
        let json = serde_json::to_string(&fd).unwrap();
        let decoded: FileData = serde_json::from_str(&json).unwrap();
        assert!(decoded.is_unavailable());
        assert!(decoded.into_record_and_bytes().is_none());
    }

    #[test]
    fn populated_file_data_round_trips_to_record() {
        let record = FileRecord {
            content_id: "cid".into(),
            file_name: "hello.txt".into(),
            file_size: 5,
            file_owner: PeerId::new("p1"),
            file_timestamp: 1000,
            replicas: HashSet::new(),
        };
        let fd = FileData::from_record(&record, b"hello");
        assert!(!fd.is_unavailable());
        let (decoded_record, bytes) = fd.into_record_and_bytes().unwrap();
        assert_eq!(decoded_record.content_id, "cid");
        assert_eq!(bytes, b"hello");
    }
}
