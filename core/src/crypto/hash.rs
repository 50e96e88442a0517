//! # Content ID Derivation
//!
//! A [`ContentId`] is a hex-encoded SHA-256 digest of the published bytes
//! concatenated with the ASCII-decimal publish timestamp. Salting the hash
//! with the timestamp is deliberate: the same bytes pushed twice at
//! different moments are treated as two distinct files, each with its own
//! replica set and lifecycle. De-duplicating identical content is a
//! different feature (drop the timestamp from the input) and is explicitly
//! not what this overlay does.

use sha2::{Digest, Sha256};

/// Computes the content id for `bytes` published at `timestamp` (Unix
/// seconds). The timestamp is mixed in as its ASCII-decimal representation,
/// matching the wire-visible `file_timestamp` field exactly.
pub fn content_id(bytes: &[u8], timestamp: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hasher.update(timestamp.to_string().as_bytes());
    hex::encode(hasher.finalize())
}
