//! # Error Types
//!
//! Every fallible boundary in the crate gets its own error enum rather than
//! a single catch-all — callers (the operations layer, the request
//! handlers, the node binary) can match on the variant that matters to them
//! instead of stringly-typed errors.

/// Errors from the metadata store: loading, saving, or the on-disk document.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read metadata file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write metadata file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed metadata document: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Errors from reading or writing blob files on disk.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    #[error("failed to read blob {content_id}: {source}")]
    Read {
        content_id: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write blob {content_id}: {source}")]
    Write {
        content_id: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to delete blob {content_id}: {source}")]
    Delete {
        content_id: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the message codec: framing and decode failures.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The connection closed with unparseable bytes still in the buffer.
    #[error("framing error: connection closed with {byte_count} unparseable bytes pending")]
    Framing { byte_count: usize },
    /// A complete JSON value was read but didn't match a known message schema.
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors from the transport layer: connecting to and sending on the wire.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("connect to {addr} timed out")]
    ConnectTimeout { addr: String },
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to send to {addr}: {source}")]
    Send {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("timed out waiting for a response")]
    ResponseTimeout,
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Errors surfaced by the operations layer (push / fetch / delete / exit).
#[derive(Debug, thiserror::Error)]
pub enum OperationError {
    #[error("no local source and no live peer known to hold this file")]
    NoSource,
    #[error("local file not found: {0}")]
    LocalFileNotFound(String),
    #[error("content id {0} is unknown to this node")]
    UnknownContentId(String),
    #[error("refusing delete: {content_id} is owned by {owner}, not this peer")]
    NotOwner { content_id: String, owner: String },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Blob(#[from] BlobError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
