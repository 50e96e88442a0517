//! # Storage
//!
//! Two independent pieces of on-disk state: the metadata document (one JSON
//! file, last-writer-wins merge, mutex-guarded) and the blob directory
//! (immutable files keyed by content id, no locking needed).
//!
//! ```text
//! metadata.rs — FileRecord, MetadataStore
//! blobs.rs    — read/write/delete against the blob directory
//! ```

pub mod blobs;
pub mod metadata;

pub use metadata::{FileRecord, MetadataStore};
