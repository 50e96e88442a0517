//! # Metadata Store
//!
//! Persistent, last-writer-wins mapping from content id to [`FileRecord`].
//! The whole store lives under one mutex: every read-modify-write sequence
//! (an `upsert` followed by an `add_replica`, for instance) must hold the
//! lock across both steps or the merge invariant breaks. A single JSON
//! document is rewritten to disk after every mutation — simple, and eventual
//! consistency across a restart is recovered via gossip re-learning rather
//! than fsync discipline.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::identity::PeerId;
use crate::storage::blobs;

/// A file known to the overlay, local or remote.
///
/// `content_id` is the primary key. `file_owner` is fixed at first insertion
/// — only the owner may issue a DELETE for this record. `replicas` is
/// best-effort derived state: the set of peers believed to hold the bytes,
/// seeded by ANNOUNCE/GOSSIP_REPLY and trimmed when a peer is reaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub content_id: String,
    pub file_name: String,
    pub file_size: u64,
    pub file_owner: PeerId,
    /// Wall-clock seconds at creation on the owner; the version used for merge.
    pub file_timestamp: u64,
    pub replicas: HashSet<PeerId>,
}

impl FileRecord {
    /// True if a blob named `content_id` exists in `blob_dir`. Computed from
    /// disk on demand rather than cached — "local" is a derived property,
    /// not stored state.
    pub fn is_local(&self, blob_dir: &Path) -> bool {
        blobs::blob_exists(blob_dir, &self.content_id)
    }
}

/// On-disk document: content id -> record, serialized as a JSON object.
type Document = BTreeMap<String, FileRecord>;

/// Persistent, mutex-guarded mapping from content id to [`FileRecord`].
pub struct MetadataStore {
    path: PathBuf,
    inner: Mutex<Document>,
}

impl MetadataStore {
    /// Loads the store from `path`, creating an empty document if the file
    /// doesn't exist yet.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let document = match std::fs::read_to_string(&path) {
            Ok(contents) => serde_json::from_str(&contents)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Document::new(),
            Err(source) => {
                return Err(StoreError::Read {
                    path: path.display().to_string(),
                    source,
                })
            }
        };

        let store = Self {
            path,
            inner: Mutex::new(document),
        };
        store.save()?;
        Ok(store)
    }

    /// Rewrites the full document to disk. Called after every mutation.
    fn save(&self) -> Result<(), StoreError> {
        let document = self.inner.lock();
        let contents = serde_json::to_string_pretty(&*document)?;
        std::fs::write(&self.path, contents).map_err(|source| StoreError::Write {
            path: self.path.display().to_string(),
            source,
        })
    }

    pub fn get(&self, content_id: &str) -> Option<FileRecord> {
        self.inner.lock().get(content_id).cloned()
    }

    /// Inserts or merges `record` under last-writer-wins semantics. Returns
    /// `true` iff the record was newly inserted or its scalar fields were
    /// replaced by a newer version (i.e. something other than the replica
    /// set changed).
    pub fn upsert(&self, record: FileRecord) -> Result<bool, StoreError> {
        let mut document = self.inner.lock();
        let updated = match document.get_mut(&record.content_id) {
            None => {
                document.insert(record.content_id.clone(), record);
                true
            }
            Some(existing) if existing.file_timestamp < record.file_timestamp => {
                let mut replicas = std::mem::take(&mut existing.replicas);
                replicas.extend(record.replicas.iter().cloned());
                *existing = record;
                existing.replicas = replicas;
                true
            }
            Some(existing) => {
                existing.replicas.extend(record.replicas);
                false
            }
        };
        drop(document);
        self.save()?;
        Ok(updated)
    }

    /// Adds `peer` to the replica set of `content_id`, if the record exists.
    pub fn add_replica(&self, content_id: &str, peer: PeerId) -> Result<(), StoreError> {
        {
            let mut document = self.inner.lock();
            if let Some(record) = document.get_mut(content_id) {
                record.replicas.insert(peer);
            }
        }
        self.save()
    }

    /// Removes `peer` from every record's replica set. Called when a peer
    /// is reaped from the peer table.
    pub fn remove_peer(&self, peer: &PeerId) -> Result<(), StoreError> {
        {
            let mut document = self.inner.lock();
            for record in document.values_mut() {
                record.replicas.remove(peer);
            }
        }
        self.save()
    }

    /// Drops a record entirely (used by DELETE handling).
    pub fn drop_record(&self, content_id: &str) -> Result<(), StoreError> {
        {
            let mut document = self.inner.lock();
            document.remove(content_id);
        }
        self.save()
    }

    /// Records whose blob exists locally in `blob_dir`.
    pub fn list_local(&self, blob_dir: &Path) -> Vec<FileRecord> {
        self.inner
            .lock()
            .values()
            .filter(|r| r.is_local(blob_dir))
            .cloned()
            .collect()
    }

    /// Records whose blob does not exist locally in `blob_dir`.
    pub fn list_remote(&self, blob_dir: &Path) -> Vec<FileRecord> {
        self.inner
            .lock()
            .values()
            .filter(|r| !r.is_local(blob_dir))
            .cloned()
            .collect()
    }

    /// All records currently held, local or remote.
    pub fn list_all(&self) -> Vec<FileRecord> {
        self.inner.lock().values().cloned().collect()
    }

    /// Rewrites the store keeping only records whose blob exists locally,
    /// resetting each kept record's `replicas` to `{self}`. Run on clean exit
    /// — the on-disk replica snapshot is not authoritative across restarts,
    /// and this avoids persisting ghosts that gossip would otherwise have to
    /// re-learn are gone.
    pub fn collapse_to_local(&self, blob_dir: &Path, self_id: &PeerId) -> Result<(), StoreError> {
        {
            let mut document = self.inner.lock();
            document.retain(|_, record| record.is_local(blob_dir));
            for record in document.values_mut() {
                record.replicas = HashSet::from([self_id.clone()]);
            }
        }
        self.save()
    }
}
