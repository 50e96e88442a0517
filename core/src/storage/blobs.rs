//! # Blob Directory
//!
//! The on-disk byte layout of the blob directory is explicitly out of scope
//! for this crate's core contract — it's "plain files keyed by content
//! hash" and nothing more. This module is the thin read/write boundary the
//! rest of the crate needs against that directory; it does not attempt to
//! specify a layout beyond what `spec.md` already fixes.

use std::path::Path;

use crate::error::BlobError;

/// True if a blob named `content_id` exists under `blob_dir`.
pub fn blob_exists(blob_dir: &Path, content_id: &str) -> bool {
    blob_dir.join(content_id).is_file()
}

/// Reads the full contents of the blob named `content_id`.
pub fn read_blob(blob_dir: &Path, content_id: &str) -> Result<Vec<u8>, BlobError> {
    std::fs::read(blob_dir.join(content_id)).map_err(|source| BlobError::Read {
        content_id: content_id.to_string(),
        source,
    })
}

/// Writes `bytes` to the blob named `content_id`, creating `blob_dir` if
/// necessary. Blobs are treated as immutable once written; concurrent
/// readers need no locking because a write only ever happens once per
/// content id before the content id exists for anyone else to read.
pub fn write_blob(blob_dir: &Path, content_id: &str, bytes: &[u8]) -> Result<(), BlobError> {
    std::fs::create_dir_all(blob_dir).map_err(|source| BlobError::Write {
        content_id: content_id.to_string(),
        source,
    })?;
    std::fs::write(blob_dir.join(content_id), bytes).map_err(|source| BlobError::Write {
        content_id: content_id.to_string(),
        source,
    })
}

/// Deletes the blob named `content_id`, if it exists. Deleting a
/// non-existent blob is not an error — DELETE handling calls this
/// unconditionally after checking the record exists.
pub fn delete_blob(blob_dir: &Path, content_id: &str) -> Result<(), BlobError> {
    match std::fs::remove_file(blob_dir.join(content_id)) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(BlobError::Delete {
            content_id: content_id.to_string(),
            source,
        }),
    }
}

/// Lists the content ids of every blob currently on disk under `blob_dir`.
/// Returns an empty list if `blob_dir` doesn't exist yet (nothing has been
/// published locally).
pub fn list_blob_ids(blob_dir: &Path) -> Result<Vec<String>, BlobError> {
    let entries = match std::fs::read_dir(blob_dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(BlobError::Read {
                content_id: blob_dir.display().to_string(),
                source,
            })
        }
    };

    let mut ids = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| BlobError::Read {
            content_id: blob_dir.display().to_string(),
            source,
        })?;
        if entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            ids.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_then_read_roundtrips() {
        let dir = tempdir().unwrap();
        write_blob(dir.path(), "abc", b"hello").unwrap();
        assert!(blob_exists(dir.path(), "abc"));
        assert_eq!(read_blob(dir.path(), "abc").unwrap(), b"hello");
    }

    #[test]
    fn delete_missing_blob_is_not_an_error() {
        let dir = tempdir().unwrap();
        assert!(delete_blob(dir.path(), "nope").is_ok());
    }

    #[test]
    fn delete_removes_blob() {
        let dir = tempdir().unwrap();
        write_blob(dir.path(), "abc", b"hello").unwrap();
        delete_blob(dir.path(), "abc").unwrap();
        assert!(!blob_exists(dir.path(), "abc"));
    }

    #[test]
    fn list_blob_ids_returns_every_written_blob() {
        let dir = tempdir().unwrap();
        write_blob(dir.path(), "abc", b"hello").unwrap();
        write_blob(dir.path(), "def", b"world").unwrap();

        let mut ids = list_blob_ids(dir.path()).unwrap();
        ids.sort();
        assert_eq!(ids, vec!["abc".to_string(), "def".to_string()]);
    }

    #[test]
    fn list_blob_ids_is_empty_when_blob_dir_does_not_exist() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("never-created");
        assert_eq!(list_blob_ids(&missing).unwrap(), Vec::<String>::new());
    }
}
