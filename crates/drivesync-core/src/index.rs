//! Per-file index store
//!
//! One JSON file per remote id under `<root>/.drivesync/indices/` holds
//! the last-synced snapshot of that file. Records are written on
//! successful Add/Modify, removed on successful Delete, and read by the
//! conflict resolver. Full-overwrite writes with owner-only permissions;
//! single-writer per id is guaranteed upstream (at most one change per id
//! per run), so no cross-process locking is attempted.

use std::path::PathBuf;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::context::{restrict_permissions, Context};
use crate::domain::{CoreError, Entry};

/// Last-synced metadata snapshot for one remote id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRecord {
    #[serde(rename = "id")]
    pub file_id: String,
    #[serde(default)]
    pub etag: String,
    #[serde(default)]
    pub md5: String,
    #[serde(rename = "mtype", default)]
    pub mime_type: String,
    /// Modification time at last sync, unix seconds.
    pub mtime: i64,
    #[serde(default)]
    pub version: i64,
    /// When this record was written, unix seconds.
    #[serde(rename = "itime")]
    pub indexed_at: i64,
}

impl IndexRecord {
    /// Snapshots an entry as its would-be index record.
    ///
    /// The entry must carry a remote id; entries without one have never
    /// been synced and cannot be indexed.
    pub fn from_entry(entry: &Entry) -> Option<Self> {
        let file_id = entry.remote_id.clone()?;
        Some(Self {
            file_id,
            etag: entry.etag.clone().unwrap_or_default(),
            md5: entry.md5_checksum().unwrap_or_default(),
            mime_type: entry.mime_type.clone().unwrap_or_default(),
            mtime: entry.mtime.timestamp(),
            version: entry.version,
            indexed_at: Utc::now().timestamp(),
        })
    }
}

/// Load/save/delete access to the index directory of one working copy.
#[derive(Debug, Clone)]
pub struct IndexStore {
    dir: PathBuf,
}

impl IndexStore {
    pub fn new(context: &Context) -> Self {
        Self {
            dir: context.indices_dir(),
        }
    }

    /// Index file location for a remote id; purely a function of the
    /// store root and the id.
    pub fn path_for(&self, file_id: &str) -> PathBuf {
        self.dir.join(file_id)
    }

    /// Reads the record for `file_id`; `Ok(None)` when the file was never
    /// indexed.
    pub fn load(&self, file_id: &str) -> Result<Option<IndexRecord>, CoreError> {
        match std::fs::read(self.path_for(file_id)) {
            Ok(data) => Ok(Some(serde_json::from_slice(&data)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Writes (or overwrites) a record, owner read/write only.
    pub fn save(&self, record: &IndexRecord) -> Result<(), CoreError> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(&record.file_id);
        std::fs::write(&path, serde_json::to_vec(record)?)?;
        restrict_permissions(&path)?;
        Ok(())
    }

    /// Removes the record for `file_id`; missing records are fine.
    pub fn delete(&self, file_id: &str) -> Result<(), CoreError> {
        match std::fs::remove_file(self.path_for(file_id)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Best-effort save used at the tail of executor workers, where an
    /// indexing failure should not fail an already-applied change.
    pub fn save_logged(&self, entry: &Entry) {
        let Some(record) = IndexRecord::from_entry(entry) else {
            warn!(name = %entry.name, "cannot index entry without a remote id");
            return;
        };
        if let Err(err) = self.save(&record) {
            warn!(name = %entry.name, error = %err, "failed to write index record");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn store() -> (tempfile::TempDir, IndexStore) {
        let dir = tempfile::tempdir().unwrap();
        let context = Context::initialize(
            dir.path(),
            "id".to_string(),
            "sec".to_string(),
            "ref".to_string(),
        )
        .unwrap();
        let store = IndexStore::new(&context);
        (dir, store)
    }

    fn record(id: &str) -> IndexRecord {
        IndexRecord {
            file_id: id.to_string(),
            etag: "e1".to_string(),
            md5: "abc".to_string(),
            mime_type: "text/plain".to_string(),
            mtime: 1_700_000_000,
            version: 3,
            indexed_at: 1_700_000_100,
        }
    }

    #[test]
    fn save_load_delete_cycle() {
        let (_dir, store) = store();
        store.save(&record("f1")).unwrap();
        assert_eq!(store.load("f1").unwrap(), Some(record("f1")));

        store.delete("f1").unwrap();
        assert_eq!(store.load("f1").unwrap(), None);
        // Deleting again is not an error.
        store.delete("f1").unwrap();
    }

    #[test]
    fn load_missing_is_none() {
        let (_dir, store) = store();
        assert!(store.load("never-written").unwrap().is_none());
    }

    #[test]
    fn json_field_names_match_layout() {
        let json = serde_json::to_value(record("f1")).unwrap();
        assert_eq!(json["id"], "f1");
        assert_eq!(json["mtype"], "text/plain");
        assert_eq!(json["itime"], 1_700_000_100);
        assert_eq!(json["mtime"], 1_700_000_000);
    }

    #[test]
    fn record_from_entry() {
        let entry = Entry {
            name: "a.txt".to_string(),
            size: 3,
            mtime: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            md5: Some("abc".to_string()),
            mime_type: Some("text/plain".to_string()),
            remote_id: Some("f9".to_string()),
            etag: Some("e9".to_string()),
            version: 7,
            ..Default::default()
        };
        let record = IndexRecord::from_entry(&entry).unwrap();
        assert_eq!(record.file_id, "f9");
        assert_eq!(record.md5, "abc");
        assert_eq!(record.mtime, 1_700_000_000);
        assert_eq!(record.version, 7);
    }

    #[test]
    fn record_requires_remote_id() {
        let entry = Entry {
            name: "local-only".to_string(),
            ..Default::default()
        };
        assert!(IndexRecord::from_entry(&entry).is_none());
    }
}
