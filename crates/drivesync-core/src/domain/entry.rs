//! File-tree entry domain entity
//!
//! An [`Entry`] describes one node of the synchronized tree as seen on one
//! side: the local filesystem, the remote store, or (paired later by the
//! resolver) both. Remote entries arrive fully described by the API; local
//! entries are built from directory metadata and compute their checksum
//! lazily on first demand.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, TimeZone, Utc};
use md5::{Digest, Md5};
use tracing::debug;

/// Where an entry's bytes can be obtained, if anywhere.
///
/// Directories and server-native documents have no byte source; the latter
/// are recognized by a non-empty export-link map instead and can only be
/// materialized through format exports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ContentSource {
    /// No direct byte source (directories, export-only documents).
    #[default]
    None,
    /// Absolute path of a local file.
    LocalFile(PathBuf),
    /// Canonical download URL of a remote blob.
    RemoteBlob(String),
}

impl ContentSource {
    /// Returns the local path when this source is a local file.
    pub fn local_path(&self) -> Option<&Path> {
        match self {
            ContentSource::LocalFile(p) => Some(p),
            _ => None,
        }
    }

    /// Returns the download URL when this source is a remote blob.
    pub fn download_url(&self) -> Option<&str> {
        match self {
            ContentSource::RemoteBlob(u) => Some(u),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ContentSource::None)
    }
}

/// Memoized MD5 slot shared between clones of the same entry snapshot.
///
/// Set once and never invalidated: callers must not mutate a file between
/// the first checksum computation and later comparisons of the same
/// snapshot.
#[derive(Debug, Clone, Default)]
pub struct ChecksumCell(Arc<OnceLock<Option<String>>>);

impl ChecksumCell {
    fn get_or_compute(&self, path: &Path) -> Option<String> {
        self.0.get_or_init(|| stream_md5(path)).clone()
    }
}

/// A file or directory node, present locally, remotely, or both.
#[derive(Debug, Clone, Default)]
pub struct Entry {
    /// Entry name with any `/` in the remote title escaped.
    pub name: String,
    pub is_dir: bool,
    /// Size in bytes; meaningless for directories.
    pub size: u64,
    /// Modification time, second precision, UTC.
    pub mtime: DateTime<Utc>,
    /// Byte source: local path, remote download URL, or none.
    pub source: ContentSource,
    /// Known MD5 checksum (remote entries); local entries leave this unset
    /// and compute on demand through [`Entry::md5_checksum`].
    pub md5: Option<String>,
    pub mime_type: Option<String>,
    /// Opaque remote identifier; `None` for entries that exist only locally.
    pub remote_id: Option<String>,
    /// Mime-type to URL map for server-native documents.
    pub export_links: BTreeMap<String, String>,
    pub owner_names: Vec<String>,
    pub shared: bool,
    pub copyable: bool,
    pub etag: Option<String>,
    pub version: i64,
    /// Lazy MD5 slot; leave defaulted when constructing entries.
    pub checksum: ChecksumCell,
}

impl Entry {
    /// Builds a local entry from filesystem metadata.
    ///
    /// The remote id stays unset and the checksum is left to lazy
    /// computation against `abs_path`.
    pub fn local(name: impl Into<String>, abs_path: PathBuf, meta: &std::fs::Metadata) -> Self {
        let mtime = meta
            .modified()
            .map(|t| round_to_second(DateTime::<Utc>::from(t)))
            .unwrap_or_default();
        Self {
            name: name.into(),
            is_dir: meta.is_dir(),
            size: meta.len(),
            mtime,
            source: ContentSource::LocalFile(abs_path),
            ..Default::default()
        }
    }

    /// Builds a metadata-only entry standing in for content piped through
    /// stdin: no byte source on disk, current time as mtime.
    pub fn piped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mtime: round_to_second(Utc::now()),
            ..Default::default()
        }
    }

    /// Builds a directory entry about to be created remotely.
    pub fn new_folder(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_dir: true,
            mtime: round_to_second(Utc::now()),
            ..Default::default()
        }
    }

    /// True when the entry is a server-native document: exportable
    /// representations exist but the bytes cannot be downloaded directly.
    pub fn has_export_links(&self) -> bool {
        !self.is_dir && !self.export_links.is_empty()
    }

    /// Returns the MD5 of this entry's content, if one can be known.
    ///
    /// Remote entries return the server-reported checksum. Local files are
    /// streamed through MD5 on first call and the digest is memoized for
    /// the lifetime of this snapshot (clones included). Directories and
    /// sourceless entries have no checksum.
    pub fn md5_checksum(&self) -> Option<String> {
        if self.is_dir {
            return None;
        }
        if let Some(known) = &self.md5 {
            return Some(known.clone());
        }
        match &self.source {
            ContentSource::LocalFile(path) => {
                if self.size > LARGE_FILE_SIZE {
                    debug!(name = %self.name, size = self.size, "checksumming large file");
                }
                self.checksum.get_or_compute(path)
            }
            _ => None,
        }
    }

    /// True when `other` exists and has the same directory-kind.
    pub fn same_dir_type(&self, other: &Entry) -> bool {
        self.is_dir == other.is_dir
    }
}

/// Files above this size get a debug note before checksumming.
const LARGE_FILE_SIZE: u64 = 400 * 1024 * 1024;

/// Rounds a timestamp to whole seconds, half-up, in UTC.
///
/// Both sides of a comparison must pass through this: the remote API
/// reports millisecond precision and local filesystems nanoseconds, while
/// the sync contract compares at second precision.
pub fn round_to_second(t: DateTime<Utc>) -> DateTime<Utc> {
    let mut secs = t.timestamp();
    if t.timestamp_subsec_nanos() >= 500_000_000 {
        secs += 1;
    }
    Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
}

fn stream_md5(path: &Path) -> Option<String> {
    let mut file = std::fs::File::open(path).ok()?;
    let mut hasher = Md5::new();
    std::io::copy(&mut file, &mut hasher).ok()?;
    let digest = hasher.finalize();
    let mut out = String::with_capacity(32);
    for byte in digest {
        let _ = write!(out, "{byte:02x}");
    }
    Some(out)
}
