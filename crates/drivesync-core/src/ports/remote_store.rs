//! Remote store port (driven/secondary port)
//!
//! Typed operations over the remote tree. The primary implementation
//! talks to the Drive REST API over HTTP, but the engine only ever sees
//! this trait, which keeps the executors testable against an in-memory
//! fake.
//!
//! Listing results are streamed: `list_children` hands back the receiving
//! end of a bounded channel that the adapter fills as pages arrive, so a
//! large directory never has to be buffered whole.

use std::fmt;
use std::path::PathBuf;
use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;
use tokio::sync::mpsc;

use crate::domain::{Entry, RemoteError};

/// Streamed listing: entries (or a terminal error) as they arrive.
pub type EntryStream = mpsc::Receiver<Result<Entry, RemoteError>>;

/// Streamed file content, ready for `tokio_util::io::StreamReader`.
pub type ByteStream = Pin<Box<dyn Stream<Item = std::io::Result<Bytes>> + Send>>;

/// Server-side processing switches carried by an upload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UploadOptions {
    /// Run OCR over uploaded images/PDFs.
    pub ocr: bool,
    /// Convert the upload to a server-native document.
    pub convert: bool,
    /// Pin the new revision.
    pub pin: bool,
    /// Use the content as indexable text.
    pub index_content: bool,
    /// Always transmit the body, even when only metadata changed.
    pub force_media: bool,
}

/// Source of an upload's bytes.
#[derive(Debug)]
pub enum UploadBody {
    /// Stream a local file.
    File(PathBuf),
    /// An in-memory payload.
    Bytes(Vec<u8>),
    /// Stream the process's standard input (piped push).
    Stdin,
}

/// One upload: insert when `src` has no remote id, update otherwise.
///
/// The remote modification time is always stamped from `src.mtime` so
/// both sides agree at second precision after the transfer.
#[derive(Debug)]
pub struct UploadRequest {
    pub parent_id: String,
    pub src: Entry,
    pub body: Option<UploadBody>,
    pub opts: UploadOptions,
}

/// Role granted by a permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Owner,
    Reader,
    Writer,
    Commenter,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Reader => "reader",
            Role::Writer => "writer",
            Role::Commenter => "commenter",
        }
    }

    /// Case-insensitive parse; unknown strings default to reader, the
    /// least-privileged grantable role.
    pub fn parse(s: &str) -> Role {
        match s.to_ascii_lowercase().as_str() {
            "owner" => Role::Owner,
            "writer" => Role::Writer,
            "commenter" => Role::Commenter,
            _ => Role::Reader,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who a permission applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    Anyone,
    User,
    Domain,
    Group,
}

impl AccountKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AccountKind::Anyone => "anyone",
            AccountKind::User => "user",
            AccountKind::Domain => "domain",
            AccountKind::Group => "group",
        }
    }

    /// Case-insensitive parse; unknown strings default to user.
    pub fn parse(s: &str) -> AccountKind {
        match s.to_ascii_lowercase().as_str() {
            "anyone" => AccountKind::Anyone,
            "domain" => AccountKind::Domain,
            "group" => AccountKind::Group,
            _ => AccountKind::User,
        }
    }
}

impl fmt::Display for AccountKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An existing permission on a remote entry.
#[derive(Debug, Clone)]
pub struct PermissionInfo {
    pub id: String,
    pub role: String,
    pub kind: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// A permission to grant.
#[derive(Debug, Clone)]
pub struct PermissionRequest {
    pub file_id: String,
    /// Email address or domain the grant targets; empty for `anyone`.
    pub value: Option<String>,
    pub role: Role,
    pub kind: AccountKind,
    /// Optional message for the notification email.
    pub message: Option<String>,
    pub notify: bool,
}

/// Per-service quota usage line from `about()`.
#[derive(Debug, Clone)]
pub struct ServiceUsage {
    pub service: String,
    pub bytes_used: u64,
}

/// Feature rate limit from `about()`.
#[derive(Debug, Clone)]
pub struct FeatureRate {
    pub name: String,
    pub rate: f64,
}

/// Per-type maximum upload size from `about()`.
#[derive(Debug, Clone)]
pub struct UploadLimit {
    pub file_type: String,
    pub size: u64,
}

/// Account and quota description.
#[derive(Debug, Clone, Default)]
pub struct AboutInfo {
    pub name: String,
    pub quota_kind: String,
    pub quota_used: u64,
    pub quota_total: u64,
    pub quota_in_trash: u64,
    pub service_usage: Vec<ServiceUsage>,
    pub features: Vec<FeatureRate>,
    pub max_upload_sizes: Vec<UploadLimit>,
}

impl AboutInfo {
    pub fn quota_free(&self) -> u64 {
        self.quota_total.saturating_sub(self.quota_used)
    }
}

/// Typed operations over the remote tree.
///
/// Path lookups surface [`RemoteError::PathNotExists`] as a distinct
/// recoverable error; every other failure propagates unchanged.
/// Implementations must be safe for concurrent use.
#[async_trait::async_trait]
pub trait RemoteStore: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Entry, RemoteError>;

    /// Resolves a `/`-separated working-copy path segment by segment from
    /// the remote root. Escaped separators inside segment names are
    /// unescaped before being matched against remote titles.
    async fn find_by_path(&self, path: &str) -> Result<Entry, RemoteError>;

    /// Same as [`find_by_path`](Self::find_by_path) but matches trashed
    /// entries.
    async fn find_by_path_trashed(&self, path: &str) -> Result<Entry, RemoteError>;

    /// Streams the children of a folder, paginating until exhausted.
    /// Hidden entries (leading dot) are filtered at this boundary unless
    /// `include_hidden` is set.
    async fn list_children(&self, parent_id: &str, include_hidden: bool) -> EntryStream;

    /// Inserts or updates an entry, stamping the remote modification time
    /// from the request's source entry.
    async fn upload(&self, req: UploadRequest) -> Result<Entry, RemoteError>;

    /// Streams an entry's bytes; `export_url` overrides the canonical
    /// download endpoint for format exports.
    async fn download(&self, id: &str, export_url: Option<&str>)
        -> Result<ByteStream, RemoteError>;

    async fn trash(&self, id: &str) -> Result<(), RemoteError>;
    async fn untrash(&self, id: &str) -> Result<(), RemoteError>;
    async fn empty_trash(&self) -> Result<(), RemoteError>;

    /// Bumps the remote modification time to server-now.
    async fn touch(&self, id: &str) -> Result<Entry, RemoteError>;

    async fn copy(
        &self,
        new_name: &str,
        parent_id: Option<&str>,
        src: &Entry,
    ) -> Result<Entry, RemoteError>;

    async fn rename(&self, id: &str, new_title: &str) -> Result<Entry, RemoteError>;

    async fn insert_parent(&self, id: &str, parent_id: &str) -> Result<(), RemoteError>;
    async fn remove_parent(&self, id: &str, parent_id: &str) -> Result<(), RemoteError>;

    /// Grants the public reader permission and returns the public URL.
    async fn publish(&self, id: &str) -> Result<String, RemoteError>;
    async fn unpublish(&self, id: &str) -> Result<(), RemoteError>;

    async fn list_permissions(&self, id: &str) -> Result<Vec<PermissionInfo>, RemoteError>;
    async fn insert_permission(
        &self,
        req: &PermissionRequest,
    ) -> Result<PermissionInfo, RemoteError>;
    async fn delete_permission(&self, id: &str, scope: &str) -> Result<(), RemoteError>;

    /// Resolves the permission id for an email address (used by unshare).
    async fn id_for_email(&self, email: &str) -> Result<String, RemoteError>;

    async fn about(&self) -> Result<AboutInfo, RemoteError>;
}
