//! Wire DTOs for the Drive REST API
//!
//! Serde types mirroring the JSON resources, plus the mapping into domain
//! entries. Numeric fields arrive as JSON strings on this API, so sizes
//! and versions go through a tolerant deserializer.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use drivesync_core::domain::{paths, round_to_second, ContentSource, Entry};
use serde::{Deserialize, Deserializer};

/// Mime type the API uses to mark folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Wire format for modification timestamps.
const MTIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// A file or folder resource.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResource {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub mime_type: Option<String>,
    pub modified_date: Option<String>,
    pub download_url: Option<String>,
    pub export_links: Option<BTreeMap<String, String>>,
    pub md5_checksum: Option<String>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub file_size: Option<u64>,
    pub etag: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub version: Option<i64>,
    pub shared: Option<bool>,
    pub copyable: Option<bool>,
    pub owner_names: Option<Vec<String>>,
}

impl FileResource {
    /// Maps the wire resource into a domain entry. Titles are escaped so
    /// a remote name containing `/` occupies a single path segment.
    pub fn into_entry(self) -> Entry {
        let is_dir = self.mime_type.as_deref() == Some(FOLDER_MIME_TYPE);
        let source = match self.download_url {
            Some(url) if !is_dir => ContentSource::RemoteBlob(url),
            _ => ContentSource::None,
        };
        Entry {
            name: paths::escape_name(&self.title),
            is_dir,
            size: self.file_size.unwrap_or(0),
            mtime: self
                .modified_date
                .as_deref()
                .and_then(parse_mtime)
                .unwrap_or_default(),
            source,
            md5: self.md5_checksum,
            mime_type: self.mime_type,
            remote_id: Some(self.id),
            export_links: self.export_links.unwrap_or_default(),
            owner_names: self.owner_names.unwrap_or_default(),
            shared: self.shared.unwrap_or(false),
            copyable: self.copyable.unwrap_or(false),
            etag: self.etag,
            version: self.version.unwrap_or(0),
            ..Default::default()
        }
    }
}

/// One page of a listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileList {
    #[serde(default)]
    pub items: Vec<FileResource>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionResource {
    pub id: String,
    #[serde(default)]
    pub role: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub name: Option<String>,
    pub email_address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PermissionList {
    #[serde(default)]
    pub items: Vec<PermissionResource>,
}

#[derive(Debug, Deserialize)]
pub struct PermissionId {
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboutResource {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub quota_type: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub quota_bytes_total: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub quota_bytes_used: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub quota_bytes_used_in_trash: Option<u64>,
    #[serde(default)]
    pub quota_bytes_by_service: Vec<ServiceQuota>,
    #[serde(default)]
    pub features: Vec<Feature>,
    #[serde(default)]
    pub max_upload_sizes: Vec<MaxUploadSize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceQuota {
    #[serde(default)]
    pub service_name: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub bytes_used: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    #[serde(default)]
    pub feature_name: String,
    #[serde(default)]
    pub feature_rate: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaxUploadSize {
    #[serde(rename = "type", default)]
    pub file_type: String,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub size: Option<u64>,
}

/// Parses a wire timestamp and rounds it to whole seconds.
pub fn parse_mtime(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|t| round_to_second(t.with_timezone(&Utc)))
}

/// Formats a timestamp the way the API expects modification dates.
pub fn format_mtime(t: DateTime<Utc>) -> String {
    round_to_second(t).format(MTIME_FORMAT).to_string()
}

fn lenient_u64<'de, D: Deserializer<'de>>(de: D) -> Result<Option<u64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Str(String),
    }
    Ok(match Option::<Raw>::deserialize(de)? {
        Some(Raw::Num(n)) => Some(n),
        Some(Raw::Str(s)) => s.parse().ok(),
        None => None,
    })
}

fn lenient_i64<'de, D: Deserializer<'de>>(de: D) -> Result<Option<i64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(i64),
        Str(String),
    }
    Ok(match Option::<Raw>::deserialize(de)? {
        Some(Raw::Num(n)) => Some(n),
        Some(Raw::Str(s)) => s.parse().ok(),
        None => None,
    })
}
