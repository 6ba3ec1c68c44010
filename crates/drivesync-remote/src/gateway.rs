//! Remote gateway over the Drive REST API
//!
//! Implements the [`RemoteStore`] port: segment-wise path resolution,
//! paginated listings streamed through a bounded channel, insert/update
//! uploads with local-mtime stamping, streaming downloads, trash and
//! permission operations.

use futures::{StreamExt, TryStreamExt};
use reqwest::Method;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

use drivesync_core::domain::paths;
use drivesync_core::ports::{
    AboutInfo, ByteStream, EntryStream, FeatureRate, PermissionInfo, PermissionRequest,
    RemoteStore, ServiceUsage, UploadBody, UploadLimit, UploadRequest,
};
use drivesync_core::{Entry, RemoteError};

use crate::client::DriveClient;
use crate::wire::{
    format_mtime, AboutResource, FileList, FileResource, PermissionId, PermissionList,
    PermissionResource, FOLDER_MIME_TYPE,
};

/// Sentinel id of the remote root folder.
pub const ROOT_ID: &str = "root";

/// Host serving published resources.
const RESOURCE_HOST_URL: &str = "https://googledrive.com/host";

/// Buffer of the listing channel: pages keep arriving while the consumer
/// drains earlier entries.
const LIST_CHANNEL_CAPACITY: usize = 64;

/// Drive REST implementation of the remote store port.
pub struct DriveGateway {
    client: DriveClient,
}

impl DriveGateway {
    pub fn new(client: DriveClient) -> Self {
        Self { client }
    }

    async fn get_file(&self, id: &str) -> Result<FileResource, RemoteError> {
        self.client
            .execute_json(self.client.request(Method::GET, &format!("/files/{id}")))
            .await
    }

    /// Finds the child of `parent_id` whose title matches exactly;
    /// `trashed` scopes the match to trashed entries (which have lost
    /// their parent attachment, so the parent clause is dropped there).
    async fn find_child_by_title(
        &self,
        parent_id: &str,
        title: &str,
        trashed: bool,
    ) -> Result<FileResource, RemoteError> {
        let query = if trashed {
            format!("title = {} and trashed=true", quote(title))
        } else {
            format!(
                "{} in parents and title = {} and trashed=false",
                quote(parent_id),
                quote(title)
            )
        };

        let builder = self
            .client
            .request(Method::GET, "/files")
            .query(&[("q", query.as_str()), ("maxResults", "1")]);
        let list: FileList = self.client.execute_json(builder).await?;
        list.items
            .into_iter()
            .next()
            .ok_or(RemoteError::PathNotExists)
    }

    async fn find_by_path_impl(&self, path: &str, trashed: bool) -> Result<Entry, RemoteError> {
        if paths::root_like(path) {
            return Ok(self.get_file(ROOT_ID).await?.into_entry());
        }

        let mut current = ROOT_ID.to_string();
        let mut resource = None;
        for segment in path.split('/').skip(1) {
            let title = paths::unescape_name(segment);
            let found = self.find_child_by_title(&current, &title, trashed).await?;
            current = found.id.clone();
            resource = Some(found);
        }
        // The loop ran at least once: non-root paths have a segment.
        Ok(resource.expect("non-root path has segments").into_entry())
    }

    fn media_body(body: UploadBody) -> reqwest::Body {
        match body {
            UploadBody::File(path) => {
                let stream = futures::stream::once(async move { tokio::fs::File::open(path).await })
                    .map_ok(ReaderStream::new)
                    .try_flatten();
                reqwest::Body::wrap_stream(stream)
            }
            UploadBody::Bytes(data) => reqwest::Body::from(data),
            UploadBody::Stdin => reqwest::Body::wrap_stream(ReaderStream::new(tokio::io::stdin())),
        }
    }
}

#[async_trait::async_trait]
impl RemoteStore for DriveGateway {
    async fn find_by_id(&self, id: &str) -> Result<Entry, RemoteError> {
        Ok(self.get_file(id).await?.into_entry())
    }

    async fn find_by_path(&self, path: &str) -> Result<Entry, RemoteError> {
        self.find_by_path_impl(path, false).await
    }

    async fn find_by_path_trashed(&self, path: &str) -> Result<Entry, RemoteError> {
        self.find_by_path_impl(path, true).await
    }

    async fn list_children(&self, parent_id: &str, include_hidden: bool) -> EntryStream {
        let (tx, rx) = mpsc::channel(LIST_CHANNEL_CAPACITY);
        let client = self.client.clone();
        let query = format!("{} in parents and trashed=false", quote(parent_id));
        let page_size = client.page_size().to_string();

        tokio::spawn(async move {
            let mut page_token: Option<String> = None;
            loop {
                let mut builder = client
                    .request(Method::GET, "/files")
                    .query(&[("q", query.as_str()), ("maxResults", page_size.as_str())]);
                if let Some(token) = &page_token {
                    builder = builder.query(&[("pageToken", token.as_str())]);
                }

                let list: FileList = match client.execute_json(builder).await {
                    Ok(list) => list,
                    Err(err) => {
                        warn!(error = %err, "listing page failed");
                        let _ = tx.send(Err(err)).await;
                        return;
                    }
                };

                for item in list.items {
                    let entry = item.into_entry();
                    if !include_hidden && entry.name.starts_with('.') {
                        continue;
                    }
                    if tx.send(Ok(entry)).await.is_err() {
                        return; // consumer hung up
                    }
                }

                match list.next_page_token {
                    Some(token) if !token.is_empty() => page_token = Some(token),
                    _ => return,
                }
            }
        });

        rx
    }

    async fn upload(&self, req: UploadRequest) -> Result<Entry, RemoteError> {
        let UploadRequest {
            parent_id,
            src,
            body,
            opts,
        } = req;

        let mut metadata = json!({
            "title": paths::unescape_name(&src.name),
            "parents": [{"id": parent_id}],
            "modifiedDate": format_mtime(src.mtime),
        });
        if src.is_dir {
            metadata["mimeType"] = json!(FOLDER_MIME_TYPE);
        } else if let Some(mime) = &src.mime_type {
            metadata["mimeType"] = json!(mime);
        }

        let resource: FileResource = match &src.remote_id {
            None => {
                debug!(name = %src.name, "inserting remote entry");
                let builder = self
                    .client
                    .request(Method::POST, "/files")
                    .query(&[("setModifiedDate", "true")])
                    .json(&metadata);
                self.client.execute_json(builder).await?
            }
            Some(id) => {
                debug!(name = %src.name, id, "updating remote entry");
                let mut builder = self
                    .client
                    .request(Method::PUT, &format!("/files/{id}"))
                    .query(&[("setModifiedDate", "true")]);
                if opts.ocr {
                    builder = builder.query(&[("ocr", "true")]);
                }
                if opts.convert {
                    builder = builder.query(&[("convert", "true")]);
                }
                if opts.pin {
                    builder = builder.query(&[("pinned", "true")]);
                }
                if opts.index_content {
                    builder = builder.query(&[("useContentAsIndexableText", "true")]);
                }
                self.client.execute_json(builder.json(&metadata)).await?
            }
        };

        let Some(body) = body else {
            return Ok(resource.into_entry());
        };
        if src.is_dir {
            return Ok(resource.into_entry());
        }

        debug!(name = %src.name, id = %resource.id, "transmitting media");
        let media: FileResource = self
            .client
            .execute_json(
                self.client
                    .upload_request(Method::PUT, &format!("/files/{}", resource.id))
                    .query(&[("uploadType", "media")])
                    .body(Self::media_body(body)),
            )
            .await?;

        // The media write bumps the server-side mtime; restamp it from the
        // source so both sides agree at second precision.
        let restamped: FileResource = self
            .client
            .execute_json(
                self.client
                    .request(Method::PUT, &format!("/files/{}", media.id))
                    .query(&[("setModifiedDate", "true")])
                    .json(&json!({"modifiedDate": format_mtime(src.mtime)})),
            )
            .await?;
        Ok(restamped.into_entry())
    }

    async fn download(
        &self,
        id: &str,
        export_url: Option<&str>,
    ) -> Result<ByteStream, RemoteError> {
        let builder = match export_url {
            Some(url) => self.client.absolute_request(Method::GET, url),
            None => self
                .client
                .request(Method::GET, &format!("/files/{id}"))
                .query(&[("alt", "media")]),
        };
        let response = self.client.execute(builder).await?;
        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(std::io::Error::other));
        Ok(Box::pin(stream))
    }

    async fn trash(&self, id: &str) -> Result<(), RemoteError> {
        self.client
            .execute(self.client.request(Method::POST, &format!("/files/{id}/trash")))
            .await?;
        Ok(())
    }

    async fn untrash(&self, id: &str) -> Result<(), RemoteError> {
        self.client
            .execute(
                self.client
                    .request(Method::POST, &format!("/files/{id}/untrash")),
            )
            .await?;
        Ok(())
    }

    async fn empty_trash(&self) -> Result<(), RemoteError> {
        self.client
            .execute(self.client.request(Method::DELETE, "/files/trash"))
            .await?;
        Ok(())
    }

    async fn touch(&self, id: &str) -> Result<Entry, RemoteError> {
        let resource: FileResource = self
            .client
            .execute_json(self.client.request(Method::POST, &format!("/files/{id}/touch")))
            .await?;
        Ok(resource.into_entry())
    }

    async fn copy(
        &self,
        new_name: &str,
        parent_id: Option<&str>,
        src: &Entry,
    ) -> Result<Entry, RemoteError> {
        let src_id = src
            .remote_id
            .as_deref()
            .ok_or_else(|| RemoteError::Other(anyhow::anyhow!("copy source has no remote id")))?;

        let mut metadata = json!({
            "title": paths::unescape_name(new_name),
            "modifiedDate": format_mtime(src.mtime),
        });
        if let Some(parent) = parent_id {
            metadata["parents"] = json!([{"id": parent}]);
        }

        let resource: FileResource = self
            .client
            .execute_json(
                self.client
                    .request(Method::POST, &format!("/files/{src_id}/copy"))
                    .json(&metadata),
            )
            .await?;
        Ok(resource.into_entry())
    }

    async fn rename(&self, id: &str, new_title: &str) -> Result<Entry, RemoteError> {
        let resource: FileResource = self
            .client
            .execute_json(
                self.client
                    .request(Method::PUT, &format!("/files/{id}"))
                    .json(&json!({"title": paths::unescape_name(new_title)})),
            )
            .await?;
        Ok(resource.into_entry())
    }

    async fn insert_parent(&self, id: &str, parent_id: &str) -> Result<(), RemoteError> {
        self.client
            .execute(
                self.client
                    .request(Method::POST, &format!("/files/{id}/parents"))
                    .json(&json!({"id": parent_id})),
            )
            .await?;
        Ok(())
    }

    async fn remove_parent(&self, id: &str, parent_id: &str) -> Result<(), RemoteError> {
        self.client
            .execute(
                self.client
                    .request(Method::DELETE, &format!("/files/{id}/parents/{parent_id}")),
            )
            .await?;
        Ok(())
    }

    async fn publish(&self, id: &str) -> Result<String, RemoteError> {
        let request = PermissionRequest {
            file_id: id.to_string(),
            value: None,
            role: drivesync_core::ports::Role::Reader,
            kind: drivesync_core::ports::AccountKind::Anyone,
            message: None,
            notify: false,
        };
        self.insert_permission(&request).await?;
        Ok(format!("{RESOURCE_HOST_URL}/{id}"))
    }

    async fn unpublish(&self, id: &str) -> Result<(), RemoteError> {
        self.delete_permission(id, "anyone").await
    }

    async fn list_permissions(&self, id: &str) -> Result<Vec<PermissionInfo>, RemoteError> {
        let list: PermissionList = self
            .client
            .execute_json(
                self.client
                    .request(Method::GET, &format!("/files/{id}/permissions")),
            )
            .await?;
        Ok(list.items.into_iter().map(permission_info).collect())
    }

    async fn insert_permission(
        &self,
        req: &PermissionRequest,
    ) -> Result<PermissionInfo, RemoteError> {
        let mut body = json!({
            "role": req.role.as_str(),
            "type": req.kind.as_str(),
        });
        if let Some(value) = &req.value {
            body["value"] = json!(value);
        }

        let mut builder = self
            .client
            .request(
                Method::POST,
                &format!("/files/{}/permissions", req.file_id),
            )
            .query(&[(
                "sendNotificationEmails",
                if req.notify { "true" } else { "false" },
            )]);
        if let Some(message) = &req.message {
            builder = builder.query(&[("emailMessage", message.as_str())]);
        }

        let resource: PermissionResource =
            self.client.execute_json(builder.json(&body)).await?;
        Ok(permission_info(resource))
    }

    async fn delete_permission(&self, id: &str, scope: &str) -> Result<(), RemoteError> {
        self.client
            .execute(
                self.client
                    .request(Method::DELETE, &format!("/files/{id}/permissions/{scope}")),
            )
            .await?;
        Ok(())
    }

    async fn id_for_email(&self, email: &str) -> Result<String, RemoteError> {
        let resource: PermissionId = self
            .client
            .execute_json(
                self.client
                    .request(Method::GET, &format!("/permissionIds/{email}")),
            )
            .await?;
        Ok(resource.id)
    }

    async fn about(&self) -> Result<AboutInfo, RemoteError> {
        let about: AboutResource = self
            .client
            .execute_json(self.client.request(Method::GET, "/about"))
            .await?;
        Ok(AboutInfo {
            name: about.name,
            quota_kind: about.quota_type,
            quota_used: about.quota_bytes_used.unwrap_or(0),
            quota_total: about.quota_bytes_total.unwrap_or(0),
            quota_in_trash: about.quota_bytes_used_in_trash.unwrap_or(0),
            service_usage: about
                .quota_bytes_by_service
                .into_iter()
                .map(|s| ServiceUsage {
                    service: s.service_name,
                    bytes_used: s.bytes_used.unwrap_or(0),
                })
                .collect(),
            features: about
                .features
                .into_iter()
                .filter(|f| !f.feature_name.is_empty())
                .map(|f| FeatureRate {
                    name: f.feature_name,
                    rate: f.feature_rate,
                })
                .collect(),
            max_upload_sizes: about
                .max_upload_sizes
                .into_iter()
                .map(|m| UploadLimit {
                    file_type: m.file_type,
                    size: m.size.unwrap_or(0),
                })
                .collect(),
        })
    }
}

fn permission_info(resource: PermissionResource) -> PermissionInfo {
    PermissionInfo {
        id: resource.id,
        role: resource.role,
        kind: resource.kind,
        name: resource.name,
        email: resource.email_address,
    }
}

/// Quotes a value for the server-side query grammar.
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}
