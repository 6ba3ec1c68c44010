//! Shared helpers for gateway integration tests
//!
//! Spins up a wiremock server and returns a gateway whose API and upload
//! bases both point at it.

use serde_json::{json, Value};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use drivesync_remote::{DriveClient, DriveGateway};

pub async fn setup_gateway() -> (MockServer, DriveGateway) {
    let server = MockServer::start().await;
    let client = DriveClient::with_base_urls("test-access-token", server.uri(), server.uri());
    (server, DriveGateway::new(client))
}

/// JSON for a plain file resource.
pub fn file_json(id: &str, title: &str, size: u64, md5: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "mimeType": "application/octet-stream",
        "modifiedDate": "2024-05-01T12:00:00.000Z",
        "downloadUrl": format!("https://dl.example/{id}"),
        "md5Checksum": md5,
        "fileSize": size.to_string(),
        "etag": "\"etag-1\"",
        "version": "4"
    })
}

/// JSON for a folder resource.
pub fn folder_json(id: &str, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "mimeType": "application/vnd.google-apps.folder",
        "modifiedDate": "2024-05-01T12:00:00.000Z"
    })
}

/// Mounts a single-shot title lookup: a `/files` query for `title` under
/// `parent_id` answering with `items`.
pub async fn mount_title_lookup(server: &MockServer, parent_id: &str, title: &str, items: Value) {
    let query = format!("'{parent_id}' in parents and title = '{title}' and trashed=false");
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("q", query))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": items })))
        .mount(server)
        .await;
}

/// Mounts the root folder metadata endpoint.
pub async fn mount_root(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/files/root"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(folder_json("root-id", "My Drive")),
        )
        .mount(server)
        .await;
}
