//! Path resolution tests.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use drivesync_core::ports::RemoteStore;
use drivesync_core::RemoteError;

use crate::common::{file_json, folder_json, mount_root, mount_title_lookup, setup_gateway};

#[tokio::test]
async fn find_by_path_walks_segments() {
    let (server, gateway) = setup_gateway().await;
    mount_title_lookup(&server, "root", "d", json!([folder_json("id-d", "d")])).await;
    mount_title_lookup(&server, "id-d", "e", json!([folder_json("id-e", "e")])).await;
    mount_title_lookup(
        &server,
        "id-e",
        "f.bin",
        json!([file_json("id-f", "f.bin", 10, "aaaa")]),
    )
    .await;

    let entry = gateway.find_by_path("/d/e/f.bin").await.unwrap();
    assert_eq!(entry.remote_id.as_deref(), Some("id-f"));
    assert_eq!(entry.name, "f.bin");
    assert_eq!(entry.size, 10);
}

#[tokio::test]
async fn find_by_path_root_uses_sentinel() {
    let (server, gateway) = setup_gateway().await;
    mount_root(&server).await;

    let entry = gateway.find_by_path("/").await.unwrap();
    assert!(entry.is_dir);
    assert_eq!(entry.remote_id.as_deref(), Some("root-id"));
}

#[tokio::test]
async fn missing_segment_is_path_not_exists() {
    let (server, gateway) = setup_gateway().await;
    mount_title_lookup(&server, "root", "nope", json!([])).await;

    let err = gateway.find_by_path("/nope").await.unwrap_err();
    assert!(matches!(err, RemoteError::PathNotExists));
}

#[tokio::test]
async fn escaped_separator_is_unescaped_before_matching() {
    let (server, gateway) = setup_gateway().await;
    // The segment "a%2Fb.txt" must be looked up under its real title "a/b.txt".
    mount_title_lookup(
        &server,
        "root",
        "a/b.txt",
        json!([file_json("id-ab", "a/b.txt", 1, "bb")]),
    )
    .await;

    let entry = gateway.find_by_path("/a%2Fb.txt").await.unwrap();
    assert_eq!(entry.remote_id.as_deref(), Some("id-ab"));
    // And the returned entry re-escapes the title for local use.
    assert_eq!(entry.name, "a%2Fb.txt");
}

#[tokio::test]
async fn trashed_lookup_scopes_to_trash() {
    let (server, gateway) = setup_gateway().await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("q", "title = 'gone.txt' and trashed=true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [file_json("id-gone", "gone.txt", 5, "cc")]
        })))
        .mount(&server)
        .await;

    let entry = gateway.find_by_path_trashed("/gone.txt").await.unwrap();
    assert_eq!(entry.remote_id.as_deref(), Some("id-gone"));
}

#[tokio::test]
async fn api_failure_propagates_status() {
    let (server, gateway) = setup_gateway().await;
    Mock::given(method("GET"))
        .and(path("/files/broken"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    match gateway.find_by_id("broken").await.unwrap_err() {
        RemoteError::Api { status, message } => {
            assert_eq!(status, 500);
            assert!(message.contains("boom"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn download_streams_bytes() {
    let (server, gateway) = setup_gateway().await;
    Mock::given(method("GET"))
        .and(path("/files/id-f"))
        .and(query_param("alt", "media"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ten bytes!".to_vec()))
        .mount(&server)
        .await;

    let stream = gateway.download("id-f", None).await.unwrap();
    let mut reader = tokio_util::io::StreamReader::new(stream);
    let mut out = Vec::new();
    tokio::io::copy(&mut reader, &mut out).await.unwrap();
    assert_eq!(out, b"ten bytes!");
}

#[tokio::test]
async fn download_prefers_export_url() {
    let (server, gateway) = setup_gateway().await;
    Mock::given(method("GET"))
        .and(path("/exported.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF".to_vec()))
        .mount(&server)
        .await;

    let url = format!("{}/exported.pdf", server.uri());
    let stream = gateway.download("ignored", Some(&url)).await.unwrap();
    let mut reader = tokio_util::io::StreamReader::new(stream);
    let mut out = Vec::new();
    tokio::io::copy(&mut reader, &mut out).await.unwrap();
    assert_eq!(out, b"%PDF");
}
