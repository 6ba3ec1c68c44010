//! Upload tests: insert vs update, media transmission, mtime stamping.

use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{body_json_string, body_string, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use drivesync_core::ports::{RemoteStore, UploadBody, UploadOptions, UploadRequest};
use drivesync_core::Entry;

use crate::common::{file_json, folder_json, setup_gateway};

fn src_file(name: &str, size: u64) -> Entry {
    Entry {
        name: name.to_string(),
        size,
        mtime: Utc.timestamp_opt(1_714_564_800, 0).unwrap(), // 2024-05-01T12:00:00Z
        ..Default::default()
    }
}

#[tokio::test]
async fn insert_streams_metadata_then_media() {
    let (server, gateway) = setup_gateway().await;

    Mock::given(method("POST"))
        .and(path("/files"))
        .and(query_param("setModifiedDate", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_json("new-1", "a.txt", 0, "")))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("PUT"))
        .and(path("/files/new-1"))
        .and(query_param("uploadType", "media"))
        .and(body_string("hi\n"))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_json("new-1", "a.txt", 3, "md5hi")))
        .expect(1)
        .mount(&server)
        .await;

    // Restamp after the media write.
    Mock::given(method("PUT"))
        .and(path("/files/new-1"))
        .and(query_param("setModifiedDate", "true"))
        .and(body_json_string(
            json!({"modifiedDate": "2024-05-01T12:00:00.000Z"}).to_string(),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_json("new-1", "a.txt", 3, "md5hi")))
        .expect(1)
        .mount(&server)
        .await;

    let entry = gateway
        .upload(UploadRequest {
            parent_id: "root".to_string(),
            src: src_file("a.txt", 3),
            body: Some(UploadBody::Bytes(b"hi\n".to_vec())),
            opts: UploadOptions::default(),
        })
        .await
        .unwrap();

    assert_eq!(entry.remote_id.as_deref(), Some("new-1"));
    assert_eq!(entry.size, 3);
    assert_eq!(entry.md5.as_deref(), Some("md5hi"));
}

#[tokio::test]
async fn update_hits_existing_id_with_option_params() {
    let (server, gateway) = setup_gateway().await;

    Mock::given(method("PUT"))
        .and(path("/files/old-9"))
        .and(query_param("setModifiedDate", "true"))
        .and(query_param("ocr", "true"))
        .and(query_param("convert", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(file_json("old-9", "b.txt", 4, "x")))
        .expect(1)
        .mount(&server)
        .await;

    let mut src = src_file("b.txt", 4);
    src.remote_id = Some("old-9".to_string());

    // Metadata-only update: no body means no media round-trips.
    let entry = gateway
        .upload(UploadRequest {
            parent_id: "root".to_string(),
            src,
            body: None,
            opts: UploadOptions {
                ocr: true,
                convert: true,
                ..Default::default()
            },
        })
        .await
        .unwrap();

    assert_eq!(entry.remote_id.as_deref(), Some("old-9"));
}

#[tokio::test]
async fn folder_insert_sends_no_media() {
    let (server, gateway) = setup_gateway().await;

    Mock::given(method("POST"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(folder_json("dir-1", "docs")))
        .expect(1)
        .mount(&server)
        .await;

    let entry = gateway
        .upload(UploadRequest {
            parent_id: "root".to_string(),
            src: Entry::new_folder("docs"),
            body: None,
            opts: UploadOptions::default(),
        })
        .await
        .unwrap();

    assert!(entry.is_dir);
    assert_eq!(entry.remote_id.as_deref(), Some("dir-1"));
}

#[tokio::test]
async fn slashed_name_uploads_unescaped_title() {
    let (server, gateway) = setup_gateway().await;

    Mock::given(method("POST"))
        .and(path("/files"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(file_json("s1", "a/b.txt", 0, "")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let entry = gateway
        .upload(UploadRequest {
            parent_id: "root".to_string(),
            src: src_file("a%2Fb.txt", 0),
            body: None,
            opts: UploadOptions::default(),
        })
        .await
        .unwrap();

    // Round-trip: the wire title "a/b.txt" comes back escaped.
    assert_eq!(entry.name, "a%2Fb.txt");

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["title"], "a/b.txt");
}
