//! About/quota and permission tests.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use drivesync_core::ports::RemoteStore;

use crate::common::setup_gateway;

#[tokio::test]
async fn about_maps_quota_and_limits() {
    let (server, gateway) = setup_gateway().await;
    Mock::given(method("GET"))
        .and(path("/about"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Ada Lovelace",
            "quotaType": "LIMITED",
            "quotaBytesTotal": "10000",
            "quotaBytesUsed": "2500",
            "quotaBytesUsedInTrash": "100",
            "quotaBytesByService": [
                {"serviceName": "DRIVE", "bytesUsed": "2400"}
            ],
            "features": [
                {"featureName": "ocr", "featureRate": 2.0},
                {"featureName": "", "featureRate": 0.0}
            ],
            "maxUploadSizes": [{"type": "document", "size": "1048576"}]
        })))
        .mount(&server)
        .await;

    let about = gateway.about().await.unwrap();
    assert_eq!(about.name, "Ada Lovelace");
    assert_eq!(about.quota_total, 10_000);
    assert_eq!(about.quota_used, 2_500);
    assert_eq!(about.quota_in_trash, 100);
    assert_eq!(about.quota_free(), 7_500);
    assert_eq!(about.service_usage.len(), 1);
    // Unnamed features are dropped.
    assert_eq!(about.features.len(), 1);
    assert_eq!(about.max_upload_sizes[0].size, 1_048_576);
}

#[tokio::test]
async fn publish_inserts_anyone_reader_and_returns_url() {
    let (server, gateway) = setup_gateway().await;
    Mock::given(method("POST"))
        .and(path("/files/f1/permissions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "anyone", "role": "reader", "type": "anyone"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let url = gateway.publish("f1").await.unwrap();
    assert!(url.ends_with("/f1"));

    let requests = server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["role"], "reader");
    assert_eq!(body["type"], "anyone");
}

#[tokio::test]
async fn unpublish_deletes_anyone_permission() {
    let (server, gateway) = setup_gateway().await;
    Mock::given(method("DELETE"))
        .and(path("/files/f1/permissions/anyone"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    gateway.unpublish("f1").await.unwrap();
}

#[tokio::test]
async fn list_permissions_maps_fields() {
    let (server, gateway) = setup_gateway().await;
    Mock::given(method("GET"))
        .and(path("/files/f1/permissions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"id": "p1", "role": "owner", "type": "user",
                 "name": "Ada", "emailAddress": "ada@example.com"}
            ]
        })))
        .mount(&server)
        .await;

    let perms = gateway.list_permissions("f1").await.unwrap();
    assert_eq!(perms.len(), 1);
    assert_eq!(perms[0].role, "owner");
    assert_eq!(perms[0].email.as_deref(), Some("ada@example.com"));
}

#[tokio::test]
async fn trash_untrash_touch_round_trip() {
    let (server, gateway) = setup_gateway().await;
    Mock::given(method("POST"))
        .and(path("/files/f1/trash"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "f1"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/files/f1/untrash"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "f1"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/files/f1/touch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "f1", "title": "a.txt",
            "modifiedDate": "2024-05-02T09:00:00.000Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    gateway.trash("f1").await.unwrap();
    gateway.untrash("f1").await.unwrap();
    let touched = gateway.touch("f1").await.unwrap();
    assert_eq!(touched.remote_id.as_deref(), Some("f1"));
}
