//! Listing and pagination tests.

use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, ResponseTemplate};

use drivesync_core::ports::RemoteStore;

use crate::common::{file_json, folder_json, setup_gateway};

async fn collect(mut rx: drivesync_core::ports::EntryStream) -> Vec<drivesync_core::Entry> {
    let mut out = Vec::new();
    while let Some(item) = rx.recv().await {
        out.push(item.expect("listing item"));
    }
    out
}

#[tokio::test]
async fn single_page_listing() {
    let (server, gateway) = setup_gateway().await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("q", "'p1' in parents and trashed=false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                file_json("f1", "a.txt", 3, "aa"),
                folder_json("d1", "docs"),
            ]
        })))
        .mount(&server)
        .await;

    let entries = collect(gateway.list_children("p1", true).await).await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "a.txt");
    assert!(entries[1].is_dir);
}

#[tokio::test]
async fn paginated_listing_follows_continuation_token() {
    let (server, gateway) = setup_gateway().await;

    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("q", "'p1' in parents and trashed=false"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [file_json("f1", "one", 1, "aa")],
            "nextPageToken": "page-2"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [file_json("f2", "two", 2, "bb")]
        })))
        .mount(&server)
        .await;

    let entries = collect(gateway.list_children("p1", true).await).await;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "one");
    assert_eq!(entries[1].name, "two");
}

#[tokio::test]
async fn hidden_entries_filtered_at_boundary() {
    let (server, gateway) = setup_gateway().await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                file_json("f1", ".hidden", 1, "aa"),
                file_json("f2", "visible", 2, "bb"),
            ]
        })))
        .mount(&server)
        .await;

    let entries = collect(gateway.list_children("p1", false).await).await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].name, "visible");

    let entries = collect(gateway.list_children("p1", true).await).await;
    assert_eq!(entries.len(), 2);
}

#[tokio::test]
async fn listing_error_is_delivered_in_stream() {
    let (server, gateway) = setup_gateway().await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(403).set_body_string("quota"))
        .mount(&server)
        .await;

    let mut rx = gateway.list_children("p1", true).await;
    let first = rx.recv().await.expect("one item");
    assert!(first.is_err());
    assert!(rx.recv().await.is_none());
}
