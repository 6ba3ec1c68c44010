//! Drive API HTTP client
//!
//! Thin wrapper over `reqwest::Client` that owns the API and upload base
//! URLs and the OAuth2 access token, and maps non-2xx responses into
//! [`RemoteError`]. Endpoint logic lives in the gateway; this layer only
//! builds authenticated requests.

use drivesync_core::RemoteError;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use tracing::debug;

/// Base URL for the Drive API.
const API_BASE_URL: &str = "https://www.googleapis.com/drive/v2";

/// Base URL for media uploads.
const UPLOAD_BASE_URL: &str = "https://www.googleapis.com/upload/drive/v2";

/// Default listing page size.
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Authenticated HTTP client for the Drive API.
///
/// Cheap to clone: the underlying connection pool is shared.
#[derive(Clone)]
pub struct DriveClient {
    http: Client,
    api_base: String,
    upload_base: String,
    access_token: String,
    page_size: u32,
}

impl DriveClient {
    /// Creates a client against the production endpoints.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self::with_base_urls(access_token, API_BASE_URL, UPLOAD_BASE_URL)
    }

    /// Creates a client with custom base URLs (used by tests to point at
    /// a mock server).
    pub fn with_base_urls(
        access_token: impl Into<String>,
        api_base: impl Into<String>,
        upload_base: impl Into<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            api_base: api_base.into(),
            upload_base: upload_base.into(),
            access_token: access_token.into(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Overrides the listing page size.
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Authenticated request against the API base.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.api_base, path);
        self.http
            .request(method, url)
            .bearer_auth(&self.access_token)
    }

    /// Authenticated request against the upload base.
    pub fn upload_request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.upload_base, path);
        self.http
            .request(method, url)
            .bearer_auth(&self.access_token)
    }

    /// Authenticated request to an absolute URL (export links, download
    /// URLs handed out by the API).
    pub fn absolute_request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http.request(method, url).bearer_auth(&self.access_token)
    }

    /// Sends a request and fails non-2xx statuses as [`RemoteError::Api`].
    pub async fn execute(&self, builder: RequestBuilder) -> Result<Response, RemoteError> {
        let response = builder
            .send()
            .await
            .map_err(|err| RemoteError::Other(anyhow::Error::new(err).context("request failed")))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), %message, "API error response");
        Err(api_error(status, message))
    }

    /// Sends a request and decodes the JSON body.
    pub async fn execute_json<T: for<'de> Deserialize<'de>>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, RemoteError> {
        let response = self.execute(builder).await?;
        response
            .json::<T>()
            .await
            .map_err(|err| RemoteError::Other(anyhow::Error::new(err).context("invalid response body")))
    }
}

fn api_error(status: StatusCode, message: String) -> RemoteError {
    RemoteError::Api {
        status: status.as_u16(),
        message: truncate(message, 512),
    }
}

fn truncate(mut s: String, max: usize) -> String {
    if s.len() > max {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        s.truncate(end);
    }
    s
}
