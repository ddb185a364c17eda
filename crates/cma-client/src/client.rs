//! Contentful Management/Upload API client.
//!
//! Async HTTP client using `reqwest` with Bearer token authentication.

use std::time::Duration;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::{ApiFuture, ManagementApi};
use crate::error::ClientError;
use crate::types::{
    AssetRecord, AssetResponse, DEFAULT_LOCALE, EntryRecord, EntryResponse, NewAsset, NewEntry,
    RemoteCredentials, ResourceKind, UploadResponse, UploadTicket,
};

pub const DEFAULT_API_BASE: &str = "https://api.contentful.com";
pub const DEFAULT_UPLOAD_BASE: &str = "https://upload.contentful.com";
const ENVIRONMENT: &str = "master";

/// Time allowed to establish a connection.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Time allowed for one request, from connecting until the body is read.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

const MANAGEMENT_JSON: &str = "application/vnd.contentful.management.v1+json";
const OCTET_STREAM: &str = "application/octet-stream";
const VERSION_HEADER: &str = "X-Contentful-Version";
const CONTENT_MODEL_HEADER: &str = "X-Contentful-Content-Type";

/// Characters escaped in caller-supplied path segments.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Contentful API client.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    api_base: String,
    upload_base: String,
    request_timeout: Duration,
}

impl Client {
    /// Creates a client pointed at the public Contentful endpoints.
    pub fn new() -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("cfupload/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            api_base: DEFAULT_API_BASE.to_string(),
            upload_base: DEFAULT_UPLOAD_BASE.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Overrides the per-request deadline. A stalled call fails as
    /// [`ClientError::Transport`].
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Overrides the management and upload base URLs.
    pub fn with_base_urls(
        mut self,
        api_base: impl Into<String>,
        upload_base: impl Into<String>,
    ) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self.upload_base = upload_base.into().trim_end_matches('/').to_string();
        self
    }

    /// `{api}/spaces/{space}/environments/master{tail}`.
    fn environment_url(&self, creds: &RemoteCredentials, tail: &str) -> String {
        format!(
            "{}/spaces/{}/environments/{ENVIRONMENT}{tail}",
            self.api_base,
            segment(&creds.space_id)
        )
    }

    /// Sends a request and returns the body of a 2xx response.
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<(u16, Vec<u8>), ClientError> {
        let req = req.timeout(self.request_timeout).build()?;
        debug!(method = %req.method(), path = %req.url().path(), "contentful request");

        let resp = self.http.execute(req).await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok((status.as_u16(), resp.bytes().await?.to_vec()))
    }
}

impl ManagementApi for Client {
    fn upload_binary<'a>(
        &'a self,
        creds: &'a RemoteCredentials,
        data: &'a [u8],
    ) -> ApiFuture<'a, UploadTicket> {
        Box::pin(async move {
            let url = format!("{}/spaces/{}/uploads", self.upload_base, segment(&creds.space_id));
            let req = self
                .http
                .post(url)
                .headers(auth_headers(creds, OCTET_STREAM)?)
                .body(data.to_vec());
            let (status, body) = self.send(req).await?;
            let resp: UploadResponse = decode(status, &body)?;
            Ok(resp.into())
        })
    }

    fn create_asset<'a>(
        &'a self,
        creds: &'a RemoteCredentials,
        asset: &'a NewAsset,
    ) -> ApiFuture<'a, AssetRecord> {
        Box::pin(async move {
            let payload = serde_json::to_vec(asset)?;
            let req = self
                .http
                .post(self.environment_url(creds, "/assets"))
                .headers(auth_headers(creds, MANAGEMENT_JSON)?)
                .body(payload);
            let (status, body) = self.send(req).await?;
            let resp: AssetResponse = decode(status, &body)?;
            AssetRecord::try_from(resp).map_err(|message| ClientError::Protocol { status, message })
        })
    }

    fn request_processing<'a>(
        &'a self,
        creds: &'a RemoteCredentials,
        asset_id: &'a str,
        version: u64,
    ) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            let tail = format!("/assets/{}/files/{DEFAULT_LOCALE}/process", segment(asset_id));
            let req = self
                .http
                .put(self.environment_url(creds, &tail))
                .headers(auth_headers(creds, MANAGEMENT_JSON)?)
                .header(VERSION_HEADER, version.to_string());
            self.send(req).await?;
            Ok(())
        })
    }

    fn fetch_asset<'a>(
        &'a self,
        creds: &'a RemoteCredentials,
        asset_id: &'a str,
    ) -> ApiFuture<'a, AssetRecord> {
        Box::pin(async move {
            let tail = format!("/assets/{}", segment(asset_id));
            let req = self
                .http
                .get(self.environment_url(creds, &tail))
                .headers(auth_headers(creds, MANAGEMENT_JSON)?);
            let (status, body) = self.send(req).await?;
            let resp: AssetResponse = decode(status, &body)?;
            AssetRecord::try_from(resp).map_err(|message| ClientError::Protocol { status, message })
        })
    }

    fn publish<'a>(
        &'a self,
        creds: &'a RemoteCredentials,
        kind: ResourceKind,
        id: &'a str,
        version: u64,
    ) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            let tail = format!("/{}/{}/published", kind.collection(), segment(id));
            let req = self
                .http
                .put(self.environment_url(creds, &tail))
                .headers(auth_headers(creds, MANAGEMENT_JSON)?)
                .header(VERSION_HEADER, version.to_string());
            self.send(req).await?;
            Ok(())
        })
    }

    fn create_entry<'a>(
        &'a self,
        creds: &'a RemoteCredentials,
        entry: &'a NewEntry,
    ) -> ApiFuture<'a, EntryRecord> {
        Box::pin(async move {
            let payload = serde_json::to_vec(entry)?;
            let model = HeaderValue::from_str(&creds.model_id)
                .map_err(|_| ClientError::InvalidHeader("content model ID"))?;
            let req = self
                .http
                .post(self.environment_url(creds, "/entries"))
                .headers(auth_headers(creds, MANAGEMENT_JSON)?)
                .header(CONTENT_MODEL_HEADER, model)
                .body(payload);
            let (status, body) = self.send(req).await?;
            let resp: EntryResponse = decode(status, &body)?;
            EntryRecord::try_from(resp).map_err(|message| ClientError::Protocol { status, message })
        })
    }
}

/// Authorization plus content type headers.
fn auth_headers(
    creds: &RemoteCredentials,
    content_type: &'static str,
) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::new();
    let mut bearer = HeaderValue::from_str(&format!("Bearer {}", creds.token))
        .map_err(|_| ClientError::InvalidHeader("management token"))?;
    bearer.set_sensitive(true);
    headers.insert(AUTHORIZATION, bearer);
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    Ok(headers)
}

/// Parses a 2xx body; a shape mismatch is a protocol error, not a panic.
fn decode<T: DeserializeOwned>(status: u16, body: &[u8]) -> Result<T, ClientError> {
    serde_json::from_slice(body).map_err(|e| ClientError::Protocol {
        status,
        message: e.to_string(),
    })
}

fn segment(raw: &str) -> String {
    utf8_percent_encode(raw, SEGMENT).to_string()
}
