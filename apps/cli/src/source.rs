//! Loading image bytes from a URL or a local file.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, bail};
use cfupload_cma_client::client::DEFAULT_CONNECT_TIMEOUT;
use cfupload_publish::{UploadRequest, detect_content_type, sniff_content_type};

/// HTTP client for image downloads; a stalled transfer fails after `timeout`.
pub fn download_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    let http = reqwest::Client::builder()
        .user_agent(concat!("cfupload/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
        .timeout(timeout)
        .build()?;
    Ok(http)
}

/// Image bytes plus the content type reported by their origin.
#[derive(Debug)]
pub struct ImageSource {
    pub data: Vec<u8>,
    /// `Content-Type` header or extension-derived type, if any.
    pub content_type: Option<String>,
}

impl ImageSource {
    /// Downloads an image; non-2xx responses are errors.
    pub async fn fetch_url(http: &reqwest::Client, url: &str) -> anyhow::Result<Self> {
        tracing::debug!(url, "fetching image");

        let resp = http
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch image from {url}"))?;

        let status = resp.status();
        if !status.is_success() {
            bail!("Failed to fetch image: HTTP {}", status.as_u16());
        }

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let data = resp
            .bytes()
            .await
            .context("Failed to fetch image: body read failed")?
            .to_vec();

        Ok(Self { data, content_type })
    }

    /// Reads an image from disk.
    pub async fn read_file(path: &Path) -> anyhow::Result<Self> {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Self {
            data,
            content_type: detect_content_type(path).map(str::to_string),
        })
    }

    /// Builds the upload request.
    ///
    /// Precedence: `explicit`, then the payload signature, then the
    /// origin's type when it names an image.
    pub fn into_request(self, name: &str, explicit: Option<&str>) -> UploadRequest {
        let sniffed = sniff_content_type(&self.data).is_some();
        let origin = self
            .content_type
            .filter(|ct| ct.trim().to_ascii_lowercase().starts_with("image/"));

        let request = UploadRequest::new(self.data, name);
        match (explicit, sniffed, origin) {
            (Some(ct), _, _) => request.with_content_type(ct),
            (None, false, Some(ct)) => request.with_content_type(ct),
            _ => request,
        }
    }
}
