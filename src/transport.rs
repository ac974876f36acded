//! Upload transport: the collaborator that moves bytes to the server.
//!
//! DESIGN
//! ======
//! `UploadTransport` reports progress through a callback and finishes with a
//! single `Result`, which encodes the "exactly one of success or error"
//! contract in the type. Cancellation is dropping the future.
//!
//! `HttpTransport` posts a multipart form with a `file` field. The body is
//! streamed in fixed-size chunks and progress is reported as whole percent
//! of bytes handed to the connection, once per distinct value.

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::Url;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::attachment::LocalFile;
use crate::config::{UploadTimeouts, UploaderConfig};
use crate::error::UploadError;

/// Progress callback, called with a whole percentage.
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

/// Server record for a stored file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct UploadedFile {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

#[async_trait::async_trait]
pub trait UploadTransport: Send + Sync {
    async fn upload(&self, file: &LocalFile, on_progress: ProgressFn) -> Result<UploadedFile, UploadError>;
}

// =============================================================================
// HTTP TRANSPORT
// =============================================================================

pub struct HttpTransport {
    http: reqwest::Client,
    url: Url,
    token: Option<String>,
    chunk_bytes: usize,
}

impl HttpTransport {
    /// Build a transport posting to `url` with the timeouts, token, and chunk
    /// size from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(url: Url, config: &UploaderConfig) -> Result<Self, UploadError> {
        let http = build_client(config.timeouts)?;
        Ok(Self { http, url, token: config.token.clone(), chunk_bytes: config.chunk_bytes.max(1) })
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }
}

fn build_client(timeouts: UploadTimeouts) -> Result<reqwest::Client, UploadError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeouts.request_secs))
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .build()
        .map_err(|e| UploadError::HttpClientBuild(e.to_string()))
}

#[async_trait::async_trait]
impl UploadTransport for HttpTransport {
    async fn upload(&self, file: &LocalFile, on_progress: ProgressFn) -> Result<UploadedFile, UploadError> {
        let bytes = file.read().await?;
        let total = bytes.len() as u64;
        tracing::debug!(url = %self.url, file = file.name(), total, "upload started");

        let body = reqwest::Body::wrap_stream(progress_stream(bytes, self.chunk_bytes, on_progress));
        let part = Part::stream_with_length(body, total)
            .file_name(file.name().to_string())
            .mime_str(file.mime())?;
        let form = Form::new().part("file", part);

        let mut request = self.http.post(self.url.clone()).multipart(form);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), file = file.name(), "upload rejected");
            return Err(UploadError::Status { status: status.as_u16(), body: text });
        }

        parse_response(&text)
    }
}

// =============================================================================
// BODY STREAM
// =============================================================================

fn progress_stream(
    bytes: Bytes,
    chunk_bytes: usize,
    on_progress: ProgressFn,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static {
    let total = bytes.len();
    let chunks: Vec<Bytes> = (0..total)
        .step_by(chunk_bytes.max(1))
        .map(|start| bytes.slice(start..(start + chunk_bytes).min(total)))
        .collect();

    let mut sent = 0usize;
    let mut last_reported = None;
    futures::stream::iter(chunks).map(move |chunk| {
        sent += chunk.len();
        let current = percent(sent, total);
        if last_reported != Some(current) {
            last_reported = Some(current);
            on_progress(current);
        }
        Ok(chunk)
    })
}

fn percent(sent: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let value = (sent as u128 * 100) / total as u128;
    u8::try_from(value.min(100)).unwrap_or(100)
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_response(json: &str) -> Result<UploadedFile, UploadError> {
    let uploaded: UploadedFile = serde_json::from_str(json).map_err(|e| UploadError::Parse(e.to_string()))?;
    if uploaded.id.is_empty() {
        return Err(UploadError::Parse("empty file id".into()));
    }
    Ok(uploaded)
}

#[cfg(test)]
#[path = "transport_test.rs"]
mod tests;
