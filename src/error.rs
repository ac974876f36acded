//! Error types for preview decoding, uploads, and configuration.
//!
//! DESIGN
//! ======
//! Decode and upload failures are scoped to a single attachment. The tracker
//! converts them into notifications instead of returning them to callers, so
//! these types mostly travel between the tracker and its collaborators.

// =============================================================================
// DECODE
// =============================================================================

/// A local file could not be turned into a preview.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The file bytes could not be read.
    #[error("failed to read {name}: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The file exceeds the configured preview limit.
    #[error("{name} is {size} bytes, preview limit is {limit}")]
    TooLarge { name: String, size: u64, limit: u64 },
}

// =============================================================================
// UPLOAD
// =============================================================================

/// The transport reported a failed upload.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The file bytes could not be read for sending.
    #[error("failed to read upload payload: {0}")]
    Read(#[from] std::io::Error),

    /// The HTTP request could not be sent or the body could not be read.
    #[error("upload request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("upload rejected: status {status}")]
    Status { status: u16, body: String },

    /// The server response did not carry a file identifier.
    #[error("upload response parse failed: {0}")]
    Parse(String),

    /// The attachment was removed while the upload was in flight.
    #[error("upload cancelled")]
    Cancelled,

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl UploadError {
    /// Whether re-selecting the same file has a reasonable chance to succeed.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Status { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// CONFIG
// =============================================================================

/// A configuration value could not be used.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("invalid upload URL: {0}")]
    InvalidUrl(String),
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
