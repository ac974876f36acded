//! Uploader configuration parsed from environment variables.

use reqwest::Url;

use crate::error::ConfigError;

pub const DEFAULT_API_PREFIX: &str = "http://localhost:5001/console/api";
pub const DEFAULT_PUBLIC_API_PREFIX: &str = "http://localhost:5001/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_CHUNK_BYTES: usize = 64 * 1024;
/// Zero disables the preview size limit.
pub const DEFAULT_MAX_PREVIEW_BYTES: u64 = 0;

const UPLOAD_PATH: &str = "/files/upload";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploaderConfig {
    /// Console API prefix used for authenticated uploads.
    pub api_prefix: String,
    /// Prefix used when uploading through the public (end-user) API.
    pub public_api_prefix: String,
    pub public_api: bool,
    /// Explicit endpoint; overrides both prefixes.
    pub url: Option<String>,
    pub token: Option<String>,
    pub timeouts: UploadTimeouts,
    /// Size of body chunks; one progress event per chunk at most.
    pub chunk_bytes: usize,
    pub max_preview_bytes: u64,
}

impl Default for UploaderConfig {
    fn default() -> Self {
        Self {
            api_prefix: DEFAULT_API_PREFIX.into(),
            public_api_prefix: DEFAULT_PUBLIC_API_PREFIX.into(),
            public_api: false,
            url: None,
            token: None,
            timeouts: UploadTimeouts {
                request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
                connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            },
            chunk_bytes: DEFAULT_CHUNK_BYTES,
            max_preview_bytes: DEFAULT_MAX_PREVIEW_BYTES,
        }
    }
}

impl UploaderConfig {
    /// Build typed config from environment variables.
    ///
    /// Optional:
    /// - `UPLOAD_API_PREFIX`: default `http://localhost:5001/console/api`
    /// - `UPLOAD_PUBLIC_API_PREFIX`: default `http://localhost:5001/api`
    /// - `UPLOAD_PUBLIC_API`: `true` or `false` (default)
    /// - `UPLOAD_URL`: explicit endpoint
    /// - `UPLOAD_TOKEN`: bearer token
    /// - `UPLOAD_REQUEST_TIMEOUT_SECS`: default 120
    /// - `UPLOAD_CONNECT_TIMEOUT_SECS`: default 10
    /// - `UPLOAD_CHUNK_BYTES`: default 65536
    /// - `UPLOAD_MAX_PREVIEW_BYTES`: default 0 (unlimited)
    ///
    /// # Errors
    ///
    /// Returns an error if `UPLOAD_CHUNK_BYTES` is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = Self {
            api_prefix: env_string("UPLOAD_API_PREFIX").unwrap_or_else(|| DEFAULT_API_PREFIX.into()),
            public_api_prefix: env_string("UPLOAD_PUBLIC_API_PREFIX")
                .unwrap_or_else(|| DEFAULT_PUBLIC_API_PREFIX.into()),
            public_api: env_parse("UPLOAD_PUBLIC_API", false),
            url: env_string("UPLOAD_URL"),
            token: env_string("UPLOAD_TOKEN"),
            timeouts: UploadTimeouts {
                request_secs: env_parse("UPLOAD_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
                connect_secs: env_parse("UPLOAD_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
            },
            chunk_bytes: env_parse("UPLOAD_CHUNK_BYTES", DEFAULT_CHUNK_BYTES),
            max_preview_bytes: env_parse("UPLOAD_MAX_PREVIEW_BYTES", DEFAULT_MAX_PREVIEW_BYTES),
        };
        if config.chunk_bytes == 0 {
            return Err(ConfigError::Invalid { key: "UPLOAD_CHUNK_BYTES", value: "0".into() });
        }
        Ok(config)
    }

    /// Resolve the upload endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured URL or prefix does not parse.
    pub fn upload_url(&self) -> Result<Url, ConfigError> {
        let raw = match &self.url {
            Some(url) => url.clone(),
            None => {
                let prefix = if self.public_api { &self.public_api_prefix } else { &self.api_prefix };
                format!("{}{UPLOAD_PATH}", prefix.trim_end_matches('/'))
            }
        };
        Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(format!("{raw}: {e}")))
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
