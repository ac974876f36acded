//! Preview decoding for local files.
//!
//! A preview is shown before the upload completes, so decoding happens first
//! and a file that cannot be previewed is never sent.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::attachment::LocalFile;
use crate::error::DecodeError;

/// Turns a local file into a displayable preview string.
#[async_trait::async_trait]
pub trait PreviewDecoder: Send + Sync {
    async fn decode(&self, file: &LocalFile) -> Result<String, DecodeError>;
}

/// Encodes the whole file as a `data:` URL.
#[derive(Clone, Copy, Debug, Default)]
pub struct DataUrlDecoder {
    /// Zero means unlimited.
    max_bytes: u64,
}

impl DataUrlDecoder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject files larger than `max_bytes` (zero disables the limit).
    #[must_use]
    pub fn with_limit(max_bytes: u64) -> Self {
        Self { max_bytes }
    }
}

#[async_trait::async_trait]
impl PreviewDecoder for DataUrlDecoder {
    async fn decode(&self, file: &LocalFile) -> Result<String, DecodeError> {
        let bytes = file
            .read()
            .await
            .map_err(|source| DecodeError::Read { name: file.name().to_string(), source })?;

        let size = bytes.len() as u64;
        if self.max_bytes > 0 && size > self.max_bytes {
            return Err(DecodeError::TooLarge { name: file.name().to_string(), size, limit: self.max_bytes });
        }

        Ok(data_url(file.mime(), &bytes))
    }
}

fn data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

#[cfg(test)]
#[path = "decode_test.rs"]
mod tests;
