//! Attachment records and the local file handles they wrap.
//!
//! DESIGN
//! ======
//! An `Attachment` is a plain value. The store replaces whole records rather
//! than mutating fields, so every helper here returns a new record.
//!
//! `Progress` keeps the `0..=100` range and the `-1` failure sentinel in one
//! small copy type, serialized as a bare number for UI consumers.

use std::fmt;
use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::Serialize;
use uuid::Uuid;

// =============================================================================
// IDENTIFIER
// =============================================================================

/// Locally generated identifier, distinct from any server-assigned id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct AttachmentId(Uuid);

impl AttachmentId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for AttachmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// PROGRESS
// =============================================================================

/// Upload completion in percent, or the failure sentinel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Progress(i8);

impl Progress {
    pub const ZERO: Self = Self(0);
    pub const COMPLETE: Self = Self(100);
    /// Terminal failure marker.
    pub const FAILED: Self = Self(-1);

    /// Progress reported while bytes are still moving. Never reaches 100:
    /// only a confirmed server id completes an upload.
    #[must_use]
    pub fn in_flight(percent: u8) -> Self {
        Self(i8::try_from(percent.min(99)).unwrap_or(99))
    }

    #[must_use]
    pub fn value(self) -> i8 {
        self.0
    }

    #[must_use]
    pub fn is_failed(self) -> bool {
        self == Self::FAILED
    }

    #[must_use]
    pub fn is_complete(self) -> bool {
        self == Self::COMPLETE
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_failed() { f.write_str("failed") } else { write!(f, "{}%", self.0) }
    }
}

// =============================================================================
// LOCAL FILE
// =============================================================================

/// A file picked, dropped, or pasted by the user.
///
/// Path-backed files are read lazily, so a handle can outlive the file and
/// fail at decode time the same way a browser `File` can.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LocalFile {
    name: String,
    mime: String,
    #[serde(skip)]
    source: FileSource,
}

#[derive(Clone, Debug, PartialEq)]
enum FileSource {
    Path(PathBuf),
    Memory(Bytes),
}

impl LocalFile {
    /// Handle to a file on disk. The MIME type is guessed from the extension.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        let mime = guess_mime(&path);
        Self { name, mime, source: FileSource::Path(path) }
    }

    /// In-memory file, e.g. clipboard image data.
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let name = name.into();
        let mime = guess_mime(Path::new(&name));
        Self { name, mime, source: FileSource::Memory(bytes.into()) }
    }

    /// Override the guessed MIME type.
    #[must_use]
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = mime.into();
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Read the full payload.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if a path-backed file cannot be read.
    pub async fn read(&self) -> std::io::Result<Bytes> {
        match &self.source {
            FileSource::Memory(bytes) => Ok(bytes.clone()),
            FileSource::Path(path) => tokio::fs::read(path).await.map(Bytes::from),
        }
    }
}

fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

// =============================================================================
// ATTACHMENT
// =============================================================================

/// One file being uploaded or already uploaded.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Attachment {
    pub id: AttachmentId,
    pub file: LocalFile,
    /// Data URL usable before the upload completes.
    pub preview: String,
    pub progress: Progress,
    /// Set only once the server confirmed the upload.
    pub server_id: Option<String>,
}

impl Attachment {
    /// Fresh record for a file whose preview was just decoded.
    #[must_use]
    pub fn new(file: LocalFile, preview: String) -> Self {
        Self { id: AttachmentId::new(), file, preview, progress: Progress::ZERO, server_id: None }
    }

    #[must_use]
    pub fn with_progress(&self, progress: Progress) -> Self {
        Self { progress, ..self.clone() }
    }

    #[must_use]
    pub fn uploaded(&self, server_id: impl Into<String>) -> Self {
        Self { progress: Progress::COMPLETE, server_id: Some(server_id.into()), ..self.clone() }
    }

    #[must_use]
    pub fn failed(&self) -> Self {
        self.with_progress(Progress::FAILED)
    }

    #[must_use]
    pub fn is_uploading(&self) -> bool {
        !self.is_failed() && !self.is_uploaded()
    }

    #[must_use]
    pub fn is_uploaded(&self) -> bool {
        self.progress.is_complete() && self.server_id.is_some()
    }

    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.progress.is_failed()
    }
}

#[cfg(test)]
#[path = "attachment_test.rs"]
mod tests;
