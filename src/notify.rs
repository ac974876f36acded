//! User-facing notifications.
//!
//! DESIGN
//! ======
//! The tracker never returns decode or upload failures to the caller of an
//! event handler. It hands a `Notice` to a `Notifier` and moves on. Sinks are
//! fire-and-forget: a UI that has gone away must not stall an upload.

use serde::Serialize;
use tokio::sync::mpsc;

/// Toast severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

/// A message to show the user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    #[serde(rename = "type")]
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn error(message: impl Into<String>) -> Self {
        Self { severity: Severity::Error, message: message.into() }
    }
}

/// Sink for user-visible notices.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

// =============================================================================
// MESSAGES
// =============================================================================

pub const DEFAULT_READ_ERROR: &str = "Image reading failed, please try again.";
pub const DEFAULT_UPLOAD_ERROR: &str = "Image upload failed, please upload again.";

/// Localized texts for the two failure notices.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadMessages {
    pub read_error: String,
    pub upload_error: String,
}

impl Default for UploadMessages {
    fn default() -> Self {
        Self { read_error: DEFAULT_READ_ERROR.into(), upload_error: DEFAULT_UPLOAD_ERROR.into() }
    }
}

// =============================================================================
// SINKS
// =============================================================================

/// Writes notices to the tracing subscriber. Used by the CLI.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        match notice.severity {
            Severity::Error => tracing::error!(message = %notice.message, "notice"),
            Severity::Warning => tracing::warn!(message = %notice.message, "notice"),
            Severity::Success | Severity::Info => tracing::info!(message = %notice.message, "notice"),
        }
    }
}

/// Forwards notices to a channel drained by a UI layer.
#[derive(Clone, Debug)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        if self.tx.send(notice).is_err() {
            tracing::debug!("notice dropped: receiver closed");
        }
    }
}

#[cfg(test)]
#[path = "notify_test.rs"]
mod tests;
