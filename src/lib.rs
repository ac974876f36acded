//! Client-side attachment tracking and upload orchestration.
//!
//! DESIGN
//! ======
//! `UploadTracker` owns an `AttachmentStore` and drives one task per local
//! upload. Collaborators sit behind traits: `PreviewDecoder` reads files into
//! previews, `UploadTransport` moves bytes, `Notifier` shows failures. The
//! `events` module adapts drag, drop, and paste gestures onto the tracker.

pub mod attachment;
pub mod config;
pub mod decode;
pub mod error;
pub mod events;
pub mod notify;
pub mod store;
pub mod tracker;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use attachment::{Attachment, AttachmentId, LocalFile, Progress};
pub use config::UploaderConfig;
pub use decode::{DataUrlDecoder, PreviewDecoder};
pub use error::{ConfigError, DecodeError, UploadError};
pub use events::{DropEvent, EventOutcome, PasteEvent};
pub use notify::{ChannelNotifier, Notice, Notifier, Severity, TracingNotifier, UploadMessages};
pub use store::{AttachmentStore, Snapshot};
pub use tracker::{UploadHandle, UploadOutcome, UploadTracker};
pub use transport::{HttpTransport, ProgressFn, UploadTransport, UploadedFile};
