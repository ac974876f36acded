//! Upload tracker: owns the attachment collection and drives uploads.
//!
//! DESIGN
//! ======
//! Each `start_local_upload` spawns one task running the whole lifecycle:
//! decode preview → register record → upload → success or failure. The task
//! talks to the store only through read-modify-write operations, so uploads
//! running side by side never clobber each other.
//!
//! CANCELLATION
//! ============
//! Every in-flight upload owns a `CancellationToken`. `remove` and `clear`
//! cancel it, which drops the transport future at its next await point and
//! aborts the transfer. Late progress or completion callbacks only ever
//! *replace* an existing record, so a record removed mid-upload stays removed.
//!
//! ERROR HANDLING
//! ==============
//! Nothing here returns an error to the event handler that started an
//! upload. A decode failure sends the read-error notice and leaves no record.
//! An upload failure sends the upload-error notice and leaves the record in
//! place with the failure sentinel so the user can remove it or try again.

use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::attachment::{Attachment, AttachmentId, LocalFile, Progress};
use crate::decode::{DataUrlDecoder, PreviewDecoder};
use crate::error::UploadError;
use crate::notify::{Notice, Notifier, UploadMessages};
use crate::store::{AttachmentStore, Snapshot};
use crate::transport::{ProgressFn, UploadTransport, UploadedFile};

// =============================================================================
// OUTCOME
// =============================================================================

/// How one local upload ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The server stored the file.
    Uploaded { id: AttachmentId, server_id: String },
    /// The transport failed; the record carries the failure sentinel.
    Failed { id: AttachmentId },
    /// The preview could not be decoded; nothing was registered or sent.
    Unreadable,
    /// The record was removed while the upload was in flight.
    Cancelled { id: AttachmentId },
    /// The upload task panicked or was aborted by the runtime.
    Aborted,
}

/// Handle to a spawned upload. Dropping it does not stop the upload.
#[derive(Debug)]
pub struct UploadHandle {
    inner: JoinHandle<UploadOutcome>,
}

impl UploadHandle {
    /// Wait for the upload lifecycle to finish.
    pub async fn finished(self) -> UploadOutcome {
        match self.inner.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "upload task did not complete");
                UploadOutcome::Aborted
            }
        }
    }
}

// =============================================================================
// TRACKER
// =============================================================================

/// Owns the attachment collection and the drag state. Clones share state.
#[derive(Clone)]
pub struct UploadTracker {
    store: AttachmentStore,
    transport: Arc<dyn UploadTransport>,
    decoder: Arc<dyn PreviewDecoder>,
    notifier: Arc<dyn Notifier>,
    messages: Arc<UploadMessages>,
    pub(crate) drag_active: Arc<AtomicBool>,
    in_flight: Arc<Mutex<HashMap<AttachmentId, CancellationToken>>>,
}

impl UploadTracker {
    /// Tracker with the data-URL decoder and default messages.
    pub fn new(store: AttachmentStore, transport: Arc<dyn UploadTransport>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            transport,
            decoder: Arc::new(DataUrlDecoder::new()),
            notifier,
            messages: Arc::new(UploadMessages::default()),
            drag_active: Arc::new(AtomicBool::new(false)),
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    #[must_use]
    pub fn with_decoder(mut self, decoder: Arc<dyn PreviewDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    #[must_use]
    pub fn with_messages(mut self, messages: UploadMessages) -> Self {
        self.messages = Arc::new(messages);
        self
    }

    #[must_use]
    pub fn store(&self) -> &AttachmentStore {
        &self.store
    }

    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.store.subscribe()
    }

    /// Number of uploads whose transfer has not finished.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.tokens().len()
    }

    // =========================================================================
    // COLLECTION OPERATIONS
    // =========================================================================

    pub fn add_or_update(&self, record: Attachment) {
        self.store.add_or_update(record);
    }

    /// Remove a record and cancel its upload, if any.
    pub fn remove(&self, id: AttachmentId) -> bool {
        if let Some(token) = self.tokens().remove(&id) {
            debug!(%id, "cancelling in-flight upload");
            token.cancel();
        }
        self.store.remove(id)
    }

    pub fn update_progress(&self, id: AttachmentId, progress: Progress) -> bool {
        self.store.update_progress(id, progress)
    }

    /// Remove every record and cancel every in-flight upload.
    pub fn clear(&self) {
        let cancelled: Vec<CancellationToken> = self.tokens().drain().map(|(_, token)| token).collect();
        if !cancelled.is_empty() {
            debug!(count = cancelled.len(), "cancelling in-flight uploads");
        }
        for token in cancelled {
            token.cancel();
        }
        self.store.clear();
    }

    // =========================================================================
    // LOCAL UPLOAD
    // =========================================================================

    /// Start the decode → upload lifecycle for `file` and return immediately.
    #[must_use = "the handle reports how the upload ended; drop it explicitly to detach"]
    pub fn start_local_upload(&self, file: LocalFile) -> UploadHandle {
        let tracker = self.clone();
        UploadHandle { inner: tokio::spawn(async move { tracker.run_local_upload(file).await }) }
    }

    async fn run_local_upload(self, file: LocalFile) -> UploadOutcome {
        let preview = match self.decoder.decode(&file).await {
            Ok(preview) => preview,
            Err(e) => {
                warn!(file = file.name(), error = %e, "preview decode failed");
                self.notifier.notify(Notice::error(&self.messages.read_error));
                return UploadOutcome::Unreadable;
            }
        };

        let record = Attachment::new(file, preview);
        let id = record.id;
        let token = CancellationToken::new();
        self.tokens().insert(id, token.clone());
        self.store.add_or_update(record.clone());

        // A clear() that ran between registration and insertion cancelled us
        // before the record existed; drop the record it could not see.
        if token.is_cancelled() {
            self.store.remove(id);
            return UploadOutcome::Cancelled { id };
        }

        debug!(%id, file = record.file.name(), "upload started");
        let on_progress = self.progress_fn(id, token.clone());
        let outcome = tokio::select! {
            biased;
            () = token.cancelled() => {
                debug!(%id, "upload cancelled");
                UploadOutcome::Cancelled { id }
            }
            result = self.transport.upload(&record.file, on_progress) => self.finish(&record, result, &token),
        };

        self.tokens().remove(&id);
        outcome
    }

    fn finish(
        &self,
        record: &Attachment,
        result: Result<UploadedFile, UploadError>,
        token: &CancellationToken,
    ) -> UploadOutcome {
        let id = record.id;
        if token.is_cancelled() {
            return UploadOutcome::Cancelled { id };
        }

        match result {
            Ok(uploaded) => {
                info!(%id, server_id = %uploaded.id, file = record.file.name(), "upload complete");
                self.store.replace_existing(record.uploaded(uploaded.id.clone()));
                UploadOutcome::Uploaded { id, server_id: uploaded.id }
            }
            Err(e) => {
                warn!(%id, file = record.file.name(), error = %e, retryable = e.retryable(), "upload failed");
                self.notifier.notify(Notice::error(&self.messages.upload_error));
                self.store.replace_existing(record.failed());
                UploadOutcome::Failed { id }
            }
        }
    }

    /// Progress callback for one upload: clamps to the in-flight range and
    /// drops events that would not move progress forward.
    fn progress_fn(&self, id: AttachmentId, token: CancellationToken) -> ProgressFn {
        let store = self.store.clone();
        Arc::new(move |percent| {
            if token.is_cancelled() {
                return;
            }
            let progress = Progress::in_flight(percent);
            store.modify(id, |current| {
                (current.is_uploading() && progress > current.progress).then(|| current.with_progress(progress))
            });
        })
    }

    fn tokens(&self) -> std::sync::MutexGuard<'_, HashMap<AttachmentId, CancellationToken>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "tracker_test.rs"]
mod tests;
