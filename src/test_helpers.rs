//! Mocks and fixtures shared by the tracker and event tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{Notify, mpsc, watch};

use crate::attachment::LocalFile;
use crate::decode::PreviewDecoder;
use crate::error::{DecodeError, UploadError};
use crate::notify::{ChannelNotifier, Notice};
use crate::store::{AttachmentStore, Snapshot};
use crate::tracker::UploadTracker;
use crate::transport::{ProgressFn, UploadTransport, UploadedFile};

// =============================================================================
// ScriptedTransport
// =============================================================================

/// Emits a fixed list of progress percentages, optionally waits on a gate,
/// then returns a fixed result.
pub struct ScriptedTransport {
    pub progress: Vec<u8>,
    /// `Ok(server_id)` or `Err(http_status)`.
    pub result: Result<String, u16>,
    pub gate: Option<Arc<Notify>>,
    /// When set, the progress of the first record is sampled after each event.
    pub observer: Option<(AttachmentStore, std::sync::Mutex<Vec<i8>>)>,
    pub calls: AtomicUsize,
}

impl ScriptedTransport {
    pub fn succeeding(server_id: &str, progress: Vec<u8>) -> Self {
        Self { progress, result: Ok(server_id.into()), gate: None, observer: None, calls: AtomicUsize::new(0) }
    }

    pub fn failing(status: u16) -> Self {
        Self { progress: vec![10, 20], result: Err(status), gate: None, observer: None, calls: AtomicUsize::new(0) }
    }

    #[must_use]
    pub fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    #[must_use]
    pub fn observing(mut self, store: AttachmentStore) -> Self {
        self.observer = Some((store, std::sync::Mutex::new(Vec::new())));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn observed(&self) -> Vec<i8> {
        self.observer
            .as_ref()
            .map(|(_, seen)| seen.lock().unwrap().clone())
            .unwrap_or_default()
    }

    fn sample(&self) {
        if let Some((store, seen)) = &self.observer {
            if let Some(first) = store.snapshot().first() {
                seen.lock().unwrap().push(first.progress.value());
            }
        }
    }
}

#[async_trait::async_trait]
impl UploadTransport for ScriptedTransport {
    async fn upload(&self, _file: &LocalFile, on_progress: ProgressFn) -> Result<UploadedFile, UploadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.sample();
        for percent in &self.progress {
            on_progress(*percent);
            self.sample();
        }
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        match &self.result {
            Ok(id) => Ok(UploadedFile { id: id.clone(), name: None, size: None, mime_type: None }),
            Err(status) => Err(UploadError::Status { status: *status, body: String::new() }),
        }
    }
}

// =============================================================================
// FailingDecoder
// =============================================================================

pub struct FailingDecoder;

#[async_trait::async_trait]
impl PreviewDecoder for FailingDecoder {
    async fn decode(&self, file: &LocalFile) -> Result<String, DecodeError> {
        Err(DecodeError::Read {
            name: file.name().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, "corrupt"),
        })
    }
}

// =============================================================================
// FIXTURES
// =============================================================================

pub fn tracker_with(transport: Arc<ScriptedTransport>) -> (UploadTracker, mpsc::UnboundedReceiver<Notice>) {
    tracker_on(AttachmentStore::new(), transport)
}

pub fn tracker_on(
    store: AttachmentStore,
    transport: Arc<ScriptedTransport>,
) -> (UploadTracker, mpsc::UnboundedReceiver<Notice>) {
    let (notifier, notices) = ChannelNotifier::channel();
    let tracker = UploadTracker::new(store, transport, Arc::new(notifier));
    (tracker, notices)
}

pub fn image(name: &str, len: usize) -> LocalFile {
    LocalFile::from_bytes(name, vec![0x5A; len])
}

pub fn drain(notices: &mut mpsc::UnboundedReceiver<Notice>) -> Vec<Notice> {
    let mut out = Vec::new();
    while let Ok(notice) = notices.try_recv() {
        out.push(notice);
    }
    out
}

/// Wait until a published snapshot satisfies `pred`.
pub async fn wait_for(rx: &mut watch::Receiver<Snapshot>, pred: impl FnMut(&Snapshot) -> bool) -> Snapshot {
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(pred))
        .await
        .expect("timed out waiting for snapshot")
        .expect("store dropped")
        .clone()
}
