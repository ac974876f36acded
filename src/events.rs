//! Drag, drop, and paste adapters.
//!
//! Each handler maps one UI event onto tracker actions and tells the host
//! whether to suppress the platform's default handling. Only the first file
//! of a multi-file payload is attached per gesture.

use std::sync::atomic::Ordering;

use crate::attachment::LocalFile;
use crate::tracker::{UploadHandle, UploadTracker};

/// Files carried by a drop gesture.
#[derive(Clone, Debug, Default)]
pub struct DropEvent {
    pub files: Vec<LocalFile>,
}

/// Clipboard contents of a paste gesture.
#[derive(Clone, Debug, Default)]
pub struct PasteEvent {
    pub files: Vec<LocalFile>,
}

/// What the host should do with the event after the handler ran.
#[derive(Debug, Default)]
pub struct EventOutcome {
    pub prevent_default: bool,
    pub stop_propagation: bool,
    /// Set when the event started an upload.
    pub upload: Option<UploadHandle>,
}

impl EventOutcome {
    fn consumed() -> Self {
        Self { prevent_default: true, stop_propagation: true, upload: None }
    }
}

impl UploadTracker {
    #[must_use]
    pub fn is_drag_active(&self) -> bool {
        self.drag_active.load(Ordering::Acquire)
    }

    pub fn handle_drag_enter(&self) -> EventOutcome {
        self.drag_active.store(true, Ordering::Release);
        EventOutcome::consumed()
    }

    /// Keeps the drop target eligible; the drag flag is left as is.
    pub fn handle_drag_over(&self) -> EventOutcome {
        EventOutcome::consumed()
    }

    pub fn handle_drag_leave(&self) -> EventOutcome {
        self.drag_active.store(false, Ordering::Release);
        EventOutcome::consumed()
    }

    pub fn handle_drop(&self, event: DropEvent) -> EventOutcome {
        self.drag_active.store(false, Ordering::Release);
        let upload = event.files.into_iter().next().map(|file| self.start_local_upload(file));
        EventOutcome { upload, ..EventOutcome::consumed() }
    }

    /// Attaches a pasted file. Text-only pastes are left to the platform.
    pub fn handle_paste(&self, event: PasteEvent) -> EventOutcome {
        match event.files.into_iter().next() {
            Some(file) => EventOutcome {
                prevent_default: true,
                stop_propagation: false,
                upload: Some(self.start_local_upload(file)),
            },
            None => EventOutcome::default(),
        }
    }
}

#[cfg(test)]
#[path = "events_test.rs"]
mod tests;
