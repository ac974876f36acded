//! Attachment collection with snapshot replacement.
//!
//! DESIGN
//! ======
//! The collection lives inside a `tokio::sync::watch` channel as an
//! `Arc<[Attachment]>`. Every mutation runs as a read-modify-write closure
//! under the channel's lock: it reads the current snapshot, builds the next
//! collection from it, and publishes the result in one step. Readers clone the
//! `Arc` and never observe a half-applied change; concurrent writers cannot
//! lose each other's updates.
//!
//! Mutations that would not change anything publish nothing, so subscribers
//! only wake for real changes.

use std::sync::Arc;

use tokio::sync::watch;

use crate::attachment::{Attachment, AttachmentId, Progress};

/// Immutable view of the collection at one point in time.
pub type Snapshot = Arc<[Attachment]>;

/// Single source of truth for attachments. Clones share the same collection.
#[derive(Clone)]
pub struct AttachmentStore {
    tx: Arc<watch::Sender<Snapshot>>,
}

impl AttachmentStore {
    #[must_use]
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(Snapshot::from(Vec::new()));
        Self { tx: Arc::new(tx) }
    }

    // =========================================================================
    // READS
    // =========================================================================

    /// Current collection, in addition order.
    #[must_use]
    pub fn snapshot(&self) -> Snapshot {
        self.tx.borrow().clone()
    }

    #[must_use]
    pub fn get(&self, id: AttachmentId) -> Option<Attachment> {
        self.tx.borrow().iter().find(|a| a.id == id).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tx.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tx.borrow().is_empty()
    }

    /// Receiver that observes every published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.tx.subscribe()
    }

    // =========================================================================
    // WRITES
    // =========================================================================

    /// Replace the whole collection.
    pub fn set(&self, records: Vec<Attachment>) {
        self.tx.send_replace(Snapshot::from(records));
    }

    /// Insert `record`, or replace the record with the same id in place.
    pub fn add_or_update(&self, record: Attachment) {
        self.apply(move |files| {
            let index = files.iter().position(|a| a.id == record.id);
            if index.is_some_and(|i| files[i] == record) {
                return None;
            }
            let mut next = files.to_vec();
            match index {
                Some(i) => next[i] = record,
                None => next.push(record),
            }
            Some(next)
        });
    }

    /// Replace the record with the same id. Never inserts.
    ///
    /// Returns `false` when no record with that id exists.
    pub fn replace_existing(&self, record: Attachment) -> bool {
        let id = record.id;
        self.modify(id, move |_| Some(record))
    }

    /// Rewrite the record with `id` from its current value.
    ///
    /// `f` returns `None` to leave the record unchanged. Returns whether a new
    /// snapshot was published.
    pub fn modify<F>(&self, id: AttachmentId, f: F) -> bool
    where
        F: FnOnce(&Attachment) -> Option<Attachment>,
    {
        self.apply(move |files| {
            let index = files.iter().position(|a| a.id == id)?;
            let updated = f(&files[index])?;
            if updated == files[index] {
                return None;
            }
            let mut next = files.to_vec();
            next[index] = Attachment { id, ..updated };
            Some(next)
        })
    }

    /// Delete the record with `id`. Returns `false` if it was not present.
    pub fn remove(&self, id: AttachmentId) -> bool {
        self.apply(|files| {
            if !files.iter().any(|a| a.id == id) {
                return None;
            }
            Some(files.iter().filter(|a| a.id != id).cloned().collect())
        })
    }

    /// Set progress on the record with `id`, if present.
    pub fn update_progress(&self, id: AttachmentId, progress: Progress) -> bool {
        self.modify(id, |current| Some(current.with_progress(progress)))
    }

    /// Empty the collection.
    pub fn clear(&self) {
        self.apply(|files| if files.is_empty() { None } else { Some(Vec::new()) });
    }

    fn apply<F>(&self, f: F) -> bool
    where
        F: FnOnce(&[Attachment]) -> Option<Vec<Attachment>>,
    {
        self.tx.send_if_modified(|current| match f(&**current) {
            Some(next) => {
                *current = Snapshot::from(next);
                true
            }
            None => false,
        })
    }
}

impl Default for AttachmentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
