use super::*;
use crate::test_helpers::*;
use crate::tracker::UploadOutcome;
use std::sync::Arc;

fn tracker() -> (UploadTracker, tokio::sync::mpsc::UnboundedReceiver<crate::notify::Notice>) {
    tracker_with(Arc::new(ScriptedTransport::succeeding("srv", vec![50])))
}

// =============================================================================
// drag state
// =============================================================================

#[tokio::test]
async fn drag_enter_over_leave_track_the_flag() {
    let (tracker, _notices) = tracker();
    assert!(!tracker.is_drag_active());

    let outcome = tracker.handle_drag_enter();
    assert!(outcome.prevent_default && outcome.stop_propagation);
    assert!(tracker.is_drag_active());

    let outcome = tracker.handle_drag_over();
    assert!(outcome.prevent_default && outcome.stop_propagation);
    assert!(tracker.is_drag_active(), "drag over preserves the flag");

    let outcome = tracker.handle_drag_leave();
    assert!(outcome.prevent_default && outcome.stop_propagation);
    assert!(!tracker.is_drag_active());
}

#[tokio::test]
async fn drag_over_without_enter_leaves_flag_clear() {
    let (tracker, _notices) = tracker();
    tracker.handle_drag_over();
    assert!(!tracker.is_drag_active());
}

#[tokio::test]
async fn clones_share_drag_state() {
    let (tracker, _notices) = tracker();
    let other = tracker.clone();
    other.handle_drag_enter();
    assert!(tracker.is_drag_active());
}

// =============================================================================
// drop
// =============================================================================

#[tokio::test]
async fn drop_without_files_changes_nothing() {
    let (tracker, mut notices) = tracker();
    tracker.handle_drag_enter();

    let outcome = tracker.handle_drop(DropEvent::default());

    assert!(outcome.prevent_default);
    assert!(outcome.upload.is_none());
    assert!(!tracker.is_drag_active());
    assert!(tracker.snapshot().is_empty());
    assert!(drain(&mut notices).is_empty());
}

#[tokio::test]
async fn drop_uploads_only_the_first_file() {
    let transport = Arc::new(ScriptedTransport::succeeding("srv", vec![]));
    let (tracker, _notices) = tracker_with(transport.clone());
    tracker.handle_drag_enter();

    let outcome = tracker.handle_drop(DropEvent { files: vec![image("first.png", 4), image("second.png", 4)] });

    assert!(outcome.prevent_default && outcome.stop_propagation);
    assert!(!tracker.is_drag_active());
    let result = outcome.upload.expect("drop with files starts an upload").finished().await;
    assert!(matches!(result, UploadOutcome::Uploaded { .. }));

    let snap = tracker.snapshot();
    assert_eq!(snap.len(), 1);
    assert_eq!(snap[0].file.name(), "first.png");
    assert_eq!(transport.calls(), 1);
}

// =============================================================================
// paste
// =============================================================================

#[tokio::test]
async fn paste_with_file_suppresses_default_and_uploads() {
    let (tracker, mut notices) = tracker();

    let clipboard = LocalFile::from_bytes("clipboard", vec![1, 2, 3]).with_mime("image/png");
    let outcome = tracker.handle_paste(PasteEvent { files: vec![clipboard] });

    assert!(outcome.prevent_default);
    let result = outcome.upload.expect("paste with file starts an upload").finished().await;
    let UploadOutcome::Uploaded { id, .. } = result else {
        panic!("expected upload to succeed, got {result:?}");
    };

    let record = tracker.store().get(id).unwrap();
    assert!(record.is_uploaded());
    assert!(record.preview.starts_with("data:image/png;base64,"));
    assert!(drain(&mut notices).is_empty());
}

#[tokio::test]
async fn paste_without_file_keeps_default_behavior() {
    let (tracker, _notices) = tracker();

    let outcome = tracker.handle_paste(PasteEvent::default());

    assert!(!outcome.prevent_default);
    assert!(outcome.upload.is_none());
    assert!(tracker.snapshot().is_empty());
}
