use super::*;

#[test]
fn channel_notifier_forwards_in_order() {
    let (notifier, mut rx) = ChannelNotifier::channel();
    notifier.notify(Notice::error("first"));
    notifier.notify(Notice { severity: Severity::Info, message: "second".into() });

    assert_eq!(rx.try_recv().unwrap(), Notice::error("first"));
    let second = rx.try_recv().unwrap();
    assert_eq!(second.severity, Severity::Info);
    assert_eq!(second.message, "second");
    assert!(rx.try_recv().is_err());
}

#[test]
fn channel_notifier_survives_closed_receiver() {
    let (notifier, rx) = ChannelNotifier::channel();
    drop(rx);
    notifier.notify(Notice::error("nobody listening"));
}

#[test]
fn notice_serializes_like_a_toast() {
    let json = serde_json::to_value(Notice::error("boom")).unwrap();
    assert_eq!(json, serde_json::json!({ "type": "error", "message": "boom" }));
}

#[test]
fn default_messages_are_distinct() {
    let messages = UploadMessages::default();
    assert_eq!(messages.read_error, DEFAULT_READ_ERROR);
    assert_eq!(messages.upload_error, DEFAULT_UPLOAD_ERROR);
    assert_ne!(messages.read_error, messages.upload_error);
}
