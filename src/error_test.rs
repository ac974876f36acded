use super::*;

#[test]
fn status_5xx_and_429_are_retryable() {
    for status in [429, 500, 502, 503, 599] {
        let err = UploadError::Status { status, body: String::new() };
        assert!(err.retryable(), "status {status} should be retryable");
    }
}

#[test]
fn client_errors_are_not_retryable() {
    for status in [400, 401, 403, 413, 415] {
        let err = UploadError::Status { status, body: String::new() };
        assert!(!err.retryable(), "status {status} should not be retryable");
    }
}

#[test]
fn cancelled_and_parse_are_not_retryable() {
    assert!(!UploadError::Cancelled.retryable());
    assert!(!UploadError::Parse("missing id".into()).retryable());
}

#[test]
fn decode_error_messages_name_the_file() {
    let err = DecodeError::TooLarge { name: "cat.png".into(), size: 20, limit: 10 };
    assert_eq!(err.to_string(), "cat.png is 20 bytes, preview limit is 10");

    let err = DecodeError::Read {
        name: "dog.png".into(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
    };
    assert!(err.to_string().starts_with("failed to read dog.png"));
}
