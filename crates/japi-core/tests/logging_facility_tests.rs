// Logging facility tests
// Each test uses its own op name: the capture buffer is shared process-wide.

use japi_core::errors::{ExErrorKind, JapiError};
use japi_core::key::Depth;
use japi_core::logging_facility::init_test_capture;
use japi_core::{log_op_end, log_op_error, log_op_start};
use std::time::Instant;

#[test]
fn test_start_then_end() {
    let capture = init_test_capture();
    let op = "logging_start_end_op";

    let start = Instant::now();
    log_op_start!(op);
    log_op_end!(op, start);

    let names: Vec<_> = capture
        .events_for_op(op)
        .into_iter()
        .filter_map(|e| e.event)
        .collect();
    assert_eq!(names, vec!["start", "end"]);
}

#[test]
fn test_end_carries_duration_and_component() {
    let capture = init_test_capture();
    let op = "logging_duration_op";

    log_op_end!(op, Instant::now(), created = 2u64);

    let events = capture.events_for_op(op);
    assert_eq!(events.len(), 1);
    let end = &events[0];
    assert!(end.field("duration_ms").is_some());
    assert_eq!(end.field("created"), Some("2"));
    assert_eq!(
        end.component.as_deref(),
        Some(module_path!()),
        "component is the calling module"
    );
}

#[test]
fn test_error_carries_kind_code_and_message() {
    let capture = init_test_capture();
    let op = "logging_error_op";

    let err = JapiError::InvalidSegment {
        level: Depth::Package,
        segment: "a/b".to_string(),
        reason: "must not contain a path separator",
    };
    log_op_error!(op, err, Instant::now(), key = "p/a/b/f/a");

    let events = capture.events_for_op(op);
    assert_eq!(events.len(), 1);
    let ev = &events[0];
    assert_eq!(ev.level, tracing::Level::ERROR);
    assert_eq!(ev.event.as_deref(), Some("end_error"));
    assert_eq!(
        ev.field("err_kind"),
        Some(format!("{:?}", ExErrorKind::InvalidSegment).as_str())
    );
    assert_eq!(ev.field("err_code"), Some("ERR_INVALID_SEGMENT"));
    assert_eq!(ev.field("key"), Some("p/a/b/f/a"));
    assert!(ev
        .field("message")
        .is_some_and(|m| m.contains("package segment")));
}

#[test]
fn test_start_event_carries_extra_fields() {
    let capture = init_test_capture();
    let op = "logging_start_fields_op";

    log_op_start!(op, project = "proj-fields");

    let events = capture.events_with("project", "proj-fields");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].op.as_deref(), Some(op));
}
