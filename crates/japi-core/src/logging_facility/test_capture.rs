//! In-memory event capture for log assertions in tests.
//!
//! One capture layer is installed as the global subscriber the first time
//! `init_test_capture` runs; every later call returns a handle to the same
//! buffer. Test binaries run tests in parallel, so assertions should narrow
//! the buffer to the key, project or op name the test itself used.

use japi_core_types::schema::{FIELD_COMPONENT, FIELD_EVENT, FIELD_OP};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, OnceLock};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// One recorded event; every field is kept in rendered form.
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub component: Option<String>,
    pub op: Option<String>,
    pub event: Option<String>,
    /// All fields, including `message` when the event has one.
    pub fields: HashMap<String, String>,
}

impl CapturedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

#[derive(Default)]
struct FieldMap(HashMap<String, String>);

// Numbers and bools fall through to `record_debug`, whose `{:?}` rendering
// matches their `Display`.
impl Visit for FieldMap {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{:?}", value));
    }
}

type Buffer = Arc<Mutex<Vec<CapturedEvent>>>;

struct CaptureLayer {
    buffer: Buffer,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = FieldMap::default();
        event.record(&mut visitor);
        let fields = visitor.0;

        let captured = CapturedEvent {
            level: *event.metadata().level(),
            component: fields.get(FIELD_COMPONENT).cloned(),
            op: fields.get(FIELD_OP).cloned(),
            event: fields.get(FIELD_EVENT).cloned(),
            fields,
        };

        if let Ok(mut events) = self.buffer.lock() {
            events.push(captured);
        }
    }
}

/// Handle on the shared capture buffer.
#[derive(Clone)]
pub struct TestCapture {
    buffer: Buffer,
}

impl TestCapture {
    /// Snapshot of everything captured so far.
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.buffer.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Events whose `field` equals `value`, in emission order.
    pub fn events_with(&self, field: &str, value: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.field(field) == Some(value))
            .collect()
    }

    /// The `event` names of `events_with(field, value)`, skipping events
    /// that have none.
    pub fn event_names_with(&self, field: &str, value: &str) -> Vec<String> {
        self.events_with(field, value)
            .into_iter()
            .filter_map(|e| e.event)
            .collect()
    }

    /// Events emitted for operation `op`.
    pub fn events_for_op(&self, op: &str) -> Vec<CapturedEvent> {
        self.events_with(FIELD_OP, op)
    }

    /// # Panics
    ///
    /// Panics unless some event has both the given `op` and `event`.
    pub fn assert_event_exists(&self, op: &str, event: &str) {
        let for_op = self.events_for_op(op);
        assert!(
            for_op.iter().any(|e| e.event.as_deref() == Some(event)),
            "no event={} among {} events for op={}",
            event,
            for_op.len(),
            op
        );
    }
}

static GLOBAL_CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Install the capture layer as the global subscriber (once) and return a
/// handle to its buffer.
///
/// Do not combine with `logging_facility::init` in the same process; only
/// one global subscriber can exist.
///
/// ```
/// use japi_core::logging_facility::init_test_capture;
/// use japi_core::log_op_start;
///
/// let capture = init_test_capture();
/// log_op_start!("doc_example_op");
/// capture.assert_event_exists("doc_example_op", "start");
/// ```
pub fn init_test_capture() -> TestCapture {
    GLOBAL_CAPTURE
        .get_or_init(|| {
            let buffer = Buffer::default();
            tracing_subscriber::registry()
                .with(CaptureLayer {
                    buffer: buffer.clone(),
                })
                .init();
            TestCapture { buffer }
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_and_bools_render_plainly() {
        let capture = init_test_capture();
        tracing::info!(op = "capture_render_test", count = 3u64, ok = true, delta = -2i64);

        let events = capture.events_for_op("capture_render_test");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].field("count"), Some("3"));
        assert_eq!(events[0].field("ok"), Some("true"));
        assert_eq!(events[0].field("delta"), Some("-2"));
    }

    #[test]
    fn test_events_with_filters_on_field() {
        let capture = init_test_capture();
        tracing::info!(key = "cap/p/f/a/v1", event = "first_created");
        tracing::info!(key = "cap/p/f/a/v2", event = "modified");

        assert_eq!(
            capture.event_names_with("key", "cap/p/f/a/v1"),
            vec!["first_created"]
        );
    }
}
