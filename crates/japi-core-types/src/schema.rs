//! Field keys and event names shared by every emitter and by log assertions
//!
//! `tracing` macros need field names as identifiers, so emitters spell them
//! out; these constants are what readers of the events (test capture, log
//! queries) match on.

// Fields present on every operation event
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";

// Subject of an event
pub const FIELD_PROJECT: &str = "project";
pub const FIELD_KEY: &str = "key";

pub const FIELD_ERR_CODE: &str = "err_code";

// Operation lifecycle
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

// Snapshot history
pub const EVENT_FIRST_CREATED: &str = "first_created";
pub const EVENT_MODIFIED: &str = "modified";
pub const EVENT_CORRUPT_ENTRY: &str = "corrupt_entry";

// Project manifest
pub const EVENT_MANIFEST_CREATED: &str = "manifest_created";
pub const EVENT_MANIFEST_REPLACED: &str = "manifest_replaced";
