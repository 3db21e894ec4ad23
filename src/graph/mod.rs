//! Graph state engine: value types, the document store with undo/redo, saved
//! sessions, tree layout, and the prompt-facing text snapshot.

pub mod document;
pub mod history;
pub mod layout;
pub mod session;
pub mod snapshot;
pub mod types;

pub use document::{GraphDocument, GraphEvent, GraphStoreState};
pub use types::*;

use chrono::{SecondsFormat, Utc};

/// Fresh time-ordered identifier for nodes, edges, and graphs.
pub(crate) fn new_id() -> String {
    uuid::Uuid::now_v7().to_string()
}

/// Current time as RFC 3339 with millisecond precision, e.g.
/// `2026-03-01T12:00:00.000Z`.
pub(crate) fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
