// Lifecycle events - the NDJSON wire format between a test engine and
// the reporters

use serde::{Deserialize, Serialize};

/// One line of an event stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// The run starts
    SuiteBegin,

    /// A context is entered; `id` pairs it with its `context_end`
    ContextBegin {
        id: u64,
        description: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        skip_reason: Option<String>,
    },

    /// A context is exited
    ContextEnd { id: u64 },

    /// A test starts inside the currently open contexts
    TestBegin { description: String },

    /// The test under way logged a message
    Log { message: String },

    /// A test finished
    TestEnd {
        description: String,
        status: EventStatus,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        #[serde(default)]
        duration_ms: u64,
    },

    /// The run is over
    SuiteEnd {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        duration_ms: Option<u64>,
    },
}

/// Outcome as spelled on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Ok,
    Failed,
    Skipped,
}
