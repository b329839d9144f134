// Error types shared by the reporter, config and replay layers

use thiserror::Error;

/// Errors surfaced by the reporting library
#[derive(Debug, Error)]
pub enum ReportError {
    /// The suite finished with at least one failed test. Per-test details
    /// were already printed, so this carries nothing else.
    #[error("test run failed")]
    SuiteFailed,

    /// Unrecognized color preference
    #[error("invalid color preference '{0}' (expected auto, always or never)")]
    InvalidColor(String),

    /// A line of an event stream could not be decoded
    #[error("invalid event on line {line}: {source}")]
    InvalidEvent {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// `context_end` referenced an id that was never opened
    #[error("context {0} was never opened")]
    UnknownContext(u64),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ReportError {
    /// Whether this is the end-of-suite failure signal rather than a
    /// configuration or input problem
    pub fn is_suite_failure(&self) -> bool {
        matches!(self, ReportError::SuiteFailed)
    }
}

pub type Result<T, E = ReportError> = std::result::Result<T, E>;
