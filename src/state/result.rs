// Test case and result structures

use serde::Serialize;

/// A single test as seen by the reporter
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCase {
    pub description: String,
    /// Descriptions of the enclosing contexts, root first
    pub path: Vec<String>,
}

impl TestCase {
    /// Create a top-level test case
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            path: Vec::new(),
        }
    }

    /// Create a test case nested under the given contexts
    pub fn nested<I, S>(path: I, description: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            description: description.into(),
            path: path.into_iter().map(Into::into).collect(),
        }
    }

    /// Ancestor descriptions followed by the test's own
    pub fn full_description(&self) -> String {
        let mut parts: Vec<&str> = self.path.iter().map(String::as_str).collect();
        parts.push(&self.description);
        parts.join(" ")
    }
}

/// Outcome of an executed test
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Skipped { reason: Option<String> },
    Ok,
    Failed { error: String },
}

/// Test result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestResult {
    pub test: TestCase,
    #[serde(flatten)]
    pub outcome: Outcome,
    pub duration_ms: u64,
}

impl TestResult {
    /// Create a pass result
    pub fn pass(test: TestCase, duration_ms: u64) -> Self {
        Self {
            test,
            outcome: Outcome::Ok,
            duration_ms,
        }
    }

    /// Create a fail result
    pub fn fail(test: TestCase, error: impl Into<String>, duration_ms: u64) -> Self {
        Self {
            test,
            outcome: Outcome::Failed {
                error: error.into(),
            },
            duration_ms,
        }
    }

    /// Create a skip result
    pub fn skip(test: TestCase, reason: Option<String>) -> Self {
        Self {
            test,
            outcome: Outcome::Skipped { reason },
            duration_ms: 0,
        }
    }

    /// False only for failed tests
    pub fn is_ok(&self) -> bool {
        !self.is_failed()
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, Outcome::Failed { .. })
    }
}
