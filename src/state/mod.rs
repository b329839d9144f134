// State module - Test run data model
// Contexts, test cases, per-test results and the aggregate run summary

pub mod context;
pub mod result;

pub use context::Context;
pub use result::{Outcome, TestCase, TestResult};

use serde::Serialize;
use std::time::Duration;

/// Aggregate counts for a finished run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    total: usize,
    succeeded: usize,
    failed: usize,
    skipped: usize,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    duration: Duration,
}

impl RunSummary {
    /// Create an empty summary
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a summary from finished results
    pub fn from_results<'a>(
        results: impl IntoIterator<Item = &'a TestResult>,
        duration: Duration,
    ) -> Self {
        let mut summary = Self::new();
        for result in results {
            summary.add(result);
        }
        summary.duration = duration;
        summary
    }

    /// Count a test result
    pub fn add(&mut self, result: &TestResult) {
        self.total += 1;

        match result.outcome {
            Outcome::Ok => self.succeeded += 1,
            Outcome::Failed { .. } => self.failed += 1,
            Outcome::Skipped { .. } => self.skipped += 1,
        }
    }

    /// Set the elapsed run time
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn skipped(&self) -> usize {
        self.skipped
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// A run is ok when nothing failed; skips do not count against it
    pub fn is_ok(&self) -> bool {
        self.failed == 0
    }
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts_each_outcome() {
        let results = vec![
            TestResult::pass(TestCase::new("a"), 1),
            TestResult::fail(TestCase::new("b"), "boom", 2),
            TestResult::skip(TestCase::new("c"), Some("slow".to_string())),
            TestResult::pass(TestCase::new("d"), 3),
        ];

        let summary = RunSummary::from_results(&results, Duration::from_millis(1500));
        assert_eq!(summary.total(), 4);
        assert_eq!(summary.succeeded(), 2);
        assert_eq!(summary.failed(), 1);
        assert_eq!(summary.skipped(), 1);
        assert_eq!(summary.duration(), Duration::from_millis(1500));
        assert!(!summary.is_ok());
    }

    #[test]
    fn test_summary_skips_only_is_ok() {
        let mut summary = RunSummary::new();
        summary.add(&TestResult::skip(TestCase::new("x"), None));
        assert!(summary.is_ok());
        assert_eq!(summary.total(), 1);
    }

    #[test]
    fn test_summary_serializes_duration_as_millis() {
        let mut summary = RunSummary::new();
        summary.set_duration(Duration::from_millis(250));
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["duration_ms"], 250);
        assert_eq!(json["total"], 0);
    }
}
