// End-of-run aggregate line

use super::{Backend, ColorSpec};
use crate::state::RunSummary;

/// Render `Ran N tests. <clauses> (in Xs)`.
///
/// Clauses appear in the fixed order failed, skipped, passed and only for
/// non-zero counts.
pub fn render_report<B: Backend + ?Sized>(summary: &RunSummary, backend: &B) -> String {
    let mut clauses = Vec::new();
    if summary.failed() > 0 {
        clauses.push(backend.color(ColorSpec::Red, &format!("{} failed", summary.failed())));
    }
    if summary.skipped() > 0 {
        clauses.push(backend.color(ColorSpec::Cyan, &format!("{} skipped", summary.skipped())));
    }
    if summary.succeeded() > 0 {
        clauses.push(backend.color(
            ColorSpec::Green,
            &format!("{} passed", summary.succeeded()),
        ));
    }

    let seconds = summary.duration().as_millis() as f64 / 1000.0;
    let mut parts = vec![format!("Ran {} tests.", summary.total())];
    if !clauses.is_empty() {
        parts.push(clauses.join(", "));
    }
    parts.push(format!("(in {}s)", seconds));
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{TestCase, TestResult};
    use std::time::Duration;

    struct Plain;

    impl Backend for Plain {
        fn print(&mut self, _message: &str, _newline: bool) {}

        fn color(&self, spec: ColorSpec, text: &str) -> String {
            format!("<{}>{}", spec.name(), text)
        }

        fn link_to_test(&self, test: &TestCase, _inline: bool) -> String {
            test.description.clone()
        }
    }

    fn summary(passed: usize, failed: usize, skipped: usize, millis: u64) -> RunSummary {
        let mut results = Vec::new();
        for i in 0..passed {
            results.push(TestResult::pass(TestCase::new(format!("p{i}")), 0));
        }
        for i in 0..failed {
            results.push(TestResult::fail(TestCase::new(format!("f{i}")), "x", 0));
        }
        for i in 0..skipped {
            results.push(TestResult::skip(TestCase::new(format!("s{i}")), None));
        }
        RunSummary::from_results(&results, Duration::from_millis(millis))
    }

    #[test]
    fn test_report_omits_zero_clauses() {
        let line = render_report(&summary(5, 2, 0, 1500), &Plain);
        assert_eq!(line, "Ran 7 tests. <red>2 failed, <green>5 passed (in 1.5s)");
    }

    #[test]
    fn test_report_clause_order_is_fixed() {
        let line = render_report(&summary(1, 1, 1, 2000), &Plain);
        assert_eq!(
            line,
            "Ran 3 tests. <red>1 failed, <cyan>1 skipped, <green>1 passed (in 2s)"
        );
    }

    #[test]
    fn test_report_only_skipped() {
        let line = render_report(&summary(0, 0, 4, 10), &Plain);
        assert_eq!(line, "Ran 4 tests. <cyan>4 skipped (in 0.01s)");
    }

    #[test]
    fn test_report_empty_run() {
        let line = render_report(&RunSummary::new(), &Plain);
        assert_eq!(line, "Ran 0 tests. (in 0s)");
    }
}
