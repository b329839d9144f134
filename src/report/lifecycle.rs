// Lifecycle reporter - the shared reporting policy
//
// Consumes suite/context/test events, decides what reaches the backend and
// when. In quiet mode passing work stays invisible and a failing test
// reveals its ancestry on demand, each header exactly once.

use std::sync::Arc;

use super::capture::{CaptureGuard, LogCapture};
use super::stack::ContextStack;
use super::summary::render_report;
use super::{Backend, ColorSpec, Reporter};
use crate::config::ReporterOptions;
use crate::error::ReportError;
use crate::state::{Context, Outcome, RunSummary, TestCase, TestResult};

const INDENT_UNIT: &str = "  ";
const RULE_WIDTH: usize = 80;

/// Reporting state machine driving a [`Backend`].
///
/// Every lifecycle method first calls the backend's pre-hook of the same
/// name with the same arguments, then applies the shared policy.
pub struct LazyReporter<B: Backend> {
    backend: B,
    quiet: bool,
    log_capture: bool,
    stack: ContextStack,
    capture: LogCapture,
    capture_guard: Option<CaptureGuard>,
    indent: usize,
    failures: Vec<TestResult>,
}

impl<B: Backend> LazyReporter<B> {
    pub fn new(backend: B, options: &ReporterOptions) -> Self {
        Self {
            backend,
            quiet: options.quiet(),
            log_capture: options.log_capture,
            stack: ContextStack::new(),
            capture: LogCapture::new(),
            capture_guard: None,
            indent: 0,
            failures: Vec::new(),
        }
    }

    /// Install the capture buffer as the ambient logger
    pub fn suite_begin(&mut self) {
        self.backend.suite_begin();

        if self.log_capture && self.capture_guard.is_none() {
            self.capture_guard = Some(self.capture.install());
        }
        self.failures.clear();
        self.indent = 0;
    }

    pub fn context_begin(&mut self, context: &Arc<Context>, force: bool) {
        self.backend.context_begin(context, force);

        if self.quiet && !force {
            self.stack.enter(context, false);
            return;
        }

        // A forced header in quiet mode must not appear above undisclosed
        // ancestors.
        self.reveal_pending();
        let depth = self.stack.disclosed_depth();
        self.stack.enter(context, true);
        self.print_context_header(context, depth);
        self.sync_indent();
    }

    pub fn context_end(&mut self, context: &Arc<Context>, force: bool) {
        self.backend.context_end(context, force);

        if self.stack.exit(context) {
            self.sync_indent();
        }
    }

    pub fn test_begin(&mut self, test: &TestCase, force: bool) {
        self.backend.test_begin(test, force);

        if !force {
            self.capture.drain(&mut self.backend);
        }
        if self.quiet && !force {
            return;
        }

        let line = format!("{}{} ... ", self.prefix(), test.description);
        self.backend.print(&line, false);
    }

    pub fn test_end(&mut self, result: &TestResult) {
        self.backend.test_end(result);

        if self.quiet && result.is_failed() {
            self.reveal_pending();
            self.test_begin(&result.test, true);
        }

        match &result.outcome {
            Outcome::Skipped { reason } => {
                if !self.quiet {
                    let text = match reason {
                        Some(reason) => format!("SKIP ({})", reason),
                        None => "SKIP".to_string(),
                    };
                    let marker = self.backend.color(ColorSpec::Cyan, &text);
                    self.backend.print(&marker, true);
                }
            }
            Outcome::Ok => {
                if !self.quiet {
                    let marker = self.backend.color(ColorSpec::Green, "OK");
                    self.backend.print(&marker, true);
                }
            }
            Outcome::Failed { error } => {
                self.failures.push(result.clone());
                self.print_failure(&result.test, error);
            }
        }

        self.capture.reset();
    }

    /// Print the run summary and hand back the ambient logger.
    ///
    /// Returns [`ReportError::SuiteFailed`] when the run was not ok; the
    /// logger is restored before that.
    pub fn suite_end(&mut self, summary: &RunSummary) -> Result<(), ReportError> {
        self.backend.suite_end(summary);

        self.capture.drain(&mut self.backend);
        self.capture_guard = None;
        self.indent = 0;

        self.backend.print("", true);
        let rule = self.backend.color(ColorSpec::Dim, &"─".repeat(RULE_WIDTH));
        self.backend.print(&rule, true);

        let ok = summary.is_ok();
        if !ok {
            let banner = self.backend.color(ColorSpec::Red, "Failed tests:");
            self.backend.print(&banner, true);
            for failure in &self.failures {
                let link = self.backend.link_to_test(&failure.test, false);
                self.backend.print(&format!("{}{}", INDENT_UNIT, link), true);
            }
        }

        let report = render_report(summary, &self.backend);
        self.backend.print(&report, true);

        if ok {
            return Ok(());
        }
        let marker = self.backend.color(ColorSpec::Red, "FAILED");
        self.backend.print(&marker, true);
        Err(ReportError::SuiteFailed)
    }

    /// Print headers for every context opened since the last disclosure
    fn reveal_pending(&mut self) {
        let pending = self.stack.pending_headers().to_vec();
        if pending.is_empty() {
            return;
        }

        let depth = self.stack.disclosed_depth();
        for (offset, context) in pending.iter().enumerate() {
            self.print_context_header(context, depth + offset);
        }
        self.stack.disclose_all();
        self.sync_indent();
    }

    fn print_context_header(&mut self, context: &Context, depth: usize) {
        let header = format!("{}- {}:", INDENT_UNIT.repeat(depth), context.description);
        self.backend.print(&header, false);

        let notice = match &context.skip_reason {
            Some(reason) => {
                let skip = self
                    .backend
                    .color(ColorSpec::Cyan, &format!("SKIP ({})", reason));
                format!(" {}", skip)
            }
            None => String::new(),
        };
        self.backend.print(&notice, true);
    }

    fn print_failure(&mut self, test: &TestCase, error: &str) {
        let marker = self.backend.color(ColorSpec::Red, "FAILED");
        let link = self.backend.link_to_test(test, true);
        self.backend.print(&format!("{} {}", marker, link), true);

        let prefix = self.prefix();
        for line in error.lines() {
            self.backend.print(&format!("{}| {}", prefix, line), true);
        }

        if !self.capture.is_empty() {
            let banner = self.backend.color(ColorSpec::Bold, "Captured logging:");
            self.backend.print(&format!("{}{}", prefix, banner), true);
            for line in self.capture.lines() {
                self.backend.print(&format!("{}{}", prefix, line), true);
            }
        }
    }

    /// Indent follows the number of open contexts whose header is shown
    fn sync_indent(&mut self) {
        self.indent = self.stack.disclosed_depth();
    }

    fn prefix(&self) -> String {
        INDENT_UNIT.repeat(self.indent)
    }

    pub fn indent(&self) -> usize {
        self.indent
    }

    pub fn is_quiet(&self) -> bool {
        self.quiet
    }

    /// Failed results in the order they were reported
    pub fn failures(&self) -> &[TestResult] {
        &self.failures
    }

    /// The capture buffer; lines appended here show up like captured logs
    pub fn capture(&self) -> &LogCapture {
        &self.capture
    }

    pub fn stack(&self) -> &ContextStack {
        &self.stack
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }
}

impl<B: Backend> Reporter for LazyReporter<B> {
    fn on_suite_begin(&mut self) {
        self.suite_begin();
    }

    fn on_context_begin(&mut self, context: &Arc<Context>) {
        self.context_begin(context, false);
    }

    fn on_context_end(&mut self, context: &Arc<Context>) {
        self.context_end(context, false);
    }

    fn on_test_begin(&mut self, test: &TestCase) {
        self.test_begin(test, false);
    }

    fn on_test_end(&mut self, result: &TestResult) {
        self.test_end(result);
    }

    fn on_suite_end(&mut self, summary: &RunSummary) -> Result<(), ReportError> {
        self.suite_end(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records whole lines; partial prints are joined until a newline
    #[derive(Default)]
    struct Transcript {
        lines: Vec<String>,
        partial: String,
    }

    impl Backend for Transcript {
        fn print(&mut self, message: &str, newline: bool) {
            self.partial.push_str(message);
            if newline {
                self.lines.push(std::mem::take(&mut self.partial));
            }
        }

        fn color(&self, _spec: ColorSpec, text: &str) -> String {
            text.to_string()
        }

        fn link_to_test(&self, test: &TestCase, inline: bool) -> String {
            if inline {
                format!("'{}'", test.full_description())
            } else {
                format!("run '{}'", test.full_description())
            }
        }
    }

    fn options(show_all: bool) -> ReporterOptions {
        ReporterOptions {
            show_all,
            ..ReporterOptions::default()
        }
    }

    #[test]
    fn test_verbose_prints_headers_as_entered() {
        let mut reporter = LazyReporter::new(Transcript::default(), &options(true));
        let outer = Context::new("outer");
        let inner = Context::new("inner");
        let test = TestCase::nested(["outer", "inner"], "works");

        reporter.suite_begin();
        reporter.context_begin(&outer, false);
        assert_eq!(reporter.indent(), 1);
        reporter.context_begin(&inner, false);
        assert_eq!(reporter.indent(), 2);
        reporter.test_begin(&test, false);
        reporter.test_end(&TestResult::pass(test.clone(), 1));
        reporter.context_end(&inner, false);
        assert_eq!(reporter.indent(), 1);
        reporter.context_end(&outer, false);
        assert_eq!(reporter.indent(), 0);

        let lines = &reporter.backend().lines;
        assert_eq!(lines[0], "- outer:");
        assert_eq!(lines[1], "  - inner:");
        assert_eq!(lines[2], "    works ... OK");
    }

    #[test]
    fn test_quiet_passing_group_prints_nothing() {
        let mut reporter = LazyReporter::new(Transcript::default(), &options(false));
        let group = Context::new("group");
        let test = TestCase::nested(["group"], "passes");

        reporter.suite_begin();
        reporter.context_begin(&group, false);
        reporter.test_begin(&test, false);
        reporter.test_end(&TestResult::pass(test.clone(), 1));
        reporter.test_begin(&test, false);
        reporter.test_end(&TestResult::skip(test.clone(), None));
        reporter.context_end(&group, false);

        assert!(reporter.backend().lines.is_empty());
        assert!(reporter.backend().partial.is_empty());
        assert_eq!(reporter.indent(), 0);
    }

    #[test]
    fn test_quiet_failure_reveals_ancestry_once() {
        let mut reporter = LazyReporter::new(Transcript::default(), &options(false));
        let a = Context::new("a");
        let b = Context::new("b");
        let c = Context::new("c");
        let first = TestCase::nested(["a", "b", "c"], "first");
        let second = TestCase::nested(["a", "b", "c"], "second");

        reporter.suite_begin();
        reporter.context_begin(&a, false);
        reporter.context_begin(&b, false);
        reporter.context_begin(&c, false);
        reporter.test_begin(&first, false);
        reporter.test_end(&TestResult::fail(first.clone(), "one", 1));
        reporter.test_begin(&second, false);
        reporter.test_end(&TestResult::fail(second.clone(), "two", 1));

        let lines = &reporter.backend().lines;
        assert_eq!(
            lines,
            &vec![
                "- a:".to_string(),
                "  - b:".to_string(),
                "    - c:".to_string(),
                "      first ... FAILED 'a b c first'".to_string(),
                "      | one".to_string(),
                "      second ... FAILED 'a b c second'".to_string(),
                "      | two".to_string(),
            ]
        );
        assert_eq!(reporter.failures().len(), 2);
    }

    #[test]
    fn test_quiet_failure_in_sibling_group_prints_only_new_branch() {
        let mut reporter = LazyReporter::new(Transcript::default(), &options(false));
        let root = Context::new("root");
        let left = Context::new("left");
        let right = Context::new("right");
        let t1 = TestCase::nested(["root", "left"], "t1");
        let t2 = TestCase::nested(["root", "right"], "t2");

        reporter.suite_begin();
        reporter.context_begin(&root, false);
        reporter.context_begin(&left, false);
        reporter.test_begin(&t1, false);
        reporter.test_end(&TestResult::fail(t1.clone(), "x", 1));
        reporter.context_end(&left, false);
        reporter.context_begin(&right, false);
        reporter.test_begin(&t2, false);
        reporter.test_end(&TestResult::fail(t2.clone(), "y", 1));

        let headers: Vec<&String> = reporter
            .backend()
            .lines
            .iter()
            .filter(|l| l.trim_start().starts_with("- "))
            .collect();
        assert_eq!(headers, vec!["- root:", "  - left:", "  - right:"]);
    }

    #[test]
    fn test_captured_logging_replayed_on_failure() {
        let mut reporter = LazyReporter::new(Transcript::default(), &options(true));
        let test = TestCase::new("noisy");

        reporter.suite_begin();
        reporter.test_begin(&test, false);
        reporter.capture().append("first line\nsecond line");
        reporter.test_end(&TestResult::fail(test.clone(), "bad\nworse", 1));

        let lines = &reporter.backend().lines;
        assert_eq!(lines[0], "noisy ... FAILED 'noisy'");
        assert_eq!(lines[1], "| bad");
        assert_eq!(lines[2], "| worse");
        assert_eq!(lines[3], "Captured logging:");
        assert_eq!(lines[4], "first line");
        assert_eq!(lines[5], "second line");
        assert!(reporter.capture().is_empty());
    }

    #[test]
    fn test_capture_dropped_for_passing_test() {
        let mut reporter = LazyReporter::new(Transcript::default(), &options(true));
        let test = TestCase::new("quiet one");

        reporter.suite_begin();
        reporter.test_begin(&test, false);
        reporter.capture().append("never shown");
        reporter.test_end(&TestResult::pass(test.clone(), 1));

        assert_eq!(reporter.backend().lines, vec!["quiet one ... OK"]);
        assert!(reporter.capture().is_empty());
    }

    #[test]
    fn test_logs_between_tests_are_drained() {
        let mut reporter = LazyReporter::new(Transcript::default(), &options(false));
        let test = TestCase::new("t");

        reporter.suite_begin();
        reporter.capture().append("setup output");
        reporter.test_begin(&test, false);

        assert_eq!(reporter.backend().lines, vec!["setup output"]);
    }

    #[test]
    fn test_skipped_context_notice() {
        let mut reporter = LazyReporter::new(Transcript::default(), &options(true));
        let slow = Context::skipped("network", "offline");

        reporter.suite_begin();
        reporter.context_begin(&slow, false);

        assert_eq!(reporter.backend().lines, vec!["- network: SKIP (offline)"]);
    }

    #[test]
    fn test_skip_reason_in_verbose() {
        let mut reporter = LazyReporter::new(Transcript::default(), &options(true));
        let test = TestCase::new("later");

        reporter.suite_begin();
        reporter.test_begin(&test, false);
        reporter.test_end(&TestResult::skip(test.clone(), Some("slow".to_string())));

        assert_eq!(reporter.backend().lines, vec!["later ... SKIP (slow)"]);
    }

    #[test]
    fn test_suite_end_lists_failures_and_signals() {
        let mut reporter = LazyReporter::new(Transcript::default(), &options(false));
        let test = TestCase::new("broken");
        let result = TestResult::fail(test.clone(), "boom", 1);

        reporter.suite_begin();
        reporter.test_begin(&test, false);
        reporter.test_end(&result);
        let summary = RunSummary::from_results([&result], std::time::Duration::from_millis(20));
        let err = reporter.suite_end(&summary).unwrap_err();

        assert!(err.is_suite_failure());
        let lines = &reporter.backend().lines;
        let banner = lines.iter().position(|l| l == "Failed tests:").unwrap();
        assert_eq!(lines[banner + 1], "  run 'broken'");
        assert_eq!(lines[banner + 2], "Ran 1 tests. 1 failed (in 0.02s)");
        assert_eq!(lines.last().unwrap(), "FAILED");
    }

    #[test]
    fn test_suite_end_ok_returns_normally() {
        let mut reporter = LazyReporter::new(Transcript::default(), &options(false));
        reporter.suite_begin();
        let summary = RunSummary::new();
        assert!(reporter.suite_end(&summary).is_ok());
        assert!(!reporter.backend().lines.iter().any(|l| l == "Failed tests:"));
    }

    #[test]
    fn test_forced_context_in_quiet_mode_reveals_parents_first() {
        let mut reporter = LazyReporter::new(Transcript::default(), &options(false));
        let parent = Context::new("parent");
        let child = Context::new("child");

        reporter.suite_begin();
        reporter.context_begin(&parent, false);
        reporter.context_begin(&child, true);

        assert_eq!(reporter.backend().lines, vec!["- parent:", "  - child:"]);
        assert_eq!(reporter.indent(), 2);

        reporter.context_end(&child, true);
        assert_eq!(reporter.indent(), 1);
        assert_eq!(reporter.stack().depth(), 1);

        // A later quiet sibling stays hidden under the printed parent
        let sibling = Context::new("sibling");
        reporter.context_begin(&sibling, false);
        assert_eq!(reporter.indent(), 1);
        reporter.context_end(&sibling, false);

        reporter.context_end(&parent, false);
        assert_eq!(reporter.indent(), 0);
        assert_eq!(reporter.stack().depth(), 0);
        assert_eq!(reporter.stack().disclosed_depth(), 0);
        assert_eq!(reporter.backend().lines, vec!["- parent:", "  - child:"]);
    }
}
