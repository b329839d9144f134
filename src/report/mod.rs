// Report module - Lifecycle reporting over pluggable output backends

pub mod capture;
pub mod console;
pub mod html;
pub mod lifecycle;
pub mod stack;
pub mod streaming;
pub mod summary;

use crate::error::ReportError;
use crate::state::{Context, RunSummary, TestCase, TestResult};
use std::sync::Arc;

pub use capture::{CaptureGuard, CaptureLayer, LogCapture};
pub use console::ConsoleBackend;
pub use html::HtmlBackend;
pub use lifecycle::LazyReporter;
pub use stack::ContextStack;
pub use streaming::StreamingJsonReporter;
pub use summary::render_report;

/// Styling understood by every backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpec {
    Red,
    Green,
    Cyan,
    Blue,
    Yellow,
    Bold,
    Dim,
}

impl ColorSpec {
    pub fn name(self) -> &'static str {
        match self {
            ColorSpec::Red => "red",
            ColorSpec::Green => "green",
            ColorSpec::Cyan => "cyan",
            ColorSpec::Blue => "blue",
            ColorSpec::Yellow => "yellow",
            ColorSpec::Bold => "bold",
            ColorSpec::Dim => "dim",
        }
    }
}

/// Output medium a [`LazyReporter`] renders through.
///
/// The first three methods are the primitives every backend must supply.
/// The remaining ones are pre-hooks: the reporter calls the backend's hook
/// with the same arguments right before running the shared policy for that
/// event, so a backend can add setup without replacing the policy.
pub trait Backend {
    /// Write a message, ending the line only when `newline` is set
    fn print(&mut self, message: &str, newline: bool);

    /// Render `text` with the given styling into a fragment `print` accepts
    fn color(&self, spec: ColorSpec, text: &str) -> String;

    /// Render a reference to a test; `inline` selects the compact form
    fn link_to_test(&self, test: &TestCase, inline: bool) -> String;

    fn suite_begin(&mut self) {}

    fn context_begin(&mut self, _context: &Context, _force: bool) {}

    fn context_end(&mut self, _context: &Context, _force: bool) {}

    fn test_begin(&mut self, _test: &TestCase, _force: bool) {}

    fn test_end(&mut self, _result: &TestResult) {}

    fn suite_end(&mut self, _summary: &RunSummary) {}
}

/// Receiver of run lifecycle events, in strict nesting order
pub trait Reporter {
    /// Called once before anything else
    fn on_suite_begin(&mut self);

    /// Called when a context is entered
    fn on_context_begin(&mut self, context: &Arc<Context>);

    /// Called when a context is exited
    fn on_context_end(&mut self, context: &Arc<Context>);

    /// Called when a test starts
    fn on_test_begin(&mut self, test: &TestCase);

    /// Called when a test finishes
    fn on_test_end(&mut self, result: &TestResult);

    /// Called when the entire suite finishes; fails when the run did
    fn on_suite_end(&mut self, summary: &RunSummary) -> Result<(), ReportError>;
}
