pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod execution;
pub mod logging;
pub mod report;
pub mod state;

pub use error::ReportError;
pub use report::{Backend, ColorSpec, LazyReporter, Reporter};
pub use state::{Context, Outcome, RunSummary, TestCase, TestResult};
