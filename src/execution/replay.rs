// Replay - drive a reporter from a recorded event stream

use std::collections::HashMap;
use std::io::BufRead;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::info;

use super::events::{EventStatus, LifecycleEvent};
use crate::error::ReportError;
use crate::logging::TEST_LOG_TARGET;
use crate::report::Reporter;
use crate::state::{Context, RunSummary, TestCase, TestResult};

/// Turns [`LifecycleEvent`]s into reporter calls.
///
/// Plays the part of the test engine: owns the contexts, tracks the open
/// path for full test descriptions and counts results for the summary.
pub struct Replayer<'r, R: Reporter + ?Sized> {
    reporter: &'r mut R,
    contexts: HashMap<u64, Arc<Context>>,
    open: Vec<Arc<Context>>,
    summary: RunSummary,
    started: Option<Instant>,
}

impl<'r, R: Reporter + ?Sized> Replayer<'r, R> {
    pub fn new(reporter: &'r mut R) -> Self {
        Self {
            reporter,
            contexts: HashMap::new(),
            open: Vec::new(),
            summary: RunSummary::new(),
            started: None,
        }
    }

    /// Results counted so far
    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Forward one event. Only `suite_end` of a failed run and
    /// `context_end` for an unknown id return errors.
    pub fn apply(&mut self, event: LifecycleEvent) -> Result<(), ReportError> {
        match event {
            LifecycleEvent::SuiteBegin => {
                self.started = Some(Instant::now());
                self.summary = RunSummary::new();
                self.reporter.on_suite_begin();
            }
            LifecycleEvent::ContextBegin {
                id,
                description,
                skip_reason,
            } => {
                let context = Arc::new(Context {
                    description,
                    skip_reason,
                });
                self.contexts.insert(id, Arc::clone(&context));
                self.open.push(Arc::clone(&context));
                self.reporter.on_context_begin(&context);
            }
            LifecycleEvent::ContextEnd { id } => {
                let context = self
                    .contexts
                    .remove(&id)
                    .ok_or(ReportError::UnknownContext(id))?;
                if let Some(position) = self.open.iter().rposition(|c| Arc::ptr_eq(c, &context)) {
                    self.open.truncate(position);
                }
                self.reporter.on_context_end(&context);
            }
            LifecycleEvent::TestBegin { description } => {
                let test = self.test_case(description);
                self.reporter.on_test_begin(&test);
            }
            // Captured by the reporter when capture is on, otherwise shown
            // by the process logger
            LifecycleEvent::Log { message } => {
                info!(target: TEST_LOG_TARGET, "{}", message);
            }
            LifecycleEvent::TestEnd {
                description,
                status,
                error,
                reason,
                duration_ms,
            } => {
                let test = self.test_case(description);
                let result = match status {
                    EventStatus::Ok => TestResult::pass(test, duration_ms),
                    EventStatus::Failed => TestResult::fail(
                        test,
                        error.unwrap_or_else(|| "test failed".to_string()),
                        duration_ms,
                    ),
                    EventStatus::Skipped => TestResult::skip(test, reason),
                };
                self.summary.add(&result);
                self.reporter.on_test_end(&result);
            }
            LifecycleEvent::SuiteEnd { duration_ms } => {
                let duration = match (duration_ms, self.started) {
                    (Some(ms), _) => Duration::from_millis(ms),
                    (None, Some(started)) => started.elapsed(),
                    (None, None) => Duration::ZERO,
                };
                self.summary.set_duration(duration);
                self.reporter.on_suite_end(&self.summary)?;
            }
        }

        Ok(())
    }

    fn test_case(&self, description: String) -> TestCase {
        TestCase {
            description,
            path: self.open.iter().map(|c| c.description.clone()).collect(),
        }
    }
}

/// Replay newline-delimited JSON events from a reader.
///
/// Blank lines are skipped. Returns the counted summary, or
/// [`ReportError::SuiteFailed`] when the stream ends a failed run.
pub fn replay_reader<R, B>(reader: B, reporter: &mut R) -> Result<RunSummary, ReportError>
where
    R: Reporter + ?Sized,
    B: BufRead,
{
    let mut replayer = Replayer::new(reporter);

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event = serde_json::from_str(&line).map_err(|source| ReportError::InvalidEvent {
            line: index + 1,
            source,
        })?;
        replayer.apply(event)?;
    }

    Ok(replayer.summary().clone())
}

/// Replay events held in a string
pub fn replay_str<R: Reporter + ?Sized>(
    events: &str,
    reporter: &mut R,
) -> Result<RunSummary, ReportError> {
    replay_reader(events.as_bytes(), reporter)
}
