use crate::error::ReportError;
use crate::state::{Context, Outcome, RunSummary, TestCase, TestResult};
use serde_json::json;
use std::io::{self, Write};
use std::sync::Arc;

use super::Reporter;

/// Emits every lifecycle event as one JSON object per line, in the format
/// `nestreport replay` reads back.
pub struct StreamingJsonReporter<W: Write = io::Stdout> {
    out: W,
    next_id: u64,
    open: Vec<(Arc<Context>, u64)>,
}

impl StreamingJsonReporter {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> StreamingJsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            next_id: 1,
            open: Vec::new(),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, mut event: serde_json::Value) {
        event["timestamp"] = json!(chrono::Utc::now().to_rfc3339());
        if let Ok(s) = serde_json::to_string(&event) {
            let _ = writeln!(self.out, "{}", s);
        }
        let _ = self.out.flush();
    }
}

impl<W: Write> Reporter for StreamingJsonReporter<W> {
    fn on_suite_begin(&mut self) {
        self.next_id = 1;
        self.open.clear();
        self.emit(json!({ "event": "suite_begin" }));
    }

    fn on_context_begin(&mut self, context: &Arc<Context>) {
        let id = self.next_id;
        self.next_id += 1;
        self.open.push((Arc::clone(context), id));

        let mut event = json!({
            "event": "context_begin",
            "id": id,
            "description": context.description,
        });
        if let Some(reason) = &context.skip_reason {
            event["skip_reason"] = json!(reason);
        }
        self.emit(event);
    }

    fn on_context_end(&mut self, context: &Arc<Context>) {
        let Some(position) = self
            .open
            .iter()
            .rposition(|(open, _)| Arc::ptr_eq(open, context))
        else {
            return;
        };
        let (_, id) = self.open.remove(position);
        self.emit(json!({ "event": "context_end", "id": id }));
    }

    fn on_test_begin(&mut self, test: &TestCase) {
        self.emit(json!({
            "event": "test_begin",
            "description": test.description,
        }));
    }

    fn on_test_end(&mut self, result: &TestResult) {
        let mut event = json!({
            "event": "test_end",
            "description": result.test.description,
            "duration_ms": result.duration_ms,
        });

        match &result.outcome {
            Outcome::Ok => event["status"] = json!("ok"),
            Outcome::Failed { error } => {
                event["status"] = json!("failed");
                event["error"] = json!(error);
            }
            Outcome::Skipped { reason } => {
                event["status"] = json!("skipped");
                if let Some(reason) = reason {
                    event["reason"] = json!(reason);
                }
            }
        }

        self.emit(event);
    }

    fn on_suite_end(&mut self, summary: &RunSummary) -> Result<(), ReportError> {
        self.emit(json!({
            "event": "suite_end",
            "duration_ms": summary.duration().as_millis() as u64,
            "summary": summary,
        }));

        if summary.is_ok() {
            Ok(())
        } else {
            Err(ReportError::SuiteFailed)
        }
    }
}
