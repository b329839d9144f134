// Per-test log capture
//
// While a suite runs, the capture buffer stands in for the ambient logger:
// every `tracing` event on the reporting thread becomes one or more buffered
// lines, replayed only when a test fails.

use std::collections::VecDeque;
use std::fmt::{self, Write as _};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context as LayerContext, Layer, SubscriberExt};

use super::Backend;

/// Queue of captured log lines. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct LogCapture {
    lines: Arc<Mutex<VecDeque<String>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    fn buffer(&self) -> MutexGuard<'_, VecDeque<String>> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a message, one buffered line per line break
    pub fn append(&self, message: impl fmt::Display) {
        let message = message.to_string();
        let mut buffer = self.buffer();
        for line in message.split('\n') {
            buffer.push_back(line.strip_suffix('\r').unwrap_or(line).to_string());
        }
    }

    /// Append a log call: `first` as-is, every other argument in its
    /// `Debug` form, space-joined
    pub fn append_args(&self, first: &dyn fmt::Display, rest: &[&dyn fmt::Debug]) {
        let mut message = first.to_string();
        for arg in rest {
            let _ = write!(message, " {:?}", arg);
        }
        self.append(message);
    }

    /// Print every buffered line through the backend, oldest first, and
    /// empty the buffer
    pub fn drain<B: Backend + ?Sized>(&self, backend: &mut B) {
        let lines: Vec<String> = self.buffer().drain(..).collect();
        for line in &lines {
            backend.print(line, true);
        }
    }

    /// Drop everything buffered without printing it
    pub fn reset(&self) {
        self.buffer().clear();
    }

    /// Snapshot of the buffered lines
    pub fn lines(&self) -> Vec<String> {
        self.buffer().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.buffer().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer().is_empty()
    }

    /// Route `tracing` events on this thread into the buffer until the
    /// returned guard is dropped, at which point the previous default
    /// dispatcher is back in place.
    pub fn install(&self) -> CaptureGuard {
        let subscriber = tracing_subscriber::registry()
            .with(CaptureLayer::new(self.clone()).with_filter(LevelFilter::DEBUG));

        CaptureGuard {
            _default: tracing::subscriber::set_default(subscriber),
        }
    }
}

/// Keeps the capture installed as the ambient logger
#[must_use = "the previous logger is restored as soon as the guard is dropped"]
pub struct CaptureGuard {
    _default: DefaultGuard,
}

impl fmt::Debug for CaptureGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureGuard").finish_non_exhaustive()
    }
}

/// `tracing` layer appending each event to a [`LogCapture`]
#[derive(Debug, Clone)]
pub struct CaptureLayer {
    capture: LogCapture,
}

impl CaptureLayer {
    pub fn new(capture: LogCapture) -> Self {
        Self { capture }
    }
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: LayerContext<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        self.capture.append(visitor.finish());
    }
}

/// Renders an event as its message followed by ` key=value` pairs
#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn finish(self) -> String {
        if self.message.is_empty() {
            self.fields.trim_start().to_string()
        } else {
            self.message + &self.fields
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}
