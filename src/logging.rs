// Process logger setup
//
// Diagnostics of the tool itself go to stderr so they never mix with the
// report on stdout. While a suite runs with log capture, the reporter
// temporarily replaces this logger on the reporting thread.

use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

/// `<marker> LEVEL [HH:MM:SS]: message`
pub struct CustomFormatter;

impl<S, N> FormatEvent<S, N> for CustomFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let timestamp = Local::now().format("%H:%M:%S");
        let (marker, level) = level_marker(*event.metadata().level());

        write!(writer, "{} {} [{}]: ", marker, level, timestamp)?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn level_marker(level: Level) -> (&'static str, &'static str) {
    match level {
        Level::TRACE => ("🔬", "TRACE"),
        Level::DEBUG => ("🐛", "DEBUG"),
        Level::INFO => ("ℹ️ ", "INFO"),
        Level::WARN => ("⚠️ ", "WARN"),
        Level::ERROR => ("❌", "ERROR"),
    }
}

/// Target of log output produced by the tests themselves
pub const TEST_LOG_TARGET: &str = "nestreport::test_log";

/// Filter used when `RUST_LOG` is not set.
///
/// Test log output stays visible at info level unless the configured
/// filter names its target explicitly.
pub fn default_filter(verbose: bool, configured: &str) -> String {
    let base = if verbose {
        "nestreport=debug,warn"
    } else {
        configured
    };
    if base.contains(TEST_LOG_TARGET) {
        base.to_string()
    } else if base.trim().is_empty() {
        format!("{}=info", TEST_LOG_TARGET)
    } else {
        format!("{},{}=info", base, TEST_LOG_TARGET)
    }
}

/// Install the global stderr logger. Safe to call more than once; later
/// calls are ignored.
pub fn init(verbose: bool, configured: &str) {
    let filter = default_filter(verbose, configured);

    let _ = tracing_subscriber::fmt()
        .event_format(CustomFormatter)
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .try_init();
}
