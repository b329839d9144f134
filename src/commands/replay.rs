// Replay command - render a recorded event stream

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::cli::{OutputFormat, ReplayArgs};
use crate::config::{ColorChoice, Config};
use crate::execution::replay_reader;
use crate::report::{ConsoleBackend, HtmlBackend, LazyReporter, StreamingJsonReporter};

pub fn handle_replay(args: &ReplayArgs, config: &Config) -> Result<()> {
    let mut options = args
        .reporter_options(config)
        .context("Invalid reporter configuration")?;

    // Auto-detection looks at the terminal, which a file is not
    if args.output.is_some() && options.color == ColorChoice::Auto {
        options.color = ColorChoice::Never;
    }
    debug!("Reporter options: {:?}", options);

    let input = open_input(args)?;
    let output = open_output(args.output.as_deref())?;
    info!(
        "Replaying {} as {:?}",
        if args.reads_stdin() {
            "stdin".to_string()
        } else {
            args.input.display().to_string()
        },
        args.format
    );

    // Flush before surfacing the run outcome
    match args.format {
        OutputFormat::Console => {
            let backend = ConsoleBackend::new(output, &options);
            let mut reporter = LazyReporter::new(backend, &options);
            let outcome = replay_reader(input, &mut reporter);
            finish_output(reporter.into_backend().into_inner(), "report")?;
            outcome?;
        }
        OutputFormat::Html => {
            let title = args
                .input
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .filter(|_| !args.reads_stdin())
                .unwrap_or_else(|| "Test run".to_string());
            let mut reporter = LazyReporter::new(HtmlBackend::new(title, &options), &options);
            let outcome = replay_reader(input, &mut reporter);

            // The page is written for failed runs too
            let page = reporter.into_backend().finish();
            let mut output = output;
            output
                .write_all(page.as_bytes())
                .context("Failed to write HTML report")?;
            finish_output(output, "HTML report")?;
            outcome?;
        }
        OutputFormat::Stream => {
            let mut reporter = StreamingJsonReporter::new(output);
            let outcome = replay_reader(input, &mut reporter);
            finish_output(reporter.into_inner(), "event stream")?;
            outcome?;
        }
    }

    Ok(())
}

fn finish_output(mut output: Box<dyn Write>, what: &str) -> Result<()> {
    output
        .flush()
        .with_context(|| format!("Failed to write {}", what))
}

fn open_input(args: &ReplayArgs) -> Result<Box<dyn BufRead>> {
    if args.reads_stdin() {
        return Ok(Box::new(io::stdin().lock()));
    }

    let file = File::open(&args.input)
        .with_context(|| format!("Failed to open event file: {}", args.input.display()))?;
    Ok(Box::new(BufReader::new(file)))
}

fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create report file: {}", path.display()))?;
            Ok(Box::new(io::BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout())),
    }
}
