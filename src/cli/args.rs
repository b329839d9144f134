// CLI argument definitions using Clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::{ColorChoice, Config, ReporterOptions};
use crate::error::ReportError;

/// Output format of the replay command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Terminal text
    Console,
    /// Standalone HTML page
    Html,
    /// Newline-delimited JSON events
    Stream,
}

/// Incremental reporter for hierarchical test runs
#[derive(Parser, Debug)]
#[command(name = "nestreport")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Render nested test runs with lazy context headers", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose debug output
    #[arg(short = 'v', long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Create default configuration file
    #[arg(long, value_name = "CONFIG_FILE")]
    pub init_config: Option<PathBuf>,

    /// Print shell completion script (bash, zsh, fish, elvish, powershell)
    #[arg(long, value_name = "SHELL_TYPE", value_parser = ["bash", "zsh", "fish", "elvish", "powershell"])]
    pub completion: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a recorded event stream
    Replay(ReplayArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    /// NDJSON event file, or "-" for stdin
    #[arg(default_value = "-")]
    pub input: PathBuf,

    /// Print every context and test, not only failures
    #[arg(short = 'a', long, default_value_t = false)]
    pub show_all: bool,

    /// Capture log events per test and show them for failures
    #[arg(long, default_value_t = false)]
    pub log_capture: bool,

    /// Do not capture log events
    #[arg(long, default_value_t = false, conflicts_with = "log_capture")]
    pub no_log_capture: bool,

    /// Colored output: auto, always or never
    #[arg(long, value_name = "WHEN")]
    pub color: Option<String>,

    /// Command used to rerun a single test in failure links
    #[arg(long, value_name = "PATH")]
    pub base: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Console)]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short = 'o', long, value_name = "OUTPUT_FILE")]
    pub output: Option<PathBuf>,
}

impl ReplayArgs {
    /// Merge flags over the configuration file; flags win
    pub fn reporter_options(&self, config: &Config) -> Result<ReporterOptions, ReportError> {
        let mut options = config.reporter_options()?;

        if self.show_all {
            options.show_all = true;
        }
        if self.log_capture {
            options.log_capture = true;
        }
        if self.no_log_capture {
            options.log_capture = false;
        }
        if let Some(color) = &self.color {
            options.color = color.parse::<ColorChoice>()?;
        }
        if let Some(base) = &self.base {
            options.base = Some(base.clone());
        }

        Ok(options)
    }

    pub fn reads_stdin(&self) -> bool {
        self.input.as_os_str() == "-"
    }
}
