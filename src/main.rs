// Main entry point for nestreport

use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, warn};

use nestreport::cli::{Cli, Commands};
use nestreport::commands;
use nestreport::config::Config;
use nestreport::error::ReportError;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = Config::load();
    let level = config
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(nestreport::config::default_level);
    nestreport::logging::init(cli.verbose, &level);

    if config.is_some() {
        debug!("Loaded configuration file");
    }
    let config = config.unwrap_or_default();

    let outcome = if let Some(path) = &cli.init_config {
        commands::handle_init_config(path)
    } else if let Some(shell_type) = &cli.completion {
        commands::handle_completion(shell_type)
    } else {
        match &cli.command {
            Some(Commands::Replay(args)) => commands::handle_replay(args, &config),
            None => {
                warn!("No command given. Use 'nestreport --help' for usage.");
                return ExitCode::from(2);
            }
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        // Already reported in full by the reporter
        Err(err)
            if err
                .downcast_ref::<ReportError>()
                .is_some_and(ReportError::is_suite_failure) =>
        {
            ExitCode::FAILURE
        }
        Err(err) => {
            error!("{:#}", err);
            ExitCode::from(2)
        }
    }
}
