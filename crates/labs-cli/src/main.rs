//! `labs-convert`: Quest lab export to REDCap import file.

use std::io::{self, IsTerminal};
use std::process::ExitCode;

use clap::{ColorChoice, Parser};

use labs_cli::logging::{LogConfig, init_logging};

mod cli;
mod commands;
mod summary;

use crate::cli::Cli;
use crate::commands::run_convert;
use crate::summary::print_summary;

fn main() -> ExitCode {
    let cli = Cli::parse();
    cli.color.write_global();
    if let Err(error) = init_logging(&log_config(&cli)) {
        eprintln!("error: failed to initialize logging: {error}");
        return ExitCode::FAILURE;
    }
    match run_convert(&cli) {
        Ok(result) => {
            print_summary(&result);
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

/// Logging configuration from CLI flags.
///
/// `--log-level` beats `-v`/`-q`, which beat `RUST_LOG`.
fn log_config(cli: &Cli) -> LogConfig {
    let explicit_level = cli.log_level.is_some() || cli.verbosity.is_present();
    let level_filter = cli
        .log_level
        .map_or_else(|| cli.verbosity.tracing_level_filter(), Into::into);
    let with_ansi = match cli.color.color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => cli.log_file.is_none() && io::stderr().is_terminal(),
    };
    LogConfig {
        use_env_filter: !explicit_level,
        with_ansi,
        ..LogConfig::default()
    }
    .with_level_filter(level_filter)
    .with_format(cli.log_format.into())
    .with_log_file(cli.log_file.clone())
    .with_log_data(cli.log_data)
}
