//! CLI argument definitions for the lab results converter.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use tracing::level_filters::LevelFilter;

use labs_cli::logging::LogFormat;
use labs_ingest::{DEFAULT_LOOKUP_FILE, QUEST_HEADER_SKIP_ROWS};
use labs_model::options::{DEFAULT_EVENT_NAME, DEFAULT_REPEAT_INSTRUMENT};

#[derive(Parser)]
#[command(
    name = "labs-convert",
    version,
    about = "Convert a Quest lab results export into a REDCap import file",
    long_about = "Convert a long-format Quest lab results export into a wide REDCap import file.\n\n\
                  One row is produced per patient and blood draw. Result names are renamed\n\
                  to REDCap fields through a lookup table, repeated reports keep the latest\n\
                  value, and an optional ID file restricts the output to a cohort."
)]
pub struct Cli {
    /// Quest export CSV (with the report preamble).
    #[arg(long = "input_file", alias = "input-file", value_name = "PATH")]
    pub input_file: PathBuf,

    /// REDCap import CSV to write.
    #[arg(long = "output_file", alias = "output-file", value_name = "PATH")]
    pub output_file: PathBuf,

    /// Lookup table with `quest_col` and `redcap_col` columns.
    #[arg(
        long = "lookup_file",
        alias = "lookup-file",
        value_name = "PATH",
        default_value = DEFAULT_LOOKUP_FILE
    )]
    pub lookup_file: PathBuf,

    /// Optional CSV with an `ID` column restricting which patients are written.
    #[arg(long = "id_file", alias = "id-file", value_name = "PATH")]
    pub id_file: Option<PathBuf>,

    /// Number of preamble lines before the Quest export header.
    #[arg(long = "skip-rows", value_name = "N", default_value_t = QUEST_HEADER_SKIP_ROWS)]
    pub skip_rows: usize,

    /// Value written to `redcap_event_name`.
    #[arg(long = "event-name", value_name = "NAME", default_value = DEFAULT_EVENT_NAME)]
    pub event_name: String,

    /// Value written to `redcap_repeat_instrument`.
    #[arg(
        long = "repeat-instrument",
        value_name = "NAME",
        default_value = DEFAULT_REPEAT_INSTRUMENT
    )]
    pub repeat_instrument: String,

    /// Write the run summary as JSON.
    #[arg(long = "report-json", value_name = "PATH")]
    pub report_json: Option<PathBuf>,

    /// Run the full conversion and report without writing the output file.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Include patient identifiers and result values in logs.
    #[arg(long = "log-data")]
    pub log_data: bool,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(level: LogLevelArg) -> Self {
        match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        }
    }
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(format: LogFormatArg) -> Self {
        match format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_snake_case_flags_with_defaults() {
        let cli = Cli::try_parse_from([
            "labs-convert",
            "--input_file",
            "quest.csv",
            "--output_file",
            "redcap.csv",
        ])
        .unwrap();
        assert_eq!(cli.input_file, PathBuf::from("quest.csv"));
        assert_eq!(cli.lookup_file, PathBuf::from("redcap_datadict.csv"));
        assert_eq!(cli.skip_rows, 19);
        assert_eq!(cli.event_name, "hivpd23_visit_1_arm_1");
        assert_eq!(cli.repeat_instrument, "labs");
        assert!(cli.id_file.is_none());
        assert!(!cli.dry_run);
    }

    #[test]
    fn accepts_kebab_case_aliases() {
        let cli = Cli::try_parse_from([
            "labs-convert",
            "--input-file",
            "quest.csv",
            "--output-file",
            "redcap.csv",
            "--id-file",
            "ids.csv",
            "--lookup-file",
            "lookup.csv",
        ])
        .unwrap();
        assert_eq!(cli.id_file, Some(PathBuf::from("ids.csv")));
        assert_eq!(cli.lookup_file, PathBuf::from("lookup.csv"));
    }

    #[test]
    fn input_and_output_are_required() {
        assert!(Cli::try_parse_from(["labs-convert", "--input_file", "quest.csv"]).is_err());
    }
}
