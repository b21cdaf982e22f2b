use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::info;

use labs_cli::pipeline::{PipelineConfig, run_pipeline};
use labs_cli::types::ConvertResult;
use labs_model::RedcapOptions;

use crate::cli::Cli;

const REPORT_SCHEMA: &str = "labs-convert.run-report";
const REPORT_SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
struct RunReport<'a> {
    schema: &'static str,
    schema_version: u32,
    generated_at: String,
    #[serde(flatten)]
    result: &'a ConvertResult,
}

pub fn run_convert(cli: &Cli) -> Result<ConvertResult> {
    let options = RedcapOptions::new()
        .with_event_name(cli.event_name.clone())
        .with_repeat_instrument(cli.repeat_instrument.clone());
    let config = PipelineConfig::new(
        cli.input_file.clone(),
        cli.output_file.clone(),
        cli.lookup_file.clone(),
    )
    .with_id_file(cli.id_file.clone())
    .with_skip_rows(cli.skip_rows)
    .with_options(options)
    .with_dry_run(cli.dry_run);

    let result = run_pipeline(&config)?;

    if let Some(path) = &cli.report_json {
        write_report_json(path, &result)
            .with_context(|| format!("write run report {}", path.display()))?;
        info!(path = %path.display(), "run report written");
    }
    Ok(result)
}

fn write_report_json(path: &Path, result: &ConvertResult) -> Result<()> {
    let payload = RunReport {
        schema: REPORT_SCHEMA,
        schema_version: REPORT_SCHEMA_VERSION,
        generated_at: Utc::now().to_rfc3339(),
        result,
    };
    let json = serde_json::to_string_pretty(&payload)?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}
