//! Conversion pipeline with explicit stages.
//!
//! The pipeline follows these stages in order:
//! 1. **Ingest**: read the Quest export, the lookup table and the optional ID file
//! 2. **Transform**: normalize, pivot and align every patient
//! 3. **Assemble**: build the output table and apply the ID allow-list
//! 4. **Output**: write the REDCap import CSV
//!
//! All configuration errors surface during ingest, before anything is written.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use tracing::{debug, info, info_span, warn};

use labs_ingest::{QUEST_HEADER_SKIP_ROWS, load_allow_list, load_column_mapping, load_quest_export};
use labs_model::{
    ColumnMapping, ConflictResolution, RedcapOptions, UnmappedColumns, WideVisitRow,
};
use labs_transform::{
    AllowList, SchemaAligner, build_output_frame, filter_by_allow_list, group_by_patient,
    normalize_rows, observed_result_names, pivot_patient, raw_rows_from_frame,
};

use crate::logging::redact_value;
use crate::types::{ConvertResult, OutputStatus};

/// Everything a conversion run needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input_file: PathBuf,
    pub output_file: PathBuf,
    pub lookup_file: PathBuf,
    pub id_file: Option<PathBuf>,
    pub skip_rows: usize,
    pub options: RedcapOptions,
    pub dry_run: bool,
}

impl PipelineConfig {
    pub fn new(
        input_file: impl Into<PathBuf>,
        output_file: impl Into<PathBuf>,
        lookup_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            input_file: input_file.into(),
            output_file: output_file.into(),
            lookup_file: lookup_file.into(),
            id_file: None,
            skip_rows: QUEST_HEADER_SKIP_ROWS,
            options: RedcapOptions::default(),
            dry_run: false,
        }
    }

    #[must_use]
    pub fn with_id_file(mut self, id_file: Option<PathBuf>) -> Self {
        self.id_file = id_file;
        self
    }

    #[must_use]
    pub fn with_skip_rows(mut self, skip_rows: usize) -> Self {
        self.skip_rows = skip_rows;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: RedcapOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

// ============================================================================
// Stage 1: Ingest
// ============================================================================

/// Result of the ingest stage.
#[derive(Debug)]
pub struct IngestResult {
    /// Prepared Quest export (prefix stripped, draw date and time derived).
    pub source: DataFrame,
    pub mapping: ColumnMapping,
    pub allow_list: Option<AllowList>,
}

/// Load and validate every input file.
pub fn ingest(config: &PipelineConfig) -> Result<IngestResult> {
    let source = load_quest_export(&config.input_file, config.skip_rows)
        .with_context(|| format!("load quest export {}", config.input_file.display()))?;
    let mapping = load_column_mapping(&config.lookup_file)
        .with_context(|| format!("load lookup table {}", config.lookup_file.display()))?;
    let allow_list = match &config.id_file {
        Some(path) => {
            let values = load_allow_list(path)
                .with_context(|| format!("load id file {}", path.display()))?;
            let allow_list = AllowList::from_values(values);
            debug!(
                path = %path.display(),
                ids = allow_list.len(),
                "id allow-list loaded"
            );
            Some(allow_list)
        }
        None => None,
    };
    Ok(IngestResult {
        source,
        mapping,
        allow_list,
    })
}

// ============================================================================
// Stage 2: Transform
// ============================================================================

/// Result of the transform stage.
#[derive(Debug, Default)]
pub struct TransformResult {
    /// Aligned rows, patients in first-appearance order.
    pub rows: Vec<WideVisitRow>,
    pub source_rows: usize,
    pub patients: usize,
    pub skipped_rows: usize,
    pub undated_rows: usize,
    pub disambiguated: usize,
    pub conflicts: Vec<ConflictResolution>,
    pub unmapped: Vec<UnmappedColumns>,
}

/// Normalize, pivot and align every patient of the prepared source table.
pub fn transform(
    source: &DataFrame,
    mapping: &ColumnMapping,
    options: &RedcapOptions,
) -> Result<TransformResult> {
    let raw = raw_rows_from_frame(source).context("read source rows")?;
    let source_rows = raw.len();
    let observed = observed_result_names(raw.iter().map(|row| row.result_name.as_str()));
    let (patients, skipped) = group_by_patient(normalize_rows(raw));
    if skipped.missing_patient_id > 0 {
        warn!(
            skipped_rows = skipped.missing_patient_id,
            "skipped rows without a patient id"
        );
    }
    if skipped.missing_draw_time > 0 {
        warn!(
            skipped_rows = skipped.missing_draw_time,
            "skipped rows whose reported date has no draw time"
        );
    }

    let aligner = SchemaAligner::new(mapping, &observed, options);
    let mut result = TransformResult {
        source_rows,
        patients: patients.len(),
        skipped_rows: skipped.missing_patient_id,
        undated_rows: skipped.missing_draw_time,
        ..TransformResult::default()
    };

    for patient in patients {
        let pivot = pivot_patient(&patient.patient_id, patient.observations);
        for conflict in &pivot.conflicts {
            log_conflict(conflict);
        }
        let aligned = aligner.align(&pivot);
        if let Some(unmapped) = &aligned.unmapped {
            warn!(
                patient_id = %redact_value(&unmapped.patient_id),
                columns = %unmapped.columns.join(", "),
                "result names missing from the lookup table"
            );
        }
        debug!(
            patient_id = %redact_value(&pivot.patient_id),
            visits = aligned.rows.len(),
            "patient pivoted"
        );
        result.disambiguated += pivot.disambiguated;
        result.conflicts.extend(pivot.conflicts);
        result.unmapped.extend(aligned.unmapped);
        result.rows.extend(aligned.rows);
    }

    Ok(result)
}

fn log_conflict(conflict: &ConflictResolution) {
    warn!(
        patient_id = %redact_value(&conflict.patient_id),
        result_name = %conflict.result_name,
        draw_date = %conflict.draw_date,
        draw_time = %conflict.draw_time,
        candidates = conflict.candidates,
        retained_reported_date = %conflict.retained_reported_date,
        "duplicate results for one draw; kept the latest report"
    );
}

// ============================================================================
// Stage 3: Assemble
// ============================================================================

/// Result of the assemble stage.
#[derive(Debug)]
pub struct AssembledOutput {
    pub frame: DataFrame,
    /// Row count after the ID allow-list, when one was applied.
    pub filtered_rows: Option<usize>,
}

/// Build the output table and restrict it to the allow-list.
pub fn assemble(
    mapping: &ColumnMapping,
    rows: &[WideVisitRow],
    allow_list: Option<&AllowList>,
) -> Result<AssembledOutput> {
    let frame = build_output_frame(mapping, rows).context("build output table")?;
    match allow_list {
        Some(allow_list) => {
            let filtered =
                filter_by_allow_list(&frame, allow_list).context("apply id allow-list")?;
            let filtered_rows = filtered.height();
            Ok(AssembledOutput {
                frame: filtered,
                filtered_rows: Some(filtered_rows),
            })
        }
        None => Ok(AssembledOutput {
            frame,
            filtered_rows: None,
        }),
    }
}

// ============================================================================
// Stage 4: Output
// ============================================================================

/// Write the output table as CSV with a header row.
pub fn write_output(frame: &mut DataFrame, path: &Path) -> Result<()> {
    let mut file =
        File::create(path).with_context(|| format!("create output file {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(frame)
        .with_context(|| format!("write output file {}", path.display()))?;
    Ok(())
}

/// Run every stage for one conversion.
pub fn run_pipeline(config: &PipelineConfig) -> Result<ConvertResult> {
    let run_span = info_span!(
        "convert",
        input_file = %config.input_file.display(),
        output_file = %config.output_file.display()
    );
    let _run_guard = run_span.enter();

    let ingest_start = Instant::now();
    let IngestResult {
        source,
        mapping,
        allow_list,
    } = info_span!("ingest").in_scope(|| ingest(config))?;
    info!(
        source_rows = source.height(),
        destination_columns = mapping.destinations().len(),
        allow_list = allow_list.is_some(),
        duration_ms = ingest_start.elapsed().as_millis(),
        "ingest complete"
    );

    let transform_start = Instant::now();
    let transformed =
        info_span!("transform").in_scope(|| transform(&source, &mapping, &config.options))?;
    info!(
        patients = transformed.patients,
        visit_rows = transformed.rows.len(),
        conflicts = transformed.conflicts.len(),
        disambiguated = transformed.disambiguated,
        duration_ms = transform_start.elapsed().as_millis(),
        "transform complete"
    );

    let mut result = ConvertResult {
        input_file: config.input_file.clone(),
        output_file: config.output_file.clone(),
        status: OutputStatus::Empty,
        source_rows: transformed.source_rows,
        patients: transformed.patients,
        skipped_rows: transformed.skipped_rows,
        undated_rows: transformed.undated_rows,
        visit_rows: transformed.rows.len(),
        filtered_rows: None,
        output_rows: 0,
        disambiguated: transformed.disambiguated,
        conflicts: transformed.conflicts,
        unmapped: transformed.unmapped,
    };

    if transformed.rows.is_empty() {
        warn!("no lab data to upload; output file not written");
        return Ok(result);
    }

    let AssembledOutput {
        mut frame,
        filtered_rows,
    } = info_span!("assemble")
        .in_scope(|| assemble(&mapping, &transformed.rows, allow_list.as_ref()))?;
    result.filtered_rows = filtered_rows;
    result.output_rows = frame.height();
    if frame.height() == 0 {
        warn!("id allow-list removed every row; writing header only");
    }

    if config.dry_run {
        info!(rows = frame.height(), "dry run; output file not written");
        result.status = OutputStatus::DryRun;
        return Ok(result);
    }

    let output_start = Instant::now();
    info_span!("output").in_scope(|| write_output(&mut frame, &config.output_file))?;
    info!(
        path = %config.output_file.display(),
        rows = frame.height(),
        columns = frame.width(),
        duration_ms = output_start.elapsed().as_millis(),
        "output written"
    );
    result.status = OutputStatus::Written;
    Ok(result)
}
