use std::path::PathBuf;

use serde::Serialize;

use labs_model::{ConflictResolution, UnmappedColumns};

/// What happened to the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputStatus {
    Written,
    DryRun,
    /// No patient produced a row; nothing was written.
    Empty,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConvertResult {
    pub input_file: PathBuf,
    pub output_file: PathBuf,
    pub status: OutputStatus,
    pub source_rows: usize,
    pub patients: usize,
    /// Source rows without a patient identifier.
    pub skipped_rows: usize,
    /// Source rows whose `Reported Date` carried no draw time.
    pub undated_rows: usize,
    pub visit_rows: usize,
    /// Rows left after the ID allow-list, when one was given.
    pub filtered_rows: Option<usize>,
    pub output_rows: usize,
    pub disambiguated: usize,
    pub conflicts: Vec<ConflictResolution>,
    pub unmapped: Vec<UnmappedColumns>,
}

impl ConvertResult {
    /// Distinct result names that had no lookup entry, across all patients.
    pub fn unmapped_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .unmapped
            .iter()
            .flat_map(|entry| entry.columns.iter().cloned())
            .collect();
        names.sort();
        names.dedup();
        names
    }
}
