//! Typed view of the prepared source table.

use std::collections::{BTreeMap, BTreeSet};

use polars::prelude::DataFrame;

use labs_ingest::{
    COL_PATIENT_ID, COL_REPORTED_DATE, COL_RESULT_NAME, COL_RESULT_VALUE, COL_TEST_ORDER_NAME,
    column_values, missing_columns,
};
use labs_model::{COL_DRAW_DATE, COL_DRAW_TIME, LabObservation, RawResultRow};

use crate::error::{Result, TransformError};

/// Columns the pivot engine reads from the prepared source table.
pub const REQUIRED_SOURCE_COLUMNS: [&str; 7] = [
    COL_PATIENT_ID,
    COL_DRAW_DATE,
    COL_DRAW_TIME,
    COL_RESULT_NAME,
    COL_RESULT_VALUE,
    COL_REPORTED_DATE,
    COL_TEST_ORDER_NAME,
];

/// Fail with every missing pivot column at once.
pub fn validate_source_columns(df: &DataFrame) -> Result<()> {
    let columns = missing_columns(df, &REQUIRED_SOURCE_COLUMNS);
    if columns.is_empty() {
        Ok(())
    } else {
        Err(TransformError::MissingColumns { columns })
    }
}

/// Read the prepared source table into rows, validating its columns first.
pub fn raw_rows_from_frame(df: &DataFrame) -> Result<Vec<RawResultRow>> {
    validate_source_columns(df)?;

    let patient_ids = column_values(df, COL_PATIENT_ID)?;
    let draw_dates = column_values(df, COL_DRAW_DATE)?;
    let draw_times = column_values(df, COL_DRAW_TIME)?;
    let result_names = column_values(df, COL_RESULT_NAME)?;
    let result_values = column_values(df, COL_RESULT_VALUE)?;
    let reported_dates = column_values(df, COL_REPORTED_DATE)?;
    let test_orders = column_values(df, COL_TEST_ORDER_NAME)?;

    let mut rows = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        rows.push(RawResultRow {
            patient_id: patient_ids[idx].clone(),
            draw_date: draw_dates[idx].clone(),
            draw_time: draw_times[idx].clone(),
            result_name: result_names[idx].clone(),
            result_value: result_values[idx].clone(),
            reported_date: reported_dates[idx].clone(),
            test_order_name: test_orders[idx].clone(),
        });
    }
    Ok(rows)
}

/// Every distinct `Result Name` in the source, as reported by the lab.
pub fn observed_result_names<'a, I>(names: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// All observations of one patient.
#[derive(Debug, Clone)]
pub struct PatientRows {
    pub patient_id: String,
    pub observations: Vec<LabObservation>,
}

/// Observations dropped before pivoting, by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkippedRows {
    /// No patient identifier.
    pub missing_patient_id: usize,
    /// `Reported Date` without a time part, or blank.
    pub missing_draw_time: usize,
}

impl SkippedRows {
    pub fn total(&self) -> usize {
        self.missing_patient_id + self.missing_draw_time
    }
}

/// Partition observations by patient, in order of first appearance.
///
/// Observations without a patient identifier, draw date or draw time have no
/// visit to land in and are dropped; their counts are returned alongside the
/// groups.
pub fn group_by_patient(observations: Vec<LabObservation>) -> (Vec<PatientRows>, SkippedRows) {
    let mut positions: BTreeMap<String, usize> = BTreeMap::new();
    let mut groups: Vec<PatientRows> = Vec::new();
    let mut skipped = SkippedRows::default();

    for observation in observations {
        if observation.patient_id.is_empty() {
            skipped.missing_patient_id += 1;
            continue;
        }
        if observation.draw_date.is_empty() || observation.draw_time.is_empty() {
            skipped.missing_draw_time += 1;
            continue;
        }
        let idx = *positions
            .entry(observation.patient_id.clone())
            .or_insert_with(|| {
                groups.push(PatientRows {
                    patient_id: observation.patient_id.clone(),
                    observations: Vec::new(),
                });
                groups.len() - 1
            });
        groups[idx].observations.push(observation);
    }

    (groups, skipped)
}
