//! Quest export loading and preparation.
//!
//! The raw export carries a single `Reported Date` column. Preparation
//! derives the draw date and draw time from it, strips the lab prefix from
//! patient identifiers, and replaces nulls with empty strings so every
//! downstream consumer sees plain text.

use std::path::Path;

use polars::prelude::{DataFrame, NamedFrom, Series};
use tracing::debug;

use labs_model::{COL_DRAW_DATE, COL_DRAW_TIME, strip_lab_prefix};

use crate::csv::{column_values, read_csv_table, require_columns};
use crate::error::Result;

pub const COL_PATIENT_ID: &str = "Patient ID";
pub const COL_REPORTED_DATE: &str = "Reported Date";
pub const COL_RESULT_NAME: &str = "Result Name";
pub const COL_RESULT_VALUE: &str = "Result Value";
pub const COL_TEST_ORDER_NAME: &str = "Test Order Name";

/// Columns the raw export must provide before preparation.
pub const REQUIRED_EXPORT_COLUMNS: [&str; 4] = [
    COL_PATIENT_ID,
    COL_REPORTED_DATE,
    COL_RESULT_NAME,
    COL_RESULT_VALUE,
];

/// Split a `Reported Date` value at the first space into (date, time).
///
/// A value without a space yields an empty time; such rows are later dropped
/// for lack of a visit key.
pub fn split_reported_date(value: &str) -> (String, String) {
    match value.split_once(' ') {
        Some((date, time)) => (date.to_string(), time.to_string()),
        None => (value.to_string(), String::new()),
    }
}

/// Load a Quest export, skipping the report preamble, and prepare it.
pub fn load_quest_export(path: &Path, skip_rows: usize) -> Result<DataFrame> {
    let df = read_csv_table(path, skip_rows)?;
    prepare_quest_frame(df, path)
}

/// Validate and normalize a raw Quest export frame.
///
/// Adds `lr_blood_draw_date` and `lr_blood_draw_time`, replaces `Patient ID`
/// with its prefix-stripped form, and null-fills the text columns.
pub fn prepare_quest_frame(mut df: DataFrame, path: &Path) -> Result<DataFrame> {
    require_columns(&df, &REQUIRED_EXPORT_COLUMNS, path)?;

    let patient_ids: Vec<String> = column_values(&df, COL_PATIENT_ID)?
        .iter()
        .map(|raw| strip_lab_prefix(raw))
        .collect();
    df.with_column(Series::new(COL_PATIENT_ID.into(), patient_ids))?;

    let reported = column_values(&df, COL_REPORTED_DATE)?;
    let (dates, times): (Vec<String>, Vec<String>) = reported
        .iter()
        .map(|value| split_reported_date(value))
        .unzip();
    df.with_column(Series::new(COL_REPORTED_DATE.into(), reported))?;
    df.with_column(Series::new(COL_DRAW_DATE.into(), dates))?;
    df.with_column(Series::new(COL_DRAW_TIME.into(), times))?;

    for name in [COL_RESULT_NAME, COL_RESULT_VALUE, COL_TEST_ORDER_NAME] {
        if df.column(name).is_err() {
            continue;
        }
        let values = column_values(&df, name)?;
        df.with_column(Series::new(name.into(), values))?;
    }

    debug!(
        path = %path.display(),
        rows = df.height(),
        "quest export prepared"
    );
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestError;
    use polars::prelude::IntoColumn;

    fn raw_frame(columns: Vec<(&str, Vec<Option<&str>>)>) -> DataFrame {
        DataFrame::new(
            columns
                .into_iter()
                .map(|(name, values)| Series::new(name.into(), values).into_column())
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn splits_reported_date_at_first_space() {
        assert_eq!(
            split_reported_date("01/15/2024 10:30 AM"),
            ("01/15/2024".to_string(), "10:30 AM".to_string())
        );
        assert_eq!(
            split_reported_date("01/15/2024"),
            ("01/15/2024".to_string(), String::new())
        );
        assert_eq!(split_reported_date(""), (String::new(), String::new()));
    }

    #[test]
    fn derives_draw_columns_and_strips_prefix() {
        let df = raw_frame(vec![
            ("Patient ID", vec![Some("LAB_S0123"), Some("LAB-S0456"), None]),
            (
                "Reported Date",
                vec![Some("01/15/2024 10:30"), None, Some("01/16/2024 08:00")],
            ),
            ("Result Name", vec![Some("Glucose"), Some("Sodium"), Some("Glucose")]),
            ("Result Value", vec![Some("100 mg/dL"), None, Some("90")]),
            ("Test Order Name", vec![None, Some("CMP"), Some("CMP")]),
        ]);

        let prepared = prepare_quest_frame(df, Path::new("quest.csv")).unwrap();

        let ids = column_values(&prepared, COL_PATIENT_ID).unwrap();
        assert_eq!(ids, vec!["123", "456", ""]);
        let dates = column_values(&prepared, COL_DRAW_DATE).unwrap();
        assert_eq!(dates, vec!["01/15/2024", "", "01/16/2024"]);
        let times = column_values(&prepared, COL_DRAW_TIME).unwrap();
        assert_eq!(times, vec!["10:30", "", "08:00"]);
        let orders = column_values(&prepared, COL_TEST_ORDER_NAME).unwrap();
        assert_eq!(orders, vec!["", "CMP", "CMP"]);
        assert!(prepared.column(COL_RESULT_VALUE).unwrap().null_count() == 0);
    }

    #[test]
    fn rejects_export_without_result_value() {
        let df = raw_frame(vec![
            ("Patient ID", vec![Some("LAB_S0123")]),
            ("Reported Date", vec![Some("01/15/2024 10:30")]),
            ("Result Name", vec![Some("Glucose")]),
        ]);

        let err = prepare_quest_frame(df, Path::new("quest.csv")).unwrap_err();
        assert!(matches!(
            err,
            IngestError::MissingColumn { ref column, .. } if column == "Result Value"
        ));
    }

    #[test]
    fn leaves_missing_test_order_for_later_validation() {
        let df = raw_frame(vec![
            ("Patient ID", vec![Some("LAB_S0123")]),
            ("Reported Date", vec![Some("01/15/2024 10:30")]),
            ("Result Name", vec![Some("Glucose")]),
            ("Result Value", vec![Some("100")]),
        ]);

        let prepared = prepare_quest_frame(df, Path::new("quest.csv")).unwrap();
        assert!(prepared.column(COL_TEST_ORDER_NAME).is_err());
        assert!(prepared.column(COL_DRAW_DATE).is_ok());
    }
}
