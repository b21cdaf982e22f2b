//! Output table construction.
//!
//! Builds the REDCap import table as a Polars DataFrame: the seven identity
//! columns followed by one Float64 column per destination field.

use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};

use labs_model::{
    COL_DRAW_DATE, COL_DRAW_TIME, COL_EVENT_NAME, COL_ID, COL_LABS_MISSING, COL_REPEAT_INSTANCE,
    COL_REPEAT_INSTRUMENT, ColumnMapping, WideVisitRow,
};

use crate::error::Result;

fn text_column(name: &str, rows: &[WideVisitRow], value: impl Fn(&WideVisitRow) -> &str) -> Column {
    let values: Vec<&str> = rows.iter().map(value).collect();
    Series::new(name.into(), values).into_column()
}

fn integer_column(name: &str, rows: &[WideVisitRow], value: impl Fn(&WideVisitRow) -> i64) -> Column {
    let values: Vec<i64> = rows.iter().map(value).collect();
    Series::new(name.into(), values).into_column()
}

/// Build the output DataFrame for the given rows.
///
/// The column set comes from the mapping alone, so an empty row slice still
/// yields the full header.
pub fn build_output_frame(mapping: &ColumnMapping, rows: &[WideVisitRow]) -> Result<DataFrame> {
    let mut columns = vec![
        text_column(COL_ID, rows, |row| row.id.as_str()),
        text_column(COL_EVENT_NAME, rows, |row| row.event_name.as_str()),
        text_column(COL_REPEAT_INSTRUMENT, rows, |row| row.repeat_instrument.as_str()),
        integer_column(COL_REPEAT_INSTANCE, rows, |row| row.repeat_instance),
        integer_column(COL_LABS_MISSING, rows, |row| row.labs_missing),
        text_column(COL_DRAW_DATE, rows, |row| row.draw_date.as_str()),
        text_column(COL_DRAW_TIME, rows, |row| row.draw_time.as_str()),
    ];

    for (idx, name) in mapping.value_columns().iter().enumerate() {
        let values: Vec<Option<f64>> = rows
            .iter()
            .map(|row| row.values.get(idx).copied().flatten())
            .collect();
        columns.push(Series::new(name.as_str().into(), values).into_column());
    }

    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use labs_model::{IDENTITY_COLUMNS, MappingEntry};

    fn row(id: &str, values: Vec<Option<f64>>) -> WideVisitRow {
        WideVisitRow {
            id: id.to_string(),
            event_name: "hivpd23_visit_1_arm_1".to_string(),
            repeat_instrument: "labs".to_string(),
            repeat_instance: 1,
            labs_missing: 0,
            draw_date: "01/15/2024".to_string(),
            draw_time: "10:30".to_string(),
            values,
        }
    }

    fn mapping() -> ColumnMapping {
        ColumnMapping::from_entries(vec![
            MappingEntry::new("Glucose", "lr_glucose"),
            MappingEntry::new("Absolute Lymphocytes_wbc", "lr_alc_wbc"),
        ])
    }

    #[test]
    fn columns_follow_identity_then_mapping_order() {
        let df = build_output_frame(&mapping(), &[row("123", vec![Some(100.0), None])]).unwrap();

        let names: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        assert_eq!(&names[..IDENTITY_COLUMNS.len()], IDENTITY_COLUMNS);
        assert_eq!(&names[IDENTITY_COLUMNS.len()..], ["lr_glucose", "lr_alc_wbc"]);
    }

    #[test]
    fn missing_values_are_null() {
        let df = build_output_frame(&mapping(), &[row("123", vec![Some(100.0), None])]).unwrap();

        let glucose = df.column("lr_glucose").unwrap().f64().unwrap();
        assert_eq!(glucose.get(0), Some(100.0));
        let alc = df.column("lr_alc_wbc").unwrap().f64().unwrap();
        assert_eq!(alc.get(0), None);
        let instance = df.column("redcap_repeat_instance").unwrap().i64().unwrap();
        assert_eq!(instance.get(0), Some(1));
    }

    #[test]
    fn empty_rows_keep_header() {
        let df = build_output_frame(&mapping(), &[]).unwrap();
        assert_eq!(df.height(), 0);
        assert_eq!(df.width(), IDENTITY_COLUMNS.len() + 2);
    }
}
