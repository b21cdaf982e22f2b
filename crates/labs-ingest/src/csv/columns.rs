//! Column presence checks and string extraction.

use std::path::Path;

use polars::prelude::{AnyValue, DataFrame};

use crate::error::{IngestError, Result};

/// Render a cell as text. Nulls become the empty string.
pub fn any_to_string(value: AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(s) => s.to_string(),
        AnyValue::StringOwned(s) => s.to_string(),
        other => other.to_string(),
    }
}

/// Extract every value of a column as text, nulls as empty strings.
pub fn column_values(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let column = df.column(name).map_err(|_| IngestError::ColumnNotFound {
        column: name.to_string(),
    })?;
    let mut values = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        values.push(any_to_string(column.get(idx).unwrap_or(AnyValue::Null)));
    }
    Ok(values)
}

/// Names from `required` that the DataFrame does not have, in `required` order.
pub fn missing_columns(df: &DataFrame, required: &[&str]) -> Vec<String> {
    let present: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|name| name.to_string())
        .collect();
    required
        .iter()
        .filter(|name| !present.iter().any(|p| p == *name))
        .map(|name| (*name).to_string())
        .collect()
}

/// Fail on the first required column the table is missing.
pub fn require_columns(df: &DataFrame, required: &[&str], path: &Path) -> Result<()> {
    match missing_columns(df, required).into_iter().next() {
        Some(column) => Err(IngestError::MissingColumn {
            column,
            path: path.to_path_buf(),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{IntoColumn, NamedFrom, Series};

    fn frame() -> DataFrame {
        DataFrame::new(vec![
            Series::new("quest_col".into(), vec![Some("Glucose"), None]).into_column(),
        ])
        .unwrap()
    }

    #[test]
    fn nulls_render_as_empty() {
        let values = column_values(&frame(), "quest_col").unwrap();
        assert_eq!(values, vec!["Glucose".to_string(), String::new()]);
    }

    #[test]
    fn unknown_column_is_an_error() {
        let result = column_values(&frame(), "redcap_col");
        assert!(matches!(result, Err(IngestError::ColumnNotFound { .. })));
    }

    #[test]
    fn reports_missing_columns_in_order() {
        let missing = missing_columns(&frame(), &["redcap_col", "quest_col", "ID"]);
        assert_eq!(missing, vec!["redcap_col", "ID"]);
    }

    #[test]
    fn require_names_first_missing_column() {
        let err = require_columns(&frame(), &["quest_col", "redcap_col"], Path::new("map.csv"))
            .unwrap_err();
        assert!(matches!(
            err,
            IngestError::MissingColumn { ref column, .. } if column == "redcap_col"
        ));
    }
}
