//! Identifier allow-list loading.

use std::path::Path;

use polars::prelude::DataFrame;
use tracing::info;

use crate::csv::{column_values, read_csv_table, require_columns};
use crate::error::Result;

pub const COL_ALLOW_LIST_ID: &str = "ID";

/// Load the raw `ID` values of an allow-list file.
///
/// Values are returned as written; extracting the numeric identifier is the
/// filter's job.
pub fn load_allow_list(path: &Path) -> Result<Vec<String>> {
    let df = read_csv_table(path, 0)?;
    let values = allow_list_from_frame(&df, path)?;
    info!(
        path = %path.display(),
        entries = values.len(),
        "allow-list loaded"
    );
    Ok(values)
}

/// Non-empty `ID` values of an already loaded allow-list table.
pub fn allow_list_from_frame(df: &DataFrame, path: &Path) -> Result<Vec<String>> {
    require_columns(df, &[COL_ALLOW_LIST_ID], path)?;
    Ok(column_values(df, COL_ALLOW_LIST_ID)?
        .into_iter()
        .filter(|value| !value.trim().is_empty())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IngestError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn loads_non_empty_ids() {
        let file = create_temp_csv("ID,Site\nS00123,A\n,B\nHIV-0042,C\n");
        let values = load_allow_list(file.path()).unwrap();
        assert_eq!(values, vec!["S00123", "HIV-0042"]);
    }

    #[test]
    fn rejects_file_without_id_column() {
        let file = create_temp_csv("Participant\nS00123\n");
        let err = load_allow_list(file.path()).unwrap_err();
        assert!(matches!(
            err,
            IngestError::MissingColumn { ref column, .. } if column == "ID"
        ));
    }
}
