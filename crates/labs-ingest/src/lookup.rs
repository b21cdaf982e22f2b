//! Lookup table (Quest test name to REDCap field) loading.

use std::path::Path;

use polars::prelude::DataFrame;
use tracing::{info, warn};

use labs_model::{ColumnMapping, MappingEntry};

use crate::csv::{column_values, read_csv_table, require_columns};
use crate::error::Result;

pub const COL_QUEST: &str = "quest_col";
pub const COL_REDCAP: &str = "redcap_col";

/// Default lookup file name, resolved against the working directory.
pub const DEFAULT_LOOKUP_FILE: &str = "redcap_datadict.csv";

/// Load the lookup table into an immutable [`ColumnMapping`].
pub fn load_column_mapping(path: &Path) -> Result<ColumnMapping> {
    let df = read_csv_table(path, 0)?;
    mapping_from_frame(&df, path)
}

/// Build a [`ColumnMapping`] from an already loaded lookup table.
pub fn mapping_from_frame(df: &DataFrame, path: &Path) -> Result<ColumnMapping> {
    require_columns(df, &[COL_QUEST, COL_REDCAP], path)?;
    let sources = column_values(df, COL_QUEST)?;
    let destinations = column_values(df, COL_REDCAP)?;

    let mapping = ColumnMapping::from_entries(
        sources
            .into_iter()
            .zip(destinations)
            .map(|(source, destination)| MappingEntry::new(source, destination)),
    );

    for source in mapping.overridden_sources() {
        warn!(
            path = %path.display(),
            quest_col = %source,
            redcap_col = mapping.destination_for(source).unwrap_or_default(),
            "lookup entry listed more than once, keeping the last"
        );
    }
    info!(
        path = %path.display(),
        mapped = mapping.len(),
        destination_columns = mapping.destinations().len(),
        "lookup table loaded"
    );
    Ok(mapping)
}
