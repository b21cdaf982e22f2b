//! Lab data ingestion utilities.
//!
//! This crate loads the three input tables of a conversion run into Polars
//! DataFrames and validates their required columns:
//!
//! - **Quest export**: long-format lab results behind a fixed report preamble
//! - **Lookup table**: `quest_col` to `redcap_col` rename mapping
//! - **Allow-list**: optional `ID` column restricting the output cohort
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use labs_ingest::{QUEST_HEADER_SKIP_ROWS, load_column_mapping, load_quest_export};
//!
//! let source = load_quest_export(Path::new("quest.csv"), QUEST_HEADER_SKIP_ROWS)?;
//! let mapping = load_column_mapping(Path::new("redcap_datadict.csv"))?;
//! ```

mod allow_list;
mod csv;
mod error;
mod lookup;
mod source;

// === Error Types ===
pub use error::{IngestError, Result};

// === CSV Reading ===
pub use csv::{
    MAX_CSV_FILE_SIZE, QUEST_HEADER_SKIP_ROWS, any_to_string, check_file_size,
    check_file_size_with_limit, column_values, missing_columns, read_csv_table, require_columns,
};

// === Quest Export ===
pub use source::{
    COL_PATIENT_ID, COL_REPORTED_DATE, COL_RESULT_NAME, COL_RESULT_VALUE, COL_TEST_ORDER_NAME,
    REQUIRED_EXPORT_COLUMNS, load_quest_export, prepare_quest_frame, split_reported_date,
};

// === Lookup Table ===
pub use lookup::{COL_QUEST, COL_REDCAP, DEFAULT_LOOKUP_FILE, load_column_mapping, mapping_from_frame};

// === Allow-list ===
pub use allow_list::{COL_ALLOW_LIST_ID, allow_list_from_frame, load_allow_list};
