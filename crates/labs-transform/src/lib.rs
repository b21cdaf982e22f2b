//! Pivot-and-reconcile engine for Quest lab results.
//!
//! This crate turns the long-format Quest export into REDCap visit rows:
//!
//! - **normalization**: result value cleaning and reported-date parsing
//! - **source**: typed rows from the prepared source table, grouped by patient
//! - **pivot**: lymphocyte disambiguation, conflict resolution and per-visit pivot
//! - **align**: renaming and ordering to the REDCap destination schema
//! - **frame**: output DataFrame construction
//! - **filter**: optional identifier allow-list

pub mod align;
pub mod error;
pub mod filter;
pub mod frame;
pub mod normalization;
pub mod pivot;
pub mod source;

pub use align::{AlignedPatient, SchemaAligner};
pub use error::{Result, TransformError};
pub use filter::{AllowList, extract_allow_list_id, filter_by_allow_list};
pub use frame::build_output_frame;
pub use normalization::{
    normalize_result_value, normalize_rows, parse_f64, parse_reported_date, strip_annotations,
};
pub use pivot::{
    ABSOLUTE_LYMPHOCYTES, ABSOLUTE_LYMPHOCYTES_LYMPH, ABSOLUTE_LYMPHOCYTES_WBC, CBC_TEST_ORDER,
    GUARANTEED_COLUMNS, LYMPHOCYTE_SUBSET_TEST_ORDER, PatientPivot, ResolvedCells, disambiguate,
    pivot_patient, resolve_conflicts,
};
pub use source::{
    PatientRows, SkippedRows, group_by_patient, observed_result_names, raw_rows_from_frame,
    validate_source_columns,
};
