//! Non-fatal findings reported while converting.

use serde::{Deserialize, Serialize};

/// A repeated measurement collapsed to its latest report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictResolution {
    pub patient_id: String,
    pub result_name: String,
    pub draw_date: String,
    pub draw_time: String,
    /// Number of rows that competed for the cell.
    pub candidates: usize,
    /// `Reported Date` of the row that was kept.
    pub retained_reported_date: String,
}

/// Observed result names for one patient that have no lookup entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmappedColumns {
    pub patient_id: String,
    pub columns: Vec<String>,
}
