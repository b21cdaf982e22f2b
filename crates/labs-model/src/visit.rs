//! Wide-format REDCap visit rows.

use serde::{Deserialize, Serialize};

pub const COL_ID: &str = "id";
pub const COL_EVENT_NAME: &str = "redcap_event_name";
pub const COL_REPEAT_INSTRUMENT: &str = "redcap_repeat_instrument";
pub const COL_REPEAT_INSTANCE: &str = "redcap_repeat_instance";
pub const COL_LABS_MISSING: &str = "lr_missing";
pub const COL_DRAW_DATE: &str = "lr_blood_draw_date";
pub const COL_DRAW_TIME: &str = "lr_blood_draw_time";

/// Fixed leading block of every output row, in output order.
pub const IDENTITY_COLUMNS: [&str; 7] = [
    COL_ID,
    COL_EVENT_NAME,
    COL_REPEAT_INSTRUMENT,
    COL_REPEAT_INSTANCE,
    COL_LABS_MISSING,
    COL_DRAW_DATE,
    COL_DRAW_TIME,
];

/// One output row: a single lab draw aligned to the destination schema.
///
/// `values` lines up with [`ColumnMapping::value_columns`](crate::ColumnMapping::value_columns);
/// `None` is the missing marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WideVisitRow {
    pub id: String,
    pub event_name: String,
    pub repeat_instrument: String,
    pub repeat_instance: i64,
    pub labs_missing: i64,
    pub draw_date: String,
    pub draw_time: String,
    pub values: Vec<Option<f64>>,
}
