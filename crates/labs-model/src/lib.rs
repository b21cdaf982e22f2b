//! Data model for the Quest labs to REDCap conversion.
//!
//! Types flow through the pipeline in this order:
//!
//! - [`RawResultRow`]: one observation as read from the Quest export
//! - [`LabObservation`]: the same observation with its value normalized
//! - [`VisitKey`]: the (patient, draw date, draw time) grain of an output row
//! - [`WideVisitRow`]: one aligned REDCap row per visit
//!
//! [`ColumnMapping`] carries the lookup table (Quest test name to REDCap
//! field) and the ordered destination schema.

pub mod mapping;
pub mod options;
pub mod record;
pub mod report;
pub mod visit;

pub use mapping::{ColumnMapping, MappingEntry};
pub use options::RedcapOptions;
pub use record::{LAB_ID_PREFIXES, LabObservation, RawResultRow, VisitKey, strip_lab_prefix};
pub use report::{ConflictResolution, UnmappedColumns};
pub use visit::{
    COL_DRAW_DATE, COL_DRAW_TIME, COL_EVENT_NAME, COL_ID, COL_LABS_MISSING, COL_REPEAT_INSTANCE,
    COL_REPEAT_INSTRUMENT, IDENTITY_COLUMNS, WideVisitRow,
};
