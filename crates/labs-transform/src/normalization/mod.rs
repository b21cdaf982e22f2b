//! Normalization functions applied before pivoting.
//!
//! - **numeric**: result-value cleaning to numbers
//! - **datetime**: `Reported Date` parsing for conflict ordering

pub mod datetime;
pub mod numeric;

pub use datetime::parse_reported_date;
pub use numeric::{normalize_result_value, normalize_rows, parse_f64, strip_annotations};
