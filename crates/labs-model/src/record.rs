//! Long-format lab result records.

use serde::{Deserialize, Serialize};

/// Prefixes Quest puts in front of the study participant number.
pub const LAB_ID_PREFIXES: [&str; 2] = ["LAB_S0", "LAB-S0"];

/// Strip the fixed lab prefix from a Quest patient identifier.
///
/// Values without a known prefix are returned trimmed but otherwise unchanged.
pub fn strip_lab_prefix(raw: &str) -> String {
    let trimmed = raw.trim();
    LAB_ID_PREFIXES
        .iter()
        .find_map(|prefix| trimmed.strip_prefix(prefix))
        .unwrap_or(trimmed)
        .to_string()
}

/// Identifies one lab draw: the grain of a single output row.
///
/// Ordering is by patient, then draw date, then draw time, compared as strings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VisitKey {
    pub patient_id: String,
    pub draw_date: String,
    pub draw_time: String,
}

impl VisitKey {
    pub fn new(
        patient_id: impl Into<String>,
        draw_date: impl Into<String>,
        draw_time: impl Into<String>,
    ) -> Self {
        Self {
            patient_id: patient_id.into(),
            draw_date: draw_date.into(),
            draw_time: draw_time.into(),
        }
    }
}

/// One observation from the Quest export, before value normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResultRow {
    /// Patient identifier with the lab prefix already stripped.
    pub patient_id: String,
    /// Date part of `Reported Date` (text before the first space).
    pub draw_date: String,
    /// Time part of `Reported Date` (text after the first space).
    pub draw_time: String,
    /// Test label as reported by the lab.
    pub result_name: String,
    /// Result text exactly as exported.
    pub result_value: String,
    /// Full `Reported Date` text, used to order repeated measurements.
    pub reported_date: String,
    /// Ordered panel that produced this result.
    pub test_order_name: String,
}

impl RawResultRow {
    /// Consume the raw row, attaching its normalized numeric value.
    pub fn into_observation(self, value: Option<f64>) -> LabObservation {
        LabObservation {
            patient_id: self.patient_id,
            draw_date: self.draw_date,
            draw_time: self.draw_time,
            result_name: self.result_name,
            value,
            reported_date: self.reported_date,
            test_order_name: self.test_order_name,
        }
    }
}

/// A lab observation whose value has been normalized to a number.
///
/// `value` is `None` when the raw text was an annotation, empty, or not numeric.
#[derive(Debug, Clone, PartialEq)]
pub struct LabObservation {
    pub patient_id: String,
    pub draw_date: String,
    pub draw_time: String,
    pub result_name: String,
    pub value: Option<f64>,
    pub reported_date: String,
    pub test_order_name: String,
}

impl LabObservation {
    pub fn visit_key(&self) -> VisitKey {
        VisitKey::new(&self.patient_id, &self.draw_date, &self.draw_time)
    }
}
