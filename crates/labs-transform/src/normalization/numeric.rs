//! Numeric normalization of lab result values.

use std::sync::LazyLock;

use regex::Regex;

use labs_model::{LabObservation, RawResultRow};

/// Result texts that carry no measurement: free-text notes, qualitative
/// reactivity flags, and blank cells.
static ANNOTATION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"^SEE NOTE.*", r"^NON-REACTIVE$", r"^REACTIVE$", r"^\s*$"]
        .iter()
        .map(|pattern| Regex::new(pattern).expect("annotation pattern is valid"))
        .collect()
});

/// Remove annotation text, applying each pattern in turn.
pub fn strip_annotations(value: &str) -> String {
    ANNOTATION_PATTERNS
        .iter()
        .fold(value.to_string(), |current, pattern| {
            pattern.replace(&current, "").into_owned()
        })
}

/// Parses a string as f64, returning None for invalid, empty, or non-finite input.
pub fn parse_f64(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Clean a raw result value into a number.
///
/// Annotations are dropped, then the text is cut at the first space (units,
/// flags) and at the first `%`. Anything left that does not parse is missing.
///
/// ```
/// use labs_transform::normalization::normalize_result_value;
///
/// assert_eq!(normalize_result_value("45.2 H"), Some(45.2));
/// assert_eq!(normalize_result_value("12%"), Some(12.0));
/// assert_eq!(normalize_result_value("NON-REACTIVE"), None);
/// assert_eq!(normalize_result_value(""), None);
/// ```
pub fn normalize_result_value(raw: &str) -> Option<f64> {
    let cleaned = strip_annotations(raw);
    let token = cleaned.split(' ').next().unwrap_or_default();
    let token = token.split('%').next().unwrap_or_default();
    parse_f64(token)
}

/// Normalize every row's result value.
pub fn normalize_rows(rows: Vec<RawResultRow>) -> Vec<LabObservation> {
    rows.into_iter()
        .map(|row| {
            let value = normalize_result_value(&row.result_value);
            row.into_observation(value)
        })
        .collect()
}
