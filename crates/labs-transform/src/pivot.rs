//! Per-patient pivot engine.
//!
//! Turns one patient's long-format observations into one wide row per
//! [`VisitKey`]. Three stages run in a fixed order:
//!
//! 1. **Disambiguation**: result names shared by clinically distinct panels
//!    are renamed by test order, so they can never merge later.
//! 2. **Conflict resolution**: repeated (visit, result name) observations are
//!    reduced to the one with the latest `Reported Date`.
//! 3. **Pivot**: the reduced cells are laid out per visit.
//!
//! Stage 2 produces a map keyed by (visit, result name), so stage 3 never
//! sees two candidates for one cell.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use labs_model::{ConflictResolution, LabObservation, VisitKey};

use crate::normalization::parse_reported_date;

pub const ABSOLUTE_LYMPHOCYTES: &str = "Absolute Lymphocytes";
pub const ABSOLUTE_LYMPHOCYTES_WBC: &str = "Absolute Lymphocytes_wbc";
pub const ABSOLUTE_LYMPHOCYTES_LYMPH: &str = "Absolute Lymphocytes_lymph";
pub const CBC_TEST_ORDER: &str = "CBC (Includes Diff/Plt)";
pub const LYMPHOCYTE_SUBSET_TEST_ORDER: &str = "Lymphocyte Subset Panel 3";

/// Result columns every pivot carries, whether or not the patient has data.
pub const GUARANTEED_COLUMNS: [&str; 2] = [ABSOLUTE_LYMPHOCYTES_WBC, ABSOLUTE_LYMPHOCYTES_LYMPH];

/// Renames a result name when it was produced by a specific test order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisambiguationRule {
    pub result_name: &'static str,
    pub test_order_name: &'static str,
    pub renamed: &'static str,
}

pub const DISAMBIGUATION_RULES: [DisambiguationRule; 2] = [
    DisambiguationRule {
        result_name: ABSOLUTE_LYMPHOCYTES,
        test_order_name: CBC_TEST_ORDER,
        renamed: ABSOLUTE_LYMPHOCYTES_WBC,
    },
    DisambiguationRule {
        result_name: ABSOLUTE_LYMPHOCYTES,
        test_order_name: LYMPHOCYTE_SUBSET_TEST_ORDER,
        renamed: ABSOLUTE_LYMPHOCYTES_LYMPH,
    },
];

/// Apply the first matching rule. Returns true if the name changed.
///
/// Observations whose test order matches no rule keep their label.
pub fn disambiguate(observation: &mut LabObservation) -> bool {
    let rule = DISAMBIGUATION_RULES.iter().find(|rule| {
        observation.result_name == rule.result_name
            && observation.test_order_name == rule.test_order_name
    });
    match rule {
        Some(rule) => {
            observation.result_name = rule.renamed.to_string();
            true
        }
        None => false,
    }
}

/// One cell of the wide table: a visit and a result name.
pub type CellKey = (VisitKey, String);

/// Observations reduced to at most one per cell.
#[derive(Debug, Clone, Default)]
pub struct ResolvedCells {
    pub cells: BTreeMap<CellKey, LabObservation>,
    pub conflicts: Vec<ConflictResolution>,
}

/// Keep the latest report for every (visit, result name) cell.
///
/// Reports are ordered by parsed `Reported Date`; a date that does not parse
/// ranks below every parsed one. Among equal dates the later source row wins.
pub fn resolve_conflicts(observations: Vec<LabObservation>) -> ResolvedCells {
    // Each cell holds its current best report and how many reports it has seen.
    let mut reduced: BTreeMap<CellKey, (LabObservation, usize)> = BTreeMap::new();
    for observation in observations {
        let key = (observation.visit_key(), observation.result_name.clone());
        match reduced.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert((observation, 1));
            }
            Entry::Occupied(mut slot) => {
                let (retained, candidates) = slot.get_mut();
                *candidates += 1;
                if parse_reported_date(&observation.reported_date)
                    >= parse_reported_date(&retained.reported_date)
                {
                    *retained = observation;
                }
            }
        }
    }

    let mut resolved = ResolvedCells::default();
    for (key, (retained, candidates)) in reduced {
        if candidates > 1 {
            resolved.conflicts.push(ConflictResolution {
                patient_id: key.0.patient_id.clone(),
                result_name: key.1.clone(),
                draw_date: key.0.draw_date.clone(),
                draw_time: key.0.draw_time.clone(),
                candidates,
                retained_reported_date: retained.reported_date.clone(),
            });
        }
        resolved.cells.insert(key, retained);
    }
    resolved
}

/// Wide view of one patient's results.
#[derive(Debug, Clone, Default)]
pub struct PatientPivot {
    pub patient_id: String,
    /// Result names with at least one value, plus [`GUARANTEED_COLUMNS`].
    pub result_columns: BTreeSet<String>,
    /// Numeric cells per visit. Visits with no numeric result are absent.
    pub visits: BTreeMap<VisitKey, BTreeMap<String, f64>>,
    pub conflicts: Vec<ConflictResolution>,
    /// Number of observations renamed by [`DISAMBIGUATION_RULES`].
    pub disambiguated: usize,
}

impl PatientPivot {
    pub fn visit_count(&self) -> usize {
        self.visits.len()
    }

    pub fn value(&self, visit: &VisitKey, result_name: &str) -> Option<f64> {
        self.visits.get(visit)?.get(result_name).copied()
    }
}

/// Disambiguate, deduplicate and pivot one patient's observations.
///
/// A cell whose retained observation has no numeric value stays missing. A
/// visit left with no numeric cell at all produces no row, since an output
/// row asserts that lab data is present.
pub fn pivot_patient(patient_id: &str, mut observations: Vec<LabObservation>) -> PatientPivot {
    let mut disambiguated = 0usize;
    for observation in &mut observations {
        if disambiguate(observation) {
            disambiguated += 1;
        }
    }

    let ResolvedCells { cells, conflicts } = resolve_conflicts(observations);

    let mut result_columns: BTreeSet<String> = GUARANTEED_COLUMNS
        .iter()
        .map(|name| (*name).to_string())
        .collect();
    let mut visits: BTreeMap<VisitKey, BTreeMap<String, f64>> = BTreeMap::new();
    for ((visit, result_name), observation) in cells {
        let Some(value) = observation.value else {
            continue;
        };
        result_columns.insert(result_name.clone());
        visits.entry(visit).or_default().insert(result_name, value);
    }

    PatientPivot {
        patient_id: patient_id.to_string(),
        result_columns,
        visits,
        conflicts,
        disambiguated,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observation(
        result_name: &str,
        value: Option<f64>,
        reported_date: &str,
        test_order_name: &str,
    ) -> LabObservation {
        LabObservation {
            patient_id: "123".to_string(),
            draw_date: "01/15/2024".to_string(),
            draw_time: "10:30".to_string(),
            result_name: result_name.to_string(),
            value,
            reported_date: reported_date.to_string(),
            test_order_name: test_order_name.to_string(),
        }
    }

    fn visit() -> VisitKey {
        VisitKey::new("123", "01/15/2024", "10:30")
    }

    #[test]
    fn disambiguates_lymphocytes_by_panel() {
        let mut cbc = observation("Absolute Lymphocytes", Some(1.5), "", CBC_TEST_ORDER);
        let mut subset = observation(
            "Absolute Lymphocytes",
            Some(1.2),
            "",
            LYMPHOCYTE_SUBSET_TEST_ORDER,
        );
        let mut other = observation("Absolute Lymphocytes", Some(1.1), "", "Other Panel");
        assert!(disambiguate(&mut cbc));
        assert!(disambiguate(&mut subset));
        assert!(!disambiguate(&mut other));
        assert_eq!(cbc.result_name, ABSOLUTE_LYMPHOCYTES_WBC);
        assert_eq!(subset.result_name, ABSOLUTE_LYMPHOCYTES_LYMPH);
        assert_eq!(other.result_name, ABSOLUTE_LYMPHOCYTES);
    }

    #[test]
    fn other_tests_are_not_renamed() {
        let mut glucose = observation("Glucose", Some(100.0), "", CBC_TEST_ORDER);
        assert!(!disambiguate(&mut glucose));
        assert_eq!(glucose.result_name, "Glucose");
    }

    #[test]
    fn latest_report_wins() {
        let resolved = resolve_conflicts(vec![
            observation("Glucose", Some(110.0), "01/16/2024 09:00", ""),
            observation("Glucose", Some(100.0), "01/15/2024 11:00", ""),
        ]);
        assert_eq!(resolved.cells.len(), 1);
        let kept = &resolved.cells[&(visit(), "Glucose".to_string())];
        assert_eq!(kept.value, Some(110.0));
        assert_eq!(resolved.conflicts.len(), 1);
        assert_eq!(resolved.conflicts[0].candidates, 2);
        assert_eq!(
            resolved.conflicts[0].retained_reported_date,
            "01/16/2024 09:00"
        );
    }

    #[test]
    fn unparseable_report_ranks_lowest() {
        let resolved = resolve_conflicts(vec![
            observation("Glucose", Some(100.0), "01/15/2024 11:00", ""),
            observation("Glucose", Some(999.0), "corrected", ""),
        ]);
        let kept = &resolved.cells[&(visit(), "Glucose".to_string())];
        assert_eq!(kept.value, Some(100.0));
    }

    #[test]
    fn equal_reports_keep_later_row() {
        let resolved = resolve_conflicts(vec![
            observation("Glucose", Some(100.0), "01/15/2024 11:00", ""),
            observation("Glucose", Some(105.0), "01/15/2024 11:00", ""),
        ]);
        let kept = &resolved.cells[&(visit(), "Glucose".to_string())];
        assert_eq!(kept.value, Some(105.0));
    }

    #[test]
    fn three_reports_keep_latest_regardless_of_position() {
        let resolved = resolve_conflicts(vec![
            observation("Glucose", Some(100.0), "01/15/2024 11:00", ""),
            observation("Glucose", Some(120.0), "01/17/2024 08:00", ""),
            observation("Glucose", Some(110.0), "01/16/2024 09:00", ""),
        ]);
        let kept = &resolved.cells[&(visit(), "Glucose".to_string())];
        assert_eq!(kept.value, Some(120.0));
        assert_eq!(resolved.conflicts.len(), 1);
        assert_eq!(resolved.conflicts[0].candidates, 3);
        assert_eq!(
            resolved.conflicts[0].retained_reported_date,
            "01/17/2024 08:00"
        );
    }

    #[test]
    fn unique_cells_report_no_conflict() {
        let resolved = resolve_conflicts(vec![
            observation("Glucose", Some(100.0), "01/15/2024 11:00", ""),
            observation("Sodium", Some(140.0), "01/15/2024 11:00", ""),
        ]);
        assert_eq!(resolved.cells.len(), 2);
        assert!(resolved.conflicts.is_empty());
    }

    #[test]
    fn pivot_keeps_both_lymphocyte_counts() {
        let pivot = pivot_patient(
            "123",
            vec![
                observation("Absolute Lymphocytes", Some(1.5), "", CBC_TEST_ORDER),
                observation(
                    "Absolute Lymphocytes",
                    Some(1.2),
                    "",
                    LYMPHOCYTE_SUBSET_TEST_ORDER,
                ),
            ],
        );
        assert_eq!(pivot.visit_count(), 1);
        assert!(pivot.conflicts.is_empty());
        assert_eq!(pivot.disambiguated, 2);
        assert_eq!(pivot.value(&visit(), ABSOLUTE_LYMPHOCYTES_WBC), Some(1.5));
        assert_eq!(pivot.value(&visit(), ABSOLUTE_LYMPHOCYTES_LYMPH), Some(1.2));
    }

    #[test]
    fn pivot_guarantees_lymphocyte_columns() {
        let pivot = pivot_patient(
            "123",
            vec![observation("Glucose", Some(100.0), "", "")],
        );
        for column in GUARANTEED_COLUMNS {
            assert!(pivot.result_columns.contains(column));
            assert_eq!(pivot.value(&visit(), column), None);
        }
        assert!(pivot.result_columns.contains("Glucose"));
    }

    #[test]
    fn pivot_splits_visits_by_draw_time() {
        let mut later = observation("Glucose", Some(90.0), "", "");
        later.draw_time = "14:00".to_string();
        let pivot = pivot_patient(
            "123",
            vec![observation("Glucose", Some(100.0), "", ""), later],
        );
        assert_eq!(pivot.visit_count(), 2);
        let afternoon = VisitKey::new("123", "01/15/2024", "14:00");
        assert_eq!(pivot.value(&afternoon, "Glucose"), Some(90.0));
        assert!(pivot.conflicts.is_empty());
    }

    #[test]
    fn visits_without_numeric_results_are_dropped() {
        let pivot = pivot_patient(
            "123",
            vec![observation("HIV-1/2 Antibody", None, "", "")],
        );
        assert_eq!(pivot.visit_count(), 0);
        assert!(!pivot.result_columns.contains("HIV-1/2 Antibody"));
    }

    #[test]
    fn latest_missing_value_overrides_earlier_number() {
        let pivot = pivot_patient(
            "123",
            vec![
                observation("Glucose", Some(100.0), "01/15/2024 11:00", ""),
                observation("Glucose", None, "01/15/2024 12:00", ""),
                observation("Sodium", Some(140.0), "01/15/2024 11:00", ""),
            ],
        );
        assert_eq!(pivot.value(&visit(), "Glucose"), None);
        assert_eq!(pivot.value(&visit(), "Sodium"), Some(140.0));
        assert_eq!(pivot.conflicts.len(), 1);
    }
}
