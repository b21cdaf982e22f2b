//! Property tests for value normalization, pivoting and allow-list extraction.

use proptest::prelude::*;

use labs_model::{LabObservation, VisitKey};
use labs_transform::{extract_allow_list_id, normalize_result_value, parse_f64, pivot_patient};

fn glucose(value: f64, day: u32) -> LabObservation {
    LabObservation {
        patient_id: "123".to_string(),
        draw_date: "01/15/2024".to_string(),
        draw_time: "10:30".to_string(),
        result_name: "Glucose".to_string(),
        value: Some(value),
        reported_date: format!("01/{day:02}/2024 09:00"),
        test_order_name: "CMP".to_string(),
    }
}

proptest! {
    #[test]
    fn plain_numbers_round_trip(value in -1.0e6f64..1.0e6) {
        let text = value.to_string();
        prop_assert_eq!(normalize_result_value(&text), Some(value));
    }

    #[test]
    fn trailing_unit_is_ignored(value in 0.0f64..1.0e4, unit in "[a-zA-Z/]{1,8}") {
        let text = format!("{value} {unit}");
        prop_assert_eq!(normalize_result_value(&text), Some(value));
    }

    #[test]
    fn percent_suffix_is_ignored(value in 0.0f64..100.0) {
        let text = format!("{value}%");
        prop_assert_eq!(normalize_result_value(&text), Some(value));
    }

    #[test]
    fn normalized_values_are_finite(text in "\\PC{0,16}") {
        if let Some(value) = normalize_result_value(&text) {
            prop_assert!(value.is_finite());
        }
        if let Some(value) = parse_f64(&text) {
            prop_assert!(value.is_finite());
        }
    }

    #[test]
    fn allow_list_ids_have_no_leading_zero(prefix in "[A-Z-]{0,4}", zeros in 0usize..4, id in 1u32..100_000) {
        let entry = format!("{prefix}{}{id}", "0".repeat(zeros));
        prop_assert_eq!(extract_allow_list_id(&entry), Some(id.to_string()));
    }

    #[test]
    fn latest_report_wins_in_any_order(values in prop::collection::vec(0.0f64..500.0, 1..8)) {
        let observations: Vec<LabObservation> = values
            .iter()
            .enumerate()
            .map(|(idx, value)| glucose(*value, idx as u32 + 1))
            .collect();
        let mut reversed = observations.clone();
        reversed.reverse();

        let visit = VisitKey::new("123", "01/15/2024", "10:30");
        let expected = values.last().copied();
        let forward = pivot_patient("123", observations);
        let backward = pivot_patient("123", reversed);

        prop_assert_eq!(forward.value(&visit, "Glucose"), expected);
        prop_assert_eq!(backward.value(&visit, "Glucose"), expected);
        prop_assert_eq!(forward.visit_count(), 1);
        prop_assert_eq!(forward.conflicts.len(), usize::from(values.len() > 1));
    }
}
