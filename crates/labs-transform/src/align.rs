//! Alignment of pivoted results to the REDCap destination schema.

use std::collections::{BTreeMap, BTreeSet};

use labs_model::{ColumnMapping, RedcapOptions, UnmappedColumns, WideVisitRow};

use crate::pivot::PatientPivot;

/// One patient's rows in destination order, plus what could not be mapped.
#[derive(Debug, Clone, Default)]
pub struct AlignedPatient {
    pub rows: Vec<WideVisitRow>,
    pub unmapped: Option<UnmappedColumns>,
}

/// Renames, fills and orders pivoted results per the lookup table.
///
/// Borrows the immutable mapping built at startup; one aligner serves every
/// patient of a run.
#[derive(Debug, Clone, Copy)]
pub struct SchemaAligner<'a> {
    mapping: &'a ColumnMapping,
    observed_result_names: &'a BTreeSet<String>,
    options: &'a RedcapOptions,
}

impl<'a> SchemaAligner<'a> {
    /// `observed_result_names` holds every `Result Name` seen anywhere in the
    /// source, before disambiguation.
    pub fn new(
        mapping: &'a ColumnMapping,
        observed_result_names: &'a BTreeSet<String>,
        options: &'a RedcapOptions,
    ) -> Self {
        Self {
            mapping,
            observed_result_names,
            options,
        }
    }

    /// Pivoted columns that are real source tests but have no lookup entry.
    pub fn unmapped_columns(&self, pivot: &PatientPivot) -> Vec<String> {
        pivot
            .result_columns
            .iter()
            .filter(|name| self.observed_result_names.contains(*name))
            .filter(|name| !self.mapping.is_mapped(name))
            .cloned()
            .collect()
    }

    /// Produce one destination row per visit, in visit order.
    pub fn align(&self, pivot: &PatientPivot) -> AlignedPatient {
        let unmapped = self.unmapped_columns(pivot);
        let rows = pivot
            .visits
            .iter()
            .map(|(visit, cells)| WideVisitRow {
                id: pivot.patient_id.clone(),
                event_name: self.options.event_name.clone(),
                repeat_instrument: self.options.repeat_instrument.clone(),
                repeat_instance: self.options.repeat_instance,
                labs_missing: self.options.labs_missing,
                draw_date: visit.draw_date.clone(),
                draw_time: visit.draw_time.clone(),
                values: self
                    .mapping
                    .value_columns()
                    .iter()
                    .map(|destination| self.cell_value(cells, destination))
                    .collect(),
            })
            .collect();

        AlignedPatient {
            rows,
            unmapped: (!unmapped.is_empty()).then(|| UnmappedColumns {
                patient_id: pivot.patient_id.clone(),
                columns: unmapped,
            }),
        }
    }

    /// Value for a destination column.
    ///
    /// Mapped sources are consulted first. An unmapped pivot column whose name
    /// equals the destination passes through unchanged.
    fn cell_value(&self, cells: &BTreeMap<String, f64>, destination: &str) -> Option<f64> {
        self.mapping
            .sources_for(destination)
            .iter()
            .find_map(|source| cells.get(source).copied())
            .or_else(|| {
                if self.mapping.is_mapped(destination) {
                    None
                } else {
                    cells.get(destination).copied()
                }
            })
    }
}
