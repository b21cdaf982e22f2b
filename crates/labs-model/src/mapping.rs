//! Lookup-table driven column mapping.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::visit::IDENTITY_COLUMNS;

/// One row of the lookup table (`quest_col`, `redcap_col`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingEntry {
    pub source_column: String,
    pub destination_column: String,
}

impl MappingEntry {
    pub fn new(source_column: impl Into<String>, destination_column: impl Into<String>) -> Self {
        Self {
            source_column: source_column.into(),
            destination_column: destination_column.into(),
        }
    }
}

/// Immutable mapping between Quest result names and REDCap fields.
///
/// Built once from the lookup table. It holds the rename lookup in both
/// directions and the destination columns in lookup-file order.
#[derive(Debug, Clone, Default)]
pub struct ColumnMapping {
    renames: BTreeMap<String, String>,
    sources_by_destination: BTreeMap<String, Vec<String>>,
    destinations: Vec<String>,
    value_columns: Vec<String>,
    overridden_sources: Vec<String>,
}

impl ColumnMapping {
    /// Build the mapping from lookup table rows.
    ///
    /// Values are trimmed. A row with an empty destination is ignored; a row
    /// with an empty source still declares its destination column. When the
    /// same source appears twice, the later row wins.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = MappingEntry>,
    {
        let mut renames = BTreeMap::new();
        let mut destinations = Vec::new();
        let mut seen = BTreeSet::new();
        let mut overridden_sources = Vec::new();

        for entry in entries {
            let source = entry.source_column.trim();
            let destination = entry.destination_column.trim();
            if destination.is_empty() {
                continue;
            }
            if seen.insert(destination.to_string()) {
                destinations.push(destination.to_string());
            }
            if source.is_empty() {
                continue;
            }
            if let Some(previous) = renames.insert(source.to_string(), destination.to_string())
                && previous != destination
            {
                overridden_sources.push(source.to_string());
            }
        }

        let mut sources_by_destination: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (source, destination) in &renames {
            sources_by_destination
                .entry(destination.clone())
                .or_default()
                .push(source.clone());
        }

        let value_columns = destinations
            .iter()
            .filter(|name| !IDENTITY_COLUMNS.contains(&name.as_str()))
            .cloned()
            .collect();

        Self {
            renames,
            sources_by_destination,
            destinations,
            value_columns,
            overridden_sources,
        }
    }

    /// REDCap field a Quest result name is renamed to.
    pub fn destination_for(&self, source: &str) -> Option<&str> {
        self.renames.get(source).map(String::as_str)
    }

    /// Quest result names that rename to the given REDCap field.
    pub fn sources_for(&self, destination: &str) -> &[String] {
        self.sources_by_destination
            .get(destination)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_mapped(&self, source: &str) -> bool {
        self.renames.contains_key(source)
    }

    /// Every destination column, in lookup-file order, without duplicates.
    pub fn destinations(&self) -> &[String] {
        &self.destinations
    }

    /// Destination columns that follow the fixed identity block in the output.
    pub fn value_columns(&self) -> &[String] {
        &self.value_columns
    }

    /// Sources that appeared more than once with different destinations.
    pub fn overridden_sources(&self) -> &[String] {
        &self.overridden_sources
    }

    pub fn len(&self) -> usize {
        self.renames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renames.is_empty()
    }
}
