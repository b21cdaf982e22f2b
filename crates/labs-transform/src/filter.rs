//! Identifier allow-list filtering.
//!
//! Allow-list entries are free text such as `S00123` or `HIV-0042`. The first
//! run of digits is the identifier, with leading zeros removed. Output `id`
//! values are compared as-is: they already lost their zero padding when the
//! lab prefix was stripped.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use polars::prelude::{BooleanChunked, DataFrame, NewChunkedArray};
use regex::Regex;
use tracing::debug;

use labs_model::COL_ID;

use crate::error::Result;

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("digit pattern is valid"));

/// Extract the identifier from an allow-list entry.
///
/// Returns None when the entry has no digits or only zeros.
pub fn extract_allow_list_id(raw: &str) -> Option<String> {
    let digits = DIGIT_RUN.find(raw)?.as_str();
    let id = digits.trim_start_matches('0');
    (!id.is_empty()).then(|| id.to_string())
}

/// Set of identifiers allowed into the output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    ids: BTreeSet<String>,
}

impl AllowList {
    /// Build from raw allow-list entries; entries without an identifier are ignored.
    pub fn from_values<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            ids: values
                .into_iter()
                .filter_map(|value| extract_allow_list_id(value.as_ref()))
                .collect(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Keep only rows whose `id` is allow-listed.
pub fn filter_by_allow_list(df: &DataFrame, allow_list: &AllowList) -> Result<DataFrame> {
    let ids = df.column(COL_ID)?.str()?;
    let keep: Vec<bool> = ids
        .into_iter()
        .map(|id| id.is_some_and(|id| allow_list.contains(id)))
        .collect();
    let mask = BooleanChunked::from_slice("allow_list".into(), &keep);
    let filtered = df.filter(&mask)?;
    debug!(
        allowed_ids = allow_list.len(),
        rows_before = df.height(),
        rows_after = filtered.height(),
        "applied id allow-list"
    );
    Ok(filtered)
}
