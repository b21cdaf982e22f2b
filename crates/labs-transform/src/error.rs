//! Error types for the pivot-and-reconcile engine.

use labs_ingest::IngestError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    /// The prepared source table lacks columns the pivot needs.
    #[error("missing required columns: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },

    #[error(transparent)]
    Ingest(#[from] IngestError),
}

impl From<polars::prelude::PolarsError> for TransformError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;
