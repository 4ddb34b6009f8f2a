//! Error types for the rowset engine.
//!
//! Every fallible operation returns [`RowSetError`]:
//!
//! - [`RowSetError::ColumnCountMismatch`] - metadata or column list disagrees with the dataset
//! - [`RowSetError::MalformedDataset`] - missing or ill-typed `columns` / `data`
//! - [`RowSetError::InvalidNameList`] - a delimited name string could not be read
//! - [`RowSetError::ObserverFailure`] / [`RowSetError::ObserverFailures`] - observer callbacks
//!
//! Errors are returned to the immediate caller and never logged or retried here.

use std::fmt;

use thiserror::Error;

// =============================================================================
// Column Sources
// =============================================================================

/// Which configured naming source disagreed with the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnSourceKind {
    /// Explicit `{name, typeName}` metadata list.
    Metadata,
    /// Delimited column name list.
    NameList,
}

impl fmt::Display for ColumnSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnSourceKind::Metadata => f.write_str("metadata"),
            ColumnSourceKind::NameList => f.write_str("column list"),
        }
    }
}

// =============================================================================
// Observer Errors
// =============================================================================

/// Failure reported by an observer callback.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ObserverError {
    message: String,
}

impl ObserverError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

// =============================================================================
// RowSet Errors (top-level)
// =============================================================================

/// Errors raised while deriving columns, materializing rows or notifying observers.
#[derive(Debug, Error)]
pub enum RowSetError {
    /// A metadata list or column list has a different length than the dataset's columns.
    #[error("{source_kind} has {provided} entries but the dataset has {expected} columns")]
    ColumnCountMismatch {
        source_kind: ColumnSourceKind,
        provided: usize,
        expected: usize,
    },

    /// Dataset is missing its column names or row values, or a row has the wrong shape.
    #[error("Malformed dataset: {0}")]
    MalformedDataset(String),

    /// Delimited name list could not be parsed.
    #[error("Invalid name list: {0}")]
    InvalidNameList(String),

    /// An observer failed and halted the remaining notifications.
    #[error("Observer #{position} failed on '{event}': {source}")]
    ObserverFailure {
        event: String,
        position: usize,
        #[source]
        source: ObserverError,
    },

    /// One or more observers failed; every observer was still notified.
    #[error("{} observer(s) failed on '{event}'", .failures.len())]
    ObserverFailures {
        event: String,
        failures: Vec<(usize, ObserverError)>,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RowSetError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        RowSetError::MalformedDataset(reason.into())
    }
}

impl From<csv::Error> for RowSetError {
    fn from(err: csv::Error) -> Self {
        RowSetError::InvalidNameList(err.to_string())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for rowset operations.
pub type RowSetResult<T> = Result<T, RowSetError>;

/// Result type returned by observer callbacks.
pub type ObserverResult = Result<(), ObserverError>;
