//! Error and diagnostic types shared by the normalization, aggregation and
//! account modules.
//!
//! Structural failures are [`StatsError`] values returned to the caller.
//! Soft conditions (no input, rows skipped during aggregation) are
//! [`Diagnostic`] values that travel next to a successful result.

use std::fmt;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum StatsError {
    /// The operation needs at least one row (or one dated row).
    #[error("cannot compute {operation}: the table has no rows")]
    EmptyTable { operation: &'static str },

    /// An account-data file was requested but is not part of the export.
    #[error("file '{0}' not found in the account data")]
    MissingFile(String),

    /// A date string is not in strict `YYYY-MM-DD` form.
    #[error("invalid date '{value}': expected YYYY-MM-DD")]
    DateFormat { value: String },

    /// A column required by the operation is neither in the rows nor a constant.
    #[error("column '{0}' is not present in the history table")]
    UnknownColumn(String),

    /// The configured data directory did not exist (it has been created).
    #[error("data directory was not found and has been created, place your export in {}", .0.display())]
    DataDirMissing(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StatsError>;

/// Non-fatal condition reported alongside a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// Normalization received no records.
    NoData,
    /// Rows excluded from an aggregation because a field could not be used.
    SkippedRows { operation: &'static str, count: usize },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::NoData => write!(f, "It seems like you have not listened to anything"),
            Diagnostic::SkippedRows { operation, count } => {
                write!(f, "{}: skipped {} unusable rows", operation, count)
            }
        }
    }
}

impl Diagnostic {
    /// A `SkippedRows` diagnostic, or `None` when nothing was skipped.
    pub fn skipped(operation: &'static str, count: usize) -> Option<Self> {
        (count > 0).then_some(Diagnostic::SkippedRows { operation, count })
    }
}
