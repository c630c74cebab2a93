// SPDX-License-Identifier: GPL-3.0-only

use thiserror::Error;

/// Errors raised while building or rendering a report
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report memory budget exhausted: {requested} bytes requested, {remaining} remaining")]
    AllocationFailure { requested: usize, remaining: usize },

    #[error("value {value:?} does not fit a {width}-character field")]
    FormatOverflow { value: String, width: usize },

    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("live state query failed for {volume}: {reason}")]
    LiveQuery { volume: String, reason: String },

    #[error("unknown field: {0}")]
    UnknownField(String),

    #[error("field {field} is not available in {report} reports")]
    FieldUnavailable { field: String, report: &'static str },

    #[error("invalid sort key: {0}")]
    InvalidSortKey(String),

    #[error("invalid units: {0}")]
    InvalidUnits(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("field {field}: {source}")]
    Field {
        field: &'static str,
        #[source]
        source: Box<ReportError>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReportError {
    /// Attach the id of the column being formatted.
    pub fn in_field(self, field: &'static str) -> Self {
        match self {
            ReportError::Field { .. } => self,
            other => ReportError::Field {
                field,
                source: Box::new(other),
            },
        }
    }
}

/// Result type alias for report operations
pub type Result<T> = std::result::Result<T, ReportError>;
