//! Query validation errors.

use thiserror::Error;

/// Reasons a client query is rejected before it reaches storage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("field '{0}' is not queryable")]
    InvalidField(String),

    #[error("operator '{0}' is not supported")]
    InvalidOperator(String),

    #[error("invalid value for '{field}' {operator}: {reason}")]
    InvalidValueShape {
        field: String,
        operator: String,
        reason: String,
    },

    #[error("too many conditions: {count} exceeds the maximum of {max}")]
    TooManyConditions { count: usize, max: usize },

    #[error("at least one condition is required")]
    EmptyConditions,

    #[error("page size {size} must be between 1 and {max}")]
    InvalidPageSize { size: u64, max: u64 },

    #[error("page number must be at least 1")]
    InvalidPageNumber,

    #[error("cursor {0} is out of range")]
    InvalidCursor(u64),

    #[error("sort direction '{0}' must be 'asc' or 'desc'")]
    InvalidSortDirection(String),

    #[error("combinator '{0}' must be 'and' or 'or'")]
    InvalidCombinator(String),

    #[error("cursor pagination is ordered by '{expected}', cannot sort by '{requested}'")]
    CursorSortMismatch { expected: String, requested: String },
}

impl QueryError {
    pub(crate) fn shape(
        field: impl Into<String>,
        operator: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        QueryError::InvalidValueShape {
            field: field.into(),
            operator: operator.into(),
            reason: reason.into(),
        }
    }
}
