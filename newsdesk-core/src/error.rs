//! Error types for query validation

use chrono::NaiveDate;
use thiserror::Error;

/// Rejections raised while building a query, before any fetch happens
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("from_date ({from}) must be before or equal to to_date ({to})")]
    InvalidRange { from: NaiveDate, to: NaiveDate },

    #[error("Date range spans {days} days, at most {max} are allowed")]
    RangeTooLong { days: usize, max: usize },

    #[error("Invalid date format: {0}. Use YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Limit must be between 1 and {max}, got {got}")]
    InvalidLimit { got: usize, max: usize },

    #[error("Page must be >= 1")]
    InvalidPage,

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl QueryError {
    pub fn invalid_date(raw: impl Into<String>) -> Self {
        QueryError::InvalidDate(raw.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        QueryError::InvalidInput(msg.into())
    }
}

/// Result type alias for query construction
pub type QueryResult<T> = Result<T, QueryError>;
