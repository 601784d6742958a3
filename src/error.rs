//! Error types for the query engine.
//!
//! Only [`QueryError::InvalidFilter`] is ever absorbed inside the engine (a
//! single malformed filter is skipped while its siblings still apply). Every
//! other variant surfaces to the caller unchanged.

use crate::config::ConfigurationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Cannot resolve path '{path}' on {entity}: {reason}")]
    PathResolution {
        entity: String,
        path: String,
        reason: String,
    },
    #[error("Invalid operator: {0}")]
    InvalidOperator(String),
    #[error("Invalid filter on '{field}': {reason}")]
    InvalidFilter { field: String, reason: String },
    #[error("Invalid query: {0}")]
    InvalidQuery(String),
    #[error(transparent)]
    Store(#[from] sqlx::Error),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl QueryError {
    pub fn path_resolution(
        entity: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        QueryError::PathResolution {
            entity: entity.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_filter(field: impl Into<String>, reason: impl Into<String>) -> Self {
        QueryError::InvalidFilter {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether the predicate builder may drop the offending filter and continue.
    pub fn is_recoverable_filter_error(&self) -> bool {
        matches!(self, QueryError::InvalidFilter { .. })
    }
}

pub type Result<T> = std::result::Result<T, QueryError>;
