use crate::album_store::StoreError;
use thiserror::Error;

/// Reasons a query is rejected. Validation failures never reach the store.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Invalid filter '{param}': {reason}")]
    InvalidFilter { param: String, reason: String },

    #[error("Invalid sort '{param}': {reason}")]
    InvalidSort { param: String, reason: String },

    #[error("Invalid pagination '{param}': {reason}")]
    InvalidPagination { param: String, reason: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl QueryError {
    pub(crate) fn filter(param: impl Into<String>, reason: impl Into<String>) -> Self {
        QueryError::InvalidFilter {
            param: param.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn sort(param: impl Into<String>, reason: impl Into<String>) -> Self {
        QueryError::InvalidSort {
            param: param.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn pagination(param: impl Into<String>, reason: impl Into<String>) -> Self {
        QueryError::InvalidPagination {
            param: param.into(),
            reason: reason.into(),
        }
    }

    /// The request parameter that caused the rejection, if any.
    pub fn param(&self) -> Option<&str> {
        match self {
            QueryError::InvalidFilter { param, .. }
            | QueryError::InvalidSort { param, .. }
            | QueryError::InvalidPagination { param, .. } => Some(param),
            QueryError::Store(_) => None,
        }
    }

    /// Whether the caller sent a request that can never succeed as is.
    pub fn is_validation_error(&self) -> bool {
        !matches!(self, QueryError::Store(_))
    }
}
