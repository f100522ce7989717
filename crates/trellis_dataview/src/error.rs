//! Data-view errors

use thiserror::Error;

use crate::transport::TransportError;

/// Data-view errors
#[derive(Debug, Error)]
pub enum DataViewError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("{provider} provider does not support {kind} filters")]
    UnsupportedFilter {
        provider: &'static str,
        kind: &'static str,
    },

    #[error("{provider} provider does not support grouping")]
    UnsupportedGrouping { provider: &'static str },

    #[error("No operation configured for remote load")]
    MissingOperation,

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for data-view operations
pub type DataViewResult<T> = Result<T, DataViewError>;
