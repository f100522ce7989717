//! Region errors

use thiserror::Error;

/// Region and part errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegionError {
    #[error("Region already registered: {0}")]
    AlreadyRegistered(String),

    #[error("Default region already set to '{existing}', cannot make '{requested}' default")]
    DefaultConflict { existing: String, requested: String },

    #[error("showSingle needs exactly one region or a default region, found {count} regions")]
    AmbiguousRegion { count: usize },

    #[error("Region not found: {0}")]
    NotFound(String),

    #[error("Region '{0}' has been destroyed")]
    Destroyed(String),

    #[error("Render failed in region '{region}': {message}")]
    Render { region: String, message: String },
}

pub type RegionResult<T> = Result<T, RegionError>;
