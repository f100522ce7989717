//! Injector errors

use thiserror::Error;

/// Errors raised while registering or resolving modules
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InjectError {
    #[error("Module not found: {0}")]
    NotFound(String),

    #[error("Circular dependency: {chain}")]
    CircularDependency { chain: String },

    #[error("Module '{name}' is not a {expected}")]
    TypeMismatch { name: String, expected: &'static str },

    #[error("Module '{name}' asked for dependency #{index} but only {len} were declared")]
    MissingArgument { name: String, index: usize, len: usize },

    #[error("Factory for '{name}' failed: {message}")]
    Factory { name: String, message: String },
}

impl InjectError {
    /// Build a factory failure from any displayable error
    pub fn factory(name: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Factory {
            name: name.into(),
            message: message.to_string(),
        }
    }
}

pub type InjectResult<T> = Result<T, InjectError>;
