//! Error types for statement building operations

use thiserror::Error;

/// Errors that can occur while binding values or assembling statements
#[derive(Debug, Error)]
pub enum SqlBuilderError {
    #[error("No match: {0}")]
    NoMatch(String),

    #[error(
        "Strict mode was enabled, but '{name}' could not be matched to a column in {target}. \
         Disable strict mode or remove it from the input."
    )]
    StrictMismatch { name: String, target: String },

    #[error("No primary key: could not find a primary key or identity column for {0}")]
    NoPrimaryKey(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SqlBuilderError {
    pub fn no_match(msg: impl Into<String>) -> Self {
        Self::NoMatch(msg.into())
    }

    pub fn strict_mismatch(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self::StrictMismatch {
            name: name.into(),
            target: target.into(),
        }
    }

    pub fn no_primary_key(msg: impl Into<String>) -> Self {
        Self::NoPrimaryKey(msg.into())
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn object_not_found(msg: impl Into<String>) -> Self {
        Self::ObjectNotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, SqlBuilderError>;
