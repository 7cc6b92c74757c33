//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! invalid persisted options, registry validation before a stroke, registry add refusals,
//! host scene failures and generic errors.
use thiserror::Error;

use crate::options::OptionsInvalid;
use crate::registry::AddRejection;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    InvalidOptions(#[from] OptionsInvalid),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Rejected(#[from] AddRejection),

    #[error("unknown registry entry '{key}'")]
    UnknownEntry { key: String },

    #[error("scene error: {0}")]
    Scene(String),

    #[error("{0}")]
    Other(String),
}

/// Reasons a paint or place tool refuses to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Source list is empty or object(s) have been deleted")]
    SourceInvalid,

    #[error("Target list is empty or object(s) have been deleted")]
    TargetInvalid,

    #[error("Object(s) can't be in both the source and target lists")]
    Overlap,
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}
