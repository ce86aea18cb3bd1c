//! Unified error type for the CRM service.
//!
//! Every core operation returns [`Result`]. The API layer turns mutation errors into
//! structured payloads through [`Error::summary`] and [`Error::messages`].

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// All failures the service can report.
#[derive(Debug, Error)]
pub enum Error {
    /// One or more required fields are missing or malformed.
    #[error("Validation failed: {}", errors.join(" "))]
    Validation {
        /// Every violation found, in field order
        errors: Vec<String>,
    },

    /// A numeric constraint was violated (non-positive price, negative stock, ...).
    #[error("{message}")]
    InvalidValue {
        /// Human-readable description of the violated constraint
        message: String,
    },

    /// A unique constraint would be violated.
    #[error("{message}")]
    Duplicate {
        /// Human-readable description of the conflicting value
        message: String,
    },

    /// A referenced record does not exist.
    #[error("Invalid {entity} ID: {id}")]
    NotFound {
        /// Record kind, lower-case (e.g. `"customer"`)
        entity: &'static str,
        /// The reference exactly as supplied by the caller
        id: String,
    },

    /// Unexpected store-level failure.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Settings could not be loaded.
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong while loading configuration
        message: String,
    },

    /// I/O failure outside the database (binding the listener, reading files).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Short message suitable for a payload's `message` field.
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::Validation { .. } => "Validation failed.".to_string(),
            Self::InvalidValue { message } | Self::Duplicate { message } => message.clone(),
            Self::NotFound { entity, .. } => format!("Invalid {entity} ID."),
            Self::Database(_) | Self::Io(_) => "Unexpected persistence error.".to_string(),
            Self::Config { .. } => "Service misconfigured.".to_string(),
        }
    }

    /// Every individual error message, suitable for a payload's `errors` list.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Validation { errors } => errors.clone(),
            other => vec![other.to_string()],
        }
    }

    /// Maps a failed insert into a [`Error::Duplicate`] when the store rejected it
    /// on a unique constraint, otherwise keeps it as a persistence error.
    pub(crate) fn from_insert(err: DbErr, duplicate_message: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::Duplicate {
                message: duplicate_message.to_string(),
            },
            _ => Self::Database(err),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
