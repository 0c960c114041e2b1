//! Unified error type for the event manager.
//!
//! Every core operation returns [`Result`]; the HTTP layer converts [`Error`]
//! into a JSON response in `api::error`.

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// All failures the service can report.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description
        message: String,
    },

    /// User input rejected before reaching the database
    #[error("Validation error: {message}")]
    Validation {
        /// Human-readable description
        message: String,
    },

    /// A row looked up by id does not exist
    #[error("{entity} with id {id} not found")]
    NotFound {
        /// Entity name, e.g. `"Event"`
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// A uniqueness rule was violated
    #[error("Conflict: {message}")]
    Conflict {
        /// Human-readable description
        message: String,
    },

    /// Session missing or invalid. Deliberately carries no detail.
    #[error("Access denied")]
    AccessDenied,

    /// Menu text could not be turned into a menu tree
    #[error("Menu parse error: {message}")]
    MenuParse {
        /// Human-readable description
        message: String,
    },

    /// Amount is not a finite, non-negative number
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(DbErr),

    /// Filesystem failure (object storage, config files)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialisation failure for stored field data
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => Self::Conflict { message },
            _ => Self::Database(err),
        }
    }
}

impl Error {
    /// Shorthand for [`Error::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Shorthand for [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
