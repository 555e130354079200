//! Unified error type for the core layer.
//!
//! Every core operation returns [`Result`]. The HTTP layer maps these variants
//! onto status codes in `api::error`.

use thiserror::Error;

/// Errors raised by configuration, persistence and business rules.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the failure
        message: String,
    },

    /// Database driver or query error
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Input failed validation
    #[error("Validation error: {message}")]
    Validation {
        /// Description of the rejected input
        message: String,
    },

    /// A monetary amount or quantity is negative, zero where not allowed, or not finite
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected value
        amount: f64,
    },

    /// The requested row does not exist or is soft-deleted
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record (e.g. "project")
        entity: &'static str,
        /// Identifier that was looked up
        id: String,
    },

    /// The request conflicts with existing state
    #[error("Conflict: {message}")]
    Conflict {
        /// Description of the conflict
        message: String,
    },

    /// Missing or invalid credentials
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Reason the credentials were rejected
        message: String,
    },

    /// Authenticated, but the role or ownership does not allow the action
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Reason the action was refused
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// HTTP server failure
    #[error("Server error: {message}")]
    Server {
        /// Description of the failure
        message: String,
    },
}

impl Error {
    /// Shorthand for a [`Error::NotFound`] with a numeric id.
    #[must_use]
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Shorthand for a [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for a [`Error::Forbidden`].
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
