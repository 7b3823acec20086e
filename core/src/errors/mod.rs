//! Domain-specific error types and error handling.

mod types;


pub use types::AccountError;

use thiserror::Error;

/// Core domain errors (general purpose)
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    #[error("Internal error: {message}")]
    Internal { message: String },

    #[error("Database error: {0}")]
    Database(String),

    // Bridge to specific error types
    #[error(transparent)]
    Account(#[from] AccountError),
}

impl DomainError {
    /// The account error behind this error, if any
    pub fn as_account_error(&self) -> Option<&AccountError> {
        match self {
            DomainError::Account(err) => Some(err),
            _ => None,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            DomainError::Validation { .. } => "VALIDATION_ERROR",
            DomainError::NotFound { .. } => "NOT_FOUND",
            DomainError::Internal { .. } => "INTERNAL_ERROR",
            DomainError::Database(_) => "DATABASE_ERROR",
            DomainError::Account(err) => err.error_code(),
        }
    }
}

pub type DomainResult<T> = Result<T, DomainError>;
