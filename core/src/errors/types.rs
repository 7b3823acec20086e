//! Account-specific error types
//!
//! Validation failures are not represented here: they are attached to the
//! user as field-level errors and never surface as `Err`.

use thiserror::Error;
use uuid::Uuid;

use crate::domain::entities::StatusKind;

/// Errors raised by account lifecycle operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("No user exists with the ID '{id}'")]
    UserNotFound { id: Uuid },

    #[error("User {id} has no verification code set")]
    MissingVerificationCode { id: Uuid },

    #[error("Cannot {action} a user with status {status}")]
    InvalidTransition {
        status: StatusKind,
        action: &'static str,
    },

    #[error("Failed to send {template} email: {message}")]
    MailDelivery { template: String, message: String },

    #[error("Password hashing failed: {message}")]
    PasswordHashing { message: String },
}

impl AccountError {
    /// Stable error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            AccountError::UserNotFound { .. } => "USER_NOT_FOUND",
            AccountError::MissingVerificationCode { .. } => "MISSING_VERIFICATION_CODE",
            AccountError::InvalidTransition { .. } => "INVALID_TRANSITION",
            AccountError::MailDelivery { .. } => "MAIL_DELIVERY_FAILED",
            AccountError::PasswordHashing { .. } => "PASSWORD_HASHING_FAILED",
        }
    }
}
