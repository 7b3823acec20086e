//! User repository trait defining the interface for user data persistence.
//!
//! Implementations own store-level validation (required fields, format and
//! uniqueness of usernames and email addresses) and report failures as
//! field-level [`ValidationErrors`] rather than as `Err`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use cms_shared::utils::validation::validators;
use cms_shared::ValidationErrors;

use crate::domain::entities::user::User;
use crate::errors::DomainError;

/// Maximum length of a username
pub const MAX_USERNAME_LENGTH: usize = 100;

/// Maximum length of an email address
pub const MAX_EMAIL_LENGTH: usize = 255;

/// Format rules every store applies before a validated save.
///
/// Uniqueness is checked by each store against its own records.
pub fn validate_fields(user: &User) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if !validators::not_empty(&user.username) {
        errors.add_error("username", "Username cannot be blank.", "required");
    } else if !validators::length_between(&user.username, 1, MAX_USERNAME_LENGTH) {
        errors.add_error(
            "username",
            format!("Username should contain at most {} characters.", MAX_USERNAME_LENGTH),
            "too_long",
        );
    } else if !validators::is_valid_username(&user.username) {
        errors.add_error("username", "Username cannot contain spaces.", "invalid_format");
    }

    if !validators::not_empty(&user.email) {
        errors.add_error("email", "Email cannot be blank.", "required");
    } else if !validators::length_between(&user.email, 1, MAX_EMAIL_LENGTH) {
        errors.add_error(
            "email",
            format!("Email should contain at most {} characters.", MAX_EMAIL_LENGTH),
            "too_long",
        );
    } else if !validators::is_valid_email(&user.email) {
        errors.add_error("email", "Email is not a valid email address.", "invalid_format");
    }

    errors
}

/// Message for a username already held by another user
pub fn username_taken_message(username: &str) -> String {
    format!("Username \"{}\" has already been taken.", username)
}

/// Message for an email already held by another user
pub fn email_taken_message(email: &str) -> String {
    format!("Email \"{}\" has already been taken.", email)
}

/// How a save treats store-level validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveMode {
    /// Validate first and persist only when validation passes
    Validate,
    /// Persist without validating
    Force,
}

/// Repository trait for User entity persistence operations
///
/// `save` is an upsert keyed by [`User::id`].
///
/// # Example
/// ```no_run
/// # use cms_core::repositories::{SaveMode, UserRepository};
/// # use cms_core::domain::entities::User;
/// # async fn example(repo: &impl UserRepository) -> Result<(), Box<dyn std::error::Error>> {
/// let user = User::new("jane", "jane@example.com");
///
/// let errors = repo.save(&user, SaveMode::Validate).await?;
/// if errors.is_empty() {
///     println!("Saved user {}", user.id);
/// }
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find a user by their unique identifier
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError>;

    /// Find a user whose username or email equals `value` (case-insensitive)
    async fn find_by_username_or_email(&self, value: &str) -> Result<Option<User>, DomainError>;

    /// Find the user holding `code`, if it was issued strictly after `issued_after`
    async fn find_by_verification_code(
        &self,
        code: &str,
        issued_after: DateTime<Utc>,
    ) -> Result<Option<User>, DomainError>;

    /// Run store-level validation without writing
    async fn validate(&self, user: &User) -> Result<ValidationErrors, DomainError>;

    /// Insert or update the user.
    ///
    /// Returns the validation errors that prevented the write; an empty set
    /// means the user was persisted.
    async fn save(&self, user: &User, mode: SaveMode) -> Result<ValidationErrors, DomainError>;
}
