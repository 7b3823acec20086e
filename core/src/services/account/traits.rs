//! Traits for mail, hashing, password policy and URL integration

use async_trait::async_trait;
use std::collections::HashMap;

use crate::domain::entities::User;
use crate::domain::value_objects::HashedPassword;

use super::types::EmailKey;

/// Trait for mail delivery by template key
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Render the template identified by `key` for `user` and send it
    async fn send_email_by_key(
        &self,
        user: &User,
        key: EmailKey,
        variables: &HashMap<String, String>,
    ) -> Result<(), String>;
}

/// Trait for password hashing
pub trait PasswordHasher: Send + Sync {
    /// Hash a plaintext password
    fn hash_password(&self, password: &str) -> Result<HashedPassword, String>;
    /// Check a plaintext password against a stored hash
    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, String>;
}

/// Trait for password policy checks
pub trait PasswordValidator: Send + Sync {
    /// Returns the reason when the password is not acceptable
    fn validate(&self, password: &str) -> Result<(), String>;
}

/// Trait for building absolute site URLs
pub trait UrlBuilder: Send + Sync {
    /// Absolute URL for `path` with the given query parameters
    fn build_url(&self, path: &str, params: &[(&str, &str)]) -> String;
}
