//! Email Service Interface
//!
//! Defines the trait for mail transports that deliver rendered messages.

use async_trait::async_trait;

use crate::InfrastructureError;

/// A rendered message ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// Recipient address
    pub to: String,
    /// Recipient display name
    pub to_name: String,
    /// Formatted sender, e.g. `CMS <no-reply@example.org>`
    pub from: String,
    pub subject: String,
    pub body: String,
    /// Whether `body` is HTML
    pub html: bool,
}

/// Mail transport trait
///
/// Implementations include:
/// - Log transport for development
/// - Mock transport for tests
#[async_trait]
pub trait EmailService: Send + Sync {
    /// Deliver a message
    ///
    /// # Returns
    ///
    /// * `Ok(message_id)` - Unique identifier for the sent message
    /// * `Err(InfrastructureError)` - If sending fails
    async fn send_email(&self, message: &EmailMessage) -> Result<String, InfrastructureError>;

    /// Get the transport name
    fn provider_name(&self) -> &str;

    /// Check if the transport is available
    async fn is_available(&self) -> bool {
        true
    }
}

/// Mask an address for logging, keeping the first character of the local part
///
/// ```ignore
/// assert_eq!(mask_email("jane@example.com"), "j***@example.com");
/// ```
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            let first = local.chars().next().unwrap_or('*');
            format!("{}***@{}", first, domain)
        }
        _ => "*".repeat(email.chars().count()),
    }
}
