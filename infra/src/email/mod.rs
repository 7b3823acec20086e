//! Email Module
//!
//! Delivery of account emails (verification and password reset links).
//!
//! ## Features
//!
//! - **Email Service Trait**: Common interface for mail transports
//! - **Log Transport**: Writes messages to the tracing output
//! - **Mock Transport**: Records messages for tests
//! - **Templates**: Default subjects and bodies per email key
//! - **Template Mailer**: Adapter implementing the account service `Mailer`

pub mod email_service;
pub mod log_email;
pub mod mailer;
pub mod mock_email;
pub mod templates;

pub use email_service::{mask_email, EmailMessage, EmailService};
pub use log_email::LogEmailService;
pub use mailer::TemplateMailer;
pub use mock_email::MockEmailService;
pub use templates::{EmailTemplate, TemplateSet};

#[cfg(test)]
mod tests;

use cms_shared::EmailConfig;

use crate::InfrastructureError;

/// Create the mail transport named by `config.transport`
///
/// Only the `log` transport ships with this crate.
pub fn create_email_service(config: &EmailConfig) -> Result<LogEmailService, InfrastructureError> {
    match config.transport.as_str() {
        "log" => Ok(LogEmailService::new()),
        other => Err(InfrastructureError::Config(format!(
            "Unknown email transport '{}'",
            other
        ))),
    }
}
