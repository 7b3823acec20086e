//! Log Email Transport
//!
//! Writes outgoing messages to the tracing output instead of sending them.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::email_service::{mask_email, EmailMessage, EmailService};
use crate::InfrastructureError;

/// Mail transport for development environments
#[derive(Clone, Default)]
pub struct LogEmailService {
    message_count: Arc<AtomicU64>,
}

impl LogEmailService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the total number of messages logged
    pub fn get_message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmailService for LogEmailService {
    async fn send_email(&self, message: &EmailMessage) -> Result<String, InfrastructureError> {
        let message_id = format!("log_{}", Uuid::new_v4());
        self.message_count.fetch_add(1, Ordering::SeqCst);

        info!(
            target: "email_service",
            provider = "log",
            to = %mask_email(&message.to),
            from = %message.from,
            subject = %message.subject,
            html = message.html,
            message_id = %message_id,
            "Email sent (log transport)"
        );
        // Links carry verification codes, keep bodies out of info logs
        debug!(target: "email_service", message_id = %message_id, body = %message.body);

        Ok(message_id)
    }

    fn provider_name(&self) -> &str {
        "Log"
    }
}
