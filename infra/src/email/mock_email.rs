//! Mock Email Transport
//!
//! Records messages in memory so tests can inspect them.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tracing::warn;
use uuid::Uuid;

use super::email_service::{mask_email, EmailMessage, EmailService};
use crate::InfrastructureError;

/// Mock mail transport for testing
///
/// This implementation:
/// - Keeps every delivered message
/// - Generates mock message IDs
/// - Can simulate transport failures
#[derive(Clone, Default)]
pub struct MockEmailService {
    message_count: Arc<AtomicU64>,
    sent: Arc<Mutex<Vec<EmailMessage>>>,
    simulate_failure: Arc<AtomicBool>,
}

impl MockEmailService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport that rejects every message
    pub fn failing() -> Self {
        let service = Self::new();
        service.set_simulate_failure(true);
        service
    }

    /// Get the total number of messages sent
    pub fn get_message_count(&self) -> u64 {
        self.message_count.load(Ordering::SeqCst)
    }

    /// Messages delivered so far, oldest first
    pub fn sent_messages(&self) -> Vec<EmailMessage> {
        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn last_message(&self) -> Option<EmailMessage> {
        self.sent_messages().pop()
    }

    /// Enable or disable failure simulation
    pub fn set_simulate_failure(&self, simulate: bool) {
        self.simulate_failure.store(simulate, Ordering::SeqCst);
    }
}

#[async_trait]
impl EmailService for MockEmailService {
    async fn send_email(&self, message: &EmailMessage) -> Result<String, InfrastructureError> {
        if message.to.trim().is_empty() {
            return Err(InfrastructureError::Email("Recipient address is empty".to_string()));
        }

        if self.simulate_failure.load(Ordering::SeqCst) {
            warn!(
                to = %mask_email(&message.to),
                "Mock email service simulating failure"
            );
            return Err(InfrastructureError::Email(
                "Simulated email sending failure".to_string(),
            ));
        }

        self.sent
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(message.clone());
        self.message_count.fetch_add(1, Ordering::SeqCst);

        Ok(format!("mock_{}", Uuid::new_v4()))
    }

    fn provider_name(&self) -> &str {
        "Mock"
    }

    async fn is_available(&self) -> bool {
        !self.simulate_failure.load(Ordering::SeqCst)
    }
}
