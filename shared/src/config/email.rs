//! Outgoing email configuration

use serde::{Deserialize, Serialize};

/// Settings for account emails (verification, password reset)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmailConfig {
    /// Sender address
    #[serde(default = "default_from_address")]
    pub from_address: String,

    /// Sender display name
    #[serde(default = "default_from_name")]
    pub from_name: String,

    /// Delivery transport ("log" writes messages to the tracing output)
    #[serde(default = "default_transport")]
    pub transport: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            from_address: default_from_address(),
            from_name: default_from_name(),
            transport: default_transport(),
        }
    }
}

impl EmailConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            from_address: std::env::var("EMAIL_FROM_ADDRESS").unwrap_or(defaults.from_address),
            from_name: std::env::var("EMAIL_FROM_NAME").unwrap_or(defaults.from_name),
            transport: std::env::var("EMAIL_TRANSPORT").unwrap_or(defaults.transport),
        }
    }

    /// Formatted `From` header value
    pub fn sender(&self) -> String {
        if self.from_name.is_empty() {
            self.from_address.clone()
        } else {
            format!("{} <{}>", self.from_name, self.from_address)
        }
    }
}

fn default_from_address() -> String {
    String::from("no-reply@localhost")
}

fn default_from_name() -> String {
    String::from("CMS")
}

fn default_transport() -> String {
    String::from("log")
}
