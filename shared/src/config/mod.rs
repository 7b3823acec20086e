//! Configuration module with business-specific sub-modules
//!
//! This module organizes configuration into logical areas:
//! - `account` - Account lifecycle limits and durations
//! - `database` - Database connection and pool configuration
//! - `email` - Outgoing email settings
//! - `environment` - Environment detection and logging configuration

pub mod account;
pub mod database;
pub mod email;
pub mod environment;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use account::AccountConfig;
pub use database::DatabaseConfig;
pub use email::EmailConfig;
pub use environment::{Environment, LogFormat, LoggingConfig};

/// Complete application configuration combining all sub-configurations
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Environment configuration
    pub environment: Environment,

    /// Account lifecycle configuration
    #[serde(default)]
    pub account: AccountConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Outgoing email configuration
    #[serde(default)]
    pub email: EmailConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        let env = Environment::default();
        Self {
            environment: env,
            account: AccountConfig::default(),
            database: DatabaseConfig::default(),
            email: EmailConfig::default(),
            logging: LoggingConfig::for_environment(env),
        }
    }
}

impl AppConfig {
    /// Create configuration for development environment
    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            account: AccountConfig::default(),
            database: DatabaseConfig::new("mysql://localhost:3306/cms_dev"),
            email: EmailConfig::default(),
            logging: LoggingConfig::for_environment(Environment::Development),
        }
    }

    /// Create configuration for production environment
    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            account: AccountConfig::default(),
            database: DatabaseConfig::new("mysql://prod-db:3306/cms").with_max_connections(50),
            email: EmailConfig::default(),
            logging: LoggingConfig::for_environment(Environment::Production),
        }
    }

    /// Load configuration from environment
    pub fn from_env() -> Self {
        let env = Environment::from_env();
        let mut config = match env {
            Environment::Development => Self::development(),
            Environment::Production => Self::production(),
            Environment::Staging => {
                let mut config = Self::development();
                config.environment = Environment::Staging;
                config.logging = LoggingConfig::for_environment(Environment::Staging);
                config
            }
        };

        config.account = AccountConfig::from_env();
        if std::env::var("DATABASE_URL").is_ok() {
            config.database = DatabaseConfig::from_env();
        }
        config.email = EmailConfig::from_env();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_preset() {
        let config = AppConfig::production();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.database.max_connections, 50);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_app_config_deserializes_with_defaults() {
        let json = r#"{
            "environment": "staging",
            "database": {
                "url": "mysql://db:3306/cms",
                "max_connections": 5,
                "connect_timeout": 10,
                "idle_timeout": 600,
                "max_lifetime": 1800
            }
        }"#;

        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.environment, Environment::Staging);
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.account.max_invalid_logins, 5);
        assert_eq!(config.email.from_address, "no-reply@localhost");
    }
}
