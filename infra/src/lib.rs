//! # Infrastructure Layer
//!
//! This crate implements the infrastructure layer for the CMS account
//! services. It provides concrete implementations of the collaborators the
//! account service depends on.
//!
//! ## Architecture
//!
//! The infrastructure layer contains:
//! - **Database**: MySQL user store using SQLx
//! - **Security**: bcrypt password hashing
//! - **Email**: template rendering and mail transports
//! - **Url**: absolute site URL construction
//! - **Config / Telemetry**: configuration loading and tracing setup
//!
//! ## Features
//!
//! - `mysql`: Enable MySQL database support (default)

use std::sync::Arc;

// Re-export core types for convenience
pub use cms_core::errors::*;

/// Database module - MySQL implementations using SQLx
#[cfg(feature = "mysql")]
pub mod database;

/// Email module - templates, transports and the account mailer
pub mod email;

/// Security module - password hashing
pub mod security;

/// Configuration loading
pub mod config;

/// Tracing subscriber setup
pub mod telemetry;

/// Site URL construction
pub mod url;

use cms_core::services::account::{AccountService, AccountServiceConfig};
use cms_shared::AppConfig;

use email::{LogEmailService, TemplateMailer};
use security::BcryptPasswordHasher;
use crate::url::SiteUrlBuilder;

#[cfg(feature = "mysql")]
use database::{DatabasePool, MySqlUserRepository};

/// Account service wired to the MySQL store, bcrypt and the logging mail transport
#[cfg(feature = "mysql")]
pub type MySqlAccountService =
    AccountService<MySqlUserRepository, BcryptPasswordHasher, TemplateMailer<LogEmailService>>;

/// Infrastructure service container
#[cfg(feature = "mysql")]
#[derive(Clone)]
pub struct InfrastructureServices {
    /// Database connection pool
    pub pool: DatabasePool,
    /// Account service built on top of the pool
    pub accounts: Arc<MySqlAccountService>,
    /// Configuration the services were built from
    pub config: AppConfig,
}

/// Initialize infrastructure services
///
/// This function sets up:
/// - Configuration from `.env`, config files and the environment
/// - Tracing
/// - The database connection pool and users table
/// - The account service and its collaborators
#[cfg(feature = "mysql")]
pub async fn initialize() -> Result<InfrastructureServices, InfrastructureError> {
    let config = config::load_config()?;
    telemetry::init_tracing(&config.logging)?;

    tracing::info!(
        environment = %config.environment,
        "Initializing infrastructure services..."
    );

    let services = build_services(config).await?;

    tracing::info!("Infrastructure services initialized successfully");
    Ok(services)
}

/// Build the services from an already loaded configuration
#[cfg(feature = "mysql")]
pub async fn build_services(config: AppConfig) -> Result<InfrastructureServices, InfrastructureError> {
    config.account.validate().map_err(InfrastructureError::Config)?;

    let pool = DatabasePool::new(config.database.clone()).await?;
    pool.ensure_schema().await?;

    let repository = Arc::new(MySqlUserRepository::new(pool.get_pool().clone()));
    let hasher = Arc::new(BcryptPasswordHasher::default());
    let mailer = Arc::new(TemplateMailer::new(
        email::create_email_service(&config.email)?,
        config.email.clone(),
    ));
    let url_builder = Arc::new(SiteUrlBuilder::new(&config.account.site_url)?);

    let accounts = Arc::new(AccountService::new(
        repository,
        hasher,
        mailer,
        url_builder,
        AccountServiceConfig::new(config.account.clone()),
    ));

    Ok(InfrastructureServices {
        pool,
        accounts,
        config,
    })
}

/// Infrastructure-specific error types
#[derive(Debug, thiserror::Error)]
pub enum InfrastructureError {
    /// Database connection error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Mail delivery error
    #[error("Email error: {0}")]
    Email(String),

    /// Password hashing error
    #[error("Hashing error: {0}")]
    Hashing(String),

    /// General infrastructure error
    #[error("Infrastructure error: {0}")]
    General(String),
}

impl From<::config::ConfigError> for InfrastructureError {
    fn from(err: ::config::ConfigError) -> Self {
        InfrastructureError::Config(err.to_string())
    }
}

impl From<bcrypt::BcryptError> for InfrastructureError {
    fn from(err: bcrypt::BcryptError) -> Self {
        InfrastructureError::Hashing(err.to_string())
    }
}

impl From<InfrastructureError> for DomainError {
    fn from(err: InfrastructureError) -> Self {
        match err {
            InfrastructureError::Database(e) => DomainError::Database(e.to_string()),
            other => DomainError::Internal {
                message: other.to_string(),
            },
        }
    }
}
