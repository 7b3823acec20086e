//! Shared utilities and common types for the CMS account services
//!
//! This crate provides common functionality used across all workspace crates:
//! - Configuration types
//! - Field-level validation errors
//! - Language (locale id) validation

pub mod config;
pub mod utils;

// Re-export commonly used items at crate root
pub use config::{
    AccountConfig, AppConfig, DatabaseConfig, EmailConfig, Environment, LogFormat, LoggingConfig,
};
pub use utils::{language, validation};
pub use utils::language::LanguageValidator;
pub use utils::validation::{ValidationError, ValidationErrors};
