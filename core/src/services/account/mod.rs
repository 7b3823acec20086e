//! Account service module for CMS user lifecycle management
//!
//! This module provides:
//! - User status transitions (pending, active, locked, suspended, archived)
//! - Invalid-login throttling with a sliding window and automatic unlock
//! - Verification code issuance, lookup and redemption
//! - Password set and change with an injectable policy

mod config;
mod context;
mod password_policy;
mod service;
mod traits;
mod types;

#[cfg(test)]
mod tests;

pub use config::AccountServiceConfig;
pub use context::{Clock, ManualClock, RequestContext, SystemClock};
pub use password_policy::LengthPasswordValidator;
pub use service::{AccountService, INVALID_PASSWORD_MESSAGE};
pub use traits::{Mailer, PasswordHasher, PasswordValidator, UrlBuilder};
pub use types::EmailKey;
