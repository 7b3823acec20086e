//! Business services containing domain logic and use cases.

pub mod account;

// Re-export commonly used types
pub use account::{
    AccountService, AccountServiceConfig, Clock, EmailKey, LengthPasswordValidator, Mailer,
    ManualClock, PasswordHasher, PasswordValidator, RequestContext, SystemClock, UrlBuilder,
};
