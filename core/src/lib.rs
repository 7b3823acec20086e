//! # CMS Core
//!
//! Account policy engine and domain layer for the CMS account services.
//! This crate contains the user entity and its status transitions, the
//! account service, repository interfaces and error types. Concrete stores,
//! hashers and mailers live in `cms_infra`.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
