//! Common utility functions

pub mod language;
pub mod validation;

// Re-export commonly used utilities
pub use language::LanguageValidator;
pub use validation::*;
