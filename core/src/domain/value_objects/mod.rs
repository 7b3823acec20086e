//! Value objects representing immutable domain concepts.

pub mod hashed_password;

pub use hashed_password::HashedPassword;
