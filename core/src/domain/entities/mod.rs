//! Domain entities representing core business objects.

pub mod account_status;
pub mod user;
pub mod verification_code;

#[cfg(test)]
mod tests;

pub use account_status::{
    AccountStatus, InvalidLoginOutcome, InvalidLoginPolicy, InvalidLoginWindow, StatusKind,
};
pub use user::{EmailFormat, User};
pub use verification_code::VerificationCode;
