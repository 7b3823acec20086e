pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;
pub mod mock;


pub use mock::MockUserRepository;
pub use r#trait::{
    email_taken_message, username_taken_message, validate_fields, SaveMode, UserRepository,
    MAX_EMAIL_LENGTH, MAX_USERNAME_LENGTH,
};
