pub mod user;

pub use user::{MockUserRepository, SaveMode, UserRepository};
