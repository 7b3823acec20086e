//! Password hashing using bcrypt.

use cms_core::domain::value_objects::HashedPassword;
use cms_core::services::account::PasswordHasher;

/// Algorithm tag stored next to bcrypt hashes
pub const BCRYPT_ALGORITHM: &str = "bcrypt";

/// bcrypt implementation of [`PasswordHasher`]
#[derive(Debug, Clone, Copy)]
pub struct BcryptPasswordHasher {
    cost: u32,
}

impl BcryptPasswordHasher {
    /// Create a hasher with an explicit work factor (4..=31)
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptPasswordHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordHasher for BcryptPasswordHasher {
    fn hash_password(&self, password: &str) -> Result<HashedPassword, String> {
        let hash = bcrypt::hash(password, self.cost).map_err(|e| {
            tracing::error!(error = %e, "Password hashing failed");
            e.to_string()
        })?;
        Ok(HashedPassword::new(hash, BCRYPT_ALGORITHM))
    }

    /// Returns `Ok(false)` on mismatch and `Err` when the stored hash is malformed.
    fn verify_password(&self, password: &str, hash: &str) -> Result<bool, String> {
        bcrypt::verify(password, hash).map_err(|e| e.to_string())
    }
}
