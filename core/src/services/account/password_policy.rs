//! Default password policy

use cms_shared::AccountConfig;
use cms_shared::utils::validation::validators;

use super::traits::PasswordValidator;

/// Accepts passwords whose length in characters is within bounds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthPasswordValidator {
    pub min_length: usize,
    pub max_length: usize,
}

impl LengthPasswordValidator {
    pub fn new(min_length: usize, max_length: usize) -> Self {
        Self {
            min_length,
            max_length,
        }
    }

    pub fn from_config(config: &AccountConfig) -> Self {
        Self::new(config.min_password_length, config.max_password_length)
    }
}

impl Default for LengthPasswordValidator {
    fn default() -> Self {
        Self::new(6, 160)
    }
}

impl PasswordValidator for LengthPasswordValidator {
    fn validate(&self, password: &str) -> Result<(), String> {
        if validators::length_between(password, self.min_length, self.max_length) {
            Ok(())
        } else {
            Err(format!(
                "Password must be between {} and {} characters.",
                self.min_length, self.max_length
            ))
        }
    }
}
