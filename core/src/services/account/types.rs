//! Types used by the account service

use std::fmt;

/// Email templates the account service sends
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmailKey {
    VerifyEmail,
    ForgotPassword,
}

impl EmailKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailKey::VerifyEmail => "verify_email",
            EmailKey::ForgotPassword => "forgot_password",
        }
    }
}

impl fmt::Display for EmailKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
