//! Configuration for the account service

use chrono::Duration;

use cms_shared::{AccountConfig, LanguageValidator};

use crate::domain::entities::InvalidLoginPolicy;

/// Configuration for the account service
#[derive(Debug, Clone, Default)]
pub struct AccountServiceConfig {
    /// Durations, limits and site settings
    pub account: AccountConfig,
}

impl AccountServiceConfig {
    pub fn new(account: AccountConfig) -> Self {
        Self { account }
    }

    /// Time after which a locked account unlocks itself on read
    pub fn cooldown_duration(&self) -> Option<Duration> {
        self.account.cooldown_duration()
    }

    /// How long a verification code stays redeemable
    pub fn verification_code_duration(&self) -> Duration {
        self.account.verification_code_duration()
    }

    pub fn invalid_login_policy(&self) -> InvalidLoginPolicy {
        InvalidLoginPolicy {
            max_invalid_logins: self.account.max_invalid_logins,
            window: self.account.invalid_login_window_duration(),
        }
    }

    pub fn language_validator(&self) -> LanguageValidator {
        LanguageValidator::new(
            self.account.site_languages.clone(),
            self.account.only_site_languages,
        )
    }

    /// Path of the page that redeems verification codes
    pub fn verification_path(&self) -> &str {
        &self.account.account_verification_path
    }
}

impl From<AccountConfig> for AccountServiceConfig {
    fn from(account: AccountConfig) -> Self {
        Self::new(account)
    }
}
