//! Account lifecycle configuration
//!
//! Limits and durations that drive lockouts, invalid-login throttling and
//! verification-code freshness. Durations are expressed in seconds.

use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Account lifecycle configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AccountConfig {
    /// Seconds after which a locked account is reactivated on its next read.
    /// `None` disables automatic unlocking.
    #[serde(default = "default_cooldown_duration")]
    pub cooldown_duration_seconds: Option<u64>,

    /// Seconds a verification code stays redeemable after being issued
    #[serde(default = "default_verification_code_duration")]
    pub verification_code_duration_seconds: u64,

    /// Invalid logins inside one window that lock the account
    #[serde(default = "default_max_invalid_logins")]
    pub max_invalid_logins: u32,

    /// Length of the invalid-login window in seconds
    #[serde(default = "default_invalid_login_window_duration")]
    pub invalid_login_window_duration_seconds: u64,

    /// Site path of the account verification page
    #[serde(default = "default_account_verification_path")]
    pub account_verification_path: String,

    /// Absolute base URL of the site, used for links in emails
    #[serde(default = "default_site_url")]
    pub site_url: String,

    /// Locale ids enabled on the site
    #[serde(default = "default_site_languages")]
    pub site_languages: Vec<String>,

    /// Restrict user language preferences to the site languages
    #[serde(default = "default_only_site_languages")]
    pub only_site_languages: bool,

    /// Minimum accepted password length
    #[serde(default = "default_min_password_length")]
    pub min_password_length: usize,

    /// Maximum accepted password length
    #[serde(default = "default_max_password_length")]
    pub max_password_length: usize,
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            cooldown_duration_seconds: default_cooldown_duration(),
            verification_code_duration_seconds: default_verification_code_duration(),
            max_invalid_logins: default_max_invalid_logins(),
            invalid_login_window_duration_seconds: default_invalid_login_window_duration(),
            account_verification_path: default_account_verification_path(),
            site_url: default_site_url(),
            site_languages: default_site_languages(),
            only_site_languages: default_only_site_languages(),
            min_password_length: default_min_password_length(),
            max_password_length: default_max_password_length(),
        }
    }
}

impl AccountConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let cooldown_duration_seconds = match std::env::var("ACCOUNT_COOLDOWN_DURATION") {
            Ok(value) if value.trim().is_empty() || value.trim() == "0" => None,
            Ok(value) => value.trim().parse().ok().or(defaults.cooldown_duration_seconds),
            Err(_) => defaults.cooldown_duration_seconds,
        };

        Self {
            cooldown_duration_seconds,
            verification_code_duration_seconds: env_or(
                "ACCOUNT_VERIFICATION_CODE_DURATION",
                defaults.verification_code_duration_seconds,
            ),
            max_invalid_logins: env_or("ACCOUNT_MAX_INVALID_LOGINS", defaults.max_invalid_logins),
            invalid_login_window_duration_seconds: env_or(
                "ACCOUNT_INVALID_LOGIN_WINDOW_DURATION",
                defaults.invalid_login_window_duration_seconds,
            ),
            account_verification_path: std::env::var("ACCOUNT_VERIFICATION_PATH")
                .unwrap_or(defaults.account_verification_path),
            site_url: std::env::var("SITE_URL").unwrap_or(defaults.site_url),
            site_languages: std::env::var("SITE_LANGUAGES")
                .map(|value| {
                    value
                        .split(',')
                        .map(|lang| lang.trim().to_string())
                        .filter(|lang| !lang.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.site_languages),
            ..defaults
        }
    }

    /// Check the configuration for values the account services cannot work with
    pub fn validate(&self) -> Result<(), String> {
        if self.max_invalid_logins == 0 {
            return Err("max_invalid_logins must be at least 1".to_string());
        }
        if self.verification_code_duration_seconds == 0 {
            return Err("verification_code_duration_seconds must be positive".to_string());
        }
        if self.invalid_login_window_duration_seconds == 0 {
            return Err("invalid_login_window_duration_seconds must be positive".to_string());
        }
        if self.min_password_length > self.max_password_length {
            return Err("min_password_length exceeds max_password_length".to_string());
        }
        Ok(())
    }

    /// Cooldown before a locked account reactivates, if enabled
    pub fn cooldown_duration(&self) -> Option<Duration> {
        self.cooldown_duration_seconds
            .filter(|seconds| *seconds > 0)
            .map(seconds_to_duration)
    }

    /// How long a verification code remains valid
    pub fn verification_code_duration(&self) -> Duration {
        seconds_to_duration(self.verification_code_duration_seconds)
    }

    /// Length of the invalid-login window
    pub fn invalid_login_window_duration(&self) -> Duration {
        seconds_to_duration(self.invalid_login_window_duration_seconds)
    }

    /// Set the cooldown in seconds (`None` disables auto-unlock)
    pub fn with_cooldown_seconds(mut self, seconds: Option<u64>) -> Self {
        self.cooldown_duration_seconds = seconds;
        self
    }

    /// Set the maximum number of invalid logins per window
    pub fn with_max_invalid_logins(mut self, max: u32) -> Self {
        self.max_invalid_logins = max;
        self
    }

    /// Set the invalid-login window length in seconds
    pub fn with_invalid_login_window_seconds(mut self, seconds: u64) -> Self {
        self.invalid_login_window_duration_seconds = seconds;
        self
    }

    /// Set the verification code lifetime in seconds
    pub fn with_verification_code_seconds(mut self, seconds: u64) -> Self {
        self.verification_code_duration_seconds = seconds;
        self
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(default)
}

fn seconds_to_duration(seconds: u64) -> Duration {
    Duration::seconds(i64::try_from(seconds).unwrap_or(i64::MAX / 1000))
}

fn default_cooldown_duration() -> Option<u64> {
    Some(300) // 5 minutes
}

fn default_verification_code_duration() -> u64 {
    86400 // 1 day
}

fn default_max_invalid_logins() -> u32 {
    5
}

fn default_invalid_login_window_duration() -> u64 {
    3600 // 1 hour
}

fn default_account_verification_path() -> String {
    String::from("verify")
}

fn default_site_url() -> String {
    String::from("http://localhost")
}

fn default_site_languages() -> Vec<String> {
    vec![String::from("en-US")]
}

fn default_only_site_languages() -> bool {
    true
}

fn default_min_password_length() -> usize {
    6
}

fn default_max_password_length() -> usize {
    160
}
