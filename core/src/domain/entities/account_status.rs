//! Account status and invalid-login throttle state.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Discriminant of [`AccountStatus`], used for storage and error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    Pending,
    Active,
    Locked,
    Suspended,
    Archived,
}

impl StatusKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusKind::Pending => "pending",
            StatusKind::Active => "active",
            StatusKind::Locked => "locked",
            StatusKind::Suspended => "suspended",
            StatusKind::Archived => "archived",
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(StatusKind::Pending),
            "active" => Ok(StatusKind::Active),
            "locked" => Ok(StatusKind::Locked),
            "suspended" => Ok(StatusKind::Suspended),
            "archived" => Ok(StatusKind::Archived),
            other => Err(format!("Unknown user status: {}", other)),
        }
    }
}

/// An open invalid-login window: when it started and how many failures it holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidLoginWindow {
    pub started_at: DateTime<Utc>,
    pub count: u32,
}

impl InvalidLoginWindow {
    /// Opens a new window at `now` holding one failure
    pub fn open(now: DateTime<Utc>) -> Self {
        Self {
            started_at: now,
            count: 1,
        }
    }

    /// A window accepts failures while `now <= started_at + duration`
    pub fn is_active(&self, now: DateTime<Utc>, duration: Duration) -> bool {
        now <= self.ends_at(duration)
    }

    pub fn ends_at(&self, duration: Duration) -> DateTime<Utc> {
        self.started_at + duration
    }
}

/// Limits applied when counting invalid logins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidLoginPolicy {
    /// Failures inside one window that lock the account
    pub max_invalid_logins: u32,
    /// Length of a window
    pub window: Duration,
}

/// What an invalid login did to the account
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidLoginOutcome {
    /// The failure was counted; `count` failures are in the current window
    Counted { count: u32 },
    /// The failure reached the limit and locked the account
    Locked,
    /// The account's status does not accumulate failures
    Ignored,
}

/// Lifecycle status of a user, carrying only the data meaningful to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AccountStatus {
    /// Registered, waiting for email verification
    Pending,
    /// Can log in; may have an open invalid-login window
    Active {
        invalid_logins: Option<InvalidLoginWindow>,
    },
    /// Locked after too many invalid logins
    Locked { locked_at: DateTime<Utc> },
    /// Suspended by an administrator
    Suspended,
    /// Soft-deleted; keeps the username and email the account had
    Archived {
        #[serde(rename = "archived_username")]
        username: String,
        #[serde(rename = "archived_email")]
        email: String,
    },
}

impl AccountStatus {
    /// Active with no invalid-login window
    pub fn active() -> Self {
        AccountStatus::Active {
            invalid_logins: None,
        }
    }

    pub fn kind(&self) -> StatusKind {
        match self {
            AccountStatus::Pending => StatusKind::Pending,
            AccountStatus::Active { .. } => StatusKind::Active,
            AccountStatus::Locked { .. } => StatusKind::Locked,
            AccountStatus::Suspended => StatusKind::Suspended,
            AccountStatus::Archived { .. } => StatusKind::Archived,
        }
    }

    pub fn invalid_login_window(&self) -> Option<&InvalidLoginWindow> {
        match self {
            AccountStatus::Active { invalid_logins } => invalid_logins.as_ref(),
            _ => None,
        }
    }

    /// Failures in the open window, zero when there is none
    pub fn invalid_login_count(&self) -> u32 {
        self.invalid_login_window().map_or(0, |window| window.count)
    }

    pub fn locked_at(&self) -> Option<DateTime<Utc>> {
        match self {
            AccountStatus::Locked { locked_at } => Some(*locked_at),
            _ => None,
        }
    }

    /// Archived username and email, if the account was deleted
    pub fn archived_identity(&self) -> Option<(&str, &str)> {
        match self {
            AccountStatus::Archived { username, email } => Some((username.as_str(), email.as_str())),
            _ => None,
        }
    }
}

impl Default for AccountStatus {
    fn default() -> Self {
        AccountStatus::Pending
    }
}
