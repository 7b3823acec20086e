//! User entity representing a CMS account.
//!
//! Status, throttle state and verification state are private and change only
//! through the transition methods below. Every transition takes the current
//! time explicitly.

use chrono::{DateTime, Duration, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cms_shared::ValidationErrors;

use super::account_status::{
    AccountStatus, InvalidLoginOutcome, InvalidLoginPolicy, InvalidLoginWindow, StatusKind,
};
use super::verification_code::VerificationCode;
use crate::domain::value_objects::HashedPassword;
use crate::errors::AccountError;

/// Preferred format for emails sent to the user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmailFormat {
    #[default]
    Text,
    Html,
}

impl EmailFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            EmailFormat::Text => "text",
            EmailFormat::Html => "html",
        }
    }

    /// Parses a stored value, falling back to text
    pub fn from_db(value: &str) -> Self {
        if value.eq_ignore_ascii_case("html") {
            EmailFormat::Html
        } else {
            EmailFormat::Text
        }
    }
}

/// User entity representing a registered account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier for the user
    pub id: Uuid,

    pub username: String,

    pub email: String,

    pub first_name: Option<String>,

    pub last_name: Option<String>,

    pub email_format: EmailFormat,

    /// Preferred locale id, e.g. `en-US`
    pub language: Option<String>,

    /// Whether the user has full administrative rights
    pub admin: bool,

    pub password_hash: Option<String>,

    /// Algorithm tag of `password_hash`
    pub hash_algorithm: Option<String>,

    /// Whether the user must pick a new password on next login
    pub password_reset_required: bool,

    pub last_password_change_at: Option<DateTime<Utc>>,

    pub last_login_at: Option<DateTime<Utc>>,

    pub last_invalid_login_at: Option<DateTime<Utc>>,

    /// Source address of the most recent login attempt
    pub last_login_attempt_ip: Option<String>,

    pub auth_session_token: Option<String>,

    /// Timestamp when the user was created
    pub created_at: DateTime<Utc>,

    /// Timestamp when the user was last updated
    pub updated_at: DateTime<Utc>,

    #[serde(flatten)]
    status: AccountStatus,

    verification: Option<VerificationCode>,

    /// Plaintext password awaiting the password-set transition
    #[serde(skip)]
    pub new_password: Option<SecretString>,

    /// Whether the next save should require email verification
    #[serde(skip)]
    pub verification_required: bool,

    /// Field-level validation errors from the last operation
    #[serde(skip)]
    pub errors: ValidationErrors,
}

impl User {
    /// Creates a new pending user
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            username: username.into(),
            email: email.into(),
            first_name: None,
            last_name: None,
            email_format: EmailFormat::default(),
            language: None,
            admin: false,
            password_hash: None,
            hash_algorithm: None,
            password_reset_required: false,
            last_password_change_at: None,
            last_login_at: None,
            last_invalid_login_at: None,
            last_login_attempt_ip: None,
            auth_session_token: None,
            created_at: now,
            updated_at: now,
            status: AccountStatus::Pending,
            verification: None,
            new_password: None,
            verification_required: false,
            errors: ValidationErrors::new(),
        }
    }

    /// Blank record with a given id, used when saving a user the store has not seen
    pub fn blank(id: Uuid) -> Self {
        let mut user = Self::new(String::new(), String::new());
        user.id = id;
        user
    }

    /// Restores the status of a stored user
    pub fn with_status(mut self, status: AccountStatus) -> Self {
        self.status = status;
        self
    }

    /// Restores the verification code of a stored user
    pub fn with_verification(mut self, verification: Option<VerificationCode>) -> Self {
        self.verification = verification;
        self
    }

    pub fn status(&self) -> &AccountStatus {
        &self.status
    }

    pub fn status_kind(&self) -> StatusKind {
        self.status.kind()
    }

    pub fn verification(&self) -> Option<&VerificationCode> {
        self.verification.as_ref()
    }

    pub fn verification_code(&self) -> Option<&str> {
        self.verification.as_ref().map(|v| v.code.as_str())
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, AccountStatus::Pending)
    }

    pub fn is_active(&self) -> bool {
        matches!(self.status, AccountStatus::Active { .. })
    }

    pub fn is_locked(&self) -> bool {
        matches!(self.status, AccountStatus::Locked { .. })
    }

    pub fn is_suspended(&self) -> bool {
        matches!(self.status, AccountStatus::Suspended)
    }

    pub fn is_archived(&self) -> bool {
        matches!(self.status, AccountStatus::Archived { .. })
    }

    /// First and last name joined, if either is set
    pub fn full_name(&self) -> Option<String> {
        let name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|part| !part.trim().is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }

    /// Display name: full name or username
    pub fn name(&self) -> String {
        self.full_name().unwrap_or_else(|| self.username.clone())
    }

    /// Copies the editable profile fields from `other`
    pub fn copy_profile_from(&mut self, other: &User) {
        self.username = other.username.clone();
        self.first_name = other.first_name.clone();
        self.last_name = other.last_name.clone();
        self.email = other.email.clone();
        self.email_format = other.email_format;
        self.admin = other.admin;
        self.password_reset_required = other.password_reset_required;
        self.language = other.language.clone();
    }

    /// Copies the account state of a stored record onto this value
    pub fn sync_account_state(&mut self, stored: &User) {
        self.status = stored.status.clone();
        self.verification = stored.verification.clone();
        self.password_hash = stored.password_hash.clone();
        self.hash_algorithm = stored.hash_algorithm.clone();
        self.password_reset_required = stored.password_reset_required;
        self.last_password_change_at = stored.last_password_change_at;
        self.last_login_at = stored.last_login_at;
        self.last_invalid_login_at = stored.last_invalid_login_at;
        self.last_login_attempt_ip = stored.last_login_attempt_ip.clone();
        self.auth_session_token = stored.auth_session_token.clone();
        self.updated_at = stored.updated_at;
        if stored.is_archived() {
            self.username = stored.username.clone();
            self.email = stored.email.clone();
        }
        if stored.new_password.is_none() {
            self.new_password = None;
        }
    }

    /// Unlocks the account once the cooldown has elapsed.
    ///
    /// Returns `true` when the status changed. Without a cooldown a lock never
    /// expires on its own.
    pub fn expire_lockout(&mut self, now: DateTime<Utc>, cooldown: Option<Duration>) -> bool {
        let (Some(locked_at), Some(cooldown)) = (self.status.locked_at(), cooldown) else {
            return false;
        };

        if now >= locked_at + cooldown {
            self.status = AccountStatus::active();
            self.updated_at = now;
            true
        } else {
            false
        }
    }

    /// Time left before a locked account unlocks itself
    pub fn remaining_cooldown(&self, now: DateTime<Utc>, cooldown: Option<Duration>) -> Option<Duration> {
        let locked_at = self.status.locked_at()?;
        let cooldown = cooldown?;
        let remaining = (locked_at + cooldown) - now;
        if remaining > Duration::zero() {
            Some(remaining)
        } else {
            None
        }
    }

    /// Issues a fresh verification code, replacing any previous one
    pub fn issue_verification_code(&mut self, now: DateTime<Utc>) -> Result<&VerificationCode, AccountError> {
        self.ensure_not_archived("issue verification code")?;
        self.updated_at = now;
        let code = self.verification.insert(VerificationCode::issue(now));
        Ok(&*code)
    }

    /// Puts the account into the pending state with a fresh verification code
    pub fn require_verification(&mut self, now: DateTime<Utc>) -> Result<(), AccountError> {
        self.ensure_not_archived("require verification")?;
        self.status = AccountStatus::Pending;
        self.issue_verification_code(now)?;
        Ok(())
    }

    /// Applies an already validated and hashed new password
    pub fn set_password(&mut self, password: HashedPassword, now: DateTime<Utc>) -> Result<(), AccountError> {
        self.ensure_not_archived("set password")?;
        self.password_hash = Some(password.hash);
        self.hash_algorithm = Some(password.algorithm);
        self.status = AccountStatus::active();
        self.verification = None;
        self.password_reset_required = false;
        self.last_password_change_at = Some(now);
        self.new_password = None;
        self.updated_at = now;
        Ok(())
    }

    /// Records a successful login
    pub fn record_successful_login(
        &mut self,
        now: DateTime<Utc>,
        ip_address: Option<String>,
        session_token: Option<String>,
    ) -> Result<(), AccountError> {
        self.ensure_not_archived("record login")?;
        self.last_login_at = Some(now);
        self.last_login_attempt_ip = ip_address;
        if let AccountStatus::Active { invalid_logins } = &mut self.status {
            *invalid_logins = None;
        }
        self.verification = None;
        self.auth_session_token = session_token;
        self.updated_at = now;
        Ok(())
    }

    /// Records an invalid login and applies the throttle.
    ///
    /// Only active accounts accumulate failures. A failure outside the
    /// current window opens a new one with a count of 1; a failure inside it
    /// that brings the count to `max_invalid_logins` locks the account and
    /// discards the window.
    pub fn record_invalid_login(
        &mut self,
        now: DateTime<Utc>,
        ip_address: Option<String>,
        policy: &InvalidLoginPolicy,
    ) -> Result<InvalidLoginOutcome, AccountError> {
        self.ensure_not_archived("record invalid login")?;
        self.last_invalid_login_at = Some(now);
        self.last_login_attempt_ip = ip_address;
        self.updated_at = now;

        let AccountStatus::Active { invalid_logins } = &mut self.status else {
            return Ok(InvalidLoginOutcome::Ignored);
        };

        match invalid_logins.take() {
            Some(mut window) if window.is_active(now, policy.window) => {
                window.count += 1;
                if window.count >= policy.max_invalid_logins {
                    self.status = AccountStatus::Locked { locked_at: now };
                    return Ok(InvalidLoginOutcome::Locked);
                }
                *invalid_logins = Some(window);
                Ok(InvalidLoginOutcome::Counted { count: window.count })
            }
            _ => {
                *invalid_logins = Some(InvalidLoginWindow::open(now));
                Ok(InvalidLoginOutcome::Counted { count: 1 })
            }
        }
    }

    /// Activates the account and clears its verification code
    pub fn activate(&mut self, now: DateTime<Utc>) -> Result<(), AccountError> {
        match self.status {
            AccountStatus::Pending | AccountStatus::Locked { .. } => {
                self.status = AccountStatus::active();
            }
            AccountStatus::Active { .. } => {}
            _ => return Err(self.invalid_transition("activate")),
        }
        self.verification = None;
        self.updated_at = now;
        Ok(())
    }

    /// Unlocks the account and clears its throttle state
    pub fn unlock(&mut self, now: DateTime<Utc>) -> Result<(), AccountError> {
        match self.status {
            AccountStatus::Locked { .. } | AccountStatus::Active { .. } => {
                self.status = AccountStatus::active();
                self.updated_at = now;
                Ok(())
            }
            _ => Err(self.invalid_transition("unlock")),
        }
    }

    pub fn suspend(&mut self, now: DateTime<Utc>) -> Result<(), AccountError> {
        self.ensure_not_archived("suspend")?;
        self.status = AccountStatus::Suspended;
        self.updated_at = now;
        Ok(())
    }

    pub fn unsuspend(&mut self, now: DateTime<Utc>) -> Result<(), AccountError> {
        match self.status {
            AccountStatus::Suspended => {
                self.status = AccountStatus::active();
                self.updated_at = now;
                Ok(())
            }
            _ => Err(self.invalid_transition("unsuspend")),
        }
    }

    /// Soft-deletes the account, moving username and email into the archive
    pub fn archive(&mut self, now: DateTime<Utc>) -> Result<(), AccountError> {
        self.ensure_not_archived("delete")?;
        self.status = AccountStatus::Archived {
            username: std::mem::take(&mut self.username),
            email: std::mem::take(&mut self.email),
        };
        self.verification = None;
        self.auth_session_token = None;
        self.updated_at = now;
        Ok(())
    }

    fn ensure_not_archived(&self, action: &'static str) -> Result<(), AccountError> {
        if self.is_archived() {
            Err(self.invalid_transition(action))
        } else {
            Ok(())
        }
    }

    fn invalid_transition(&self, action: &'static str) -> AccountError {
        AccountError::InvalidTransition {
            status: self.status.kind(),
            action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn active_user() -> User {
        User::new("jane", "jane@example.com").with_status(AccountStatus::active())
    }

    fn hashed(hash: &str) -> HashedPassword {
        HashedPassword::new(hash, "plain")
    }

    #[test]
    fn test_new_user_is_pending() {
        let user = User::new("jane", "jane@example.com");

        assert!(user.is_pending());
        assert!(user.verification().is_none());
        assert!(user.errors.is_empty());
        assert_eq!(user.email_format, EmailFormat::Text);
        assert!(!user.admin);
    }

    #[test]
    fn test_name_prefers_full_name() {
        let mut user = User::new("jane", "jane@example.com");
        assert_eq!(user.name(), "jane");

        user.first_name = Some("Jane".to_string());
        user.last_name = Some("Doe".to_string());
        assert_eq!(user.name(), "Jane Doe");
    }

    #[test]
    fn test_expire_lockout_respects_cooldown() {
        let locked_at = Utc::now();
        let mut user = active_user().with_status(AccountStatus::Locked { locked_at });
        let cooldown = Some(Duration::minutes(5));

        assert!(!user.expire_lockout(locked_at + Duration::minutes(4), cooldown));
        assert!(user.is_locked());
        assert_eq!(
            user.remaining_cooldown(locked_at + Duration::minutes(4), cooldown),
            Some(Duration::minutes(1))
        );

        assert!(user.expire_lockout(locked_at + Duration::minutes(5), cooldown));
        assert_eq!(user.status(), &AccountStatus::active());
    }

    #[test]
    fn test_expire_lockout_without_cooldown_keeps_lock() {
        let locked_at = Utc::now() - Duration::days(30);
        let mut user = active_user().with_status(AccountStatus::Locked { locked_at });

        assert!(!user.expire_lockout(Utc::now(), None));
        assert!(user.is_locked());
        assert_eq!(user.remaining_cooldown(Utc::now(), None), None);
    }

    #[test]
    fn test_set_password_clears_state() {
        let now = Utc::now();
        let mut user = User::new("jane", "jane@example.com");
        user.issue_verification_code(now).unwrap();
        user.password_reset_required = true;
        user.new_password = Some(SecretString::new("secret1".to_string()));

        user.set_password(hashed("hash"), now).unwrap();

        assert_eq!(user.status(), &AccountStatus::active());
        assert!(user.verification().is_none());
        assert!(!user.password_reset_required);
        assert!(user.new_password.is_none());
        assert_eq!(user.last_password_change_at, Some(now));
        assert_eq!(user.password_hash.as_deref(), Some("hash"));
        assert_eq!(user.hash_algorithm.as_deref(), Some("plain"));
    }

    #[test]
    fn test_invalid_login_locks_on_threshold() {
        let now = Utc::now();
        let policy = InvalidLoginPolicy {
            max_invalid_logins: 3,
            window: Duration::hours(1),
        };
        let mut user = active_user().with_status(AccountStatus::Active {
            invalid_logins: Some(InvalidLoginWindow {
                started_at: now - Duration::minutes(10),
                count: 2,
            }),
        });

        let outcome = user
            .record_invalid_login(now, Some("10.0.0.1".to_string()), &policy)
            .unwrap();

        assert_eq!(outcome, InvalidLoginOutcome::Locked);
        assert_eq!(user.status(), &AccountStatus::Locked { locked_at: now });
        assert_eq!(user.status().invalid_login_count(), 0);
        assert_eq!(user.last_invalid_login_at, Some(now));
        assert_eq!(user.last_login_attempt_ip.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_invalid_login_after_window_restarts_count() {
        let now = Utc::now();
        let policy = InvalidLoginPolicy {
            max_invalid_logins: 3,
            window: Duration::hours(1),
        };
        let mut user = active_user().with_status(AccountStatus::Active {
            invalid_logins: Some(InvalidLoginWindow {
                started_at: now - Duration::hours(2),
                count: 2,
            }),
        });

        let outcome = user.record_invalid_login(now, None, &policy).unwrap();

        assert_eq!(outcome, InvalidLoginOutcome::Counted { count: 1 });
        assert_eq!(
            user.status().invalid_login_window(),
            Some(&InvalidLoginWindow::open(now))
        );
    }

    #[test]
    fn test_invalid_login_window_end_is_inclusive() {
        let start = Utc::now();
        let window = InvalidLoginWindow::open(start);

        assert!(window.is_active(start + Duration::hours(1), Duration::hours(1)));
        assert!(!window.is_active(
            start + Duration::hours(1) + Duration::seconds(1),
            Duration::hours(1)
        ));
    }

    #[test]
    fn test_single_allowed_failure_opens_window_before_locking() {
        let now = Utc::now();
        let policy = InvalidLoginPolicy {
            max_invalid_logins: 1,
            window: Duration::hours(1),
        };
        let mut user = active_user();

        let first = user.record_invalid_login(now, None, &policy).unwrap();
        assert_eq!(first, InvalidLoginOutcome::Counted { count: 1 });
        assert!(user.is_active());

        let second = user
            .record_invalid_login(now + Duration::minutes(1), None, &policy)
            .unwrap();
        assert_eq!(second, InvalidLoginOutcome::Locked);
        assert!(user.is_locked());
    }

    #[test]
    fn test_invalid_login_ignored_when_not_active() {
        let now = Utc::now();
        let policy = InvalidLoginPolicy {
            max_invalid_logins: 1,
            window: Duration::hours(1),
        };

        let mut pending = User::new("jane", "jane@example.com");
        assert_eq!(
            pending.record_invalid_login(now, None, &policy).unwrap(),
            InvalidLoginOutcome::Ignored
        );
        assert!(pending.is_pending());
        assert_eq!(pending.last_invalid_login_at, Some(now));

        let mut suspended = active_user().with_status(AccountStatus::Suspended);
        assert_eq!(
            suspended.record_invalid_login(now, None, &policy).unwrap(),
            InvalidLoginOutcome::Ignored
        );
        assert!(suspended.is_suspended());
    }

    #[test]
    fn test_successful_login_resets_throttle() {
        let now = Utc::now();
        let mut user = active_user().with_status(AccountStatus::Active {
            invalid_logins: Some(InvalidLoginWindow::open(now)),
        });
        user.issue_verification_code(now).unwrap();

        user.record_successful_login(now, Some("127.0.0.1".to_string()), Some("token".to_string()))
            .unwrap();

        assert_eq!(user.status(), &AccountStatus::active());
        assert!(user.verification().is_none());
        assert_eq!(user.last_login_at, Some(now));
        assert_eq!(user.auth_session_token.as_deref(), Some("token"));
    }

    #[test]
    fn test_admin_transitions() {
        let now = Utc::now();
        let mut user = User::new("jane", "jane@example.com");
        user.issue_verification_code(now).unwrap();

        user.activate(now).unwrap();
        assert!(user.is_active());
        assert!(user.verification().is_none());

        user.suspend(now).unwrap();
        assert!(user.is_suspended());
        assert!(user.unlock(now).is_err());
        assert!(user.activate(now).is_err());

        user.unsuspend(now).unwrap();
        assert!(user.is_active());
        assert!(user.unsuspend(now).is_err());
    }

    #[test]
    fn test_archive_moves_identity_to_shadow_fields() {
        let now = Utc::now();
        let mut user = active_user();
        user.auth_session_token = Some("token".to_string());

        user.archive(now).unwrap();

        assert!(user.username.is_empty());
        assert!(user.email.is_empty());
        assert_eq!(
            user.status().archived_identity(),
            Some(("jane", "jane@example.com"))
        );
        assert!(user.auth_session_token.is_none());
    }

    #[test]
    fn test_archived_is_terminal() {
        let now = Utc::now();
        let mut user = active_user();
        user.archive(now).unwrap();

        let err = user.activate(now).unwrap_err();
        assert_eq!(
            err,
            AccountError::InvalidTransition {
                status: StatusKind::Archived,
                action: "activate",
            }
        );
        assert!(user.archive(now).is_err());
        assert!(user.suspend(now).is_err());
        assert!(user.set_password(hashed("hash"), now).is_err());
        assert!(user.issue_verification_code(now).is_err());
    }

    #[test]
    fn test_status_serializes_as_tagged_variant() {
        let user = active_user().with_status(AccountStatus::Suspended);
        let json = serde_json::to_value(&user).unwrap();

        assert_eq!(json["status"], "suspended");
        assert!(json.get("new_password").is_none());
    }

    #[test]
    fn test_every_status_survives_json_round_trip() {
        let now = Utc::now();
        let statuses = [
            AccountStatus::Pending,
            AccountStatus::active(),
            AccountStatus::Active {
                invalid_logins: Some(InvalidLoginWindow { started_at: now, count: 2 }),
            },
            AccountStatus::Locked { locked_at: now },
            AccountStatus::Suspended,
            AccountStatus::Archived {
                username: "jane".to_string(),
                email: "jane@example.com".to_string(),
            },
        ];

        for status in statuses {
            let mut user = User::new("jane", "jane@example.com")
                .with_status(status.clone())
                .with_verification(Some(VerificationCode::issue(now)));
            if matches!(status, AccountStatus::Archived { .. }) {
                user.username.clear();
                user.email.clear();
            }

            let json = serde_json::to_string(&user).unwrap();
            let restored: User = serde_json::from_str(&json).unwrap();

            assert_eq!(restored.id, user.id);
            assert_eq!(restored.status(), &status);
            assert_eq!(restored.username, user.username);
            assert_eq!(restored.email, user.email);
            assert_eq!(restored.verification(), user.verification());
        }
    }
}
