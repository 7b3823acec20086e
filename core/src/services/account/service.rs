//! Main account service implementation

use chrono::{DateTime, Duration, Utc};
use secrecy::ExposeSecret;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{InvalidLoginOutcome, User, VerificationCode};
use crate::errors::{AccountError, DomainError, DomainResult};
use crate::repositories::{SaveMode, UserRepository};

use super::config::AccountServiceConfig;
use super::context::{Clock, RequestContext, SystemClock};
use super::password_policy::LengthPasswordValidator;
use super::traits::{Mailer, PasswordHasher, PasswordValidator, UrlBuilder};
use super::types::EmailKey;

/// Message attached to `new_password` when a password is rejected
pub const INVALID_PASSWORD_MESSAGE: &str = "Invalid password.";

/// Account service owning user status transitions, login throttling,
/// verification codes and password changes
pub struct AccountService<U: UserRepository, H: PasswordHasher, M: Mailer> {
    /// User store
    user_repository: Arc<U>,
    /// Password hasher
    password_hasher: Arc<H>,
    /// Mail delivery by template key
    mailer: Arc<M>,
    /// Builds verification links
    url_builder: Arc<dyn UrlBuilder>,
    /// Source of the current time
    clock: Arc<dyn Clock>,
    /// Policy applied to new passwords
    password_validator: Arc<dyn PasswordValidator>,
    /// Service configuration
    config: AccountServiceConfig,
}

impl<U: UserRepository, H: PasswordHasher, M: Mailer> AccountService<U, H, M> {
    /// Create a new account service
    ///
    /// Uses the system clock and a length-based password policy taken from
    /// `config`; both can be replaced with [`with_clock`](Self::with_clock)
    /// and [`with_password_validator`](Self::with_password_validator).
    pub fn new(
        user_repository: Arc<U>,
        password_hasher: Arc<H>,
        mailer: Arc<M>,
        url_builder: Arc<dyn UrlBuilder>,
        config: AccountServiceConfig,
    ) -> Self {
        let password_validator = Arc::new(LengthPasswordValidator::from_config(&config.account));
        Self {
            user_repository,
            password_hasher,
            mailer,
            url_builder,
            clock: Arc::new(SystemClock),
            password_validator,
            config,
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_password_validator(mut self, password_validator: Arc<dyn PasswordValidator>) -> Self {
        self.password_validator = password_validator;
        self
    }

    pub fn config(&self) -> &AccountServiceConfig {
        &self.config
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Read hook applied to every loaded user.
    ///
    /// A locked user whose cooldown has elapsed is unlocked and the change is
    /// written straight back to the store.
    pub async fn populate_user(&self, mut user: User) -> DomainResult<User> {
        let now = self.clock.now();
        if user.expire_lockout(now, self.config.cooldown_duration()) {
            self.force_save(&user).await?;
            tracing::info!(
                user_id = %user.id,
                event = "account_auto_unlocked",
                "Lockout cooldown elapsed, user unlocked"
            );
        }
        Ok(user)
    }

    pub async fn get_user_by_id(&self, id: Uuid) -> DomainResult<Option<User>> {
        let user = self.user_repository.find_by_id(id).await?;
        self.populate_optional(user).await
    }

    /// Look up a user by username or email with a single store query
    pub async fn get_user_by_username_or_email(&self, value: &str) -> DomainResult<Option<User>> {
        if value.is_empty() {
            return Ok(None);
        }
        let user = self.user_repository.find_by_username_or_email(value).await?;
        self.populate_optional(user).await
    }

    /// Look up a user by a verification code that is still fresh
    pub async fn get_user_by_verification_code(&self, code: &str) -> DomainResult<Option<User>> {
        if code.is_empty() {
            return Ok(None);
        }

        let issued_after = VerificationCode::freshness_boundary(
            self.clock.now(),
            self.config.verification_code_duration(),
        );
        let user = self
            .user_repository
            .find_by_verification_code(code, issued_after)
            .await?;

        if user.is_none() {
            tracing::debug!(
                issued_after = %issued_after,
                "No user holds a fresh verification code matching the request"
            );
        }

        self.populate_optional(user).await
    }

    /// The authenticated user of the request, if it still exists
    pub async fn current_user(&self, request: &RequestContext) -> DomainResult<Option<User>> {
        match request.user_id {
            Some(id) => self.get_user_by_id(id).await,
            None => Ok(None),
        }
    }

    /// Whether the request is authenticated as an admin
    pub async fn is_admin(&self, request: &RequestContext) -> DomainResult<bool> {
        Ok(self
            .current_user(request)
            .await?
            .map_or(false, |user| user.admin))
    }

    /// Time left before a locked user unlocks itself
    pub fn remaining_cooldown(&self, user: &User) -> Option<Duration> {
        user.remaining_cooldown(self.clock.now(), self.config.cooldown_duration())
    }

    /// Insert or update a user.
    ///
    /// Returns `Ok(false)` with the errors merged into `user.errors` when
    /// the password, language or store validation fails. Nothing is written
    /// in that case.
    pub async fn save_user(&self, user: &mut User) -> DomainResult<bool> {
        let now = self.clock.now();
        user.errors.clear();

        let mut record = self
            .get_user_by_id(user.id)
            .await?
            .unwrap_or_else(|| User::blank(user.id));
        if record.is_archived() {
            return Err(AccountError::InvalidTransition {
                status: record.status_kind(),
                action: "save",
            }
            .into());
        }

        record.copy_profile_from(user);

        if user.new_password.is_some() {
            record.new_password = user.new_password.clone();
            self.apply_new_password(&mut record, now)?;
        }

        if let Some(language) = record.language.as_deref().filter(|l| !l.is_empty()) {
            if let Some(message) = self.config.language_validator().validate_value(language) {
                record.errors.add_error("language", message, "invalid_language");
            }
        }

        let store_errors = self.user_repository.validate(&record).await?;
        record.errors.merge(store_errors);

        if record.errors.has_errors() {
            tracing::warn!(
                user_id = %user.id,
                errors = %record.errors,
                event = "user_validation_failed",
                "User could not be saved due to validation errors"
            );
            user.errors.merge(std::mem::take(&mut record.errors));
            return Ok(false);
        }

        let verification_required = user.verification_required;
        if verification_required {
            record.require_verification(now)?;
        }

        let errors = self.user_repository.save(&record, SaveMode::Validate).await?;
        if errors.has_errors() {
            user.errors.merge(errors);
            return Ok(false);
        }

        user.sync_account_state(&record);
        user.verification_required = false;

        tracing::info!(
            user_id = %user.id,
            status = %record.status_kind(),
            verification_required = verification_required,
            event = "user_saved",
            "User saved"
        );

        if verification_required {
            self.send_link(&record, EmailKey::VerifyEmail).await?;
        }

        Ok(true)
    }

    /// Issue a new verification code and send the verification email
    pub async fn send_verification_email(&self, user: &mut User) -> DomainResult<()> {
        self.reissue_and_send(user, EmailKey::VerifyEmail).await
    }

    /// Issue a new verification code and send the password reset email
    pub async fn send_forgot_password_email(&self, user: &mut User) -> DomainResult<()> {
        self.reissue_and_send(user, EmailKey::ForgotPassword).await
    }

    /// Absolute verification link for the user's current code
    pub fn verification_url(&self, user: &User) -> DomainResult<String> {
        let code = user
            .verification_code()
            .ok_or(AccountError::MissingVerificationCode { id: user.id })?;

        Ok(self
            .url_builder
            .build_url(self.config.verification_path(), &[("code", code)]))
    }

    /// Apply `user.new_password` to the stored user
    pub async fn change_password(&self, user: &mut User) -> DomainResult<bool> {
        let now = self.clock.now();
        user.errors.clear();

        let mut record = self.load_record(user.id).await?;
        record.new_password = user.new_password.clone();

        if !self.apply_new_password(&mut record, now)? {
            user.errors.merge(std::mem::take(&mut record.errors));
            return Ok(false);
        }

        let errors = self.user_repository.save(&record, SaveMode::Validate).await?;
        if errors.has_errors() {
            user.errors.merge(errors);
            return Ok(false);
        }

        user.sync_account_state(&record);
        tracing::info!(
            user_id = %user.id,
            event = "password_changed",
            "User password changed"
        );
        Ok(true)
    }

    /// Record a successful login
    pub async fn handle_successful_login(
        &self,
        user: &mut User,
        request: &RequestContext,
        session_token: Option<String>,
    ) -> DomainResult<bool> {
        let now = self.clock.now();
        let mut record = self.load_record(user.id).await?;

        record.record_successful_login(now, request.ip_address.clone(), session_token)?;
        self.force_save(&record).await?;
        user.sync_account_state(&record);

        tracing::info!(
            user_id = %user.id,
            ip_address = ?request.ip_address,
            event = "login_succeeded",
            "User logged in"
        );
        Ok(true)
    }

    /// Record an invalid login and apply the throttle
    pub async fn handle_invalid_login(
        &self,
        user: &mut User,
        request: &RequestContext,
    ) -> DomainResult<InvalidLoginOutcome> {
        let now = self.clock.now();
        let mut record = self.load_record(user.id).await?;

        let outcome = record.record_invalid_login(
            now,
            request.ip_address.clone(),
            &self.config.invalid_login_policy(),
        )?;
        self.force_save(&record).await?;
        user.sync_account_state(&record);

        match outcome {
            InvalidLoginOutcome::Locked => tracing::warn!(
                user_id = %user.id,
                ip_address = ?request.ip_address,
                max_invalid_logins = self.config.account.max_invalid_logins,
                event = "account_locked",
                "Too many invalid logins, user locked"
            ),
            InvalidLoginOutcome::Counted { count } => tracing::warn!(
                user_id = %user.id,
                ip_address = ?request.ip_address,
                invalid_login_count = count,
                event = "invalid_login",
                "Invalid login recorded"
            ),
            InvalidLoginOutcome::Ignored => tracing::debug!(
                user_id = %user.id,
                status = %record.status_kind(),
                event = "invalid_login_ignored",
                "Invalid login recorded without throttling"
            ),
        }

        Ok(outcome)
    }

    pub async fn activate_user(&self, user: &mut User) -> DomainResult<bool> {
        self.apply_transition(user, "user_activated", |record, now| record.activate(now))
            .await
    }

    pub async fn unlock_user(&self, user: &mut User) -> DomainResult<bool> {
        self.apply_transition(user, "user_unlocked", |record, now| record.unlock(now))
            .await
    }

    pub async fn suspend_user(&self, user: &mut User) -> DomainResult<bool> {
        self.apply_transition(user, "user_suspended", |record, now| record.suspend(now))
            .await
    }

    pub async fn unsuspend_user(&self, user: &mut User) -> DomainResult<bool> {
        self.apply_transition(user, "user_unsuspended", |record, now| record.unsuspend(now))
            .await
    }

    /// Soft-delete a user. The write skips store validation.
    pub async fn delete_user(&self, user: &mut User) -> DomainResult<bool> {
        let now = self.clock.now();
        let mut record = self.load_record(user.id).await?;

        record.archive(now)?;
        self.force_save(&record).await?;
        user.sync_account_state(&record);

        tracing::info!(
            user_id = %user.id,
            event = "user_deleted",
            "User archived"
        );
        Ok(true)
    }

    /// Redeem a verification code, activating its user
    ///
    /// Returns `None` when no user holds the code or the activation was
    /// rejected by store validation.
    pub async fn verify_account(&self, code: &str) -> DomainResult<Option<User>> {
        let Some(mut user) = self.get_user_by_verification_code(code).await? else {
            return Ok(None);
        };

        if !self.activate_user(&mut user).await? {
            tracing::warn!(
                user_id = %user.id,
                event = "verification_rejected",
                "Verification code not redeemed"
            );
            return Ok(None);
        }
        Ok(Some(user))
    }

    /// Validate, hash and apply `record.new_password`.
    ///
    /// On rejection a `new_password` error is attached and nothing else changes.
    fn apply_new_password(&self, record: &mut User, now: DateTime<Utc>) -> DomainResult<bool> {
        let Some(password) = record.new_password.clone() else {
            record
                .errors
                .add_error("new_password", INVALID_PASSWORD_MESSAGE, "invalid");
            return Ok(false);
        };

        if let Err(reason) = self.password_validator.validate(password.expose_secret()) {
            tracing::debug!(
                user_id = %record.id,
                reason = %reason,
                "New password rejected by policy"
            );
            record
                .errors
                .add_error("new_password", INVALID_PASSWORD_MESSAGE, "invalid");
            return Ok(false);
        }

        let hashed = self
            .password_hasher
            .hash_password(password.expose_secret())
            .map_err(|message| {
                tracing::error!(
                    user_id = %record.id,
                    error = %message,
                    event = "password_hashing_failed",
                    "Failed to hash new password"
                );
                AccountError::PasswordHashing { message }
            })?;

        record.set_password(hashed, now)?;
        Ok(true)
    }

    async fn apply_transition<F>(
        &self,
        user: &mut User,
        event: &'static str,
        transition: F,
    ) -> DomainResult<bool>
    where
        F: FnOnce(&mut User, DateTime<Utc>) -> Result<(), AccountError> + Send,
    {
        let now = self.clock.now();
        user.errors.clear();

        let mut record = self.load_record(user.id).await?;
        transition(&mut record, now)?;

        let errors = self.user_repository.save(&record, SaveMode::Validate).await?;
        if errors.has_errors() {
            tracing::warn!(
                user_id = %user.id,
                errors = %errors,
                event = event,
                "Status change rejected by validation"
            );
            user.errors.merge(errors);
            return Ok(false);
        }

        user.sync_account_state(&record);
        tracing::info!(
            user_id = %user.id,
            status = %record.status_kind(),
            event = event,
            "User status changed"
        );
        Ok(true)
    }

    async fn reissue_and_send(&self, user: &mut User, key: EmailKey) -> DomainResult<()> {
        let now = self.clock.now();
        let mut record = self.load_record(user.id).await?;

        record.issue_verification_code(now)?;
        self.force_save(&record).await?;
        user.sync_account_state(&record);

        self.send_link(&record, key).await
    }

    async fn send_link(&self, user: &User, key: EmailKey) -> DomainResult<()> {
        let link = self.verification_url(user)?;
        let mut variables = HashMap::new();
        variables.insert("link".to_string(), link);

        self.mailer
            .send_email_by_key(user, key, &variables)
            .await
            .map_err(|message| {
                tracing::error!(
                    user_id = %user.id,
                    template = key.as_str(),
                    error = %message,
                    event = "mail_delivery_failed",
                    "Failed to send account email"
                );
                AccountError::MailDelivery {
                    template: key.to_string(),
                    message,
                }
            })?;

        tracing::info!(
            user_id = %user.id,
            template = key.as_str(),
            event = "account_email_sent",
            "Account email sent"
        );
        Ok(())
    }

    /// Stored user by id, passed through the read hook
    async fn load_record(&self, id: Uuid) -> DomainResult<User> {
        match self.user_repository.find_by_id(id).await? {
            Some(user) => self.populate_user(user).await,
            None => {
                tracing::warn!(user_id = %id, "Operation on unknown user");
                Err(AccountError::UserNotFound { id }.into())
            }
        }
    }

    async fn populate_optional(&self, user: Option<User>) -> DomainResult<Option<User>> {
        match user {
            Some(user) => Ok(Some(self.populate_user(user).await?)),
            None => Ok(None),
        }
    }

    async fn force_save(&self, user: &User) -> DomainResult<()> {
        let errors = self.user_repository.save(user, SaveMode::Force).await?;
        if errors.has_errors() {
            tracing::error!(
                user_id = %user.id,
                errors = %errors,
                "Store rejected a forced write"
            );
            return Err(DomainError::Internal {
                message: format!("Forced save of user {} was rejected: {}", user.id, errors),
            });
        }
        Ok(())
    }
}
