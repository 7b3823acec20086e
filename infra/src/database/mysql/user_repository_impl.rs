//! MySQL implementation of the UserRepository trait.
//!
//! Users are stored in a single `users` row; the status variant is spread
//! over the `status` column and the columns meaningful to each variant.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, MySqlPool, Row};
use std::str::FromStr;
use uuid::Uuid;

use cms_core::domain::entities::{
    AccountStatus, EmailFormat, InvalidLoginWindow, StatusKind, User, VerificationCode,
};
use cms_core::errors::DomainError;
use cms_core::repositories::user::{
    email_taken_message, username_taken_message, validate_fields, SaveMode, UserRepository,
};
use cms_shared::ValidationErrors;

const USER_COLUMNS: &str = r#"
    id, username, email, first_name, last_name, email_format, language, admin,
    password_hash, hash_algorithm, password_reset_required, last_password_change_at,
    last_login_at, last_invalid_login_at, last_login_attempt_ip, auth_session_token,
    status, invalid_login_count, invalid_login_window_start, locked_at,
    archived_username, archived_email, verification_code, verification_code_issued_at,
    created_at, updated_at
"#;

/// Status variant flattened into its table columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StatusColumns {
    pub status: StatusKind,
    pub invalid_login_count: u32,
    pub invalid_login_window_start: Option<DateTime<Utc>>,
    pub locked_at: Option<DateTime<Utc>>,
    pub archived_username: Option<String>,
    pub archived_email: Option<String>,
}

impl StatusColumns {
    pub(crate) fn from_status(status: &AccountStatus) -> Self {
        let mut columns = Self {
            status: status.kind(),
            invalid_login_count: 0,
            invalid_login_window_start: None,
            locked_at: None,
            archived_username: None,
            archived_email: None,
        };

        match status {
            AccountStatus::Active {
                invalid_logins: Some(window),
            } => {
                columns.invalid_login_count = window.count;
                columns.invalid_login_window_start = Some(window.started_at);
            }
            AccountStatus::Locked { locked_at } => columns.locked_at = Some(*locked_at),
            AccountStatus::Archived { username, email } => {
                columns.archived_username = Some(username.clone());
                columns.archived_email = Some(email.clone());
            }
            _ => {}
        }

        columns
    }

    pub(crate) fn into_status(self) -> Result<AccountStatus, DomainError> {
        let status = match self.status {
            StatusKind::Pending => AccountStatus::Pending,
            StatusKind::Active => AccountStatus::Active {
                invalid_logins: match self.invalid_login_window_start {
                    Some(started_at) if self.invalid_login_count > 0 => Some(InvalidLoginWindow {
                        started_at,
                        count: self.invalid_login_count,
                    }),
                    _ => None,
                },
            },
            StatusKind::Locked => AccountStatus::Locked {
                locked_at: self.locked_at.ok_or_else(|| {
                    DomainError::Database("Locked user row has no locked_at".to_string())
                })?,
            },
            StatusKind::Suspended => AccountStatus::Suspended,
            StatusKind::Archived => AccountStatus::Archived {
                username: self.archived_username.unwrap_or_default(),
                email: self.archived_email.unwrap_or_default(),
            },
        };
        Ok(status)
    }
}

/// MySQL implementation of UserRepository
pub struct MySqlUserRepository {
    /// Database connection pool
    pool: MySqlPool,
}

impl MySqlUserRepository {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Convert database row to User entity
    fn row_to_user(row: &MySqlRow) -> Result<User, DomainError> {
        let id: String = column(row, "id")?;
        let status: String = column(row, "status")?;

        let status = StatusColumns {
            status: StatusKind::from_str(&status).map_err(DomainError::Database)?,
            invalid_login_count: column(row, "invalid_login_count")?,
            invalid_login_window_start: column(row, "invalid_login_window_start")?,
            locked_at: column(row, "locked_at")?,
            archived_username: column(row, "archived_username")?,
            archived_email: column(row, "archived_email")?,
        }
        .into_status()?;

        let code: Option<String> = column(row, "verification_code")?;
        let issued_at: Option<DateTime<Utc>> = column(row, "verification_code_issued_at")?;
        let verification = match (code, issued_at) {
            (Some(code), Some(issued_at)) => Some(VerificationCode::new(code, issued_at)),
            _ => None,
        };

        let mut user = User::blank(
            Uuid::parse_str(&id)
                .map_err(|e| DomainError::Database(format!("Invalid UUID: {}", e)))?,
        )
        .with_status(status)
        .with_verification(verification);

        user.username = column(row, "username")?;
        user.email = column(row, "email")?;
        user.first_name = column(row, "first_name")?;
        user.last_name = column(row, "last_name")?;
        user.email_format = EmailFormat::from_db(&column::<String>(row, "email_format")?);
        user.language = column(row, "language")?;
        user.admin = column(row, "admin")?;
        user.password_hash = column(row, "password_hash")?;
        user.hash_algorithm = column(row, "hash_algorithm")?;
        user.password_reset_required = column(row, "password_reset_required")?;
        user.last_password_change_at = column(row, "last_password_change_at")?;
        user.last_login_at = column(row, "last_login_at")?;
        user.last_invalid_login_at = column(row, "last_invalid_login_at")?;
        user.last_login_attempt_ip = column(row, "last_login_attempt_ip")?;
        user.auth_session_token = column(row, "auth_session_token")?;
        user.created_at = column(row, "created_at")?;
        user.updated_at = column(row, "updated_at")?;

        Ok(user)
    }

    async fn fetch_optional(
        &self,
        query: sqlx::query::Query<'_, MySql, sqlx::mysql::MySqlArguments>,
    ) -> Result<Option<User>, DomainError> {
        let row = query
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::Database(format!("Database query failed: {}", e)))?;

        row.as_ref().map(Self::row_to_user).transpose()
    }

    /// Whether another user holds `value` in `field` (case-insensitive)
    async fn is_taken(&self, field: &str, value: &str, id: Uuid) -> Result<bool, DomainError> {
        if value.is_empty() {
            return Ok(false);
        }

        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM users WHERE LOWER({field}) = LOWER(?) AND id <> ?) AS taken"
        );

        let row = sqlx::query(&query)
            .bind(value)
            .bind(id.to_string())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::Database(format!("Failed to check {}: {}", field, e)))?;

        let taken: i64 = column(&row, "taken")?;
        Ok(taken == 1)
    }

    async fn upsert(&self, user: &User) -> Result<(), DomainError> {
        let status = StatusColumns::from_status(user.status());
        let verification = user.verification();

        let query = format!(
            r#"
            INSERT INTO users ({USER_COLUMNS})
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                username = VALUES(username),
                email = VALUES(email),
                first_name = VALUES(first_name),
                last_name = VALUES(last_name),
                email_format = VALUES(email_format),
                language = VALUES(language),
                admin = VALUES(admin),
                password_hash = VALUES(password_hash),
                hash_algorithm = VALUES(hash_algorithm),
                password_reset_required = VALUES(password_reset_required),
                last_password_change_at = VALUES(last_password_change_at),
                last_login_at = VALUES(last_login_at),
                last_invalid_login_at = VALUES(last_invalid_login_at),
                last_login_attempt_ip = VALUES(last_login_attempt_ip),
                auth_session_token = VALUES(auth_session_token),
                status = VALUES(status),
                invalid_login_count = VALUES(invalid_login_count),
                invalid_login_window_start = VALUES(invalid_login_window_start),
                locked_at = VALUES(locked_at),
                archived_username = VALUES(archived_username),
                archived_email = VALUES(archived_email),
                verification_code = VALUES(verification_code),
                verification_code_issued_at = VALUES(verification_code_issued_at),
                updated_at = VALUES(updated_at)
            "#
        );

        sqlx::query(&query)
            .bind(user.id.to_string())
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .bind(user.email_format.as_str())
            .bind(&user.language)
            .bind(user.admin)
            .bind(&user.password_hash)
            .bind(&user.hash_algorithm)
            .bind(user.password_reset_required)
            .bind(user.last_password_change_at)
            .bind(user.last_login_at)
            .bind(user.last_invalid_login_at)
            .bind(&user.last_login_attempt_ip)
            .bind(&user.auth_session_token)
            .bind(status.status.as_str())
            .bind(status.invalid_login_count)
            .bind(status.invalid_login_window_start)
            .bind(status.locked_at)
            .bind(status.archived_username)
            .bind(status.archived_email)
            .bind(verification.map(|v| v.code.clone()))
            .bind(verification.map(|v| v.issued_at))
            .bind(user.created_at)
            .bind(Utc::now()) // Always update the timestamp
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::Database(format!("Failed to save user: {}", e)))?;

        Ok(())
    }
}

/// Read a column, mapping decode failures to [`DomainError::Database`]
fn column<'r, T>(row: &'r MySqlRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, MySql> + sqlx::Type<MySql>,
{
    row.try_get(name)
        .map_err(|e| DomainError::Database(format!("Failed to get {}: {}", name, e)))
}

#[async_trait]
impl UserRepository for MySqlUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ? LIMIT 1");
        self.fetch_optional(sqlx::query(&query).bind(id.to_string()))
            .await
    }

    async fn find_by_username_or_email(&self, value: &str) -> Result<Option<User>, DomainError> {
        if value.is_empty() {
            return Ok(None);
        }

        let query = format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE LOWER(username) = LOWER(?) OR LOWER(email) = LOWER(?)
            LIMIT 1
            "#
        );
        self.fetch_optional(sqlx::query(&query).bind(value).bind(value))
            .await
    }

    async fn find_by_verification_code(
        &self,
        code: &str,
        issued_after: DateTime<Utc>,
    ) -> Result<Option<User>, DomainError> {
        let query = format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE verification_code = ? AND verification_code_issued_at > ?
            LIMIT 1
            "#
        );
        self.fetch_optional(sqlx::query(&query).bind(code).bind(issued_after))
            .await
    }

    async fn validate(&self, user: &User) -> Result<ValidationErrors, DomainError> {
        let mut errors = validate_fields(user);

        if self.is_taken("username", &user.username, user.id).await? {
            errors.add_error("username", username_taken_message(&user.username), "unique");
        }
        if self.is_taken("email", &user.email, user.id).await? {
            errors.add_error("email", email_taken_message(&user.email), "unique");
        }

        Ok(errors)
    }

    async fn save(&self, user: &User, mode: SaveMode) -> Result<ValidationErrors, DomainError> {
        if mode == SaveMode::Validate {
            let errors = self.validate(user).await?;
            if errors.has_errors() {
                tracing::debug!(
                    user_id = %user.id,
                    errors = errors.len(),
                    "User failed store validation"
                );
                return Ok(errors);
            }
        }

        self.upsert(user).await?;
        Ok(ValidationErrors::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_active_window_maps_to_columns_and_back() {
        let status = AccountStatus::Active {
            invalid_logins: Some(InvalidLoginWindow {
                started_at: at(9),
                count: 2,
            }),
        };

        let columns = StatusColumns::from_status(&status);
        assert_eq!(columns.status, StatusKind::Active);
        assert_eq!(columns.invalid_login_count, 2);
        assert_eq!(columns.invalid_login_window_start, Some(at(9)));
        assert_eq!(columns.into_status().unwrap(), status);
    }

    #[test]
    fn test_stale_counter_without_window_start_is_dropped() {
        let columns = StatusColumns {
            invalid_login_count: 3,
            ..StatusColumns::from_status(&AccountStatus::active())
        };

        assert_eq!(columns.into_status().unwrap(), AccountStatus::active());
    }

    #[test]
    fn test_archived_identity_uses_shadow_columns() {
        let status = AccountStatus::Archived {
            username: "jane".to_string(),
            email: "jane@example.com".to_string(),
        };

        let columns = StatusColumns::from_status(&status);
        assert_eq!(columns.archived_username.as_deref(), Some("jane"));
        assert_eq!(columns.locked_at, None);
        assert_eq!(columns.into_status().unwrap(), status);
    }

    #[test]
    fn test_locked_row_requires_locked_at() {
        let mut columns = StatusColumns::from_status(&AccountStatus::Locked { locked_at: at(10) });
        assert_eq!(columns.locked_at, Some(at(10)));

        columns.locked_at = None;
        assert!(matches!(columns.into_status(), Err(DomainError::Database(_))));
    }

    #[test]
    fn test_unit_statuses_carry_no_columns() {
        for status in [AccountStatus::Pending, AccountStatus::Suspended] {
            let columns = StatusColumns::from_status(&status);
            assert_eq!(columns.invalid_login_count, 0);
            assert!(columns.invalid_login_window_start.is_none());
            assert!(columns.archived_email.is_none());
            assert_eq!(columns.into_status().unwrap(), status);
        }
    }
}
