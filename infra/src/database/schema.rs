//! Users table definition

use sqlx::MySqlPool;

use crate::InfrastructureError;

/// Name of the users table
pub const USERS_TABLE: &str = "users";

/// DDL for the users table.
///
/// `username` and `email` are not unique at the index level: archived rows
/// keep empty values and uniqueness among live users is checked on save.
pub const CREATE_USERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id CHAR(36) NOT NULL PRIMARY KEY,
    username VARCHAR(100) NOT NULL DEFAULT '',
    email VARCHAR(255) NOT NULL DEFAULT '',
    first_name VARCHAR(100) NULL,
    last_name VARCHAR(100) NULL,
    email_format VARCHAR(4) NOT NULL DEFAULT 'text',
    language VARCHAR(12) NULL,
    admin BOOLEAN NOT NULL DEFAULT FALSE,
    password_hash VARCHAR(255) NULL,
    hash_algorithm VARCHAR(32) NULL,
    password_reset_required BOOLEAN NOT NULL DEFAULT FALSE,
    last_password_change_at DATETIME(6) NULL,
    last_login_at DATETIME(6) NULL,
    last_invalid_login_at DATETIME(6) NULL,
    last_login_attempt_ip VARCHAR(45) NULL,
    auth_session_token VARCHAR(100) NULL,
    status VARCHAR(10) NOT NULL DEFAULT 'pending',
    invalid_login_count INT UNSIGNED NOT NULL DEFAULT 0,
    invalid_login_window_start DATETIME(6) NULL,
    locked_at DATETIME(6) NULL,
    archived_username VARCHAR(100) NULL,
    archived_email VARCHAR(255) NULL,
    verification_code VARCHAR(100) NULL,
    verification_code_issued_at DATETIME(6) NULL,
    created_at DATETIME(6) NOT NULL,
    updated_at DATETIME(6) NOT NULL,
    INDEX idx_users_username (username),
    INDEX idx_users_email (email),
    INDEX idx_users_verification_code (verification_code)
) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4
"#;

/// Create the users table if it does not exist
pub async fn ensure_schema(pool: &MySqlPool) -> Result<(), InfrastructureError> {
    sqlx::query(CREATE_USERS_TABLE).execute(pool).await?;
    tracing::debug!(table = USERS_TABLE, "Schema ensured");
    Ok(())
}
