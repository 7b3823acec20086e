//! In-memory implementation of UserRepository for tests and local runs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use cms_shared::ValidationErrors;

use crate::domain::entities::user::User;
use crate::errors::DomainError;

use super::trait_::{
    email_taken_message, username_taken_message, validate_fields, SaveMode, UserRepository,
};

/// Mock user repository with the same validation rules as the SQL store
pub struct MockUserRepository {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    save_count: AtomicUsize,
}

impl MockUserRepository {
    /// Create a new mock repository
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            save_count: AtomicUsize::new(0),
        }
    }

    /// Store a user directly, bypassing validation
    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }

    /// Raw stored record, without any read-side transitions
    pub async fn get(&self, id: Uuid) -> Option<User> {
        self.users.read().await.get(&id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    /// Number of successful writes
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }

    fn validate_against(user: &User, users: &HashMap<Uuid, User>) -> ValidationErrors {
        let mut errors = validate_fields(user);

        if is_taken(users, user, &user.username, |u| u.username.as_str()) {
            errors.add_error("username", username_taken_message(&user.username), "unique");
        }
        if is_taken(users, user, &user.email, |u| u.email.as_str()) {
            errors.add_error("email", email_taken_message(&user.email), "unique");
        }

        errors
    }
}

/// Whether another user already holds `value` for the selected field
fn is_taken(users: &HashMap<Uuid, User>, user: &User, value: &str, field: fn(&User) -> &str) -> bool {
    !value.is_empty()
        && users
            .values()
            .any(|other| other.id != user.id && field(other).eq_ignore_ascii_case(value))
}

impl Default for MockUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn find_by_username_or_email(&self, value: &str) -> Result<Option<User>, DomainError> {
        if value.is_empty() {
            return Ok(None);
        }
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.username.eq_ignore_ascii_case(value) || u.email.eq_ignore_ascii_case(value))
            .cloned())
    }

    async fn find_by_verification_code(
        &self,
        code: &str,
        issued_after: DateTime<Utc>,
    ) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| {
                u.verification()
                    .map_or(false, |v| v.code == code && v.issued_at > issued_after)
            })
            .cloned())
    }

    async fn validate(&self, user: &User) -> Result<ValidationErrors, DomainError> {
        let users = self.users.read().await;
        Ok(Self::validate_against(user, &users))
    }

    async fn save(&self, user: &User, mode: SaveMode) -> Result<ValidationErrors, DomainError> {
        let mut users = self.users.write().await;

        if mode == SaveMode::Validate {
            let errors = Self::validate_against(user, &users);
            if errors.has_errors() {
                return Ok(errors);
            }
        }

        let mut stored = user.clone();
        stored.new_password = None;
        stored.errors.clear();
        stored.verification_required = false;
        users.insert(stored.id, stored);
        self.save_count.fetch_add(1, Ordering::SeqCst);

        Ok(ValidationErrors::new())
    }
}
