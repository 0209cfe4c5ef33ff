use async_trait::async_trait;
use uuid::Uuid;

use super::model::{NewUser, User};
use crate::error::AppError;

/// Persistence for user records.
///
/// Writes are targeted single-purpose updates rather than whole-record
/// saves, so touching the session slot never rewrites the password hash.
/// No operation is transactional across calls; callers that read and then
/// write race with each other and the last write wins.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user. Fails with a duplicate error if the username or
    /// email is taken.
    async fn insert(&self, new_user: NewUser) -> Result<User, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    /// Find the user whose username equals `username` or whose email
    /// equals `email`. Either may be `None`.
    async fn find_by_username_or_email(
        &self,
        username: Option<&str>,
        email: Option<&str>,
    ) -> Result<Option<User>, AppError>;

    /// Overwrite the session slot. `None` clears it.
    async fn set_refresh_token(&self, id: Uuid, token_hash: Option<&str>) -> Result<(), AppError>;

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<(), AppError>;

    /// Update profile fields and return the updated record.
    async fn update_details(&self, id: Uuid, full_name: &str, email: &str) -> Result<User, AppError>;
}
