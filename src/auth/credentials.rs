/// Credential verification for login
///
/// Read-only: a failed or successful check never writes to the store.

use crate::auth::password::verify_password;
use crate::error::{AppError, AuthError, ValidationError};
use crate::users::{User, UserStore};

/// Normalise an optional identifier: trimmed, lowercased, `None` if blank.
fn identifier(value: Option<&str>) -> Option<String> {
    value
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty())
}

/// Find the user named by `username` or `email` and check `password`.
///
/// # Errors
/// - `Validation` if neither identifier is given or the password is empty
/// - `NotFound` if no user matches either identifier
/// - `InvalidCredentials` if the password does not match
pub async fn verify_credentials(
    store: &dyn UserStore,
    username: Option<&str>,
    email: Option<&str>,
    password: &str,
) -> Result<User, AppError> {
    let username = identifier(username);
    let email = identifier(email);

    if username.is_none() && email.is_none() {
        return Err(ValidationError::Required("username or email".to_string()).into());
    }
    if password.is_empty() {
        return Err(ValidationError::EmptyField("password".to_string()).into());
    }

    let user = store
        .find_by_username_or_email(username.as_deref(), email.as_deref())
        .await?
        .ok_or_else(AppError::user_not_found)?;

    if !verify_password(password, &user.password_hash)? {
        tracing::warn!(user_id = %user.id, "Password mismatch on login");
        return Err(AuthError::InvalidCredentials.into());
    }

    Ok(user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::hash_password;
    use crate::error::DatabaseError;
    use crate::users::{InMemoryUserStore, NewUser};

    async fn store_with_alice() -> InMemoryUserStore {
        let store = InMemoryUserStore::new();
        store
            .insert(NewUser {
                username: "alice".to_string(),
                email: "alice@example.com".to_string(),
                full_name: "Alice".to_string(),
                avatar: "https://cdn.example.com/alice.png".to_string(),
                cover_image: None,
                password_hash: hash_password("CorrectHorse1").unwrap(),
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn accepts_username_or_email() {
        let store = store_with_alice().await;

        let by_name = verify_credentials(&store, Some("Alice"), None, "CorrectHorse1").await;
        assert_eq!(by_name.unwrap().username, "alice");

        let by_email =
            verify_credentials(&store, None, Some(" ALICE@example.com "), "CorrectHorse1").await;
        assert_eq!(by_email.unwrap().username, "alice");
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials_and_writes_nothing() {
        let store = store_with_alice().await;

        let result = verify_credentials(&store, Some("alice"), None, "WrongHorse1").await;
        assert!(matches!(result, Err(AppError::Auth(AuthError::InvalidCredentials))));

        let alice = store
            .find_by_username_or_email(Some("alice"), None)
            .await
            .unwrap()
            .unwrap();
        assert!(alice.refresh_token_hash.is_none());
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let store = store_with_alice().await;

        let result = verify_credentials(&store, Some("bob"), None, "CorrectHorse1").await;
        assert!(matches!(result, Err(AppError::Database(DatabaseError::NotFound(_)))));
    }

    #[tokio::test]
    async fn missing_identifier_or_password_is_validation_error() {
        let store = store_with_alice().await;

        let no_identifier = verify_credentials(&store, None, Some("  "), "CorrectHorse1").await;
        assert!(matches!(no_identifier, Err(AppError::Validation(_))));

        let no_password = verify_credentials(&store, Some("alice"), None, "").await;
        assert!(matches!(no_password, Err(AppError::Validation(_))));
    }
}
