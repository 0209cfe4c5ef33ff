/// Session-token lifecycle
///
/// Each user has exactly one session slot holding the digest of the one
/// refresh token currently honoured. Issuing a pair overwrites the slot,
/// refreshing compares against it and then overwrites it, logout clears
/// it. A refresh token is therefore either active (its digest is in the
/// slot) or superseded (anything else); there is no separate revoked list.
///
/// Operations read and then write without a transaction. Two concurrent
/// refreshes with the same token can both pass the comparison; whichever
/// writes last owns the slot and the other's new token is dead on arrival.

use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::auth::jwt::{generate_access_token, generate_refresh_token, validate_refresh_token};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};
use crate::users::{User, UserStore};

/// Freshly minted access and refresh tokens
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// SHA-256 hex digest stored in the session slot instead of the token
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Mint an access/refresh pair for `user` and make the refresh token the
/// user's only active one.
///
/// Only the session slot is written; the rest of the record, including
/// the password hash, is untouched.
///
/// # Errors
/// `Internal` if signing or persisting fails
pub async fn issue_tokens(
    store: &dyn UserStore,
    user: &User,
    config: &JwtSettings,
) -> Result<TokenPair, AppError> {
    let access_token = generate_access_token(user, config)?;
    let refresh_token = generate_refresh_token(user, config)?;

    store
        .set_refresh_token(user.id, Some(&hash_token(&refresh_token)))
        .await
        .map_err(|e| {
            tracing::error!(user_id = %user.id, error = %e, "Failed to persist refresh token");
            AppError::Internal("Something went wrong while generating tokens".to_string())
        })?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Exchange a presented refresh token for a new pair.
///
/// # Errors
/// - `MissingToken` if no token was presented
/// - `TokenInvalid` if verification fails or the subject is unknown
/// - `TokenReused` if the token is not the one in the user's slot
/// - `Internal` if issuing the new pair fails
pub async fn rotate_refresh_token(
    store: &dyn UserStore,
    presented: Option<&str>,
    config: &JwtSettings,
) -> Result<(User, TokenPair), AppError> {
    let presented = presented
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AuthError::MissingToken)?;

    let claims = validate_refresh_token(presented, config)?;
    let user_id = claims.user_id()?;

    let user = store.find_by_id(user_id).await?.ok_or_else(|| {
        tracing::warn!(user_id = %user_id, "Refresh token names an unknown user");
        AppError::Auth(AuthError::TokenInvalid)
    })?;

    let presented_hash = hash_token(presented);
    if user.refresh_token_hash.as_deref() != Some(presented_hash.as_str()) {
        tracing::warn!(user_id = %user.id, jti = %claims.jti, "Superseded refresh token presented");
        return Err(AuthError::TokenReused.into());
    }

    let pair = issue_tokens(store, &user, config).await?;
    Ok((user, pair))
}

/// Clear the session slot so no refresh token is honoured for `user_id`.
pub async fn revoke_session(store: &dyn UserStore, user_id: Uuid) -> Result<(), AppError> {
    store.set_refresh_token(user_id, None).await
}
