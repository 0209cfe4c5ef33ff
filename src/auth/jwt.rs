/// JWT Token Generation and Validation
///
/// Access and refresh tokens are both HS256 JWTs, each signed with its own
/// secret from `JwtSettings`.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::auth::claims::{Claims, RefreshClaims};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};
use crate::users::User;

/// Generate a new access token for a user
///
/// # Errors
/// `Internal` if signing fails
pub fn generate_access_token(user: &User, config: &JwtSettings) -> Result<String, AppError> {
    let claims = Claims::for_user(user, config.access_token_expiry, config.issuer.clone());
    sign(&claims, &config.access_token_secret)
}

/// Validate an access token and return its claims
///
/// # Errors
/// `TokenInvalid` if the token is malformed, expired, tampered with or
/// issued by someone else
pub fn validate_access_token(token: &str, config: &JwtSettings) -> Result<Claims, AppError> {
    verify(token, &config.access_token_secret, &config.issuer)
}

/// Generate a new refresh token for a user
pub fn generate_refresh_token(user: &User, config: &JwtSettings) -> Result<String, AppError> {
    let claims = RefreshClaims::new(user.id, config.refresh_token_expiry, config.issuer.clone());
    sign(&claims, &config.refresh_token_secret)
}

/// Validate a refresh token's signature, issuer and expiry.
///
/// This says nothing about whether the token is still the user's current
/// one; that is decided against the stored session slot.
pub fn validate_refresh_token(token: &str, config: &JwtSettings) -> Result<RefreshClaims, AppError> {
    verify(token, &config.refresh_token_secret, &config.issuer)
}

fn sign<T: Serialize>(claims: &T, secret: &str) -> Result<String, AppError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

fn verify<T: DeserializeOwned>(token: &str, secret: &str, issuer: &str) -> Result<T, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[issuer]);

    decode::<T>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::warn!("JWT validation error: {}", e);
            AppError::Auth(AuthError::TokenInvalid)
        })
}
