/// Authentication Routes
///
/// Registration, login, token refresh and logout.

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::{
    hash_password, issue_tokens, removal_cookie, revoke_session, rotate_refresh_token,
    token_cookie, verify_credentials, Claims, TokenPair, ACCESS_TOKEN_COOKIE,
    REFRESH_TOKEN_COOKIE,
};
use crate::configuration::JwtSettings;
use crate::error::{AppError, ErrorContext};
use crate::users::{NewUser, UserResponse, UserStore};
use crate::validators::{
    is_valid_email, is_valid_image_url, is_valid_name, is_valid_username, require_non_empty,
};

/// User registration request
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub avatar: String,
    pub cover_image: Option<String>,
}

/// Login request; at least one of `username` / `email` is required
#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: String,
}

/// Token refresh request; the cookie takes precedence over the body
#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

/// Token pair as returned to the client
#[derive(Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

impl AuthResponse {
    fn new(pair: TokenPair, jwt_config: &JwtSettings) -> Self {
        Self {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: jwt_config.access_token_expiry,
        }
    }
}

#[derive(Serialize)]
pub struct LoginResponse {
    pub user: UserResponse,
    #[serde(flatten)]
    pub tokens: AuthResponse,
}

/// Respond with the token pair in the body and as cookies
fn with_token_cookies<T: Serialize>(
    mut builder: actix_web::HttpResponseBuilder,
    pair: &TokenPair,
    jwt_config: &JwtSettings,
    body: &T,
) -> HttpResponse {
    builder
        .cookie(token_cookie(
            ACCESS_TOKEN_COOKIE,
            pair.access_token.clone(),
            jwt_config.access_token_expiry,
        ))
        .cookie(token_cookie(
            REFRESH_TOKEN_COOKIE,
            pair.refresh_token.clone(),
            jwt_config.refresh_token_expiry,
        ))
        .json(body)
}

/// POST /api/v1/users/register
///
/// Create an account. No tokens are issued; the client logs in next.
///
/// # Errors
/// - 400: a field is empty or fails validation, or the password is weak
/// - 409: username or email already registered
pub async fn register(
    form: web::Json<RegisterRequest>,
    store: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::current();

    let full_name = is_valid_name(&form.full_name)?;
    let username = is_valid_username(&form.username)?;
    let email = is_valid_email(&form.email)?;
    require_non_empty("password", &form.password)?;
    let avatar = is_valid_image_url("avatar", &form.avatar)?;
    let cover_image = match form.cover_image.as_deref().map(str::trim) {
        Some(url) if !url.is_empty() => Some(is_valid_image_url("cover_image", url)?),
        _ => None,
    };

    // Cheap duplicate check before paying for bcrypt; the store still
    // enforces uniqueness on insert.
    if store
        .find_by_username_or_email(Some(&username), Some(&email))
        .await?
        .is_some()
    {
        return Err(AppError::duplicate_user());
    }

    let password_hash = hash_password(&form.password)?;

    let user = store
        .insert(NewUser {
            username,
            email,
            full_name,
            avatar,
            cover_image,
            password_hash,
        })
        .await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "User registered successfully"
    );

    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// POST /api/v1/users/login
///
/// Authenticate with username or email plus password. The issued refresh
/// token replaces any earlier session of this user.
///
/// # Errors
/// - 400: no identifier, or empty password
/// - 404: no such user
/// - 401: wrong password
pub async fn login(
    form: web::Json<LoginRequest>,
    store: web::Data<dyn UserStore>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::current();

    let user = verify_credentials(
        store.get_ref(),
        form.username.as_deref(),
        form.email.as_deref(),
        &form.password,
    )
    .await?;

    let pair = issue_tokens(store.get_ref(), &user, jwt_config.get_ref()).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "User logged in successfully"
    );

    let body = LoginResponse {
        user: UserResponse::from(&user),
        tokens: AuthResponse::new(pair.clone(), jwt_config.get_ref()),
    };
    Ok(with_token_cookies(HttpResponse::Ok(), &pair, jwt_config.get_ref(), &body))
}

/// POST /api/v1/users/refresh-token
///
/// Exchange the current refresh token (cookie or body) for a new pair.
/// The presented token stops working immediately.
///
/// # Errors
/// - 401 UNAUTHORIZED: no token presented
/// - 401 TOKEN_INVALID: bad signature, expired, or unknown user
/// - 401 TOKEN_REUSED: token already rotated or logged out
pub async fn refresh(
    req: HttpRequest,
    body: Option<web::Json<RefreshRequest>>,
    store: web::Data<dyn UserStore>,
    jwt_config: web::Data<JwtSettings>,
) -> Result<HttpResponse, AppError> {
    let context = ErrorContext::current();

    let presented = req
        .cookie(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
        .or_else(|| body.and_then(|b| b.into_inner().refresh_token));

    let (user, pair) =
        rotate_refresh_token(store.get_ref(), presented.as_deref(), jwt_config.get_ref()).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user.id,
        "Token refreshed successfully"
    );

    let body = AuthResponse::new(pair.clone(), jwt_config.get_ref());
    Ok(with_token_cookies(HttpResponse::Ok(), &pair, jwt_config.get_ref(), &body))
}

/// POST /api/v1/users/logout
///
/// Requires a valid access token. Clears the session slot, so the last
/// refresh token stops working, and drops both cookies.
pub async fn logout(
    claims: web::ReqData<Claims>,
    store: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.user_id()?;
    let context = ErrorContext::current().with_user_id(user_id.to_string());

    revoke_session(store.get_ref(), user_id).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = ?context.user_id,
        "User logged out"
    );

    Ok(HttpResponse::Ok()
        .cookie(removal_cookie(ACCESS_TOKEN_COOKIE))
        .cookie(removal_cookie(REFRESH_TOKEN_COOKIE))
        .json(serde_json::json!({ "message": "User logged out" })))
}
