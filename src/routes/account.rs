/// Account Routes
///
/// Profile reads and updates for the authenticated user.

use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::auth::{hash_password, verify_password, Claims};
use crate::error::{AppError, AuthError, ErrorContext, ValidationError};
use crate::users::{UserResponse, UserStore};
use crate::validators::{is_valid_email, is_valid_name};

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

#[derive(Deserialize)]
pub struct UpdateAccountRequest {
    pub full_name: String,
    pub email: String,
}

/// GET /api/v1/users/current-user
pub async fn get_current_user(
    claims: web::ReqData<Claims>,
    store: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.user_id()?;

    let user = store
        .find_by_id(user_id)
        .await?
        .ok_or_else(AppError::user_not_found)?;

    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}

/// POST /api/v1/users/change-password
///
/// Only the password column changes; the current session stays valid.
///
/// # Errors
/// - 400: empty fields or weak new password
/// - 401: old password does not match
pub async fn change_password(
    claims: web::ReqData<Claims>,
    form: web::Json<ChangePasswordRequest>,
    store: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.user_id()?;
    let context = ErrorContext::current();

    if form.old_password.is_empty() {
        return Err(ValidationError::EmptyField("old_password".to_string()).into());
    }

    let user = store
        .find_by_id(user_id)
        .await?
        .ok_or_else(AppError::user_not_found)?;

    if !verify_password(&form.old_password, &user.password_hash)? {
        return Err(AuthError::InvalidCredentials.into());
    }

    let password_hash = hash_password(&form.new_password)?;
    store.update_password(user_id, &password_hash).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user_id,
        "Password changed"
    );

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Password changed successfully" })))
}

/// PATCH /api/v1/users/update-account
///
/// # Errors
/// - 400: empty or invalid full name / email
/// - 409: email belongs to another user
pub async fn update_account(
    claims: web::ReqData<Claims>,
    form: web::Json<UpdateAccountRequest>,
    store: web::Data<dyn UserStore>,
) -> Result<HttpResponse, AppError> {
    let user_id = claims.user_id()?;
    let context = ErrorContext::current();

    let full_name = is_valid_name(&form.full_name)?;
    let email = is_valid_email(&form.email)?;

    let user = store.update_details(user_id, &full_name, &email).await?;

    tracing::info!(
        request_id = %context.request_id,
        user_id = %user_id,
        "Account details updated"
    );

    Ok(HttpResponse::Ok().json(UserResponse::from(&user)))
}
