/// User routes: registration, login, profile, administration, and the
/// password/email reset flows
///
/// Login failures are deliberately indistinguishable (unknown email vs wrong
/// password), and the reset-request endpoints answer identically whether or
/// not the account exists, so neither can be used to enumerate accounts.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::ensure_owner_or_admin,
};
use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shopstack_shared::auth::{
    jwt::{create_token, Claims},
    middleware::CurrentUser,
    password::{hash_password, verify_password},
    reset_token::{generate_reset_token, hash_reset_token, is_token_valid, token_expiry},
};
use shopstack_shared::models::{
    order::Order,
    user::{CreateUser, UpdateUser, User},
};
use uuid::Uuid;
use validator::Validate;

/// Registration request body
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Display name
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Plaintext password
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address
    pub email: String,

    /// Plaintext password
    pub password: String,
}

/// Profile update request body; omitted fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    /// New display name
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,

    /// New email address
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    /// New plaintext password
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: Option<String>,
}

/// Password-reset request body
#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    /// Account email
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Password-reset completion body
#[derive(Debug, Deserialize, Validate)]
pub struct CompletePasswordResetRequest {
    /// New plaintext password
    #[validate(length(min = 8, message = "Password must be at least 8 characters long"))]
    pub password: String,
}

/// Email-reset request body
#[derive(Debug, Deserialize, Validate)]
pub struct ResetEmailRequest {
    /// The address to switch to once confirmed
    #[validate(email(message = "Invalid email format"))]
    pub new_email: String,
}

/// Authenticated-identity response: profile fields plus a bearer token
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// User ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Admin flag
    pub is_admin: bool,

    /// Signed bearer token
    pub token: String,
}

impl AuthResponse {
    fn for_user(user: &User, secret: &str) -> ApiResult<Self> {
        let token = create_token(&Claims::new(user.id), secret)?;

        Ok(Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
            token,
        })
    }
}

/// `POST /users`
///
/// Registers a new account and logs it in (the response carries a token).
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    payload.validate()?;

    let password_hash = hash_password(&payload.password)?;

    // A duplicate email trips the unique constraint and maps to 400
    let user = User::create(
        &state.db,
        CreateUser {
            name: payload.name,
            email: payload.email,
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "User registered");

    let response = AuthResponse::for_user(&user, state.jwt_secret())?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// `POST /users/login`
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let user = User::find_by_email(&state.db, &payload.email).await?;

    // Same error whether the account is unknown or the password is wrong
    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let user = user.ok_or_else(invalid)?;

    if !verify_password(&payload.password, &user.password_hash)? {
        return Err(invalid());
    }

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(AuthResponse::for_user(&user, state.jwt_secret())?))
}

/// `GET /users/profile`
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> ApiResult<Json<User>> {
    let user = User::find_by_id(&state.db, current_user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// `PUT /users/profile`
///
/// Partial update of the caller's own account. A fresh token is returned so
/// clients can swap credentials in one step after an email change.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> ApiResult<Json<AuthResponse>> {
    payload.validate()?;

    let password_hash = match &payload.password {
        Some(password) => Some(hash_password(password)?),
        None => None,
    };

    let user = User::update(
        &state.db,
        current_user.id,
        UpdateUser {
            name: payload.name,
            email: payload.email,
            password_hash,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = %user.id, "Profile updated");

    Ok(Json(AuthResponse::for_user(&user, state.jwt_secret())?))
}

/// `GET /users` (admin)
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(User::list(&state.db).await?))
}

/// `DELETE /users/:id` (admin)
///
/// Cascades to the user's cart, favorites, notifications, reviews, and
/// orders.
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    if !User::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = %id, "User deleted");

    Ok(Json(json!({ "message": "User removed" })))
}

/// `POST /users/reset-password`
///
/// Issues a password-reset token. The response never reveals whether the
/// account exists; delivery of the token happens out of band.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> ApiResult<Json<Value>> {
    payload.validate()?;

    if let Some(user) = User::find_by_email(&state.db, &payload.email).await? {
        let (token, token_hash) = generate_reset_token();
        User::set_reset_password_token(&state.db, user.id, &token_hash, token_expiry()).await?;

        tracing::info!(user_id = %user.id, "Password reset requested");
        tracing::debug!(user_id = %user.id, token = %token, "Password reset token issued");
    }

    Ok(Json(json!({
        "message": "If that account exists, a reset token has been sent"
    })))
}

/// `PUT /users/reset-password/:token`
///
/// Expired and unknown tokens produce the same error.
pub async fn complete_password_reset(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(payload): Json<CompletePasswordResetRequest>,
) -> ApiResult<Json<Value>> {
    payload.validate()?;

    let invalid = || ApiError::BadRequest("Invalid or expired reset token".to_string());

    let user = User::find_by_reset_password_token(&state.db, &hash_reset_token(&token))
        .await?
        .ok_or_else(invalid)?;

    if !is_token_valid(user.reset_password_expires_at) {
        return Err(invalid());
    }

    let password_hash = hash_password(&payload.password)?;
    User::complete_password_reset(&state.db, user.id, &password_hash).await?;

    tracing::info!(user_id = %user.id, "Password reset completed");

    Ok(Json(json!({ "message": "Password updated" })))
}

/// `POST /users/reset-email` (authenticated)
///
/// Stages a new address for the caller behind a confirmation token; the
/// account keeps its current address until the token is redeemed.
pub async fn request_email_reset(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<ResetEmailRequest>,
) -> ApiResult<Json<Value>> {
    payload.validate()?;

    if User::find_by_email(&state.db, &payload.new_email)
        .await?
        .is_some()
    {
        return Err(ApiError::BadRequest("Email already in use".to_string()));
    }

    let (token, token_hash) = generate_reset_token();
    User::set_reset_email_token(
        &state.db,
        current_user.id,
        &payload.new_email,
        &token_hash,
        token_expiry(),
    )
    .await?;

    tracing::info!(user_id = %current_user.id, "Email reset requested");
    tracing::debug!(user_id = %current_user.id, token = %token, "Email reset token issued");

    Ok(Json(json!({
        "message": "A confirmation token has been sent to the new address"
    })))
}

/// `PUT /users/reset-email/:token`
///
/// Public: the token itself proves control of the new mailbox. If the staged
/// address was claimed by someone else in the meantime, the unique constraint
/// rejects the switch.
pub async fn complete_email_reset(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Json<Value>> {
    let invalid = || ApiError::BadRequest("Invalid or expired reset token".to_string());

    let user = User::find_by_reset_email_token(&state.db, &hash_reset_token(&token))
        .await?
        .ok_or_else(invalid)?;

    if !is_token_valid(user.reset_email_expires_at) {
        return Err(invalid());
    }

    let user = User::complete_email_reset(&state.db, user.id)
        .await?
        .ok_or_else(invalid)?;

    tracing::info!(user_id = %user.id, "Email reset completed");

    Ok(Json(json!({ "message": "Email updated" })))
}

/// `GET /users/:id/orders`
///
/// A user's order history; admins may view anyone's.
pub async fn list_user_orders(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Order>>> {
    ensure_owner_or_admin(&current_user, id)?;

    Ok(Json(Order::list_for_user(&state.db, id).await?))
}

/// `DELETE /users/:id/orders/:order_id`
///
/// Removes an order from a user's history. The order must actually belong to
/// the addressed user: 404 if it doesn't exist, 403 if it belongs to someone
/// else.
pub async fn delete_user_order(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path((id, order_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Value>> {
    ensure_owner_or_admin(&current_user, id)?;

    let order = Order::find_by_id(&state.db, order_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

    if order.user_id != id {
        return Err(ApiError::Forbidden(
            "Order does not belong to this user".to_string(),
        ));
    }

    Order::delete(&state.db, order_id).await?;

    tracing::info!(user_id = %id, order_id = %order_id, "Order deleted");

    Ok(Json(json!({ "message": "Order removed" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "longenough".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad_email = RegisterRequest {
            email: "not-an-email".to_string(),
            ..valid_clone(&valid)
        };
        assert!(bad_email.validate().is_err());

        let short_password = RegisterRequest {
            password: "short".to_string(),
            ..valid_clone(&valid)
        };
        assert!(short_password.validate().is_err());
    }

    fn valid_clone(r: &RegisterRequest) -> RegisterRequest {
        RegisterRequest {
            name: r.name.clone(),
            email: r.email.clone(),
            password: r.password.clone(),
        }
    }

    #[test]
    fn test_update_profile_all_fields_optional() {
        let empty = UpdateProfileRequest {
            name: None,
            email: None,
            password: None,
        };
        assert!(empty.validate().is_ok());
    }

    #[test]
    fn test_auth_response_serializes_token() {
        let response = AuthResponse {
            id: Uuid::new_v4(),
            name: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            is_admin: false,
            token: "header.payload.signature".to_string(),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["token"], "header.payload.signature");
        assert_eq!(json["is_admin"], false);
    }
}
