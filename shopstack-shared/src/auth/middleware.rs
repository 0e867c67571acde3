/// Authentication middleware for axum
///
/// Two layers, composed per route group by the API crate:
///
/// - `protect`: resolves the `Authorization: Bearer <token>` header to a user
///   record and inserts a [`CurrentUser`] into request extensions. 401 on a
///   missing/invalid/expired token or an unknown user.
/// - `require_admin`: runs after `protect` and rejects with 403 unless the
///   resolved user carries the admin flag.
///
/// The admin flag is read from the database on every request, not from the
/// token, so demoting an admin takes effect immediately.
///
/// # Example
///
/// ```text
/// let admin_routes = Router::new()
///     .route("/products", post(routes::products::create_product))
///     .layer(middleware::from_fn(require_admin))
///     .layer(middleware::from_fn(create_protect_layer(pool, secret)));
/// ```

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use super::jwt::{validate_token, JwtError};
use crate::models::user::User;

/// The authenticated caller, attached to request extensions by `protect`
///
/// Carries everything handlers need for authorization decisions and never
/// includes the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Admin flag gating privileged routes
    pub is_admin: bool,
}

impl CurrentUser {
    /// Builds the request-scoped view of a user record
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
        }
    }

    /// Whether this caller may act on resources owned by `owner_id`
    ///
    /// Admins may act on anything; everyone else only on their own.
    pub fn can_access(&self, owner_id: Uuid) -> bool {
        self.is_admin || self.id == owner_id
    }
}

/// Error type for the authentication gate
#[derive(Debug)]
pub enum AuthError {
    /// Missing or malformed authorization header
    MissingCredentials,

    /// Token validation failed
    InvalidToken(String),

    /// Token is valid but the referenced user no longer exists
    UnknownUser,

    /// Caller is authenticated but not an admin
    NotAdmin,

    /// Database error while resolving the user
    DatabaseError(String),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingCredentials => {
                (StatusCode::UNAUTHORIZED, "Not authorized, no token".to_string())
            }
            AuthError::InvalidToken(msg) => (StatusCode::UNAUTHORIZED, msg),
            AuthError::UnknownUser => {
                (StatusCode::UNAUTHORIZED, "Not authorized, user not found".to_string())
            }
            AuthError::NotAdmin => {
                (StatusCode::FORBIDDEN, "Not authorized as an admin".to_string())
            }
            AuthError::DatabaseError(msg) => {
                tracing::error!("Auth gate database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Bearer-token authentication middleware
///
/// Validates the token, resolves the referenced user, and attaches a
/// [`CurrentUser`] to the request.
pub async fn protect(
    pool: PgPool,
    secret: String,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MissingCredentials)?;

    let claims = validate_token(token, &secret).map_err(|e| match e {
        JwtError::Expired => AuthError::InvalidToken("Not authorized, token expired".to_string()),
        _ => AuthError::InvalidToken("Not authorized, token failed".to_string()),
    })?;

    let user = User::find_by_id(&pool, claims.sub)
        .await
        .map_err(|e| AuthError::DatabaseError(e.to_string()))?
        .ok_or(AuthError::UnknownUser)?;

    req.extensions_mut().insert(CurrentUser::from_user(&user));

    Ok(next.run(req).await)
}

/// Admin authorization middleware
///
/// Must be layered after `protect`; a missing `CurrentUser` extension means
/// the route was wired without the authentication gate.
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AuthError> {
    let current_user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AuthError::MissingCredentials)?;

    if !current_user.is_admin {
        return Err(AuthError::NotAdmin);
    }

    Ok(next.run(req).await)
}

/// Creates a `protect` middleware closure capturing the pool and JWT secret
pub fn create_protect_layer(
    pool: PgPool,
    secret: impl Into<String>,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AuthError>> + Send>>
       + Clone {
    let secret = secret.into();
    move |req, next| {
        let pool = pool.clone();
        let secret = secret.clone();
        Box::pin(protect(pool, secret, req, next))
    }
}
