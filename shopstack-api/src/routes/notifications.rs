/// Notification routes
///
/// Staff post notices to a specific user; the user lists and dismisses them.
/// Listing and deleting are owner-checked, posting is admin-only (enforced by
/// the router).

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
use serde::Deserialize;
use serde_json::{json, Value};
use shopstack_shared::auth::middleware::CurrentUser;
use shopstack_shared::models::{
    notification::{CreateNotification, Notification},
    user::User,
};
use uuid::Uuid;
use validator::Validate;

/// Notification creation body
#[derive(Debug, Deserialize, Validate)]
pub struct CreateNotificationRequest {
    /// Short title
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    /// Message body
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,
}

/// `GET /users/:id/notifications`
pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Notification>>> {
    ensure_owner_or_admin(&current_user, id)?;

    Ok(Json(Notification::list_for_user(&state.db, id).await?))
}

/// `POST /users/:id/notifications` (admin)
pub async fn create_notification(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateNotificationRequest>,
) -> ApiResult<(StatusCode, Json<Notification>)> {
    payload.validate()?;

    if User::find_by_id(&state.db, id).await?.is_none() {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    let notification = Notification::create(
        &state.db,
        CreateNotification {
            user_id: id,
            title: payload.title,
            message: payload.message,
        },
    )
    .await?;

    tracing::info!(user_id = %id, notification_id = %notification.id, "Notification posted");

    Ok((StatusCode::CREATED, Json(notification)))
}

/// `DELETE /users/:id/notifications/:notification_id`
///
/// The model scopes the delete by owner, so a guessed id belonging to
/// someone else still 404s.
pub async fn delete_notification(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path((id, notification_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Value>> {
    ensure_owner_or_admin(&current_user, id)?;

    if !Notification::delete(&state.db, id, notification_id).await? {
        return Err(ApiError::NotFound("Notification not found".to_string()));
    }

    Ok(Json(json!({ "message": "Notification removed" })))
}
