/// Favorites routes
///
/// Starred products under `/users/:id/favorites`; owner-checked, and adding
/// an already-favorited product is a quiet no-op.

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
use shopstack_shared::models::{favorite::Favorite, product::Product};
use uuid::Uuid;

/// Add-favorite request body
#[derive(Debug, Deserialize)]
pub struct AddFavoriteRequest {
    /// Product to star
    pub product_id: Uuid,
}

/// `GET /users/:id/favorites`
///
/// The user's starred products, most recently starred first.
pub async fn list_favorites(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Product>>> {
    ensure_owner_or_admin(&current_user, id)?;

    Ok(Json(Favorite::list_for_user(&state.db, id).await?))
}

/// `POST /users/:id/favorites`
pub async fn add_favorite(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddFavoriteRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    ensure_owner_or_admin(&current_user, id)?;

    if Product::find_by_id(&state.db, payload.product_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("Product not found".to_string()));
    }

    Favorite::add(&state.db, id, payload.product_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Added to favorites" })),
    ))
}

/// `DELETE /users/:id/favorites/:product_id`
pub async fn remove_favorite(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path((id, product_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Value>> {
    ensure_owner_or_admin(&current_user, id)?;

    if !Favorite::remove(&state.db, id, product_id).await? {
        return Err(ApiError::NotFound("Product not in favorites".to_string()));
    }

    Ok(Json(json!({ "message": "Removed from favorites" })))
}
