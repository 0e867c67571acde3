/// Cart routes
///
/// The cart lives server-side as one row per (user, product); adding a
/// product already in the cart merges quantities instead of duplicating the
/// line. All routes are scoped to `/users/:id/cart` and owner-checked.

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
    cart::{CartItem, CartLine},
    product::Product,
};
use uuid::Uuid;
use validator::Validate;

/// Add-to-cart request body
#[derive(Debug, Deserialize, Validate)]
pub struct AddToCartRequest {
    /// Product to add
    pub product_id: Uuid,

    /// Units to add (merged into any existing line)
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    #[serde(default = "default_quantity")]
    pub quantity: i32,
}

/// Quantity update body
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCartItemRequest {
    /// New quantity for the line (use DELETE to remove it)
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

/// `GET /users/:id/cart`
///
/// Cart lines joined with current product data (name, image, price, stock).
pub async fn get_cart(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<CartLine>>> {
    ensure_owner_or_admin(&current_user, id)?;

    Ok(Json(CartItem::list_for_user(&state.db, id).await?))
}

/// `POST /users/:id/cart`
///
/// Adds a product, merging by product: a second add of the same product
/// increments the existing line's quantity.
pub async fn add_to_cart(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddToCartRequest>,
) -> ApiResult<(StatusCode, Json<CartItem>)> {
    ensure_owner_or_admin(&current_user, id)?;
    payload.validate()?;

    if Product::find_by_id(&state.db, payload.product_id)
        .await?
        .is_none()
    {
        return Err(ApiError::NotFound("Product not found".to_string()));
    }

    let item = CartItem::add(&state.db, id, payload.product_id, payload.quantity).await?;

    tracing::debug!(user_id = %id, product_id = %payload.product_id, "Cart item added");

    Ok((StatusCode::CREATED, Json(item)))
}

/// `PUT /users/:id/cart/:product_id`
///
/// Sets the line's quantity outright (no merge).
pub async fn update_cart_item(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path((id, product_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> ApiResult<Json<CartItem>> {
    ensure_owner_or_admin(&current_user, id)?;
    payload.validate()?;

    let item = CartItem::set_quantity(&state.db, id, product_id, payload.quantity)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not in cart".to_string()))?;

    Ok(Json(item))
}

/// `DELETE /users/:id/cart/:product_id`
pub async fn remove_from_cart(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path((id, product_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<Json<Value>> {
    ensure_owner_or_admin(&current_user, id)?;

    if !CartItem::remove(&state.db, id, product_id).await? {
        return Err(ApiError::NotFound("Product not in cart".to_string()));
    }

    Ok(Json(json!({ "message": "Removed from cart" })))
}

/// `DELETE /users/:id/cart`
///
/// Empties the cart, e.g. after checkout.
pub async fn clear_cart(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    ensure_owner_or_admin(&current_user, id)?;

    let removed = CartItem::clear(&state.db, id).await?;

    tracing::debug!(user_id = %id, removed, "Cart cleared");

    Ok(Json(json!({ "message": "Cart cleared" })))
}
