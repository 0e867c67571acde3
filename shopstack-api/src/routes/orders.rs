/// Order routes: checkout, history, payment recording, and fulfillment
///
/// Customers create and view their own orders and may record payment or
/// cancel; everything that moves an order through fulfillment (delivered,
/// unpaid reversal, status, shipping, payment method, tracking) is admin
/// territory.

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
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shopstack_shared::auth::middleware::CurrentUser;
use shopstack_shared::models::order::{
    CreateOrder, CreateOrderItem, Order, OrderItem, OrderWithOwner, PaymentResult,
    ShippingAddress,
};
use uuid::Uuid;
use validator::Validate;

/// A line item in a checkout request
#[derive(Debug, Deserialize)]
pub struct OrderItemRequest {
    /// Purchased product
    pub product_id: Uuid,

    /// Product name snapshot
    pub name: String,

    /// Product image snapshot
    #[serde(default)]
    pub image: String,

    /// Unit price snapshot
    pub price: Decimal,

    /// Units purchased
    pub quantity: i32,
}

/// Checkout request body
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    /// Line items; an empty list is rejected
    pub order_items: Vec<OrderItemRequest>,

    /// Shipping destination
    pub shipping_address: ShippingAddress,

    /// Payment method label
    pub payment_method: String,

    /// Sum of line item prices
    pub items_price: Decimal,

    /// Tax charged
    pub tax_price: Decimal,

    /// Shipping charged
    pub shipping_price: Decimal,

    /// Grand total
    pub total_price: Decimal,
}

/// Status update body
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    /// New status line
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
}

/// Payment-method update body
#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePaymentRequest {
    /// New payment method label
    #[validate(length(min = 1, message = "Payment method is required"))]
    pub payment_method: String,
}

/// Tracking-number update body
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTrackingRequest {
    /// Carrier tracking number
    #[validate(length(min = 1, message = "Tracking number is required"))]
    pub tracking_number: String,
}

/// An order header with its line items
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    /// The order itself
    #[serde(flatten)]
    pub order: Order,

    /// Line items
    pub order_items: Vec<OrderItem>,
}

/// An order with owner identity and line items (single-order view)
#[derive(Debug, Serialize)]
pub struct OrderWithOwnerDetail {
    /// The order plus its owner's name and email
    #[serde(flatten)]
    pub order: OrderWithOwner,

    /// Line items
    pub order_items: Vec<OrderItem>,
}

/// `POST /orders`
///
/// Places an order for the caller. Prices and snapshots come from the client
/// cart; they are stored as submitted.
pub async fn create_order(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<CreateOrderRequest>,
) -> ApiResult<(StatusCode, Json<OrderDetail>)> {
    if payload.order_items.is_empty() {
        return Err(ApiError::BadRequest("No order items".to_string()));
    }

    let items = payload
        .order_items
        .into_iter()
        .map(|item| CreateOrderItem {
            product_id: item.product_id,
            name: item.name,
            image: item.image,
            price: item.price,
            quantity: item.quantity,
        })
        .collect();

    let order = Order::create(
        &state.db,
        current_user.id,
        CreateOrder {
            items,
            shipping: payload.shipping_address,
            payment_method: payload.payment_method,
            items_price: payload.items_price,
            tax_price: payload.tax_price,
            shipping_price: payload.shipping_price,
            total_price: payload.total_price,
        },
    )
    .await?;

    let order_items = OrderItem::list_for_order(&state.db, order.id).await?;

    tracing::info!(order_id = %order.id, user_id = %current_user.id, "Order placed");

    Ok((StatusCode::CREATED, Json(OrderDetail { order, order_items })))
}

/// `GET /orders`
///
/// The caller's own orders, newest first.
pub async fn list_my_orders(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<Order>>> {
    Ok(Json(Order::list_for_user(&state.db, current_user.id).await?))
}

/// `GET /orders/all` (admin)
pub async fn list_all_orders(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<OrderWithOwner>>> {
    Ok(Json(Order::list_all_with_owner(&state.db).await?))
}

/// `GET /orders/:id`
///
/// Single order with line items and owner identity; owner or admin only.
pub async fn get_order(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<OrderWithOwnerDetail>> {
    let order = Order::find_by_id_with_owner(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

    ensure_owner_or_admin(&current_user, order.order.user_id)?;

    let order_items = OrderItem::list_for_order(&state.db, id).await?;

    Ok(Json(OrderWithOwnerDetail { order, order_items }))
}

/// `PUT /orders/:id/pay`
///
/// Records a payment-provider result against the order. The result is stored
/// verbatim; the provider is not consulted.
pub async fn pay_order(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PaymentResult>,
) -> ApiResult<Json<Order>> {
    let order = find_order_checked(&state, &current_user, id).await?;

    if order.is_cancelled {
        return Err(ApiError::BadRequest("Order is cancelled".to_string()));
    }

    let order = Order::mark_paid(&state.db, id, payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

    tracing::info!(order_id = %id, "Order paid");

    Ok(Json(order))
}

/// `PUT /orders/:id/cancel`
///
/// A paid order can no longer be cancelled; it has to be unpaid (refunded)
/// by an admin first.
pub async fn cancel_order(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Order>> {
    let order = find_order_checked(&state, &current_user, id).await?;

    if order.is_paid {
        return Err(ApiError::BadRequest("Order already paid".to_string()));
    }

    let order = Order::cancel(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

    tracing::info!(order_id = %id, "Order cancelled");

    Ok(Json(order))
}

/// `PUT /orders/:id/delivered` (admin)
pub async fn deliver_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Order>> {
    let order = Order::mark_delivered(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

    tracing::info!(order_id = %id, "Order delivered");

    Ok(Json(order))
}

/// `PUT /orders/:id/unpaid` (admin)
///
/// Reverses a recorded payment, e.g. after a refund; clears the provider
/// snapshot too.
pub async fn unpay_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Order>> {
    let order = Order::mark_unpaid(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

    tracing::info!(order_id = %id, "Order marked unpaid");

    Ok(Json(order))
}

/// `GET /orders/:id/status` (admin)
pub async fn get_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let order = find_order(&state, id).await?;
    Ok(Json(json!({ "status": order.status })))
}

/// `PUT /orders/:id/status` (admin)
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> ApiResult<Json<Order>> {
    payload.validate()?;

    let order = Order::update_status(&state.db, id, &payload.status)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

    tracing::info!(order_id = %id, status = %order.status, "Order status updated");

    Ok(Json(order))
}

/// `GET /orders/:id/shipping` (admin)
pub async fn get_order_shipping(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ShippingAddress>> {
    let order = find_order(&state, id).await?;

    Ok(Json(ShippingAddress {
        address: order.shipping_address,
        city: order.shipping_city,
        postal_code: order.shipping_postal_code,
        country: order.shipping_country,
    }))
}

/// `PUT /orders/:id/shipping` (admin)
pub async fn update_order_shipping(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ShippingAddress>,
) -> ApiResult<Json<Order>> {
    let order = Order::update_shipping(&state.db, id, payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

    tracing::info!(order_id = %id, "Order shipping updated");

    Ok(Json(order))
}

/// `GET /orders/:id/payment` (admin)
pub async fn get_order_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let order = find_order(&state, id).await?;

    Ok(Json(json!({
        "payment_method": order.payment_method,
        "is_paid": order.is_paid,
        "paid_at": order.paid_at,
        "payment_result": order.payment_result,
    })))
}

/// `PUT /orders/:id/payment` (admin)
pub async fn update_order_payment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePaymentRequest>,
) -> ApiResult<Json<Order>> {
    payload.validate()?;

    let order = Order::update_payment_method(&state.db, id, &payload.payment_method)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

    tracing::info!(order_id = %id, "Order payment method updated");

    Ok(Json(order))
}

/// `GET /orders/:id/tracking` (admin)
pub async fn get_order_tracking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    let order = find_order(&state, id).await?;
    Ok(Json(json!({ "tracking_number": order.tracking_number })))
}

/// `PUT /orders/:id/tracking` (admin)
pub async fn update_order_tracking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTrackingRequest>,
) -> ApiResult<Json<Order>> {
    payload.validate()?;

    let order = Order::update_tracking(&state.db, id, &payload.tracking_number)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

    tracing::info!(order_id = %id, "Order tracking updated");

    Ok(Json(order))
}

/// Loads an order or 404s
async fn find_order(state: &AppState, id: Uuid) -> ApiResult<Order> {
    Order::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))
}

/// Loads an order and verifies the caller owns it (or is an admin)
async fn find_order_checked(
    state: &AppState,
    current_user: &CurrentUser,
    id: Uuid,
) -> ApiResult<Order> {
    let order = find_order(state, id).await?;
    ensure_owner_or_admin(current_user, order.user_id)?;
    Ok(order)
}
