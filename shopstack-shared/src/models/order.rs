/// Order model and database operations
///
/// An order is a header row (`orders`) plus line items (`order_items`) that
/// snapshot the product name, image, and price at purchase time, so later
/// catalog edits never rewrite history.
///
/// Lifecycle is tracked with independent flag/timestamp pairs rather than a
/// single state column:
///
/// ```text
/// created ──► paid ──► delivered
///    │          │
///    │          └──► unpaid (admin reversal)
///    └──► cancelled (only while unpaid)
/// ```
///
/// Re-applying a flag the order already has is a no-op success.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

const ORDER_COLUMNS: &str = "id, user_id, shipping_address, shipping_city, \
     shipping_postal_code, shipping_country, payment_method, \
     items_price, tax_price, shipping_price, total_price, \
     is_paid, paid_at, payment_result, \
     is_delivered, delivered_at, is_cancelled, cancelled_at, \
     status, tracking_number, created_at";

/// Snapshot of an external payment-provider result
///
/// Stored verbatim from the mark-paid request body. This is a trust boundary:
/// the backend does not verify the payment with the provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentResult {
    /// Provider-side payment ID
    pub id: String,

    /// Provider-side status string
    pub status: String,

    /// Provider-side last-update time (provider's own format)
    pub update_time: String,

    /// Payer email as reported by the provider
    pub email_address: String,
}

/// Shipping destination for an order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingAddress {
    /// Street address
    pub address: String,

    /// City
    pub city: String,

    /// Postal code
    pub postal_code: String,

    /// Country
    pub country: String,
}

/// Order header
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Order {
    /// Unique order ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Shipping street address
    pub shipping_address: String,

    /// Shipping city
    pub shipping_city: String,

    /// Shipping postal code
    pub shipping_postal_code: String,

    /// Shipping country
    pub shipping_country: String,

    /// Payment method label (e.g., "PayPal")
    pub payment_method: String,

    /// Sum of line item prices
    pub items_price: Decimal,

    /// Tax charged
    pub tax_price: Decimal,

    /// Shipping charged
    pub shipping_price: Decimal,

    /// Grand total
    pub total_price: Decimal,

    /// Whether payment has been recorded
    pub is_paid: bool,

    /// When payment was recorded
    pub paid_at: Option<DateTime<Utc>>,

    /// Payment-provider snapshot recorded at pay time
    pub payment_result: Option<Json<PaymentResult>>,

    /// Whether the order has been delivered
    pub is_delivered: bool,

    /// When delivery was recorded
    pub delivered_at: Option<DateTime<Utc>>,

    /// Whether the order was cancelled
    pub is_cancelled: bool,

    /// When cancellation was recorded
    pub cancelled_at: Option<DateTime<Utc>>,

    /// Free-text status line shown to the customer
    pub status: String,

    /// Carrier tracking number, once assigned
    pub tracking_number: Option<String>,

    /// When the order was placed
    pub created_at: DateTime<Utc>,
}

/// Order line item with purchase-time snapshots
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderItem {
    /// Unique line item ID
    pub id: Uuid,

    /// Owning order
    pub order_id: Uuid,

    /// Purchased product
    pub product_id: Uuid,

    /// Product name at purchase time
    pub name: String,

    /// Product image at purchase time
    pub image: String,

    /// Unit price at purchase time
    pub price: Decimal,

    /// Units purchased
    pub quantity: i32,
}

/// Order header plus its owner's name and email (admin views)
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OrderWithOwner {
    /// The order itself
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub order: Order,

    /// Owner display name
    pub user_name: String,

    /// Owner email
    pub user_email: String,
}

/// Input line item for creating an order
#[derive(Debug, Clone)]
pub struct CreateOrderItem {
    /// Purchased product
    pub product_id: Uuid,

    /// Product name snapshot
    pub name: String,

    /// Product image snapshot
    pub image: String,

    /// Unit price snapshot
    pub price: Decimal,

    /// Units purchased
    pub quantity: i32,
}

/// Input for creating an order
#[derive(Debug, Clone)]
pub struct CreateOrder {
    /// Line items (must be non-empty; the handler rejects an empty list)
    pub items: Vec<CreateOrderItem>,

    /// Shipping destination
    pub shipping: ShippingAddress,

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

impl Order {
    /// Creates an order with its line items in one transaction
    pub async fn create(
        pool: &PgPool,
        user_id: Uuid,
        data: CreateOrder,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let order = sqlx::query_as::<_, Order>(&format!(
            "INSERT INTO orders (user_id, shipping_address, shipping_city, \
                shipping_postal_code, shipping_country, payment_method, \
                items_price, tax_price, shipping_price, total_price) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(user_id)
        .bind(data.shipping.address)
        .bind(data.shipping.city)
        .bind(data.shipping.postal_code)
        .bind(data.shipping.country)
        .bind(data.payment_method)
        .bind(data.items_price)
        .bind(data.tax_price)
        .bind(data.shipping_price)
        .bind(data.total_price)
        .fetch_one(&mut *tx)
        .await?;

        for item in data.items {
            sqlx::query(
                "INSERT INTO order_items (order_id, product_id, name, image, price, quantity) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(order.id)
            .bind(item.product_id)
            .bind(item.name)
            .bind(item.image)
            .bind(item.price)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(order)
    }

    /// Finds an order by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds an order by ID joined with its owner's name and email
    pub async fn find_by_id_with_owner(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<OrderWithOwner>, sqlx::Error> {
        sqlx::query_as::<_, OrderWithOwner>(
            "SELECT o.*, u.name AS user_name, u.email AS user_email \
             FROM orders o JOIN users u ON u.id = o.user_id \
             WHERE o.id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists a user's orders, newest first
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Lists every order with owner name/email, newest first (admin view)
    pub async fn list_all_with_owner(pool: &PgPool) -> Result<Vec<OrderWithOwner>, sqlx::Error> {
        sqlx::query_as::<_, OrderWithOwner>(
            "SELECT o.*, u.name AS user_name, u.email AS user_email \
             FROM orders o JOIN users u ON u.id = o.user_id \
             ORDER BY o.created_at DESC",
        )
        .fetch_all(pool)
        .await
    }

    /// Records payment: sets the paid flag, timestamp, and provider snapshot
    ///
    /// Marking an already-paid order paid again simply overwrites the
    /// snapshot (no-op from the state machine's point of view).
    pub async fn mark_paid(
        pool: &PgPool,
        id: Uuid,
        result: PaymentResult,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET is_paid = TRUE, paid_at = NOW(), payment_result = $2 \
             WHERE id = $1 \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(Json(result))
        .fetch_optional(pool)
        .await
    }

    /// Clears the paid state (admin reversal)
    pub async fn mark_unpaid(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET is_paid = FALSE, paid_at = NULL, payment_result = NULL \
             WHERE id = $1 \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Records delivery
    pub async fn mark_delivered(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET is_delivered = TRUE, delivered_at = NOW() \
             WHERE id = $1 \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Records cancellation
    ///
    /// The caller is responsible for rejecting cancellation of a paid order
    /// first; this method itself only flips the flag.
    pub async fn cancel(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET is_cancelled = TRUE, cancelled_at = NOW() \
             WHERE id = $1 \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Sets the free-text status line
    pub async fn update_status(
        pool: &PgPool,
        id: Uuid,
        status: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET status = $2 WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(status)
        .fetch_optional(pool)
        .await
    }

    /// Replaces the shipping destination
    pub async fn update_shipping(
        pool: &PgPool,
        id: Uuid,
        shipping: ShippingAddress,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET shipping_address = $2, shipping_city = $3, \
                shipping_postal_code = $4, shipping_country = $5 \
             WHERE id = $1 \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(shipping.address)
        .bind(shipping.city)
        .bind(shipping.postal_code)
        .bind(shipping.country)
        .fetch_optional(pool)
        .await
    }

    /// Sets the payment method label
    pub async fn update_payment_method(
        pool: &PgPool,
        id: Uuid,
        payment_method: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET payment_method = $2 WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(payment_method)
        .fetch_optional(pool)
        .await
    }

    /// Sets the carrier tracking number
    pub async fn update_tracking(
        pool: &PgPool,
        id: Uuid,
        tracking_number: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Order>(&format!(
            "UPDATE orders SET tracking_number = $2 WHERE id = $1 RETURNING {ORDER_COLUMNS}"
        ))
        .bind(id)
        .bind(tracking_number)
        .fetch_optional(pool)
        .await
    }

    /// Deletes an order (line items cascade), returning true if removed
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl OrderItem {
    /// Lists an order's line items
    pub async fn list_for_order(pool: &PgPool, order_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, OrderItem>(
            "SELECT id, order_id, product_id, name, image, price, quantity \
             FROM order_items WHERE order_id = $1",
        )
        .bind(order_id)
        .fetch_all(pool)
        .await
    }
}
