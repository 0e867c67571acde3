/// Cart model and database operations
///
/// A cart is the set of `cart_items` rows belonging to a user, one row per
/// product (`UNIQUE (user_id, product_id)`). Adding a product that is already
/// in the cart increments the quantity instead of inserting a duplicate row;
/// the merge happens in a single upsert, so two concurrent adds both land.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// A cart row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartItem {
    /// Unique row ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Carted product
    pub product_id: Uuid,

    /// Units of the product in the cart
    pub quantity: i32,

    /// When the product was first added
    pub created_at: DateTime<Utc>,

    /// When the quantity last changed
    pub updated_at: DateTime<Utc>,
}

/// A cart row joined with its product's current listing data
///
/// This is what the cart endpoint returns, so clients don't have to fetch
/// each product separately.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CartLine {
    /// Carted product
    pub product_id: Uuid,

    /// Product name
    pub name: String,

    /// Product image reference
    pub image: String,

    /// Current unit price
    pub price: Decimal,

    /// Units currently in stock
    pub count_in_stock: i32,

    /// Units in the cart
    pub quantity: i32,
}

impl CartItem {
    /// Adds a product to a user's cart, merging by product
    ///
    /// If the product is already carted, its quantity is incremented by
    /// `quantity`; otherwise a new row is inserted. Returns the resulting row.
    pub async fn add(
        pool: &PgPool,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, CartItem>(
            "INSERT INTO cart_items (user_id, product_id, quantity) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (user_id, product_id) \
             DO UPDATE SET quantity = cart_items.quantity + EXCLUDED.quantity, \
                           updated_at = NOW() \
             RETURNING id, user_id, product_id, quantity, created_at, updated_at",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_one(pool)
        .await
    }

    /// Sets the quantity of a carted product
    ///
    /// Returns None if the product is not in the cart.
    pub async fn set_quantity(
        pool: &PgPool,
        user_id: Uuid,
        product_id: Uuid,
        quantity: i32,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, CartItem>(
            "UPDATE cart_items SET quantity = $3, updated_at = NOW() \
             WHERE user_id = $1 AND product_id = $2 \
             RETURNING id, user_id, product_id, quantity, created_at, updated_at",
        )
        .bind(user_id)
        .bind(product_id)
        .bind(quantity)
        .fetch_optional(pool)
        .await
    }

    /// Removes a product from the cart, returning true if a row was removed
    pub async fn remove(
        pool: &PgPool,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Empties a user's cart
    pub async fn clear(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cart_items WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Lists a user's cart joined with product listing data, oldest first
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<CartLine>, sqlx::Error> {
        sqlx::query_as::<_, CartLine>(
            "SELECT c.product_id, p.name, p.image, p.price, p.count_in_stock, c.quantity \
             FROM cart_items c \
             JOIN products p ON p.id = c.product_id \
             WHERE c.user_id = $1 \
             ORDER BY c.created_at",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
