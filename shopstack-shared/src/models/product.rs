/// Product model and database operations
///
/// Products carry two derived columns, `rating` (arithmetic mean of review
/// ratings) and `num_reviews` (their count). Both are recomputed inside the
/// same transaction as every review insert — see `models::review`.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE products (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL UNIQUE,
///     description TEXT NOT NULL DEFAULT '',
///     image VARCHAR(512) NOT NULL DEFAULT '',
///     price NUMERIC(12, 2) NOT NULL DEFAULT 0,
///     count_in_stock INTEGER NOT NULL DEFAULT 0,
///     rating DOUBLE PRECISION NOT NULL DEFAULT 0,
///     num_reviews INTEGER NOT NULL DEFAULT 0,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

const PRODUCT_COLUMNS: &str = "id, name, description, image, price, count_in_stock, \
     rating, num_reviews, created_at, updated_at";

/// Catalog entry
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Product {
    /// Unique product ID (UUID v4)
    pub id: Uuid,

    /// Product name (unique)
    pub name: String,

    /// Long-form description
    pub description: String,

    /// Image reference (URL or asset path)
    pub image: String,

    /// Unit price
    pub price: Decimal,

    /// Units available
    pub count_in_stock: i32,

    /// Mean of all review ratings (derived, 0 when unreviewed)
    pub rating: f64,

    /// Number of reviews (derived)
    pub num_reviews: i32,

    /// When the product was created
    pub created_at: DateTime<Utc>,

    /// When the product was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new product
#[derive(Debug, Clone)]
pub struct CreateProduct {
    /// Product name (must be unique)
    pub name: String,

    /// Description
    pub description: String,

    /// Image reference
    pub image: String,

    /// Unit price
    pub price: Decimal,

    /// Units available
    pub count_in_stock: i32,
}

/// Input for updating a product; only non-None fields are written
#[derive(Debug, Clone, Default)]
pub struct UpdateProduct {
    /// New name
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New image reference
    pub image: Option<String>,

    /// New unit price
    pub price: Option<Decimal>,

    /// New stock count
    pub count_in_stock: Option<i32>,
}

impl Product {
    /// Creates a new product
    ///
    /// # Errors
    ///
    /// Returns a database error on a duplicate name (unique constraint); the
    /// API layer maps it to 400 "Product already exists".
    pub async fn create(pool: &PgPool, data: CreateProduct) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            "INSERT INTO products (name, description, image, price, count_in_stock) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(data.name)
        .bind(data.description)
        .bind(data.image)
        .bind(data.price)
        .bind(data.count_in_stock)
        .fetch_one(pool)
        .await
    }

    /// Finds a product by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Lists one page of products, newest first
    ///
    /// `keyword` applies a case-insensitive substring filter on the name.
    /// Pair with [`Product::count`] using the same keyword to build the
    /// page/pages envelope.
    pub async fn list_page(
        pool: &PgPool,
        keyword: Option<&str>,
        page_size: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let pattern = like_pattern(keyword);

        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE name ILIKE $1 \
             ORDER BY created_at DESC \
             LIMIT $2 OFFSET $3"
        ))
        .bind(pattern)
        .bind(page_size)
        .bind(offset)
        .fetch_all(pool)
        .await
    }

    /// Counts products matching the keyword filter
    pub async fn count(pool: &PgPool, keyword: Option<&str>) -> Result<i64, sqlx::Error> {
        let pattern = like_pattern(keyword);

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products WHERE name ILIKE $1")
            .bind(pattern)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Lists the highest-rated products
    pub async fn top_rated(pool: &PgPool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY rating DESC LIMIT $1"
        ))
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Lists every product, newest first (admin view, unpaginated)
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at DESC"
        ))
        .fetch_all(pool)
        .await
    }

    /// Updates a product, writing only the fields present in `data`
    ///
    /// Returns the updated product, or None if it doesn't exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateProduct,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            "UPDATE products SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                image = COALESCE($4, image), \
                price = COALESCE($5, price), \
                count_in_stock = COALESCE($6, count_in_stock), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.image)
        .bind(data.price)
        .bind(data.count_in_stock)
        .fetch_optional(pool)
        .await
    }

    /// Deletes a product by ID, returning true if a row was removed
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Builds the ILIKE pattern for the keyword filter
///
/// No keyword matches everything; `%` and `_` in user input are escaped so
/// they match literally.
fn like_pattern(keyword: Option<&str>) -> String {
    match keyword {
        Some(kw) if !kw.is_empty() => {
            let escaped = kw.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
            format!("%{}%", escaped)
        }
        _ => "%".to_string(),
    }
}
