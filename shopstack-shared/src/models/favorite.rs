/// Favorites: products a user has starred
///
/// One row per (user, product); re-favoriting is a no-op.

use sqlx::PgPool;
use uuid::Uuid;

use super::product::Product;

/// Favorite operations (rows are only ever read joined with products, so
/// there is no standalone record struct)
pub struct Favorite;

impl Favorite {
    /// Adds a product to a user's favorites; idempotent
    pub async fn add(pool: &PgPool, user_id: Uuid, product_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO favorites (user_id, product_id) VALUES ($1, $2) \
             ON CONFLICT (user_id, product_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(product_id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Removes a product from a user's favorites, returning true if removed
    pub async fn remove(
        pool: &PgPool,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND product_id = $2")
            .bind(user_id)
            .bind(product_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists a user's favorited products, most recently favorited first
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Product>, sqlx::Error> {
        sqlx::query_as::<_, Product>(
            "SELECT p.id, p.name, p.description, p.image, p.price, p.count_in_stock, \
                    p.rating, p.num_reviews, p.created_at, p.updated_at \
             FROM favorites f \
             JOIN products p ON p.id = f.product_id \
             WHERE f.user_id = $1 \
             ORDER BY f.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
