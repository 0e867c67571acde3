/// Review model and database operations
///
/// A user may review a product at most once, enforced both by a handler
/// pre-check (for the friendly 400) and a `UNIQUE (product_id, user_id)`
/// constraint (as the authoritative rule under concurrent submissions).
///
/// Creating a review recomputes the owning product's `rating` and
/// `num_reviews` inside the same transaction, so the aggregates can never
/// drift from the review rows.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// Product review
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Review {
    /// Unique review ID
    pub id: Uuid,

    /// Reviewed product
    pub product_id: Uuid,

    /// Review author
    pub user_id: Uuid,

    /// Author display name, snapshotted at review time
    pub name: String,

    /// Numeric rating, 1 through 5
    pub rating: i32,

    /// Free-text comment
    pub comment: String,

    /// When the review was written
    pub created_at: DateTime<Utc>,
}

/// Input for creating a review
#[derive(Debug, Clone)]
pub struct CreateReview {
    /// Reviewed product
    pub product_id: Uuid,

    /// Review author
    pub user_id: Uuid,

    /// Author display name snapshot
    pub name: String,

    /// Numeric rating, 1 through 5
    pub rating: i32,

    /// Free-text comment
    pub comment: String,
}

impl Review {
    /// Creates a review and recomputes the product's aggregates
    ///
    /// Runs in a single transaction: insert the review, re-read all ratings
    /// for the product, write the new mean and count back to the product row.
    ///
    /// # Errors
    ///
    /// Returns a database error if the user already reviewed this product
    /// (unique constraint) or the product doesn't exist (foreign key).
    pub async fn create(pool: &PgPool, data: CreateReview) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let review = sqlx::query_as::<_, Review>(
            "INSERT INTO reviews (product_id, user_id, name, rating, comment) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, product_id, user_id, name, rating, comment, created_at",
        )
        .bind(data.product_id)
        .bind(data.user_id)
        .bind(data.name)
        .bind(data.rating)
        .bind(data.comment)
        .fetch_one(&mut *tx)
        .await?;

        let ratings: Vec<(i32,)> =
            sqlx::query_as("SELECT rating FROM reviews WHERE product_id = $1")
                .bind(data.product_id)
                .fetch_all(&mut *tx)
                .await?;

        let ratings: Vec<i32> = ratings.into_iter().map(|(r,)| r).collect();
        let (rating, num_reviews) = rating_summary(&ratings);

        sqlx::query(
            "UPDATE products SET rating = $2, num_reviews = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(data.product_id)
        .bind(rating)
        .bind(num_reviews)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(review)
    }

    /// Checks whether a user already reviewed a product
    pub async fn exists_for(
        pool: &PgPool,
        product_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM reviews WHERE product_id = $1 AND user_id = $2)",
        )
        .bind(product_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Lists a product's reviews, newest first
    pub async fn list_for_product(
        pool: &PgPool,
        product_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Review>(
            "SELECT id, product_id, user_id, name, rating, comment, created_at \
             FROM reviews WHERE product_id = $1 ORDER BY created_at DESC",
        )
        .bind(product_id)
        .fetch_all(pool)
        .await
    }
}

/// Computes the product aggregates from a set of ratings
///
/// Returns `(mean, count)`; an empty set yields `(0.0, 0)`.
pub fn rating_summary(ratings: &[i32]) -> (f64, i32) {
    if ratings.is_empty() {
        return (0.0, 0);
    }

    let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    let mean = sum as f64 / ratings.len() as f64;

    (mean, ratings.len() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_summary_empty() {
        assert_eq!(rating_summary(&[]), (0.0, 0));
    }

    #[test]
    fn test_rating_summary_single() {
        assert_eq!(rating_summary(&[4]), (4.0, 1));
    }

    #[test]
    fn test_rating_summary_mean() {
        let (mean, count) = rating_summary(&[5, 4, 3]);
        assert!((mean - 4.0).abs() < f64::EPSILON);
        assert_eq!(count, 3);
    }

    #[test]
    fn test_rating_summary_non_integral_mean() {
        let (mean, count) = rating_summary(&[5, 4]);
        assert!((mean - 4.5).abs() < f64::EPSILON);
        assert_eq!(count, 2);
    }
}
