/// Notification model and database operations
///
/// Notifications are short notices produced by staff for a specific user
/// (order updates, promotions). The user can list and dismiss them.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// A per-user notice
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Notification {
    /// Unique notification ID
    pub id: Uuid,

    /// Owning user
    pub user_id: Uuid,

    /// Short title
    pub title: String,

    /// Message body
    pub message: String,

    /// When the notification was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a notification
#[derive(Debug, Clone)]
pub struct CreateNotification {
    /// Owning user
    pub user_id: Uuid,

    /// Short title
    pub title: String,

    /// Message body
    pub message: String,
}

impl Notification {
    /// Creates a notification
    pub async fn create(pool: &PgPool, data: CreateNotification) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (user_id, title, message) \
             VALUES ($1, $2, $3) \
             RETURNING id, user_id, title, message, created_at",
        )
        .bind(data.user_id)
        .bind(data.title)
        .bind(data.message)
        .fetch_one(pool)
        .await
    }

    /// Lists a user's notifications, newest first
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            "SELECT id, user_id, title, message, created_at \
             FROM notifications WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    /// Deletes a notification scoped to its owner, returning true if removed
    ///
    /// Scoping by user id means a caller can never dismiss someone else's
    /// notification even with a guessed id.
    pub async fn delete(pool: &PgPool, user_id: Uuid, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
