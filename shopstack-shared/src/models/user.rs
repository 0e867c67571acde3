/// User model and database operations
///
/// Users carry the admin flag that gates privileged routes, plus the staged
/// state for the password- and email-reset flows. Reset tokens are stored as
/// SHA-256 hashes (see `auth::reset_token`), never in plaintext.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     email CITEXT NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     is_admin BOOLEAN NOT NULL DEFAULT FALSE,
///     reset_password_token VARCHAR(64),
///     reset_password_expires_at TIMESTAMPTZ,
///     new_email CITEXT,
///     reset_email_token VARCHAR(64),
///     reset_email_expires_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, name, email, password_hash, is_admin, \
     reset_password_token, reset_password_expires_at, \
     new_email, reset_email_token, reset_email_expires_at, \
     created_at, updated_at";

/// User account record
///
/// The password hash and reset-token fields are excluded from serialization;
/// a `User` can be returned from a handler without leaking credentials.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address (case-insensitive via CITEXT, unique)
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Admin flag gating privileged routes
    pub is_admin: bool,

    /// SHA-256 hash of the outstanding password-reset token, if any
    #[serde(skip_serializing)]
    pub reset_password_token: Option<String>,

    /// When the password-reset token stops being honored
    #[serde(skip_serializing)]
    pub reset_password_expires_at: Option<DateTime<Utc>>,

    /// Staged email address awaiting confirmation
    #[serde(skip_serializing)]
    pub new_email: Option<String>,

    /// SHA-256 hash of the outstanding email-reset token, if any
    #[serde(skip_serializing)]
    pub reset_email_token: Option<String>,

    /// When the email-reset token stops being honored
    #[serde(skip_serializing)]
    pub reset_email_expires_at: Option<DateTime<Utc>>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,
}

/// Input for updating an existing user
///
/// Only non-None fields are written; this is what backs the partial-update
/// semantics of the profile endpoint.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    /// New display name
    pub name: Option<String>,

    /// New email address
    pub email: Option<String>,

    /// New password hash (already hashed by the caller)
    pub password_hash: Option<String>,
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns a database error on a duplicate email (unique constraint) or
    /// connection failure. The API layer maps the duplicate to a 400.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (name, email, password_hash) \
             VALUES ($1, $2, $3) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(data.name)
        .bind(data.email)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by email address (case-insensitive)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Updates a user, writing only the fields present in `data`
    ///
    /// Returns the updated user, or None if the user doesn't exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET \
                name = COALESCE($2, name), \
                email = COALESCE($3, email), \
                password_hash = COALESCE($4, password_hash), \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(data.name)
        .bind(data.email)
        .bind(data.password_hash)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Deletes a user by ID
    ///
    /// Cascades to cart items, favorites, notifications, reviews, and orders.
    /// Returns true if a row was removed.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all users, newest first
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
        ))
        .fetch_all(pool)
        .await
    }

    /// Stores a hashed password-reset token with its expiry
    pub async fn set_reset_password_token(
        pool: &PgPool,
        id: Uuid,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET reset_password_token = $2, reset_password_expires_at = $3, \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(token_hash)
        .bind(expires_at)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Looks up a user by the hash of a presented password-reset token
    ///
    /// Expiry is checked by the caller so an expired token and an unknown
    /// token produce the same error message.
    pub async fn find_by_reset_password_token(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE reset_password_token = $1"
        ))
        .bind(token_hash)
        .fetch_optional(pool)
        .await
    }

    /// Sets a new password hash and clears the reset-token fields
    pub async fn complete_password_reset(
        pool: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, \
             reset_password_token = NULL, reset_password_expires_at = NULL, \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Stages a new email address behind a hashed confirmation token
    pub async fn set_reset_email_token(
        pool: &PgPool,
        id: Uuid,
        new_email: &str,
        token_hash: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET new_email = $2, reset_email_token = $3, \
             reset_email_expires_at = $4, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(new_email)
        .bind(token_hash)
        .bind(expires_at)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Looks up a user by the hash of a presented email-reset token
    pub async fn find_by_reset_email_token(
        pool: &PgPool,
        token_hash: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE reset_email_token = $1"
        ))
        .bind(token_hash)
        .fetch_optional(pool)
        .await
    }

    /// Applies the staged email address and clears the reset-token fields
    pub async fn complete_email_reset(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET email = new_email, \
             new_email = NULL, reset_email_token = NULL, reset_email_expires_at = NULL, \
             updated_at = NOW() \
             WHERE id = $1 AND new_email IS NOT NULL \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}
