/// Common test utilities for integration tests
///
/// Shared infrastructure:
/// - Test database setup (migrations run on connect)
/// - A regular user and an admin user with valid bearer tokens
/// - Request/response helpers for exercising the router

use axum::body::Body;
use axum::http::{Request, Response};
use shopstack_api::app::{build_router, AppState};
use shopstack_api::config::Config;
use shopstack_shared::auth::jwt::{create_token, Claims};
use shopstack_shared::auth::password::hash_password;
use shopstack_shared::models::product::{CreateProduct, Product};
use shopstack_shared::models::user::{CreateUser, User};
use sqlx::PgPool;
use uuid::Uuid;

/// Password every test account is created with
pub const TEST_PASSWORD: &str = "test_password_123";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub config: Config,
    pub user: User,
    pub admin: User,
    pub user_token: String,
    pub admin_token: String,
}

impl TestContext {
    /// Creates a new test context with a migrated database and two accounts
    pub async fn new() -> anyhow::Result<Self> {
        let config = Config::from_env()?;

        let db = PgPool::connect(&config.database.url).await?;

        // Path relative to this crate's Cargo.toml
        sqlx::migrate!("../shopstack-shared/migrations").run(&db).await?;

        let password_hash = hash_password(TEST_PASSWORD)?;

        let user = User::create(
            &db,
            CreateUser {
                name: "Test User".to_string(),
                email: format!("test-{}@example.com", Uuid::new_v4()),
                password_hash: password_hash.clone(),
            },
        )
        .await?;

        let admin = User::create(
            &db,
            CreateUser {
                name: "Test Admin".to_string(),
                email: format!("admin-{}@example.com", Uuid::new_v4()),
                password_hash,
            },
        )
        .await?;

        sqlx::query("UPDATE users SET is_admin = TRUE WHERE id = $1")
            .bind(admin.id)
            .execute(&db)
            .await?;

        let user_token = create_token(&Claims::new(user.id), &config.jwt.secret)?;
        let admin_token = create_token(&Claims::new(admin.id), &config.jwt.secret)?;

        let state = AppState::new(db.clone(), config.clone());
        let app = build_router(state);

        Ok(TestContext {
            db,
            app,
            config,
            user,
            admin,
            user_token,
            admin_token,
        })
    }

    /// Cleans up test data (users cascade to carts, orders, reviews, ...)
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        User::delete(&self.db, self.user.id).await?;
        User::delete(&self.db, self.admin.id).await?;

        sqlx::query("DELETE FROM products WHERE name LIKE 'Test Product%'")
            .execute(&self.db)
            .await?;

        Ok(())
    }

    /// Sends a request through the router
    pub async fn send(&self, request: Request<Body>) -> Response<axum::body::Body> {
        use tower::Service as _;
        self.app.clone().call(request).await.unwrap()
    }
}

/// Builds a request with an optional bearer token and JSON body
pub fn request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }

    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Reads a response body as JSON
pub async fn body_json(response: Response<axum::body::Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Helper to create a test product directly in the database
pub async fn create_test_product(ctx: &TestContext, price: &str) -> anyhow::Result<Product> {
    let product = Product::create(
        &ctx.db,
        CreateProduct {
            name: format!("Test Product {}", Uuid::new_v4()),
            description: "A product for testing".to_string(),
            image: "/images/test.jpg".to_string(),
            price: price.parse().map_err(|e| anyhow::anyhow!("bad price: {}", e))?,
            count_in_stock: 10,
        },
    )
    .await?;

    Ok(product)
}
