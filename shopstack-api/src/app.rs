/// Application state and router builder
///
/// Defines the shared application state and builds the axum router with all
/// routes and middleware.
///
/// # Router architecture
///
/// ```text
/// /
/// ├── /health                          # public
/// ├── /products                        # browse is public
/// │   ├── GET    /                     # paginated list (page size 12)
/// │   ├── GET    /top-rated
/// │   ├── GET    /all                  # admin
/// │   ├── POST   /                     # admin
/// │   ├── GET/PUT/DELETE /:id          # GET public, PUT/DELETE admin
/// │   └── POST   /:id/reviews          # authenticated
/// ├── /users
/// │   ├── POST   /                     # register (public)
/// │   ├── POST   /login                # public
/// │   ├── GET    /                     # admin
/// │   ├── GET/PUT /profile             # authenticated
/// │   ├── POST/PUT /reset-password...  # public completion by token
/// │   ├── POST/PUT /reset-email...
/// │   └── /:id/{cart,favorites,notifications,orders}  # owner or admin
/// └── /orders
///     ├── POST/GET /                   # authenticated
///     ├── GET    /all                  # admin
///     ├── GET    /:id                  # owner or admin
///     ├── PUT    /:id/{pay,cancel}     # owner or admin
///     └── PUT    /:id/{delivered,unpaid,status,shipping,payment,tracking}  # admin
/// ```
///
/// # Middleware stack
///
/// Authentication (`protect`) and authorization (`require_admin`) are layered
/// per route group; tracing, CORS, and security headers wrap the whole
/// router.

use crate::{config::Config, middleware::security::SecurityHeadersLayer, routes};
use axum::{
    http::{header, HeaderValue, Method},
    middleware::from_fn,
    routing::{delete, get, post, put},
    Router,
};
use shopstack_shared::auth::middleware::{create_protect_layer, require_admin};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into each request handler via axum's `State` extractor; the pool is
/// internally reference-counted and the config is behind an Arc, so cloning
/// is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Gets the JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete axum router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let protect = from_fn(create_protect_layer(
        state.db.clone(),
        state.jwt_secret().to_string(),
    ));
    let admin = from_fn(require_admin);

    // Public routes: catalog browsing, registration, login, reset completion
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/products", get(routes::products::list_products))
        .route("/products/top-rated", get(routes::products::top_rated_products))
        .route("/products/:id", get(routes::products::get_product))
        .route("/users", post(routes::users::register))
        .route("/users/login", post(routes::users::login))
        .route("/users/reset-password", post(routes::users::request_password_reset))
        .route(
            "/users/reset-password/:token",
            put(routes::users::complete_password_reset),
        )
        .route(
            "/users/reset-email/:token",
            put(routes::users::complete_email_reset),
        );

    // Authenticated routes: profile, reviews, carts, favorites,
    // notifications, own orders. Ownership of /users/:id/... sub-resources is
    // checked in the handlers (admins may act on any user).
    let protected_routes = Router::new()
        .route(
            "/users/profile",
            get(routes::users::get_profile).put(routes::users::update_profile),
        )
        .route("/users/reset-email", post(routes::users::request_email_reset))
        .route("/products/:id/reviews", post(routes::products::create_review))
        .route(
            "/users/:id/cart",
            get(routes::cart::get_cart)
                .post(routes::cart::add_to_cart)
                .delete(routes::cart::clear_cart),
        )
        .route(
            "/users/:id/cart/:product_id",
            put(routes::cart::update_cart_item).delete(routes::cart::remove_from_cart),
        )
        .route(
            "/users/:id/favorites",
            get(routes::favorites::list_favorites).post(routes::favorites::add_favorite),
        )
        .route(
            "/users/:id/favorites/:product_id",
            delete(routes::favorites::remove_favorite),
        )
        .route(
            "/users/:id/notifications",
            get(routes::notifications::list_notifications),
        )
        .route(
            "/users/:id/notifications/:notification_id",
            delete(routes::notifications::delete_notification),
        )
        .route("/users/:id/orders", get(routes::users::list_user_orders))
        .route(
            "/users/:id/orders/:order_id",
            delete(routes::users::delete_user_order),
        )
        .route(
            "/orders",
            post(routes::orders::create_order).get(routes::orders::list_my_orders),
        )
        .route("/orders/:id", get(routes::orders::get_order))
        .route("/orders/:id/pay", put(routes::orders::pay_order))
        .route("/orders/:id/cancel", put(routes::orders::cancel_order))
        .layer(protect.clone());

    // Admin routes: catalog management, user administration, order
    // fulfillment. `require_admin` runs after `protect`.
    let admin_routes = Router::new()
        .route("/products", post(routes::products::create_product))
        .route("/products/all", get(routes::products::list_all_products))
        .route(
            "/products/:id",
            put(routes::products::update_product).delete(routes::products::delete_product),
        )
        .route("/users", get(routes::users::list_users))
        .route("/users/:id", delete(routes::users::delete_user))
        .route(
            "/users/:id/notifications",
            post(routes::notifications::create_notification),
        )
        .route("/orders/all", get(routes::orders::list_all_orders))
        .route("/orders/:id/delivered", put(routes::orders::deliver_order))
        .route("/orders/:id/unpaid", put(routes::orders::unpay_order))
        .route(
            "/orders/:id/status",
            get(routes::orders::get_order_status).put(routes::orders::update_order_status),
        )
        .route(
            "/orders/:id/shipping",
            get(routes::orders::get_order_shipping).put(routes::orders::update_order_shipping),
        )
        .route(
            "/orders/:id/payment",
            get(routes::orders::get_order_payment).put(routes::orders::update_order_payment),
        )
        .route(
            "/orders/:id/tracking",
            get(routes::orders::get_order_tracking).put(routes::orders::update_order_tracking),
        )
        .layer(admin)
        .layer(protect);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}
