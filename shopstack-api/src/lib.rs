/// Storefront REST API
///
/// HTTP layer over `shopstack-shared`: configuration, the unified error
/// type, the axum router, and the per-resource route handlers.

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
