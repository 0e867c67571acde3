/// Authentication and authorization utilities
///
/// - `jwt`: bearer token creation and validation (HS256)
/// - `password`: Argon2id password hashing and verification
/// - `reset_token`: opaque one-time tokens for password/email reset flows
/// - `middleware`: axum layers that resolve the bearer token to a user
///   (`protect`) and gate admin-only routes (`require_admin`)

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod reset_token;
