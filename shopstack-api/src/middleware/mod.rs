/// API-level middleware
///
/// - `security`: response headers applied to every route

pub mod security;
