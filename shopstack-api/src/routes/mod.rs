/// API route handlers
///
/// One module per resource. Handlers take `State<AppState>` plus, on
/// protected routes, the `Extension<CurrentUser>` attached by the
/// authentication middleware, and return `ApiResult<T>`.

pub mod cart;
pub mod favorites;
pub mod health;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod users;

use crate::error::{ApiError, ApiResult};
use shopstack_shared::auth::middleware::CurrentUser;
use uuid::Uuid;

/// Rejects callers acting on another user's sub-resources
///
/// Admins pass unconditionally; everyone else must own the resource.
pub(crate) fn ensure_owner_or_admin(current_user: &CurrentUser, owner_id: Uuid) -> ApiResult<()> {
    if current_user.can_access(owner_id) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Not authorized to access this resource".to_string(),
        ))
    }
}
