/// Database models for shopstack
///
/// One module per entity, each owning its table's CRUD operations:
///
/// - `user`: accounts, admin flag, password/email reset fields
/// - `product`: catalog entries with derived review aggregates
/// - `review`: per-user product reviews (one per user per product)
/// - `cart`: cart rows keyed by (user, product) with merge-on-add semantics
/// - `favorite`: favorited products per user
/// - `notification`: per-user notices
/// - `order`: orders, their line items, and lifecycle flags

pub mod cart;
pub mod favorite;
pub mod notification;
pub mod order;
pub mod product;
pub mod review;
pub mod user;
