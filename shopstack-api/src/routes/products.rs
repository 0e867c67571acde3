/// Product routes: public catalog browsing, admin catalog management, and
/// review submission

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use shopstack_shared::auth::middleware::CurrentUser;
use shopstack_shared::models::{
    product::{CreateProduct, Product, UpdateProduct},
    review::{CreateReview, Review},
};
use uuid::Uuid;
use validator::Validate;

/// Products per catalog page
const PAGE_SIZE: i64 = 12;

/// How many products the top-rated endpoint returns
const TOP_RATED_LIMIT: i64 = 3;

/// Catalog listing query parameters
#[derive(Debug, Deserialize)]
pub struct ProductListQuery {
    /// Case-insensitive substring filter on the product name
    pub keyword: Option<String>,

    /// 1-based page number
    #[serde(rename = "pageNumber")]
    pub page_number: Option<i64>,
}

/// Paginated catalog page
#[derive(Debug, Serialize)]
pub struct ProductPage {
    /// Products on this page, newest first
    pub products: Vec<Product>,

    /// The page returned (1-based)
    pub page: i64,

    /// Total number of pages for this keyword
    pub pages: i64,
}

/// A product together with its reviews
#[derive(Debug, Serialize)]
pub struct ProductDetail {
    /// The product itself
    #[serde(flatten)]
    pub product: Product,

    /// Reviews, newest first
    pub reviews: Vec<Review>,
}

/// Product creation request body
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    /// Product name (must be unique)
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    /// Long-form description
    #[serde(default)]
    pub description: String,

    /// Image reference
    #[serde(default)]
    pub image: String,

    /// Unit price
    pub price: Decimal,

    /// Units available
    #[validate(range(min = 0, message = "Stock count cannot be negative"))]
    #[serde(default)]
    pub count_in_stock: i32,
}

/// Product update request body; omitted fields are left unchanged
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProductRequest {
    /// New name
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,

    /// New description
    pub description: Option<String>,

    /// New image reference
    pub image: Option<String>,

    /// New unit price
    pub price: Option<Decimal>,

    /// New stock count
    #[validate(range(min = 0, message = "Stock count cannot be negative"))]
    pub count_in_stock: Option<i32>,
}

/// Review submission body
#[derive(Debug, Deserialize, Validate)]
pub struct CreateReviewRequest {
    /// Numeric rating, 1 through 5
    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i32,

    /// Free-text comment
    #[serde(default)]
    pub comment: String,
}

/// `GET /products?keyword=&pageNumber=`
///
/// One page of the catalog with enough envelope for clients to render a
/// pager. Page numbers are clamped to 1 at the bottom; a page past the end
/// just comes back empty.
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductListQuery>,
) -> ApiResult<Json<ProductPage>> {
    let page = query.page_number.unwrap_or(1).max(1);
    let keyword = query.keyword.as_deref();

    let total = Product::count(&state.db, keyword).await?;
    let products =
        Product::list_page(&state.db, keyword, PAGE_SIZE, (page - 1) * PAGE_SIZE).await?;

    Ok(Json(ProductPage {
        products,
        page,
        pages: page_count(total, PAGE_SIZE),
    }))
}

/// `GET /products/top-rated`
pub async fn top_rated_products(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(Product::top_rated(&state.db, TOP_RATED_LIMIT).await?))
}

/// `GET /products/all` (admin)
///
/// The whole catalog, unpaginated, for the management table.
pub async fn list_all_products(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    Ok(Json(Product::list_all(&state.db).await?))
}

/// `GET /products/:id`
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ProductDetail>> {
    let product = Product::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    let reviews = Review::list_for_product(&state.db, id).await?;

    Ok(Json(ProductDetail { product, reviews }))
}

/// `POST /products` (admin)
pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<CreateProductRequest>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    payload.validate()?;

    // A duplicate name trips the unique constraint and maps to 400
    let product = Product::create(
        &state.db,
        CreateProduct {
            name: payload.name,
            description: payload.description,
            image: payload.image,
            price: payload.price,
            count_in_stock: payload.count_in_stock,
        },
    )
    .await?;

    tracing::info!(product_id = %product.id, "Product created");

    Ok((StatusCode::CREATED, Json(product)))
}

/// `PUT /products/:id` (admin)
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> ApiResult<Json<Product>> {
    payload.validate()?;

    let product = Product::update(
        &state.db,
        id,
        UpdateProduct {
            name: payload.name,
            description: payload.description,
            image: payload.image,
            price: payload.price,
            count_in_stock: payload.count_in_stock,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    tracing::info!(product_id = %product.id, "Product updated");

    Ok(Json(product))
}

/// `DELETE /products/:id` (admin)
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Value>> {
    if !Product::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Product not found".to_string()));
    }

    tracing::info!(product_id = %id, "Product deleted");

    Ok(Json(json!({ "message": "Product removed" })))
}

/// `POST /products/:id/reviews`
///
/// One review per user per product. The pre-check gives the friendly 400;
/// under a concurrent duplicate submission the unique constraint catches
/// whichever insert loses and maps to the same message.
pub async fn create_review(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateReviewRequest>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    payload.validate()?;

    if Product::find_by_id(&state.db, id).await?.is_none() {
        return Err(ApiError::NotFound("Product not found".to_string()));
    }

    if Review::exists_for(&state.db, id, current_user.id).await? {
        return Err(ApiError::BadRequest("Product already reviewed".to_string()));
    }

    Review::create(
        &state.db,
        CreateReview {
            product_id: id,
            user_id: current_user.id,
            name: current_user.name.clone(),
            rating: payload.rating,
            comment: payload.comment,
        },
    )
    .await?;

    tracing::info!(product_id = %id, user_id = %current_user.id, "Review added");

    Ok((StatusCode::CREATED, Json(json!({ "message": "Review added" }))))
}

/// Number of pages needed for `total` items at `page_size` per page
fn page_count(total: i64, page_size: i64) -> i64 {
    (total + page_size - 1) / page_size
}
