/// Integration tests for the storefront API
///
/// End-to-end coverage through the real router against a live PostgreSQL:
/// - Registration, login, and the authentication gate
/// - Admin-only routes
/// - Catalog pagination and keyword search
/// - Review uniqueness and rating aggregates
/// - Cart merge-by-product semantics
/// - Order lifecycle (pay, cancel, admin reversal)
/// - Ownership checks on per-user sub-resources
///
/// Requires `DATABASE_URL` and `JWT_SECRET` in the environment; run with
/// `cargo test -- --ignored`.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_test_product, request, TestContext, TEST_PASSWORD};
use serde_json::json;

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_register_and_login() {
    let ctx = TestContext::new().await.unwrap();

    let email = format!("newuser-{}@example.com", uuid::Uuid::new_v4());

    let response = ctx
        .send(request(
            "POST",
            "/users",
            None,
            Some(json!({
                "name": "New User",
                "email": email,
                "password": "a_long_password"
            })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["email"], email.as_str());
    assert_eq!(body["is_admin"], false);
    let token = body["token"].as_str().unwrap().to_string();

    // The issued token works on a protected route
    let response = ctx
        .send(request("GET", "/users/profile", Some(&token), None))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Wrong password and unknown email produce the same 401
    let response = ctx
        .send(request(
            "POST",
            "/users/login",
            None,
            Some(json!({ "email": email, "password": "wrong_password" })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Invalid email or password");

    let response = ctx
        .send(request(
            "POST",
            "/users/login",
            None,
            Some(json!({ "email": "nobody@example.com", "password": "whatever1" })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Invalid email or password");

    // Correct credentials log in
    let response = ctx
        .send(request(
            "POST",
            "/users/login",
            None,
            Some(json!({ "email": ctx.user.email, "password": TEST_PASSWORD })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    sqlx::query("DELETE FROM users WHERE email = $1")
        .bind(&email)
        .execute(&ctx.db)
        .await
        .unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_authentication_required() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx.send(request("GET", "/orders", None, None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Not authorized, no token");

    let response = ctx
        .send(request("GET", "/orders", Some("not-a-jwt"), None))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_admin_gate() {
    let ctx = TestContext::new().await.unwrap();

    let payload = json!({
        "name": format!("Test Product {}", uuid::Uuid::new_v4()),
        "description": "Gated",
        "price": "19.99",
        "count_in_stock": 5
    });

    // Regular user is rejected
    let response = ctx
        .send(request(
            "POST",
            "/products",
            Some(&ctx.user_token),
            Some(payload.clone()),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Not authorized as an admin");

    // Admin succeeds
    let response = ctx
        .send(request(
            "POST",
            "/products",
            Some(&ctx.admin_token),
            Some(payload),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_duplicate_product_name_rejected() {
    let ctx = TestContext::new().await.unwrap();

    let product = create_test_product(&ctx, "10.00").await.unwrap();

    let response = ctx
        .send(request(
            "POST",
            "/products",
            Some(&ctx.admin_token),
            Some(json!({ "name": product.name, "price": "10.00" })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Product already exists");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_product_pagination() {
    let ctx = TestContext::new().await.unwrap();

    // A marker shared by this test's products so the keyword filter isolates
    // them from anything else in the database
    let marker = uuid::Uuid::new_v4().simple().to_string();

    for i in 0..13 {
        shopstack_shared::models::product::Product::create(
            &ctx.db,
            shopstack_shared::models::product::CreateProduct {
                name: format!("Test Product {} {}", marker, i),
                description: String::new(),
                image: String::new(),
                price: "1.00".parse().unwrap(),
                count_in_stock: 1,
            },
        )
        .await
        .unwrap();
    }

    let response = ctx
        .send(request(
            "GET",
            &format!("/products?keyword={}&pageNumber=1", marker),
            None,
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["products"].as_array().unwrap().len(), 12);
    assert_eq!(body["page"], 1);
    assert_eq!(body["pages"], 2);

    let response = ctx
        .send(request(
            "GET",
            &format!("/products?keyword={}&pageNumber=2", marker),
            None,
            None,
        ))
        .await;
    let body = body_json(response).await;
    assert_eq!(body["products"].as_array().unwrap().len(), 1);
    assert_eq!(body["page"], 2);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_review_uniqueness_and_aggregates() {
    let ctx = TestContext::new().await.unwrap();

    let product = create_test_product(&ctx, "25.00").await.unwrap();

    let response = ctx
        .send(request(
            "POST",
            &format!("/products/{}/reviews", product.id),
            Some(&ctx.user_token),
            Some(json!({ "rating": 4, "comment": "Solid" })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Second review by the same user is rejected
    let response = ctx
        .send(request(
            "POST",
            &format!("/products/{}/reviews", product.id),
            Some(&ctx.user_token),
            Some(json!({ "rating": 5, "comment": "Changed my mind" })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Product already reviewed");

    // A different user reviewing moves the mean
    let response = ctx
        .send(request(
            "POST",
            &format!("/products/{}/reviews", product.id),
            Some(&ctx.admin_token),
            Some(json!({ "rating": 2, "comment": "Not for me" })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = ctx
        .send(request("GET", &format!("/products/{}", product.id), None, None))
        .await;
    let body = body_json(response).await;
    assert_eq!(body["num_reviews"], 2);
    assert!((body["rating"].as_f64().unwrap() - 3.0).abs() < f64::EPSILON);
    assert_eq!(body["reviews"].as_array().unwrap().len(), 2);

    // Out-of-range rating is rejected before touching the database
    let response = ctx
        .send(request(
            "POST",
            &format!("/products/{}/reviews", product.id),
            Some(&ctx.user_token),
            Some(json!({ "rating": 6, "comment": "" })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_cart_merges_by_product() {
    let ctx = TestContext::new().await.unwrap();

    let product = create_test_product(&ctx, "5.00").await.unwrap();
    let cart_uri = format!("/users/{}/cart", ctx.user.id);

    let response = ctx
        .send(request(
            "POST",
            &cart_uri,
            Some(&ctx.user_token),
            Some(json!({ "product_id": product.id, "quantity": 2 })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Adding the same product again merges instead of duplicating
    let response = ctx
        .send(request(
            "POST",
            &cart_uri,
            Some(&ctx.user_token),
            Some(json!({ "product_id": product.id, "quantity": 3 })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["quantity"], 5);

    let response = ctx
        .send(request("GET", &cart_uri, Some(&ctx.user_token), None))
        .await;
    let body = body_json(response).await;
    let lines = body.as_array().unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["quantity"], 5);

    // Quantity can be set outright
    let response = ctx
        .send(request(
            "PUT",
            &format!("{}/{}", cart_uri, product.id),
            Some(&ctx.user_token),
            Some(json!({ "quantity": 1 })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["quantity"], 1);

    // Another user cannot touch this cart
    let response = ctx
        .send(request("GET", &cart_uri, Some(&ctx.admin_token), None))
        .await;
    assert_eq!(response.status(), StatusCode::OK); // admins may

    let stranger = TestContext::new().await.unwrap();
    let response = ctx
        .send(request("GET", &cart_uri, Some(&stranger.user_token), None))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    stranger.cleanup().await.unwrap();

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_favorites_are_idempotent() {
    let ctx = TestContext::new().await.unwrap();

    let product = create_test_product(&ctx, "7.50").await.unwrap();
    let uri = format!("/users/{}/favorites", ctx.user.id);

    for _ in 0..2 {
        let response = ctx
            .send(request(
                "POST",
                &uri,
                Some(&ctx.user_token),
                Some(json!({ "product_id": product.id })),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = ctx.send(request("GET", &uri, Some(&ctx.user_token), None)).await;
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let response = ctx
        .send(request(
            "DELETE",
            &format!("{}/{}", uri, product.id),
            Some(&ctx.user_token),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx.send(request("GET", &uri, Some(&ctx.user_token), None)).await;
    let body = body_json(response).await;
    assert!(body.as_array().unwrap().is_empty());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_notifications_flow() {
    let ctx = TestContext::new().await.unwrap();

    let uri = format!("/users/{}/notifications", ctx.user.id);

    // Only admins may post
    let response = ctx
        .send(request(
            "POST",
            &uri,
            Some(&ctx.user_token),
            Some(json!({ "title": "Hi", "message": "Hello" })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ctx
        .send(request(
            "POST",
            &uri,
            Some(&ctx.admin_token),
            Some(json!({ "title": "Order shipped", "message": "On its way" })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let notification = body_json(response).await;

    let response = ctx.send(request("GET", &uri, Some(&ctx.user_token), None)).await;
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let response = ctx
        .send(request(
            "DELETE",
            &format!("{}/{}", uri, notification["id"].as_str().unwrap()),
            Some(&ctx.user_token),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_order_lifecycle() {
    let ctx = TestContext::new().await.unwrap();

    let product = create_test_product(&ctx, "30.00").await.unwrap();

    // Empty item list is rejected
    let response = ctx
        .send(request(
            "POST",
            "/orders",
            Some(&ctx.user_token),
            Some(json!({
                "order_items": [],
                "shipping_address": {
                    "address": "1 Main St", "city": "Springfield",
                    "postal_code": "12345", "country": "US"
                },
                "payment_method": "PayPal",
                "items_price": "0.00", "tax_price": "0.00",
                "shipping_price": "0.00", "total_price": "0.00"
            })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "No order items");

    let response = ctx
        .send(request(
            "POST",
            "/orders",
            Some(&ctx.user_token),
            Some(json!({
                "order_items": [{
                    "product_id": product.id, "name": product.name,
                    "image": product.image, "price": "30.00", "quantity": 2
                }],
                "shipping_address": {
                    "address": "1 Main St", "city": "Springfield",
                    "postal_code": "12345", "country": "US"
                },
                "payment_method": "PayPal",
                "items_price": "60.00", "tax_price": "6.00",
                "shipping_price": "5.00", "total_price": "71.00"
            })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let order_id = body["id"].as_str().unwrap().to_string();
    assert_eq!(body["is_paid"], false);
    assert_eq!(body["order_items"].as_array().unwrap().len(), 1);

    // Pay the order
    let response = ctx
        .send(request(
            "PUT",
            &format!("/orders/{}/pay", order_id),
            Some(&ctx.user_token),
            Some(json!({
                "id": "PAYID-1", "status": "COMPLETED",
                "update_time": "2025-01-10T12:00:00Z",
                "email_address": "payer@example.com"
            })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["is_paid"], true);
    assert!(body["paid_at"].is_string());

    // A paid order cannot be cancelled
    let response = ctx
        .send(request(
            "PUT",
            &format!("/orders/{}/cancel", order_id),
            Some(&ctx.user_token),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Order already paid");

    // Admin reverses the payment, then cancellation goes through
    let response = ctx
        .send(request(
            "PUT",
            &format!("/orders/{}/unpaid", order_id),
            Some(&ctx.admin_token),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["is_paid"], false);
    assert!(body["payment_result"].is_null());

    let response = ctx
        .send(request(
            "PUT",
            &format!("/orders/{}/cancel", order_id),
            Some(&ctx.user_token),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["is_cancelled"], true);

    // Admin fulfillment endpoints
    let response = ctx
        .send(request(
            "PUT",
            &format!("/orders/{}/status", order_id),
            Some(&ctx.admin_token),
            Some(json!({ "status": "refund issued" })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .send(request(
            "PUT",
            &format!("/orders/{}/tracking", order_id),
            Some(&ctx.admin_token),
            Some(json!({ "tracking_number": "1Z999" })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["tracking_number"], "1Z999");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_order_ownership_enforced() {
    let ctx = TestContext::new().await.unwrap();
    let stranger = TestContext::new().await.unwrap();

    let product = create_test_product(&ctx, "12.00").await.unwrap();

    let response = ctx
        .send(request(
            "POST",
            "/orders",
            Some(&ctx.user_token),
            Some(json!({
                "order_items": [{
                    "product_id": product.id, "name": product.name,
                    "image": product.image, "price": "12.00", "quantity": 1
                }],
                "shipping_address": {
                    "address": "1 Main St", "city": "Springfield",
                    "postal_code": "12345", "country": "US"
                },
                "payment_method": "PayPal",
                "items_price": "12.00", "tax_price": "0.00",
                "shipping_price": "0.00", "total_price": "12.00"
            })),
        ))
        .await;
    let order_id = body_json(response).await["id"].as_str().unwrap().to_string();

    // The owner and an admin can read it; a stranger cannot
    let uri = format!("/orders/{}", order_id);

    let response = ctx.send(request("GET", &uri, Some(&ctx.user_token), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["user_email"], ctx.user.email.as_str());

    let response = ctx.send(request("GET", &uri, Some(&ctx.admin_token), None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx
        .send(request("GET", &uri, Some(&stranger.user_token), None))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Order history under /users/:id/orders follows the same rule
    let history = format!("/users/{}/orders", ctx.user.id);
    let response = ctx
        .send(request("GET", &history, Some(&stranger.user_token), None))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ctx.send(request("GET", &history, Some(&ctx.user_token), None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    // Deleting through another user's history path is rejected even for an
    // admin: the order does not belong to the addressed user
    let response = ctx
        .send(request(
            "DELETE",
            &format!("/users/{}/orders/{}", ctx.admin.id, order_id),
            Some(&ctx.admin_token),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // A missing order is a 404, not a 403
    let response = ctx
        .send(request(
            "DELETE",
            &format!("{}/{}", history, uuid::Uuid::new_v4()),
            Some(&ctx.user_token),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Deleting the order from history removes it
    let response = ctx
        .send(request(
            "DELETE",
            &format!("{}/{}", history, order_id),
            Some(&ctx.user_token),
            None,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = ctx.send(request("GET", &uri, Some(&ctx.admin_token), None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    stranger.cleanup().await.unwrap();
    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL"]
async fn test_password_reset_flow() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .send(request(
            "POST",
            "/users/reset-password",
            None,
            Some(json!({ "email": ctx.user.email })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The endpoint answers the same for unknown accounts
    let response = ctx
        .send(request(
            "POST",
            "/users/reset-password",
            None,
            Some(json!({ "email": "nobody@example.com" })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // A made-up token is rejected
    let response = ctx
        .send(request(
            "PUT",
            "/users/reset-password/deadbeefdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef",
            None,
            Some(json!({ "password": "brand_new_password" })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Invalid or expired reset token");

    ctx.cleanup().await.unwrap();
}
