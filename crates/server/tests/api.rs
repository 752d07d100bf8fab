//! End-to-end exercises of the HTTP contract against an in-memory
//! database: register, browse, mutate the cart, check out, list orders.

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use db::DBService;
use serde_json::{Value, json};
use server::{AppConfig, AppState, app};
use tower::ServiceExt;

async fn test_app() -> Router {
    let db = DBService::new_in_memory().await.unwrap();
    app(AppState::new(
        db,
        AppConfig {
            jwt_secret: "test-secret".to_string(),
        },
    ))
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn register(app: &Router, email: &str) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({"email": email, "password": "hunter2"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["token"].as_str().unwrap().to_string()
}

async fn create_product(app: &Router, title: &str, price: f64) -> String {
    let (status, body) = send(
        app,
        "POST",
        "/api/furniture",
        None,
        Some(json!({
            "title": title,
            "price": price,
            "imageUrl": "https://example.com/p.jpg",
            "merchantId": "merchant_1",
            "tags": ["Living Room"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = test_app().await;
    let (status, body) = send(&app, "GET", "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], json!(true));
}

#[tokio::test]
async fn test_cart_requires_token() {
    let app = test_app().await;
    let (status, body) = send(&app, "GET", "/api/cart", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], json!(false));
}

#[tokio::test]
async fn test_catalog_round_trip() {
    let app = test_app().await;
    let id = create_product(&app, "STRANDMON", 299.0).await;

    let (status, body) = send(&app, "GET", "/api/furniture", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = send(&app, "GET", &format!("/api/furniture/{id}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], json!("STRANDMON"));
    assert_eq!(body["data"]["tags"], json!(["Living Room"]));
}

#[tokio::test]
async fn test_cart_flow_and_checkout() {
    let app = test_app().await;
    let token = register(&app, "mira@test.com").await;
    let sofa = create_product(&app, "Velvet Sofa", 100.0).await;
    let vase = create_product(&app, "Nordic Vase", 50.0).await;

    // Empty cart is created lazily.
    let (status, body) = send(&app, "GET", "/api/cart", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"], json!([]));
    assert_eq!(body["data"]["total"], json!(0.0));

    // Two adds of the same product merge into one line.
    for _ in 0..2 {
        let (status, _) = send(
            &app,
            "POST",
            "/api/cart/add",
            Some(&token),
            Some(json!({"productId": sofa, "quantity": 1})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }
    let (_, body) = send(
        &app,
        "POST",
        "/api/cart/add",
        Some(&token),
        Some(json!({"productId": vase, "quantity": 1})),
    )
    .await;
    let items = body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(body["data"]["total"], json!(250.0));

    // Setting a quantity to zero removes the line.
    let (_, body) = send(
        &app,
        "POST",
        "/api/cart/update",
        Some(&token),
        Some(json!({"productId": sofa, "quantity": 0})),
    )
    .await;
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["total"], json!(50.0));

    // Checkout snapshots the cart and empties it.
    let (status, body) = send(
        &app,
        "POST",
        "/api/orders",
        Some(&token),
        Some(json!({
            "shippingAddress": {
                "fullName": "Mira Tan",
                "address": "123 Jalan Besar",
                "city": "Kuala Lumpur",
                "postalCode": "50000",
                "phone": "+60123456789"
            },
            "paymentDetails": {"method": "visa", "cardLast4": "4242"}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total"], json!(50.0));
    assert_eq!(body["data"]["status"], json!("pending"));
    assert_eq!(body["data"]["calculatedStatus"], json!("Processing"));

    let (_, body) = send(&app, "GET", "/api/cart", Some(&token), None).await;
    assert_eq!(body["data"]["items"], json!([]));
    assert_eq!(body["data"]["total"], json!(0.0));

    let (_, body) = send(&app, "GET", "/api/orders", Some(&token), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_checkout_with_empty_cart_is_rejected() {
    let app = test_app().await;
    let token = register(&app, "empty@test.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/orders",
        Some(&token),
        Some(json!({
            "shippingAddress": {
                "fullName": "Mira Tan",
                "address": "123 Jalan Besar",
                "city": "Kuala Lumpur",
                "postalCode": "50000",
                "phone": "+60123456789"
            },
            "paymentDetails": {"method": "visa"}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], json!("cart is empty"));

    let (_, body) = send(&app, "GET", "/api/orders", Some(&token), None).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn test_add_unknown_product_is_not_found() {
    let app = test_app().await;
    let token = register(&app, "ghost@test.com").await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/cart/add",
        Some(&token),
        Some(json!({
            "productId": "00000000-0000-0000-0000-000000000000",
            "quantity": 1
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = test_app().await;
    register(&app, "dup@test.com").await;
    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({"email": "dup@test.com", "password": "hunter2"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}
