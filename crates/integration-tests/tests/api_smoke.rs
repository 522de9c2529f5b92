//! Router behaviour that is decided before any query runs.
//!
//! The state's pool points at an address nothing listens on, so these tests
//! need no services.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;
use tower::ServiceExt;

use online_shop_integration_tests::{body_json, empty_request, json_request, offline_state};
use online_shop_server::app;
use online_shop_server::middleware::request_id::REQUEST_ID_HEADER;

#[tokio::test]
async fn test_health_is_ok_without_database() {
    let response = app(offline_state())
        .oneshot(empty_request("GET", "/health"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
    let bytes = axum::body::to_bytes(response.into_body(), 64).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn test_readiness_reports_unreachable_database() {
    let response = app(offline_state())
        .oneshot(empty_request("GET", "/health/ready"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_me_requires_session() {
    let response = app(offline_state())
        .oneshot(empty_request("GET", "/api/auth/me"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await,
        json!({ "message": "Not authorized, please log in" })
    );
}

#[tokio::test]
async fn test_order_reads_require_session() {
    for uri in ["/api/orders", "/api/orders/mine", "/api/orders/1"] {
        let response = app(offline_state())
            .oneshot(empty_request("GET", uri))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }

    let response = app(offline_state())
        .oneshot(empty_request("PUT", "/api/orders/1/pay"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_routes_require_session() {
    let product = json!({ "name": "Пуэр", "price": "100" });
    let response = app(offline_state())
        .oneshot(json_request("POST", "/api/products", &product))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app(offline_state())
        .oneshot(empty_request("GET", "/api/users"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_guest_order_with_wrong_total_is_rejected() {
    let body = json!({
        "items": [{
            "product_id": 1,
            "name": "Пуэр",
            "quantity": 2,
            "price": "100",
            "image": "/images/1.jpg"
        }],
        "contact": { "full_name": "Анна Петрова", "phone": "+7 900 123-45-67" },
        "shipping_address": {
            "address": "ул. Ленина, 1",
            "city": "Казань",
            "postal_code": "420000",
            "country": "Россия"
        },
        "total_price": "150"
    });

    let response = app(offline_state())
        .oneshot(json_request("POST", "/api/orders", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["message"].as_str().unwrap().contains("200"));
}

#[tokio::test]
async fn test_guest_order_without_items_is_rejected() {
    let body = json!({
        "items": [],
        "contact": { "full_name": "Анна Петрова", "phone": "+7 900 123-45-67" },
        "shipping_address": {
            "address": "ул. Ленина, 1",
            "city": "Казань",
            "postal_code": "420000",
            "country": "Россия"
        },
        "total_price": "0"
    });

    let response = app(offline_state())
        .oneshot(json_request("POST", "/api/orders", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

fn guest_order(price: &str, quantity: u32, total: &str) -> serde_json::Value {
    json!({
        "items": [{
            "product_id": 1,
            "name": "Пуэр",
            "quantity": quantity,
            "price": price,
            "image": ""
        }],
        "contact": { "full_name": "Анна Петрова", "phone": "+7 900 123-45-67" },
        "shipping_address": {
            "address": "ул. Ленина, 1",
            "city": "Казань",
            "postal_code": "420000",
            "country": "Россия"
        },
        "total_price": total
    })
}

#[tokio::test]
async fn test_overflowing_price_is_a_bad_request() {
    let body = guest_order("79228162514264337593543950335", 2, "1");

    let response = app(offline_state())
        .oneshot(json_request("POST", "/api/orders", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["message"].is_string());
}

#[tokio::test]
async fn test_sub_kopeck_price_is_a_bad_request() {
    let body = guest_order("0.005", 1, "0.005");

    let response = app(offline_state())
        .oneshot(json_request("POST", "/api/orders", &body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_non_numeric_id_is_json_bad_request() {
    let response = app(offline_state())
        .oneshot(empty_request("GET", "/api/products/tea"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["message"].is_string());
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let response = app(offline_state())
        .oneshot(empty_request("GET", "/api/coupons"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
