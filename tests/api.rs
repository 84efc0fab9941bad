use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::IntoResponse,
};
use order_admin_api::{
    error::AppError,
    routes::{self, BODY_LIMIT_BYTES},
    services::auth_service::issue_token,
    state::AppState,
};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

// Only requests rejected before any query runs are exercised here.
fn app() -> Router {
    let state = AppState::new(DatabaseConnection::Disconnected, Some("test-secret".into()));
    routes::app(state, &[])
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = serde_json::from_slice(&bytes).expect("json envelope");
    (status, body)
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

#[tokio::test]
async fn malformed_json_is_a_bad_request_envelope() {
    let (status, body) = send(json_request("POST", "/api/orders", "{not json")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn empty_orders_are_rejected() {
    let payload = format!(r#"{{"customer_id":"{}","items":[]}}"#, Uuid::new_v4());
    let (status, body) = send(json_request("POST", "/api/orders", &payload)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Order must contain at least one item");
}

#[tokio::test]
async fn unknown_status_is_rejected() {
    let uri = format!("/api/orders/{}/status", Uuid::new_v4());
    let (status, body) = send(json_request("PATCH", &uri, r#"{"status":"refunded"}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn invalid_query_values_are_rejected() {
    let request = Request::builder()
        .uri("/api/orders?status=lost")
        .body(Body::empty())
        .expect("request");
    let (status, _) = send(request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn me_requires_a_bearer_token() {
    let request = Request::builder()
        .uri("/api/auth/me")
        .body(Body::empty())
        .expect("request");
    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Missing Authorization header");

    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, "Bearer not-a-token")
        .body(Body::empty())
        .expect("request");
    let (status, _) = send(request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tokens_signed_with_another_secret_are_rejected() {
    let token = issue_token("some-other-secret", Uuid::new_v4()).expect("token");
    let request = Request::builder()
        .uri("/api/auth/me")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request");
    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid or expired token");
}

#[tokio::test]
async fn not_found_renders_the_error_envelope() {
    let response = AppError::NotFound("Order").into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body: Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Order not found");
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn malformed_ids_are_bad_request_envelopes() {
    for uri in [
        "/api/orders/not-a-uuid",
        "/api/customers/42",
        "/api/products/abc",
    ] {
        let request = Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request");
        let (status, body) = send(request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["status"], "error", "{uri}");
    }

    let (status, body) = send(json_request(
        "PATCH",
        "/api/orders/123/status",
        r#"{"status":"shipped"}"#,
    ))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn unknown_routes_use_the_fallback_envelope() {
    let request = Request::builder()
        .uri("/api/invoices")
        .body(Body::empty())
        .expect("request");
    let (status, body) = send(request).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Route not found");
}

#[tokio::test]
async fn oversized_bodies_are_rejected_with_an_envelope() {
    let padding = "x".repeat(BODY_LIMIT_BYTES + 1);
    let payload = format!(r#"{{"name":"{padding}","category":"Books","price":1}}"#);
    let (status, body) = send(json_request("POST", "/api/products", &payload)).await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Request body too large");
}

#[tokio::test]
async fn product_price_must_be_positive_with_two_decimals() {
    for price in ["0", "-5", "1.005", "100000000000"] {
        let payload = format!(r#"{{"name":"Lamp","category":"Home","price":{price}}}"#);
        let (status, body) = send(json_request("POST", "/api/products", &payload)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "price {price}");
        assert_eq!(body["status"], "error", "price {price}");
    }

    let uri = format!("/api/products/{}", Uuid::new_v4());
    let (status, body) = send(json_request("PUT", &uri, r#"{"price":0}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "price must be greater than 0");
}

#[tokio::test]
async fn product_name_and_category_are_required() {
    let (status, body) = send(json_request(
        "POST",
        "/api/products",
        r#"{"name":"   ","category":"Books","price":9.99}"#,
    ))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "name is required");

    let (status, body) = send(json_request(
        "POST",
        "/api/products",
        r#"{"name":"Atlas","category":"","price":9.99}"#,
    ))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "category is required");

    let (status, _) = send(json_request(
        "POST",
        "/api/products",
        r#"{"category":"Books","price":9.99}"#,
    ))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn customers_need_a_name_and_a_valid_email() {
    for email in ["", "not-an-email", "@example.com", "ada@localhost", "ada@.com"] {
        let payload = format!(r#"{{"name":"Ada","email":"{email}"}}"#);
        let (status, body) = send(json_request("POST", "/api/customers", &payload)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "email {email:?}");
        assert_eq!(body["message"], "A valid email is required", "email {email:?}");
    }

    let (status, body) = send(json_request(
        "POST",
        "/api/customers",
        r#"{"name":"","email":"ada@example.com"}"#,
    ))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "name is required");
}
