//! Integration tests for the API server.

use std::sync::Arc;
use std::sync::OnceLock;
use std::time::Duration;

use api::routes::orders::AppState;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use cart_client::InMemoryCartService;
use chrono::Utc;
use common::{Money, UserId};
use domain::{OrderService, op_kind};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::{
    InMemoryStoreClient, OrderRecord, OrderStatus, SettingsHandle, StoreGateway, StoreSettings,
};
use resilience::{PolicyConfig, ResiliencePipeline};
use tower::ServiceExt;

const TABLE: &str = "orders";

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup_with_pipeline(
    pipeline: ResiliencePipeline,
) -> (axum::Router, InMemoryStoreClient, InMemoryCartService) {
    let client = InMemoryStoreClient::new();
    let settings = SettingsHandle::new(StoreSettings::new("eu-west-1", TABLE));
    let client_in_factory = client.clone();
    let gateway = Arc::new(StoreGateway::new(settings, move |_region| {
        Ok(Arc::new(client_in_factory.clone()))
    }));

    let cart = InMemoryCartService::new();
    let order_service = OrderService::new(gateway, Some(Arc::new(cart.clone())), Arc::new(pipeline));
    let state = Arc::new(AppState { order_service });
    let app = api::create_app(state, get_metrics_handle(), &[]);
    (app, client, cart)
}

fn setup() -> (axum::Router, InMemoryStoreClient, InMemoryCartService) {
    setup_with_pipeline(api::default_pipeline())
}

fn authed(request: axum::http::request::Builder) -> axum::http::request::Builder {
    request
        .header("x-user-id", "u1")
        .header("x-groups", "customers")
        .header("authorization", "Bearer jwt-token")
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn seed_record(user: &str, index: usize) -> OrderRecord {
    OrderRecord {
        user_id: UserId::new(user),
        hash_key: format!("key-{index}"),
        email: "jane@example.com".to_string(),
        name: format!("Order {index}"),
        surname: "Doe".to_string(),
        address: "1 Main St".to_string(),
        tel_number: "555-0100".to_string(),
        order_list: "[]".to_string(),
        total_price: Money::from_cents(1000),
        status: OrderStatus::Completed,
        created_at: Utc::now(),
    }
}

fn checkout_body() -> serde_json::Value {
    serde_json::json!({
        "email": "jane@example.com",
        "name": "Jane",
        "surname": "Doe",
        "address": "1 Main St",
        "tel_number": "555-0100",
        "order_list": "[{\"sku\":\"SKU-001\",\"qty\":2}]",
        "total_price": 299.99
    })
}

#[tokio::test]
async fn test_health_check() {
    let (app, _, _) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    // the CORS allow-list is attached on every response
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin")
    );

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_list_requires_identity() {
    let (app, _, _) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/orders")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_checkout_requires_identity() {
    let (app, client, _) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/orders")
                .header("content-type", "application/json")
                .body(Body::from(checkout_body().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(client.record_count().await, 0);
}

#[tokio::test]
async fn test_checkout_persists_and_clears_cart() {
    let (app, client, cart) = setup();

    let response = app
        .oneshot(
            authed(Request::builder().method("POST").uri("/orders"))
                .header("content-type", "application/json")
                .body(Body::from(checkout_body().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Order processed successfully.");

    let records = client.records_for(TABLE, &UserId::new("u1")).await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].status, OrderStatus::Completed);
    assert_eq!(records[0].total_price, Money::from_cents(29999));
    // the bearer credential is forwarded unchanged
    assert!(cart.was_cleared_with("jwt-token"));
}

#[tokio::test]
async fn test_checkout_rejects_missing_fields() {
    let (app, client, _) = setup();

    let mut body = checkout_body();
    body.as_object_mut().unwrap().remove("surname");
    let response = app
        .oneshot(
            authed(Request::builder().method("POST").uri("/orders"))
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("surname"));
    assert_eq!(client.record_count().await, 0);
}

#[tokio::test]
async fn test_checkout_rejects_negative_price() {
    let (app, _, _) = setup();

    let mut body = checkout_body();
    body["total_price"] = serde_json::json!(-1.0);
    let response = app
        .oneshot(
            authed(Request::builder().method("POST").uri("/orders"))
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_paginates_full_history() {
    let (app, client, _) = setup();
    for index in 0..25 {
        client.seed(TABLE, seed_record("u1", index)).await;
    }

    let response = app
        .oneshot(
            authed(Request::builder().uri("/orders?page=3&pageSize=10"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["totalPages"], 3);
    assert_eq!(json["orders"].as_array().unwrap().len(), 5);
    assert_eq!(json["orders"][0]["name"], "Order 20");
    assert_eq!(json["orders"][0]["status"], "COMPLETED");
}

#[tokio::test]
async fn test_list_defaults_to_first_page_of_ten() {
    let (app, client, _) = setup();
    for index in 0..25 {
        client.seed(TABLE, seed_record("u1", index)).await;
    }

    let response = app
        .oneshot(
            authed(Request::builder().uri("/orders"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["orders"].as_array().unwrap().len(), 10);
    assert_eq!(json["totalPages"], 3);
}

#[tokio::test]
async fn test_list_rejects_zero_page_size() {
    let (app, _, _) = setup();

    let response = app
        .oneshot(
            authed(Request::builder().uri("/orders?pageSize=0"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_store_timeouts_serve_the_fallback() {
    let policy = PolicyConfig {
        timeout: Duration::from_millis(10),
        ..PolicyConfig::default()
    };
    let pipeline = ResiliencePipeline::builder()
        .operation(op_kind::GET_ORDERS, policy.clone())
        .operation(op_kind::ADD_ORDER, policy)
        .build();
    let (app, client, cart) = setup_with_pipeline(pipeline);
    client.set_put_delay(Some(Duration::from_millis(50))).await;

    let response = app
        .oneshot(
            authed(Request::builder().method("POST").uri("/orders"))
                .header("content-type", "application/json")
                .body(Body::from(checkout_body().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    // the fallback payload is distinguishable from success
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(
        json["description"],
        "Unable to add order at the moment. Please try again later."
    );
    assert_eq!(cart.cleared_count(), 0);
}
