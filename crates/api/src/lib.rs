//! HTTP API server with observability for the order service.
//!
//! Provides REST endpoints for order history and checkout, with
//! structured logging (tracing) and Prometheus metrics. Every handler
//! runs its store and downstream calls through the resilience pipeline.

pub mod config;
pub mod error;
pub mod identity;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use cart_client::{CartService, HttpCartService};
use domain::{OrderService, op_kind};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::{
    InMemoryStoreClient, OrderStore, SettingsHandle, StoreGateway, StoreSettings,
};
use resilience::{PolicyConfig, ResiliencePipeline};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use config::Config;
use routes::orders::AppState;

/// Builds the response CORS layer from the configured allow-list.
///
/// An empty list allows any origin.
fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed_origins.is_empty() {
        layer.allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        layer.allow_origin(origins)
    }
}

/// Creates the Axum application router with all routes and shared state.
///
/// The CORS layer is attached on every response regardless of outcome.
pub fn create_app<S: OrderStore + 'static, C: CartService + 'static>(
    state: Arc<AppState<S, C>>,
    metrics_handle: PrometheusHandle,
    allowed_origins: &[String],
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", get(routes::orders::list::<S, C>))
        .route("/orders", post(routes::orders::checkout::<S, C>))
        .with_state(state)
        .merge(metrics_router)
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}

/// Builds the pipeline with both operation kinds registered.
///
/// Observed production settings: 20 s timeout, 3 retries, a breaker
/// window of 4 at a 0.5 failure ratio with a 2 s open wait, and bulkhead
/// limits of 5 (reads) and 6 (writes).
pub fn default_pipeline() -> ResiliencePipeline {
    ResiliencePipeline::builder()
        .operation(op_kind::GET_ORDERS, PolicyConfig::default())
        .operation(
            op_kind::ADD_ORDER,
            PolicyConfig {
                bulkhead_limit: 6,
                ..PolicyConfig::default()
            },
        )
        .build()
}

/// Application state with the default store and cart wiring.
pub type DefaultAppState = AppState<StoreGateway<InMemoryStoreClient>, HttpCartService>;

/// Creates the default application state from configuration.
///
/// Returns the settings handle so the `(region, table)` pair can be
/// swapped at runtime.
pub fn create_default_state(config: &Config) -> (Arc<DefaultAppState>, SettingsHandle) {
    let settings = SettingsHandle::new(StoreSettings::new(
        config.store_region.as_str(),
        config.store_table.as_str(),
    ));

    let backend = InMemoryStoreClient::new();
    let gateway = Arc::new(StoreGateway::new(settings.clone(), move |_region| {
        Ok(Arc::new(backend.clone()))
    }));

    let cart = config
        .cart_service_url
        .as_deref()
        .map(|url| Arc::new(HttpCartService::new(url)));
    if cart.is_none() {
        tracing::info!("cart service address not configured, skipping compensating calls");
    }

    let order_service = OrderService::new(gateway, cart, Arc::new(default_pipeline()));
    (Arc::new(AppState { order_service }), settings)
}
