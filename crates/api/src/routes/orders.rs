//! Order listing and checkout endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use cart_client::CartService;
use common::Money;
use domain::{
    CheckoutOutcome, ListOrdersOutcome, NewOrder, OrderError, OrderService, OrderView, PageRequest,
};
use order_store::OrderStore;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::identity::Identity;

/// Shared application state accessible from all handlers.
pub struct AppState<S: OrderStore, C: CartService> {
    pub order_service: OrderService<S, C>,
}

// -- Request types --

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<u32>,
}

#[derive(Deserialize)]
pub struct CheckoutRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub surname: Option<String>,
    pub address: Option<String>,
    pub tel_number: Option<String>,
    pub order_list: Option<String>,
    pub total_price: Option<f64>,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrdersPageResponse {
    pub orders: Vec<OrderView>,
    #[serde(rename = "totalPages")]
    pub total_pages: u32,
}

#[derive(Serialize)]
pub struct CheckoutResponse {
    pub message: &'static str,
}

#[derive(Serialize)]
pub struct UnavailableResponse {
    pub description: &'static str,
}

fn unavailable(description: &'static str) -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(UnavailableResponse { description }),
    )
        .into_response()
}

// -- Handlers --

/// GET /orders — the caller's paginated order history.
#[tracing::instrument(skip(state, identity), fields(user_id = %identity.user_id))]
pub async fn list<S: OrderStore + 'static, C: CartService + 'static>(
    State(state): State<Arc<AppState<S, C>>>,
    identity: Identity,
    Query(params): Query<ListParams>,
) -> Result<Response, ApiError> {
    let request = PageRequest::resolve(params.page, params.page_size)?;

    let outcome = state
        .order_service
        .list_orders(&identity.user_id, request)
        .await?;

    Ok(match outcome {
        ListOrdersOutcome::Page(paged) => (
            StatusCode::OK,
            Json(OrdersPageResponse {
                orders: paged.items,
                total_pages: paged.total_pages,
            }),
        )
            .into_response(),
        ListOrdersOutcome::Unavailable => {
            unavailable("Unable to fetch orders at the moment. Please try again later.")
        }
    })
}

/// POST /orders — submit a new order and clear the caller's cart.
#[tracing::instrument(skip(state, identity, req), fields(user_id = %identity.user_id))]
pub async fn checkout<S: OrderStore + 'static, C: CartService + 'static>(
    State(state): State<Arc<AppState<S, C>>>,
    identity: Identity,
    Json(req): Json<CheckoutRequest>,
) -> Result<Response, ApiError> {
    let total_price = match req.total_price {
        Some(value) => Money::from_decimal(value).ok_or_else(|| {
            ApiError::BadRequest("total_price must be a non-negative number".to_string())
        })?,
        None => return Err(OrderError::missing_field("total_price").into()),
    };

    let order = NewOrder {
        email: req.email.unwrap_or_default(),
        name: req.name.unwrap_or_default(),
        surname: req.surname.unwrap_or_default(),
        address: req.address.unwrap_or_default(),
        tel_number: req.tel_number.unwrap_or_default(),
        order_list: req.order_list.unwrap_or_default(),
        total_price,
    };

    let outcome = state
        .order_service
        .checkout(&identity.user_id, &identity.bearer_token, order)
        .await?;

    Ok(match outcome {
        CheckoutOutcome::Completed => (
            StatusCode::OK,
            Json(CheckoutResponse {
                message: "Order processed successfully.",
            }),
        )
            .into_response(),
        CheckoutOutcome::Unavailable => {
            unavailable("Unable to add order at the moment. Please try again later.")
        }
    })
}
