//! Order service composing store, cart client, and resilience pipeline.

use std::sync::Arc;

use cart_client::CartService;
use chrono::Utc;
use common::UserId;
use order_store::{OrderRecord, OrderStatus, OrderStore};
use resilience::ResiliencePipeline;

use crate::error::OrderError;
use crate::idempotency;
use crate::order::{NewOrder, OrderView};
use crate::pagination::{PageRequest, Paged, paginate};

/// Operation kinds scoping breaker and bulkhead state in the pipeline.
pub mod op_kind {
    pub const GET_ORDERS: &str = "getOrders";
    pub const ADD_ORDER: &str = "addOrder";
}

/// Result of listing orders: a page, or the degraded fallback.
#[derive(Debug, Clone, PartialEq)]
pub enum ListOrdersOutcome {
    Page(Paged<OrderView>),
    /// The pipeline served its fallback; no page is available.
    Unavailable,
}

/// Result of a checkout: completed, or the degraded fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutOutcome {
    Completed,
    /// The pipeline served its fallback; the order was not confirmed.
    /// Some attempts may still have written a record (at-least-once).
    Unavailable,
}

/// The two order use cases, every external call wrapped by the pipeline.
///
/// The cart client is optional: when the downstream address cannot be
/// resolved the compensating call is skipped entirely, which is not a
/// failure.
pub struct OrderService<S: OrderStore, C: CartService> {
    store: Arc<S>,
    cart: Option<Arc<C>>,
    pipeline: Arc<ResiliencePipeline>,
}

impl<S, C> OrderService<S, C>
where
    S: OrderStore + 'static,
    C: CartService + 'static,
{
    /// Creates the service over a store gateway, an optional cart client,
    /// and a pipeline with both operation kinds registered.
    pub fn new(store: Arc<S>, cart: Option<Arc<C>>, pipeline: Arc<ResiliencePipeline>) -> Self {
        Self {
            store,
            cart,
            pipeline,
        }
    }

    /// Fetches the user's full order history, projects it for display,
    /// and paginates it in memory.
    ///
    /// Total pages is computed over the full result set; pagination is
    /// deliberately not pushed down to the store.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders(
        &self,
        user_id: &UserId,
        request: PageRequest,
    ) -> Result<ListOrdersOutcome, OrderError> {
        metrics::counter!("orders_list_total").increment(1);

        let store = self.store.clone();
        let user_id = user_id.clone();
        let outcome = self
            .pipeline
            .execute(
                op_kind::GET_ORDERS,
                move || {
                    let store = store.clone();
                    let user_id = user_id.clone();
                    async move {
                        let records = store.query(&user_id).await.map_err(OrderError::from)?;
                        let views: Vec<OrderView> =
                            records.iter().map(OrderView::from_record).collect();
                        Ok::<_, OrderError>(ListOrdersOutcome::Page(paginate(views, request)))
                    }
                },
                |_reason| ListOrdersOutcome::Unavailable,
            )
            .await?;
        Ok(outcome)
    }

    /// Persists a new order and clears the user's cart downstream.
    ///
    /// The store write and the cart call run as one logical operation
    /// through the pipeline: a downstream failure after a committed write
    /// fails the attempt without undoing the record, so retries may write
    /// duplicates under fresh keys.
    #[tracing::instrument(skip(self, bearer_token, order))]
    pub async fn checkout(
        &self,
        user_id: &UserId,
        bearer_token: &str,
        order: NewOrder,
    ) -> Result<CheckoutOutcome, OrderError> {
        order.validate()?;
        metrics::counter!("orders_checkout_total").increment(1);

        let store = self.store.clone();
        let cart = self.cart.clone();
        let user_id = user_id.clone();
        let bearer_token = bearer_token.to_string();
        let outcome = self
            .pipeline
            .execute(
                op_kind::ADD_ORDER,
                move || {
                    let store = store.clone();
                    let cart = cart.clone();
                    let user_id = user_id.clone();
                    let bearer_token = bearer_token.clone();
                    let order = order.clone();
                    async move {
                        // each attempt derives its own instant and key
                        let now = Utc::now();
                        let key = idempotency::derive_key(&user_id, &order.order_list, now);
                        let record = OrderRecord {
                            user_id,
                            hash_key: key.into_inner(),
                            email: order.email,
                            name: order.name,
                            surname: order.surname,
                            address: order.address,
                            tel_number: order.tel_number,
                            order_list: order.order_list,
                            total_price: order.total_price,
                            status: OrderStatus::Completed,
                            created_at: now,
                        };
                        store.put(record).await.map_err(OrderError::from)?;

                        if let Some(cart) = &cart {
                            cart.clear_cart(&bearer_token)
                                .await
                                .map_err(OrderError::from)?;
                        }
                        Ok::<_, OrderError>(CheckoutOutcome::Completed)
                    }
                },
                |_reason| CheckoutOutcome::Unavailable,
            )
            .await?;
        Ok(outcome)
    }
}
