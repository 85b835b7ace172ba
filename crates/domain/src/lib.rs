//! Order use cases for the order service.
//!
//! This crate provides:
//! - order input validation
//! - idempotency-key derivation for submitted orders
//! - deterministic pagination over fetched result sets
//! - the `OrderService` composing store, cart client, and resilience
//!   pipeline into the two use cases (list orders, checkout)

pub mod error;
pub mod idempotency;
pub mod order;
pub mod pagination;
pub mod service;

pub use error::OrderError;
pub use idempotency::IdempotencyKey;
pub use order::{NewOrder, OrderView};
pub use pagination::{PageRequest, Paged};
pub use service::{CheckoutOutcome, ListOrdersOutcome, OrderService, op_kind};
