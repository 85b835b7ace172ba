//! Downstream cart-service client.
//!
//! After a successful order write the cart service is asked to clear the
//! user's cart, forwarding the caller's bearer credential unchanged.
//! There is no transactional link to the store write; a failure here is
//! surfaced to the pipeline without undoing the committed record.

mod error;
mod http;
mod memory;

pub use error::CartError;
pub use http::HttpCartService;
pub use memory::InMemoryCartService;

use async_trait::async_trait;

/// Narrow contract to the downstream cart service.
#[async_trait]
pub trait CartService: Send + Sync {
    /// Clears the caller's cart, authenticating with their bearer token.
    async fn clear_cart(&self, bearer_token: &str) -> Result<(), CartError>;
}
