//! Domain error types.

use cart_client::CartError;
use order_store::StoreError;
use resilience::{Classify, PipelineError};
use thiserror::Error;

/// Errors that can occur during order operations.
#[derive(Debug, Error)]
pub enum OrderError {
    /// Bad input from the client. Never retried and never fed to the
    /// resilience pipeline.
    #[error("validation failed: {0}")]
    Validation(String),

    /// An error from the key-value store.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// An error from the downstream cart service.
    #[error("cart error: {0}")]
    Cart(#[from] CartError),

    /// The service was wired up inconsistently (e.g. an operation kind
    /// missing from the pipeline).
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl OrderError {
    /// Convenience constructor for a missing required field.
    pub fn missing_field(field: &str) -> Self {
        OrderError::Validation(format!("missing required field `{field}`"))
    }
}

impl Classify for OrderError {
    fn retryable(&self) -> bool {
        match self {
            OrderError::Store(err) => err.is_transient(),
            OrderError::Cart(_) => true,
            OrderError::Validation(_) | OrderError::Configuration(_) => false,
        }
    }
}

impl From<PipelineError<OrderError>> for OrderError {
    fn from(err: PipelineError<OrderError>) -> Self {
        match err {
            PipelineError::Operation(inner) => inner,
            PipelineError::UnknownOperation(op_kind) => {
                OrderError::Configuration(format!("operation kind `{op_kind}` not registered"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_store_and_cart_errors_are_retryable() {
        assert!(OrderError::Store(StoreError::Transient("throttled".into())).retryable());
        assert!(OrderError::Cart(CartError::Downstream("503".into())).retryable());
    }

    #[test]
    fn validation_and_fatal_errors_are_not_retryable() {
        assert!(!OrderError::missing_field("email").retryable());
        assert!(!OrderError::Store(StoreError::Fatal("bad table".into())).retryable());
        assert!(!OrderError::Configuration("missing op kind".into()).retryable());
    }
}
