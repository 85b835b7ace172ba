use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::{CartError, CartService};

#[derive(Debug, Default)]
struct InMemoryCartState {
    cleared_tokens: Vec<String>,
    fail_on_clear: bool,
}

/// In-memory cart service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCartService {
    state: Arc<RwLock<InMemoryCartState>>,
}

impl InMemoryCartService {
    /// Creates a new in-memory cart service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to fail clear calls.
    pub fn set_fail_on_clear(&self, fail: bool) {
        self.state.write().unwrap().fail_on_clear = fail;
    }

    /// Number of successful clear calls.
    pub fn cleared_count(&self) -> usize {
        self.state.read().unwrap().cleared_tokens.len()
    }

    /// Whether a clear call was made with the given bearer token.
    pub fn was_cleared_with(&self, bearer_token: &str) -> bool {
        self.state
            .read()
            .unwrap()
            .cleared_tokens
            .iter()
            .any(|t| t == bearer_token)
    }
}

#[async_trait]
impl CartService for InMemoryCartService {
    async fn clear_cart(&self, bearer_token: &str) -> Result<(), CartError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_clear {
            return Err(CartError::Downstream("simulated outage".to_string()));
        }
        state.cleared_tokens.push(bearer_token.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn records_cleared_tokens() {
        let service = InMemoryCartService::new();
        service.clear_cart("token-1").await.unwrap();

        assert_eq!(service.cleared_count(), 1);
        assert!(service.was_cleared_with("token-1"));
        assert!(!service.was_cleared_with("token-2"));
    }

    #[tokio::test]
    async fn injected_failure_is_downstream_error() {
        let service = InMemoryCartService::new();
        service.set_fail_on_clear(true);

        let err = service.clear_cart("token-1").await.unwrap_err();
        assert!(matches!(err, CartError::Downstream(_)));
        assert_eq!(service.cleared_count(), 0);
    }
}
