use async_trait::async_trait;

use crate::{CartError, CartService};

/// HTTP implementation issuing `DELETE {base_url}/cart`.
#[derive(Debug, Clone)]
pub struct HttpCartService {
    client: reqwest::Client,
    base_url: String,
}

impl HttpCartService {
    /// Creates a client for the cart service at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    fn cart_url(&self) -> String {
        format!("{}/cart", self.base_url)
    }
}

#[async_trait]
impl CartService for HttpCartService {
    #[tracing::instrument(skip(self, bearer_token))]
    async fn clear_cart(&self, bearer_token: &str) -> Result<(), CartError> {
        let response = self
            .client
            .delete(self.cart_url())
            .bearer_auth(bearer_token)
            .send()
            .await
            .map_err(|e| CartError::Downstream(e.to_string()))?;

        if !response.status().is_success() {
            return Err(CartError::Downstream(format!(
                "cart service answered {}",
                response.status()
            )));
        }
        tracing::debug!("cart cleared");
        Ok(())
    }
}
