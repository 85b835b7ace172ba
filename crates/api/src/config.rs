//! Application configuration loaded from environment variables.

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST` — bind address (default: `"0.0.0.0"`)
/// - `PORT` — listen port (default: `3000`)
/// - `RUST_LOG` — tracing filter directive (default: `"info"`)
/// - `STORE_REGION` — store region (default: `"eu-west-1"`)
/// - `STORE_TABLE` — store table name (default: `"orders"`)
/// - `CART_SERVICE_URL` — downstream cart service base URL; the
///   compensating call is skipped entirely when unset
/// - `CORS_ALLOWED_ORIGINS` — comma-separated origin allow-list
///   (default: empty, allowing any origin)
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub store_region: String,
    pub store_table: String,
    pub cart_service_url: Option<String>,
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            store_region: std::env::var("STORE_REGION")
                .unwrap_or_else(|_| "eu-west-1".to_string()),
            store_table: std::env::var("STORE_TABLE").unwrap_or_else(|_| "orders".to_string()),
            cart_service_url: std::env::var("CART_SERVICE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            cors_allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                .map(|origins| {
                    origins
                        .split(',')
                        .map(str::trim)
                        .filter(|origin| !origin.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            store_region: "eu-west-1".to_string(),
            store_table: "orders".to_string(),
            cart_service_url: None,
            cors_allowed_origins: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.store_region, "eu-west-1");
        assert_eq!(config.store_table, "orders");
        assert!(config.cart_service_url.is_none());
        assert!(config.cors_allowed_origins.is_empty());
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_addr_default() {
        let config = Config::default();
        assert_eq!(config.addr(), "0.0.0.0:3000");
    }
}
