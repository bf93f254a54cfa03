//! # API Configuration
//!
//! Where the store API lives and how long to wait for it.
//! Values come from environment variables with local-development defaults.

use joia_core::ShopError;
use std::env;
use std::time::Duration;

/// Default API root for local development
pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Store API configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// API root, e.g. `http://localhost:8000/api`
    pub base_url: String,

    /// Per-request timeout
    pub timeout: Duration,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    ///
    /// Optional env vars:
    /// - `JOIA_API_URL` (default `http://localhost:8000/api`)
    /// - `JOIA_API_TIMEOUT_SECS` (default 30)
    pub fn from_env() -> Result<Self, ShopError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let base_url = env::var("JOIA_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let parsed = url::Url::parse(&base_url)
            .map_err(|e| ShopError::Configuration(format!("JOIA_API_URL is invalid: {}", e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ShopError::Configuration(
                "JOIA_API_URL must start with http:// or https://".to_string(),
            ));
        }

        let timeout_secs = match env::var("JOIA_API_TIMEOUT_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|_| {
                ShopError::Configuration("JOIA_API_TIMEOUT_SECS must be a number".to_string())
            })?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self::new(base_url).with_timeout(Duration::from_secs(timeout_secs)))
    }

    /// Create config with an explicit base URL (for testing)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Builder: set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL for an API path such as `/products/` or `products/3/`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}
