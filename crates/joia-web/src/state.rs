//! # Application State
//!
//! Shared state for the Axum application.
//! Holds the configuration and one connection pool to the store API; the
//! per-shopper API clients are built on top of it for each request.

use joia_client::{build_http_client, ApiConfig};
use joia_core::ShopResult;
use std::net::SocketAddr;

/// WhatsApp number used for product inquiries when none is configured
pub const DEFAULT_WHATSAPP_NUMBER: &str = "5511999999999";

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Environment (development, staging, production)
    pub environment: String,
    /// Store API location
    pub api: ApiConfig,
    /// Shop WhatsApp number, digits only
    pub whatsapp_number: String,
    /// Allowed browser origin; any origin when unset
    pub cors_origin: Option<String>,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let api = ApiConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Invalid store API configuration: {}", e))?;

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            api,
            whatsapp_number: std::env::var("WHATSAPP_NUMBER")
                .unwrap_or_else(|_| DEFAULT_WHATSAPP_NUMBER.to_string()),
            cors_origin: std::env::var("CORS_ORIGIN").ok().filter(|o| !o.is_empty()),
        })
    }

    /// Configuration for a given store API, everything else defaulted
    pub fn for_api(api: ApiConfig) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            environment: "development".to_string(),
            api,
            whatsapp_number: DEFAULT_WHATSAPP_NUMBER.to_string(),
            cors_origin: None,
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address {}:{}: {}", self.host, self.port, e))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application config
    pub config: AppConfig,
    /// Connection pool to the store API
    pub http: reqwest::Client,
}

impl AppState {
    /// Create state from environment variables
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        Self::with_config(config).map_err(|e| anyhow::anyhow!("{}", e))
    }

    /// Create state from an explicit configuration
    pub fn with_config(config: AppConfig) -> ShopResult<Self> {
        let http = build_http_client(&config.api)?;
        Ok(Self { config, http })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_addr() {
        let mut config = AppConfig::for_api(ApiConfig::default());
        config.host = "0.0.0.0".to_string();
        config.port = 3000;

        let addr = config.socket_addr().unwrap();
        assert_eq!(addr.to_string(), "0.0.0.0:3000");
    }

    #[test]
    fn test_bad_socket_addr() {
        let mut config = AppConfig::for_api(ApiConfig::default());
        config.host = "not a host".to_string();
        assert!(config.socket_addr().is_err());
    }

    #[test]
    fn test_production_flag() {
        let mut config = AppConfig::for_api(ApiConfig::default());
        assert!(!config.is_production());
        config.environment = "production".to_string();
        assert!(config.is_production());
    }
}
