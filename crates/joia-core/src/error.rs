//! # Shop Error Types
//!
//! Typed error handling for the Joia storefront layer.
//! Every client and validation operation returns `Result<T, ShopError>`.

use thiserror::Error;

/// Core error type for storefront operations
#[derive(Debug, Error)]
pub enum ShopError {
    /// Configuration errors (missing or malformed settings)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A form field failed validation
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    /// Product not found in the store API
    #[error("Product not found: {product_id}")]
    ProductNotFound { product_id: String },

    /// Order not found in the store API
    #[error("Order not found: {order_id}")]
    OrderNotFound { order_id: String },

    /// Price could not be parsed or is out of range
    #[error("Invalid price: {message}")]
    InvalidPrice { message: String },

    /// No credentials, or the API rejected the bearer token
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Login rejected by the token endpoint
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Authenticated, but not allowed (admin screens)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Refresh token was rejected; tokens have been cleared
    #[error("Session expired, please log in again")]
    SessionExpired,

    /// Store API answered with a non-success status
    #[error("API error [{status}]: {message}")]
    Api { status: u16, message: String },

    /// Network/HTTP error talking to the store API
    #[error("Network error: {0}")]
    Network(String),

    /// Client storage failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ShopError {
    /// Shorthand for a field validation failure
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        ShopError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns true if the failure is transient.
    ///
    /// Nothing in the storefront retries on its own; this only informs the
    /// caller whether offering "try again" makes sense.
    pub fn is_retryable(&self) -> bool {
        match self {
            ShopError::Network(_) => true,
            ShopError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            ShopError::Configuration(_) => 500,
            ShopError::InvalidRequest(_) => 400,
            ShopError::Validation { .. } => 422,
            ShopError::ProductNotFound { .. } => 404,
            ShopError::OrderNotFound { .. } => 404,
            ShopError::InvalidPrice { .. } => 400,
            ShopError::Unauthorized(_) => 401,
            ShopError::InvalidCredentials => 401,
            ShopError::Forbidden(_) => 403,
            ShopError::SessionExpired => 401,
            ShopError::Api { status, .. } => match *status {
                400..=499 => *status,
                _ => 502,
            },
            ShopError::Network(_) => 503,
            ShopError::Storage(_) => 500,
            ShopError::Serialization(_) => 500,
            ShopError::Internal(_) => 500,
        }
    }

    /// Message suitable for an alert shown to the shopper
    pub fn user_message(&self) -> String {
        match self {
            ShopError::Validation { message, .. } => message.clone(),
            ShopError::InvalidRequest(msg) => msg.clone(),
            ShopError::ProductNotFound { .. } => "Produto não encontrado.".to_string(),
            ShopError::OrderNotFound { .. } => "Pedido não encontrado.".to_string(),
            ShopError::InvalidPrice { message } => message.clone(),
            ShopError::Unauthorized(_) => "Faça login para continuar.".to_string(),
            ShopError::InvalidCredentials => "Email ou senha incorretos.".to_string(),
            ShopError::Forbidden(_) => "Acesso restrito à administração.".to_string(),
            ShopError::SessionExpired => "Sua sessão expirou. Faça login novamente.".to_string(),
            ShopError::Api { status, message } if *status < 500 => message.clone(),
            _ => "Erro ao conectar com o servidor.".to_string(),
        }
    }
}

impl From<serde_json::Error> for ShopError {
    fn from(err: serde_json::Error) -> Self {
        ShopError::Serialization(err.to_string())
    }
}

/// Result type alias for storefront operations
pub type ShopResult<T> = Result<T, ShopError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(ShopError::Network("timeout".into()).is_retryable());
        assert!(ShopError::Api {
            status: 503,
            message: "down".into()
        }
        .is_retryable());
        assert!(!ShopError::Api {
            status: 400,
            message: "bad".into()
        }
        .is_retryable());
        assert!(!ShopError::SessionExpired.is_retryable());
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ShopError::InvalidRequest("x".into()).status_code(), 400);
        assert_eq!(ShopError::validation("email", "bad").status_code(), 422);
        assert_eq!(
            ShopError::ProductNotFound {
                product_id: "7".into()
            }
            .status_code(),
            404
        );
        assert_eq!(ShopError::SessionExpired.status_code(), 401);
        assert_eq!(
            ShopError::Api {
                status: 500,
                message: "boom".into()
            }
            .status_code(),
            502
        );
        assert_eq!(
            ShopError::Api {
                status: 404,
                message: "missing".into()
            }
            .status_code(),
            404
        );
    }

    #[test]
    fn test_user_message_hides_server_details() {
        let err = ShopError::Api {
            status: 500,
            message: "Traceback ...".into(),
        };
        assert_eq!(err.user_message(), "Erro ao conectar com o servidor.");

        let err = ShopError::validation("password", "As senhas não coincidem.");
        assert_eq!(err.user_message(), "As senhas não coincidem.");
    }

    #[test]
    fn test_rejected_token_is_not_a_credentials_error() {
        let err = ShopError::Unauthorized("token_not_valid".into());
        assert_eq!(err.status_code(), 401);
        assert_eq!(err.user_message(), "Faça login para continuar.");

        assert_eq!(ShopError::InvalidCredentials.status_code(), 401);
        assert_eq!(
            ShopError::InvalidCredentials.user_message(),
            "Email ou senha incorretos."
        );
    }
}
