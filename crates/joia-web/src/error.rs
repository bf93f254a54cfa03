//! # Error Responses
//!
//! JSON error body and the mapping from [`ShopError`].

use axum::{http::StatusCode, Json};
use joia_core::auth::LOGIN_PATH;
use joia_core::ShopError;
use serde::{Deserialize, Serialize};
use tracing::error;

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Page the browser should go to next
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
            redirect: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_redirect(mut self, path: impl Into<String>) -> Self {
        self.redirect = Some(path.into());
        self
    }
}

/// What every fallible handler returns on failure
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a storefront error to a status code and JSON body
pub fn shop_error_to_response(err: ShopError) -> ApiError {
    let code = err.status_code();
    if code >= 500 {
        error!("Request failed: {}", err);
    }

    let mut response = ErrorResponse::new(err.user_message(), code);
    if let ShopError::Validation { field, .. } = &err {
        response = response.with_details(field.clone());
    }
    if matches!(err, ShopError::SessionExpired | ShopError::Unauthorized(_)) {
        response = response.with_redirect(LOGIN_PATH);
    }

    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}
