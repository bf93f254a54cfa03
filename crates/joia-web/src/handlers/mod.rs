//! # Request Handlers
//!
//! Axum request handlers, grouped by screen. Each returns the JSON page
//! model the browser renders.

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod storefront;

use axum::{response::IntoResponse, Json};

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "joia-storefront",
        "version": env!("CARGO_PKG_VERSION")
    }))
}
