//! # Routes
//!
//! Axum router configuration for the storefront and admin panel.

use crate::handlers::{self, account, admin, auth, cart, checkout, storefront};
use crate::session::SESSION_COOKIE;
use crate::state::AppState;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tower_sessions::{MemoryStore as SessionStore, SessionManagerLayer};
use tracing::warn;

/// Create the main application router
///
/// Routes:
/// - Storefront:
///   - GET /api/v1/home, /api/v1/categories, /api/v1/category/{*slug}
///   - GET /api/v1/search?q=, /api/v1/products/{id}
/// - Cart (session):
///   - GET/DELETE /api/v1/cart, POST /api/v1/cart/toggle
///   - POST/PATCH /api/v1/cart/items, DELETE /api/v1/cart/items/{product_id}
/// - Checkout: POST /api/v1/checkout
/// - Auth: /api/v1/auth/{login,logout,register,sms/send,sms/verify}
/// - Account: /api/v1/profile, /api/v1/profile/addresses, /api/v1/orders/{id}
/// - Admin (staff only): /api/v1/admin/...
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(state.config.cors_origin.as_deref());

    let sessions = SessionManagerLayer::new(SessionStore::default())
        .with_name(SESSION_COOKIE)
        .with_secure(state.config.is_production());

    let storefront_routes = Router::new()
        .route("/home", get(storefront::home))
        .route("/categories", get(storefront::categories))
        .route("/category/{*slug}", get(storefront::category))
        .route("/search", get(storefront::search))
        .route("/products/{product_id}", get(storefront::product));

    let cart_routes = Router::new()
        .route("/", get(cart::get_cart).delete(cart::clear_cart))
        .route("/toggle", post(cart::toggle_cart))
        .route(
            "/items",
            post(cart::add_item).patch(cart::update_quantity),
        )
        .route("/items/{product_id}", delete(cart::remove_item));

    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/register", post(auth::register))
        .route("/sms/send", post(auth::sms_send))
        .route("/sms/verify", post(auth::sms_verify));

    let account_routes = Router::new()
        .route("/profile", get(account::profile))
        .route(
            "/profile/addresses",
            get(account::list_addresses).post(account::create_address),
        )
        .route("/profile/addresses/{address_id}", delete(account::delete_address))
        .route("/orders/{order_id}", get(account::get_order));

    let admin_routes = Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route(
            "/products",
            get(admin::list_products).post(admin::create_product),
        )
        .route(
            "/products/{product_id}",
            patch(admin::update_product).delete(admin::delete_product),
        )
        .route("/product-images/{image_id}", delete(admin::delete_product_image))
        .route("/orders", get(admin::list_orders));

    let api_routes = Router::new()
        .merge(storefront_routes)
        .merge(account_routes)
        .nest("/cart", cart_routes)
        .route("/checkout", post(checkout::checkout))
        .nest("/auth", auth_routes)
        .nest("/admin", admin_routes);

    Router::new()
        // Health check at root
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        // API v1
        .nest("/api/v1", api_routes)
        // Middleware
        .layer(sessions)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        // State
        .with_state(state)
}

/// Any origin unless one is configured; a configured origin may send the
/// session cookie
fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let exact = origin.and_then(|o| match HeaderValue::from_str(o) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring invalid CORS_ORIGIN {}: {}", o, e);
            None
        }
    });

    match exact {
        Some(value) => CorsLayer::new()
            .allow_origin(value)
            .allow_credentials(true)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PATCH,
                Method::DELETE,
            ])
            .allow_headers([header::CONTENT_TYPE]),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    }
}
