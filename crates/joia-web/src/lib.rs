//! # joia-web
//!
//! HTTP layer for the Joia storefront and admin panel.
//!
//! This crate provides:
//! - Axum-based HTTP server serving JSON page models
//! - Session-scoped cart and token pair (`tower-sessions`)
//! - Staff-only admin endpoints for products and orders
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/api/v1/home` | Home shelves |
//! | GET | `/api/v1/category/{*slug}` | Category listing with filters |
//! | GET | `/api/v1/search?q=` | Product search |
//! | GET | `/api/v1/products/{id}` | Product page |
//! | GET | `/api/v1/cart` | Cart drawer |
//! | POST | `/api/v1/checkout` | Place order |
//! | POST | `/api/v1/auth/login` | Sign in |
//! | GET | `/api/v1/profile` | Profile and orders |
//! | GET | `/api/v1/admin/dashboard` | Admin dashboard |

pub mod error;
pub mod handlers;
pub mod routes;
pub mod session;
pub mod state;

pub use error::{ApiError, ErrorResponse};
pub use routes::create_router;
pub use state::{AppConfig, AppState};
