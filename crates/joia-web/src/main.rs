//! # Joia Storefront
//!
//! Storefront and admin server in front of the Joia store API.
//!
//! ## Usage
//!
//! ```bash
//! # Point at the store API
//! export JOIA_API_URL=http://localhost:8000/api
//! export WHATSAPP_NUMBER=5511999999999
//!
//! # JSON logs for production
//! export LOG_FORMAT=json
//!
//! # Run the server
//! joia-storefront
//! ```

use joia_web::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    // Initialize application state
    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Store API: {}", state.config.api.base_url);

    // Create router
    let app = routes::create_router(state);

    // Start server
    info!("Joia storefront v{} on http://{}", env!("CARGO_PKG_VERSION"), addr);

    if !is_prod {
        info!("Health: http://{}/health", addr);
        info!("Home: GET http://{}/api/v1/home", addr);
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Human-readable logs by default, JSON lines when `LOG_FORMAT=json`
fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(Level::INFO.into())
        .from_env_lossy();

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(filter)
            .init();
    }
}
