//! Checkout: turn the session cart into an order.

use crate::error::{shop_error_to_response, ApiError};
use crate::session::{load_cart, save_cart, SessionApi};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use joia_core::{CheckoutForm, NewOrder, OrderStatus, Price};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{error, info, instrument};

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub order_id: u64,
    pub status: OrderStatus,
    pub total: Price,
    pub message: String,
    pub redirect: String,
}

/// Place the order, then empty the cart.
///
/// The cart is only cleared once the API has accepted the order.
#[instrument(skip(state, session, form))]
pub async fn checkout(
    State(state): State<AppState>,
    session: Session,
    Json(form): Json<CheckoutForm>,
) -> Result<(StatusCode, Json<CheckoutResponse>), ApiError> {
    let mut cart = load_cart(&session).await.map_err(shop_error_to_response)?;
    let order = NewOrder::from_cart(&cart, &form).map_err(shop_error_to_response)?;

    let api = SessionApi::open(&state, session.clone())
        .await
        .map_err(shop_error_to_response)?;
    let result = api.create_order(&order).await;
    let placed = api.finish(result).await.map_err(|e| {
        error!("Checkout failed: {}", e);
        shop_error_to_response(e)
    })?;

    cart.clear();
    save_cart(&session, &cart)
        .await
        .map_err(shop_error_to_response)?;
    info!("Checkout complete: order={}", placed.id);

    Ok((
        StatusCode::CREATED,
        Json(CheckoutResponse {
            order_id: placed.id,
            status: placed.status,
            total: placed.total,
            message: "Pedido realizado com sucesso!".to_string(),
            redirect: "/".to_string(),
        }),
    ))
}
