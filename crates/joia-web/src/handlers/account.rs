//! Profile, saved addresses and order detail for the signed-in shopper.

use crate::error::{shop_error_to_response, ApiError};
use crate::session::SessionApi;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use joia_core::{Address, NewAddress, Order, ShopError, ShopResult, User};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{instrument, warn};

/// Order with its display strings
#[derive(Debug, Serialize, Deserialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub status_label: String,
    pub total_display: String,
}

impl From<Order> for OrderView {
    fn from(order: Order) -> Self {
        Self {
            status_label: order.status.label().to_string(),
            total_display: order.total.display(),
            order,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProfilePage {
    pub display_name: String,
    pub user: User,
    pub orders: Vec<OrderView>,
}

/// Pages behind login need a token before any call is made
pub(crate) async fn signed_in(state: &AppState, session: Session) -> ShopResult<SessionApi> {
    let api = SessionApi::open(state, session).await?;
    if !api.tokens().is_authenticated() {
        return Err(ShopError::SessionExpired);
    }
    Ok(api)
}

#[instrument(skip_all)]
pub async fn profile(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<ProfilePage>, ApiError> {
    let api = signed_in(&state, session)
        .await
        .map_err(shop_error_to_response)?;
    let (user, orders) = tokio::join!(api.me(), api.orders());
    let user = api.finish(user).await.map_err(shop_error_to_response)?;

    let orders = orders.unwrap_or_else(|e| {
        warn!("Could not load orders for profile: {}", e);
        Vec::new()
    });

    Ok(Json(ProfilePage {
        display_name: user.display_name(),
        user,
        orders: orders.into_iter().map(OrderView::from).collect(),
    }))
}

pub async fn list_addresses(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<Address>>, ApiError> {
    let api = signed_in(&state, session)
        .await
        .map_err(shop_error_to_response)?;
    let result = api.addresses().await;
    api.finish(result)
        .await
        .map(Json)
        .map_err(shop_error_to_response)
}

#[instrument(skip(state, session, address))]
pub async fn create_address(
    State(state): State<AppState>,
    session: Session,
    Json(address): Json<NewAddress>,
) -> Result<(StatusCode, Json<Address>), ApiError> {
    address.validate().map_err(shop_error_to_response)?;
    let api = signed_in(&state, session)
        .await
        .map_err(shop_error_to_response)?;
    let result = api.create_address(&address).await;
    let created = api.finish(result).await.map_err(shop_error_to_response)?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn delete_address(
    State(state): State<AppState>,
    session: Session,
    Path(address_id): Path<u64>,
) -> Result<StatusCode, ApiError> {
    let api = signed_in(&state, session)
        .await
        .map_err(shop_error_to_response)?;
    let result = api.delete_address(address_id).await;
    api.finish(result).await.map_err(shop_error_to_response)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Order confirmation / detail page
#[instrument(skip(state, session))]
pub async fn get_order(
    State(state): State<AppState>,
    session: Session,
    Path(order_id): Path<u64>,
) -> Result<Json<OrderView>, ApiError> {
    let api = SessionApi::open(&state, session)
        .await
        .map_err(shop_error_to_response)?;
    let order = api.order(order_id).await;
    api.finish(Ok(())).await.map_err(shop_error_to_response)?;

    order.map(|o| Json(OrderView::from(o))).ok_or_else(|| {
        shop_error_to_response(ShopError::OrderNotFound {
            order_id: order_id.to_string(),
        })
    })
}
