//! Cart drawer endpoints. The cart lives in the shopper's session.

use crate::error::{shop_error_to_response, ApiError};
use crate::session::{load_cart, save_cart, SessionApi};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use joia_core::{
    validate_selection, Cart, CartItem, CartKey, Price, SelectedOptions, ShopError,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::{info, instrument};

/// Cart as rendered by the drawer
#[derive(Debug, Serialize, Deserialize)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub count: u32,
    pub subtotal: Price,
    pub subtotal_display: String,
    pub is_open: bool,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().to_vec(),
            count: cart.count(),
            subtotal: cart.subtotal(),
            subtotal_display: cart.subtotal().display(),
            is_open: cart.is_open(),
        }
    }
}

/// "Add to cart" from a product page
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: u64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub selected_options: SelectedOptions,
    #[serde(default)]
    pub engraving_text: Option<String>,
}

fn default_quantity() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub product_id: u64,
    #[serde(default)]
    pub selected_options: SelectedOptions,
    pub quantity: u32,
}

async fn store(session: &Session, cart: &Cart) -> Result<Json<CartView>, ApiError> {
    save_cart(session, cart)
        .await
        .map_err(shop_error_to_response)?;
    Ok(Json(CartView::from(cart)))
}

pub async fn get_cart(session: Session) -> Result<Json<CartView>, ApiError> {
    let cart = load_cart(&session).await.map_err(shop_error_to_response)?;
    Ok(Json(CartView::from(&cart)))
}

/// Add a product line; price, name and image come from the catalog, not the
/// request. Every option group must have a pick. Opens the drawer.
#[instrument(skip(state, session, request), fields(product_id = request.product_id))]
pub async fn add_item(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<CartView>, ApiError> {
    let api = SessionApi::open(&state, session.clone())
        .await
        .map_err(shop_error_to_response)?;
    let product = api.product(request.product_id).await;
    api.finish(Ok(())).await.map_err(shop_error_to_response)?;

    let product = product.ok_or_else(|| {
        shop_error_to_response(ShopError::ProductNotFound {
            product_id: request.product_id.to_string(),
        })
    })?;
    validate_selection(&product, &request.selected_options).map_err(shop_error_to_response)?;

    let mut item = CartItem::from_product(&product)
        .with_options(request.selected_options)
        .with_quantity(request.quantity);
    if let Some(text) = request.engraving_text {
        item = item.with_engraving(text);
    }

    let mut cart = load_cart(&session).await.map_err(shop_error_to_response)?;
    cart.add(item).map_err(shop_error_to_response)?;
    info!("Cart now holds {} pieces", cart.count());
    store(&session, &cart).await
}

/// Drop every line of a product, whatever the options
pub async fn remove_item(
    session: Session,
    Path(product_id): Path<u64>,
) -> Result<Json<CartView>, ApiError> {
    let mut cart = load_cart(&session).await.map_err(shop_error_to_response)?;
    cart.remove(product_id);
    store(&session, &cart).await
}

/// Set the quantity of one line; zero removes it
pub async fn update_quantity(
    session: Session,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<CartView>, ApiError> {
    let mut cart = load_cart(&session).await.map_err(shop_error_to_response)?;
    let key = CartKey {
        product_id: request.product_id,
        selected_options: request.selected_options,
    };
    cart.set_quantity(&key, request.quantity)
        .map_err(shop_error_to_response)?;
    store(&session, &cart).await
}

pub async fn clear_cart(session: Session) -> Result<Json<CartView>, ApiError> {
    let mut cart = load_cart(&session).await.map_err(shop_error_to_response)?;
    cart.clear();
    store(&session, &cart).await
}

/// Open or close the drawer
pub async fn toggle_cart(session: Session) -> Result<Json<CartView>, ApiError> {
    let mut cart = load_cart(&session).await.map_err(shop_error_to_response)?;
    cart.toggle();
    store(&session, &cart).await
}
