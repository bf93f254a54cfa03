//! # Orders
//!
//! Placing an order at checkout and reading orders back.

use crate::http::ApiClient;
use joia_core::{NewOrder, Order, ShopResult};
use tracing::{info, instrument, warn};

impl ApiClient {
    /// `POST /orders/`
    #[instrument(skip(self, order), fields(items = order.items_data.len(), total = %order.total))]
    pub async fn create_order(&self, order: &NewOrder) -> ShopResult<Order> {
        let placed: Order = self.post_json("/orders/", order).await?;
        info!("Order {} placed, total={}", placed.id, placed.total);
        Ok(placed)
    }

    /// `GET /orders/{id}/`, `None` when it cannot be loaded
    #[instrument(skip(self))]
    pub async fn order(&self, id: u64) -> Option<Order> {
        match self.get_json::<Order>(&format!("/orders/{}/", id), &[]).await {
            Ok(order) => Some(order),
            Err(e) => {
                warn!("Failed to load order {}: {}", id, e);
                None
            }
        }
    }

    /// `GET /orders/`; the API scopes the list to the caller, staff see all
    #[instrument(skip(self))]
    pub async fn orders(&self) -> ShopResult<Vec<Order>> {
        self.get_json("/orders/", &[]).await
    }
}
