//! # Orders
//!
//! Checkout form, the order payload posted to the API, and the order
//! records read back by the profile and admin screens.

use crate::account::validate_email;
use crate::cart::Cart;
use crate::catalog::Product;
use crate::error::{ShopError, ShopResult};
use crate::money::Price;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Order Records
// ============================================================================

/// Lifecycle state of an order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Paid,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Label shown to shoppers and staff
    pub fn label(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pendente",
            OrderStatus::Paid => "Pago",
            OrderStatus::Shipped => "Enviado",
            OrderStatus::Delivered => "Entregue",
            OrderStatus::Cancelled => "Cancelado",
        }
    }

    /// Cancelled orders never count toward revenue
    pub fn counts_as_revenue(&self) -> bool {
        !matches!(self, OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A line of a placed order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: u64,
    pub product: Option<u64>,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub product_image: Option<String>,
    pub quantity: u32,
    pub price: Price,
}

/// A placed order as served by `/orders/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u64,
    #[serde(default)]
    pub customer: Option<u64>,
    #[serde(default)]
    pub guest_name: Option<String>,
    #[serde(default, alias = "customer_email")]
    pub guest_email: Option<String>,
    #[serde(default)]
    pub status: OrderStatus,
    pub total: Price,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Number of pieces across all lines
    pub fn piece_count(&self) -> u32 {
        self.items.iter().map(|item| item.quantity).sum()
    }
}

/// Staff order search: order id or email containing the term.
///
/// A blank term returns every order.
pub fn search_orders<'a>(orders: &'a [Order], term: &str) -> Vec<&'a Order> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return orders.iter().collect();
    }
    orders
        .iter()
        .filter(|order| {
            order.id.to_string().contains(&needle)
                || order
                    .guest_email
                    .as_deref()
                    .is_some_and(|email| email.to_lowercase().contains(&needle))
        })
        .collect()
}

// ============================================================================
// Checkout
// ============================================================================

/// How the shopper says they will pay. Recorded only; no capture happens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Pix,
    Card,
}

/// Checkout form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CheckoutForm {
    pub name: String,
    pub email: String,
    pub address: String,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

impl CheckoutForm {
    pub fn validate(&self) -> ShopResult<()> {
        if self.name.trim().is_empty() {
            return Err(ShopError::validation("name", "Informe seu nome."));
        }
        if self.email.trim().is_empty() {
            return Err(ShopError::validation("email", "Informe seu email."));
        }
        validate_email(&self.email)?;
        if self.address.trim().is_empty() {
            return Err(ShopError::validation("address", "Informe o endereço de entrega."));
        }
        Ok(())
    }
}

/// One line of `items_data`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: u64,
    pub quantity: u32,
    pub price: Price,
}

/// Body of `POST /orders/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewOrder {
    pub guest_name: String,
    pub guest_email: String,
    pub address: String,
    pub total: Price,
    pub payment_method: PaymentMethod,
    pub items_data: Vec<NewOrderItem>,
}

impl NewOrder {
    /// Build the order payload from the cart and a validated form
    pub fn from_cart(cart: &Cart, form: &CheckoutForm) -> ShopResult<Self> {
        if cart.is_empty() {
            return Err(ShopError::InvalidRequest("Seu carrinho está vazio.".to_string()));
        }
        form.validate()?;

        let items_data = cart
            .items()
            .iter()
            .map(|item| NewOrderItem {
                product_id: item.product_id,
                quantity: item.quantity,
                price: item.unit_price,
            })
            .collect();

        Ok(Self {
            guest_name: form.name.trim().to_string(),
            guest_email: form.email.trim().to_lowercase(),
            address: form.address.trim().to_string(),
            total: cart.total(),
            payment_method: form.payment_method,
            items_data,
        })
    }
}

// ============================================================================
// Dashboard
// ============================================================================

/// Headline numbers on the admin dashboard
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub revenue: Price,
    pub order_count: usize,
    pub product_count: usize,
    pub average_ticket: Price,
    pub pending_orders: usize,
}

impl DashboardStats {
    pub fn compute(orders: &[Order], products: &[Product]) -> Self {
        let billable: Vec<&Order> = orders
            .iter()
            .filter(|o| o.status.counts_as_revenue())
            .collect();
        let revenue: Price = billable.iter().map(|o| o.total).sum();
        let average_ticket = if billable.is_empty() {
            Price::ZERO
        } else {
            Price::from_cents(revenue.cents() / billable.len() as i64)
        };

        Self {
            revenue,
            order_count: orders.len(),
            product_count: products.len(),
            average_ticket,
            pending_orders: orders
                .iter()
                .filter(|o| o.status == OrderStatus::Pending)
                .count(),
        }
    }
}
