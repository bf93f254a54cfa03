//! # Cart
//!
//! The client-held shopping cart.
//!
//! Lines are keyed by product id plus the selected options; adding a line
//! whose key already exists bumps the quantity instead of appending.
//! Quantities stay between one and [`MAX_QUANTITY`].

use crate::catalog::Product;
use crate::error::{ShopError, ShopResult};
use crate::money::Price;
use crate::storage::{KeyValueStore, CART_KEY};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Most units of one line a shopper can hold
pub const MAX_QUANTITY: u32 = 99;

fn quantity_too_large() -> ShopError {
    ShopError::validation(
        "quantity",
        format!("Quantidade máxima por item é {}.", MAX_QUANTITY),
    )
}

/// Selected attribute values, e.g. `{"Aro": "14", "Material": "Ouro 18k"}`
pub type SelectedOptions = BTreeMap<String, String>;

/// A line in the cart
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Product ID
    pub product_id: u64,

    /// Product name (denormalized for display)
    pub name: String,

    /// Unit price at the moment it was added
    pub unit_price: Price,

    /// Quantity (>= 1)
    pub quantity: u32,

    /// Cover image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// Selected options
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub selected_options: SelectedOptions,

    /// Engraving requested by the shopper
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engraving_text: Option<String>,
}

impl CartItem {
    /// Create a single-unit line from a product
    pub fn from_product(product: &Product) -> Self {
        Self {
            product_id: product.id,
            name: product.name.clone(),
            unit_price: product.effective_price(),
            quantity: 1,
            image_url: product.cover_image().map(|img| img.image.clone()),
            selected_options: SelectedOptions::new(),
            engraving_text: None,
        }
    }

    /// Builder: set selected options
    pub fn with_options(mut self, options: SelectedOptions) -> Self {
        self.selected_options = options;
        self
    }

    /// Builder: set engraving (blank text means none)
    pub fn with_engraving(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        let trimmed = text.trim();
        self.engraving_text = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    /// Builder: set quantity
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Identity of the line
    pub fn key(&self) -> CartKey {
        CartKey {
            product_id: self.product_id,
            selected_options: self.selected_options.clone(),
        }
    }

    fn matches(&self, key: &CartKey) -> bool {
        self.product_id == key.product_id && self.selected_options == key.selected_options
    }

    /// Line total
    pub fn total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// Product + options identity of a cart line
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CartKey {
    pub product_id: u64,
    #[serde(default)]
    pub selected_options: SelectedOptions,
}

/// The shopping cart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,

    /// Drawer state; UI-only and never persisted
    #[serde(skip)]
    open: bool,
}

impl Cart {
    /// Create an empty cart
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a line, merging with an existing line of the same key.
    ///
    /// Opens the cart drawer.
    pub fn add(&mut self, item: CartItem) -> ShopResult<()> {
        if item.quantity == 0 {
            return Err(ShopError::validation("quantity", "Quantidade deve ser ao menos 1."));
        }
        if item.quantity > MAX_QUANTITY {
            return Err(quantity_too_large());
        }

        let key = item.key();
        match self.items.iter_mut().find(|i| i.matches(&key)) {
            Some(existing) => {
                let merged = existing.quantity + item.quantity;
                if merged > MAX_QUANTITY {
                    return Err(quantity_too_large());
                }
                existing.quantity = merged;
                debug!(
                    product_id = existing.product_id,
                    quantity = existing.quantity,
                    "Merged cart line"
                );
            }
            None => {
                debug!(product_id = item.product_id, "Added cart line");
                self.items.push(item);
            }
        }
        self.open = true;
        Ok(())
    }

    /// Remove every line of a product. Returns true if anything was removed.
    pub fn remove(&mut self, product_id: u64) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product_id != product_id);
        self.items.len() != before
    }

    /// Remove exactly one configured line
    pub fn remove_line(&mut self, key: &CartKey) -> bool {
        let before = self.items.len();
        self.items.retain(|i| !i.matches(key));
        self.items.len() != before
    }

    /// Set the quantity of a line; zero removes it
    pub fn set_quantity(&mut self, key: &CartKey, quantity: u32) -> ShopResult<()> {
        if quantity == 0 {
            self.remove_line(key);
            return Ok(());
        }
        if quantity > MAX_QUANTITY {
            return Err(quantity_too_large());
        }
        let line = self
            .items
            .iter_mut()
            .find(|i| i.matches(key))
            .ok_or_else(|| ShopError::ProductNotFound {
                product_id: key.product_id.to_string(),
            })?;
        line.quantity = quantity;
        Ok(())
    }

    /// Rebuild a cart from stored lines.
    ///
    /// Lines sharing a key are merged; lines with an out-of-range quantity
    /// are dropped. The drawer starts closed.
    pub fn from_items(items: Vec<CartItem>) -> Self {
        let mut cart = Self::new();
        for item in items {
            let product_id = item.product_id;
            if let Err(e) = cart.add(item) {
                warn!(product_id, "Dropping stored cart line: {}", e);
            }
        }
        cart.open = false;
        cart
    }

    /// Take the lines out of the cart
    pub fn into_items(self) -> Vec<CartItem> {
        self.items
    }

    /// Empty the cart
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Lines in insertion order
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Check if cart is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all lines (2 rings + 1 necklace = 3)
    pub fn count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Sum of line totals
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(CartItem::total).sum()
    }

    /// Amount due. Shipping is free, so this equals the subtotal.
    pub fn total(&self) -> Price {
        self.subtotal()
    }

    /// Flip the drawer state
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        self.open
    }

    /// Check if the drawer is open
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Load the cart saved under [`CART_KEY`]; missing or corrupt data yields an empty cart
    pub fn load(store: &impl KeyValueStore) -> Self {
        let Some(raw) = store.get(CART_KEY) else {
            return Self::new();
        };
        match serde_json::from_str::<Vec<CartItem>>(&raw) {
            Ok(items) => Self::from_items(items),
            Err(e) => {
                warn!("Discarding unreadable saved cart: {}", e);
                Self::new()
            }
        }
    }

    /// Save the lines under [`CART_KEY`]
    pub fn save(&self, store: &impl KeyValueStore) -> ShopResult<()> {
        let raw = serde_json::to_string(&self.items)?;
        store.set(CART_KEY, &raw);
        Ok(())
    }

    /// Drop the saved cart
    pub fn clear_persisted(store: &impl KeyValueStore) {
        store.remove(CART_KEY);
    }
}

/// A cart that writes itself back to storage after every change
pub struct PersistentCart<S: KeyValueStore> {
    cart: Cart,
    store: S,
}

impl<S: KeyValueStore> PersistentCart<S> {
    /// Load from storage
    pub fn load(store: S) -> Self {
        let cart = Cart::load(&store);
        Self { cart, store }
    }

    /// Read access to the cart
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn add(&mut self, item: CartItem) -> ShopResult<()> {
        self.cart.add(item)?;
        self.cart.save(&self.store)
    }

    pub fn remove(&mut self, product_id: u64) -> ShopResult<bool> {
        let removed = self.cart.remove(product_id);
        self.cart.save(&self.store)?;
        Ok(removed)
    }

    pub fn set_quantity(&mut self, key: &CartKey, quantity: u32) -> ShopResult<()> {
        self.cart.set_quantity(key, quantity)?;
        self.cart.save(&self.store)
    }

    /// Empty the cart and remove the saved copy
    pub fn clear(&mut self) {
        self.cart.clear();
        Cart::clear_persisted(&self.store);
    }

    pub fn toggle(&mut self) -> bool {
        self.cart.toggle()
    }
}

/// Check that every option group offered by the product has a selection.
///
/// The error names the missing groups, e.g. `Por favor, selecione: Aro, Material`.
pub fn validate_selection(product: &Product, selected: &SelectedOptions) -> ShopResult<()> {
    let missing: Vec<String> = product
        .grouped_attributes()
        .into_iter()
        .filter(|group| {
            selected
                .get(&group.name)
                .map(|v| v.trim().is_empty())
                .unwrap_or(true)
        })
        .map(|group| group.name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ShopError::validation(
            "selected_options",
            format!("Por favor, selecione: {}", missing.join(", ")),
        ))
    }
}

/// WhatsApp deep link asking about a product and the current selection
pub fn whatsapp_inquiry_url(
    number: &str,
    product_name: &str,
    selected: &SelectedOptions,
    engraving: Option<&str>,
) -> String {
    let mut message = format!("Olá! Tenho interesse na joia *{}*.", product_name);
    if !selected.is_empty() {
        let lines: Vec<String> = selected
            .iter()
            .map(|(k, v)| format!("- {}: {}", k, v))
            .collect();
        message.push_str("\n\nSelecionei:\n");
        message.push_str(&lines.join("\n"));
    }
    if let Some(text) = engraving.map(str::trim).filter(|t| !t.is_empty()) {
        message.push_str(&format!("\n\nGravação: *{}*", text));
    }

    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    let mut url = match url::Url::parse("https://wa.me/") {
        Ok(url) => url,
        Err(_) => return String::new(),
    };
    url.set_path(&digits);
    url.query_pairs_mut().append_pair("text", &message);
    url.to_string()
}
