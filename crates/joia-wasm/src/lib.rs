//! # joia-wasm
//!
//! WebAssembly bindings for the Joia cart.
//!
//! This crate provides WASM-compatible functions for:
//! - Keeping the cart in `localStorage` under `joias-cart`
//! - Cart arithmetic and price formatting in the browser
//! - Client-side password checks on the sign-up form
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmCart, format_price } from 'joia-wasm';
//!
//! await init();
//!
//! const cart = WasmCart.load();
//! cart.add_item({ product_id: 7, name: 'Anel Solitário', unit_price: '1299.90' });
//!
//! console.log(cart.count(), cart.subtotal_display());
//! ```
//!
//! ## Building
//!
//! ```bash
//! wasm-pack build --target web
//! ```

pub mod storage;

use joia_core::{is_strong_password, CartItem, PersistentCart, Price, SelectedOptions, ShopResult};
use serde::Deserialize;
use storage::LocalStorage;
use wasm_bindgen::prelude::*;

/// Line as sent by the product page
#[derive(Debug, Deserialize)]
pub struct NewCartLine {
    pub product_id: u64,
    pub name: String,
    pub unit_price: Price,
    #[serde(default = "one")]
    pub quantity: u32,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub selected_options: SelectedOptions,
    #[serde(default)]
    pub engraving_text: Option<String>,
}

fn one() -> u32 {
    1
}

impl From<NewCartLine> for CartItem {
    fn from(line: NewCartLine) -> Self {
        let item = CartItem {
            product_id: line.product_id,
            name: line.name,
            unit_price: line.unit_price,
            quantity: line.quantity,
            image_url: line.image_url,
            selected_options: line.selected_options,
            engraving_text: None,
        };
        match line.engraving_text {
            Some(text) => item.with_engraving(text),
            None => item,
        }
    }
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// The shopping cart, saved to `localStorage` after every change
#[wasm_bindgen]
pub struct WasmCart {
    inner: PersistentCart<LocalStorage>,
}

#[wasm_bindgen]
impl WasmCart {
    /// Load the saved cart (empty if nothing or garbage was saved)
    pub fn load() -> WasmCart {
        Self::with_storage(LocalStorage::from_window())
    }

    /// Add a line; a line with the same product and options gains quantity
    pub fn add_item(&mut self, line: JsValue) -> Result<(), JsValue> {
        let line: NewCartLine = serde_wasm_bindgen::from_value(line)
            .map_err(|e| JsValue::from_str(&format!("Invalid cart item: {}", e)))?;
        self.add(line).map_err(to_js)
    }

    /// Remove every line of a product
    pub fn remove(&mut self, product_id: u64) -> Result<bool, JsValue> {
        self.inner.remove(product_id).map_err(to_js)
    }

    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Number of pieces
    pub fn count(&self) -> u32 {
        self.inner.cart().count()
    }

    pub fn subtotal_cents(&self) -> i64 {
        self.inner.cart().subtotal().cents()
    }

    /// Subtotal formatted for display (e.g., "R$ 159.99")
    pub fn subtotal_display(&self) -> String {
        self.inner.cart().subtotal().display()
    }

    /// Lines as a JS array
    pub fn items(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(self.inner.cart().items()).map_err(to_js)
    }

    /// Flip the drawer; returns the new state
    pub fn toggle(&mut self) -> bool {
        self.inner.toggle()
    }

    pub fn is_open(&self) -> bool {
        self.inner.cart().is_open()
    }
}

impl WasmCart {
    pub fn with_storage(storage: LocalStorage) -> Self {
        Self {
            inner: PersistentCart::load(storage),
        }
    }

    pub fn add(&mut self, line: NewCartLine) -> ShopResult<()> {
        self.inner.add(CartItem::from(line))
    }
}

/// Format a price in cents to display string
#[wasm_bindgen]
pub fn format_price(cents: i64) -> String {
    Price::from_cents(cents).display()
}

/// Parse a typed amount ("159,90" or "159.90") into cents
#[wasm_bindgen]
pub fn parse_price(input: &str) -> Result<i64, JsValue> {
    Price::parse(input).map(|p| p.cents()).map_err(to_js)
}

/// Sign-up password rule
#[wasm_bindgen]
pub fn validate_password(password: &str) -> bool {
    is_strong_password(password)
}

/// Log to browser console
#[wasm_bindgen]
pub fn log(message: &str) {
    web_sys::console::log_1(&JsValue::from_str(message));
}

/// Get library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(product_id: u64, price: &str) -> NewCartLine {
        NewCartLine {
            product_id,
            name: "Anel".to_string(),
            unit_price: Price::parse(price).unwrap(),
            quantity: 1,
            image_url: None,
            selected_options: SelectedOptions::new(),
            engraving_text: Some("  ".to_string()),
        }
    }

    #[test]
    fn test_cart_arithmetic() {
        let mut cart = WasmCart::with_storage(LocalStorage::detached());
        cart.add(line(1, "159.99")).unwrap();
        cart.add(line(1, "159.99")).unwrap();
        cart.add(line(2, "40")).unwrap();

        assert_eq!(cart.count(), 3);
        assert_eq!(cart.subtotal_cents(), 35998);
        assert_eq!(cart.subtotal_display(), "R$ 359.98");
        assert!(cart.is_open());
    }

    #[test]
    fn test_blank_engraving_dropped() {
        let item = CartItem::from(line(1, "10"));
        assert!(item.engraving_text.is_none());
    }

    #[test]
    fn test_format_and_parse_price() {
        assert_eq!(format_price(15999), "R$ 159.99");
        assert_eq!(format_price(100), "R$ 1.00");
        assert_eq!(parse_price("159,9").unwrap(), 15990);
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("Joia2024!"));
        assert!(!validate_password("joia2024"));
    }
}
