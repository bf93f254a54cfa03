//! # joia-core
//!
//! Domain types and client-side rules for the Joia jewelry storefront.
//!
//! This crate provides:
//! - `Product`, `Category` and `ProductQuery` for catalog browsing and filtering
//! - `Cart` and `PersistentCart` for the client-held shopping cart
//! - `TokenStore` for the bearer/refresh token pair
//! - `Registration`, `CheckoutForm` and friends for form validation
//! - `Order` and `DashboardStats` for the profile and admin screens
//! - `ShopError` for typed error handling
//!
//! Nothing here performs I/O. Persistence goes through the
//! [`KeyValueStore`] seam so the same cart runs against browser storage,
//! a server session or a test double.
//!
//! ## Example
//!
//! ```rust,ignore
//! use joia_core::{Cart, CartItem, MemoryStore, PersistentCart};
//!
//! let mut cart = PersistentCart::load(MemoryStore::new());
//! cart.add(CartItem::from_product(&product).with_engraving("Para sempre"))?;
//!
//! println!("{} peças, {}", cart.cart().count(), cart.cart().subtotal());
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod error;
pub mod money;
pub mod order;
pub mod storage;

// Re-exports for convenience
pub use account::{
    is_strong_password, Address, NewAddress, RegisterRequest, Registration, SmsRequest,
    SmsVerification,
};
pub use auth::{landing_path, Credentials, RefreshedToken, TokenPair, TokenStore, User};
pub use cart::{
    validate_selection, whatsapp_inquiry_url, Cart, CartItem, CartKey, PersistentCart,
    SelectedOptions, MAX_QUANTITY,
};
pub use catalog::{
    category_title, filter_offers, search_by_name, sort_newest_first, AttributeGroup,
    AttributeValue, Category, PriceFilter, Product, ProductImage, ProductQuery,
};
pub use error::{ShopError, ShopResult};
pub use money::Price;
pub use order::{
    search_orders, CheckoutForm, DashboardStats, NewOrder, NewOrderItem, Order, OrderItem,
    OrderStatus, PaymentMethod,
};
pub use storage::{KeyValueStore, MemoryStore};
