//! # Catalog Reads
//!
//! Product and category listings for the storefront.
//!
//! Every read here degrades instead of failing: a broken listing renders as
//! an empty shelf and a missing product as `None`. The failure is logged.

use crate::http::ApiClient;
use joia_core::{filter_offers, Category, Product, ProductQuery};
use serde::de::DeserializeOwned;
use tracing::{instrument, warn};

/// How many related products a product page shows
pub const RELATED_LIMIT: usize = 4;

impl ApiClient {
    async fn list_or_empty<T: DeserializeOwned>(&self, path: &str, query: &ProductQuery) -> Vec<T> {
        match self.get_json::<Vec<T>>(path, query.pairs()).await {
            Ok(items) => items,
            Err(e) => {
                warn!("Failed to load {} {:?}: {}", path, query.pairs(), e);
                Vec::new()
            }
        }
    }

    /// Every product
    #[instrument(skip(self))]
    pub async fn products(&self) -> Vec<Product> {
        self.list_or_empty("/products/", &ProductQuery::new()).await
    }

    /// Products matching a query
    #[instrument(skip(self))]
    pub async fn filtered_products(&self, query: &ProductQuery) -> Vec<Product> {
        self.list_or_empty("/products/", query).await
    }

    /// Products in a category
    #[instrument(skip(self))]
    pub async fn products_by_category(&self, slug: &str) -> Vec<Product> {
        self.filtered_products(&ProductQuery::new().category(slug)).await
    }

    /// Free text product search
    #[instrument(skip(self))]
    pub async fn search_products(&self, term: &str) -> Vec<Product> {
        self.filtered_products(&ProductQuery::new().search(term)).await
    }

    /// Newest products first
    pub async fn new_arrivals(&self) -> Vec<Product> {
        self.filtered_products(&ProductQuery::new().ordering("-id")).await
    }

    /// Products with a promotional price
    pub async fn offers(&self) -> Vec<Product> {
        filter_offers(self.products().await)
    }

    /// Up to four other products for a product page
    pub async fn related_products(&self, exclude_id: u64) -> Vec<Product> {
        self.products()
            .await
            .into_iter()
            .filter(|p| p.id != exclude_id)
            .take(RELATED_LIMIT)
            .collect()
    }

    /// A single product, or `None` when it cannot be loaded
    #[instrument(skip(self))]
    pub async fn product(&self, id: u64) -> Option<Product> {
        match self.get_json::<Product>(&format!("/products/{}/", id), &[]).await {
            Ok(product) => Some(product),
            Err(e) => {
                warn!("Failed to load product {}: {}", id, e);
                None
            }
        }
    }

    /// Every category
    pub async fn categories(&self) -> Vec<Category> {
        self.list_or_empty("/categories/", &ProductQuery::new()).await
    }

    /// Categories flagged for the home page
    pub async fn home_categories(&self) -> Vec<Category> {
        self.list_or_empty("/categories/", &ProductQuery::new().show_on_home())
            .await
    }
}
