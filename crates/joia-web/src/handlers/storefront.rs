//! Storefront pages: home, categories, search and product detail.

use crate::error::{shop_error_to_response, ApiError};
use crate::session::SessionApi;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    Json,
};
use joia_core::catalog::MATERIALS;
use joia_core::{
    category_title, whatsapp_inquiry_url, AttributeGroup, Category, PriceFilter, Product,
    ProductQuery, SelectedOptions, ShopError,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tower_sessions::Session;
use tracing::{info, instrument};

// =============================================================================
// Page Models
// =============================================================================

#[derive(Debug, Serialize)]
pub struct HomePage {
    pub categories: Vec<Category>,
    pub new_arrivals: Vec<Product>,
    pub offers: Vec<Product>,
}

/// Category page filter inputs, as sent by the sidebar form
#[derive(Debug, Default, Deserialize)]
pub struct CategoryParams {
    #[serde(default)]
    pub min_price: Option<String>,
    #[serde(default)]
    pub max_price: Option<String>,
    #[serde(default)]
    pub material: Option<String>,
}

impl From<CategoryParams> for PriceFilter {
    fn from(params: CategoryParams) -> Self {
        PriceFilter {
            min_price: params.min_price,
            max_price: params.max_price,
            material: params
                .material
                .into_iter()
                .filter(|m| !m.trim().is_empty())
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryPage {
    pub slug: String,
    pub title: String,
    pub filter: PriceFilter,
    pub materials: &'static [&'static str],
    pub products: Vec<Product>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SearchPage {
    pub term: String,
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize)]
pub struct ProductPage {
    pub product: Product,
    pub display_price: String,
    pub option_groups: Vec<AttributeGroup>,
    pub related: Vec<Product>,
    pub whatsapp_url: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Home page shelves, loaded concurrently
#[instrument(skip_all)]
pub async fn home(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<HomePage>, ApiError> {
    let api = SessionApi::open(&state, session)
        .await
        .map_err(shop_error_to_response)?;

    let (categories, new_arrivals, offers) =
        tokio::join!(api.home_categories(), api.new_arrivals(), api.offers());
    api.finish(Ok(())).await.map_err(shop_error_to_response)?;

    Ok(Json(HomePage {
        categories,
        new_arrivals,
        offers,
    }))
}

/// Category tree for the navigation menu
pub async fn categories(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<Category>>, ApiError> {
    let api = SessionApi::open(&state, session)
        .await
        .map_err(shop_error_to_response)?;
    let categories = api.categories().await;
    api.finish(Ok(())).await.map_err(shop_error_to_response)?;
    Ok(Json(categories))
}

/// Category listing with price and material filters.
///
/// Nested paths such as `aneis/formatura` list the last segment.
#[instrument(skip(state, session, params))]
pub async fn category(
    State(state): State<AppState>,
    session: Session,
    Path(slug): Path<String>,
    Query(params): Query<CategoryParams>,
) -> Result<Json<CategoryPage>, ApiError> {
    let leaf = slug
        .trim_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string();

    let filter = PriceFilter::from(params);
    let query = filter.apply(ProductQuery::new().category(leaf.clone()));

    let api = SessionApi::open(&state, session)
        .await
        .map_err(shop_error_to_response)?;
    let products = api.filtered_products(&query).await;
    api.finish(Ok(())).await.map_err(shop_error_to_response)?;

    Ok(Json(CategoryPage {
        title: category_title(&leaf),
        slug: leaf,
        filter,
        materials: MATERIALS,
        products,
    }))
}

/// Free text search; a blank term returns no results without calling the API
#[instrument(skip(state, session))]
pub async fn search(
    State(state): State<AppState>,
    session: Session,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchPage>, ApiError> {
    let term = params.q.trim().to_string();
    if term.is_empty() {
        return Ok(Json(SearchPage {
            term,
            products: Vec::new(),
        }));
    }

    let api = SessionApi::open(&state, session)
        .await
        .map_err(shop_error_to_response)?;
    let products = api.search_products(&term).await;
    api.finish(Ok(())).await.map_err(shop_error_to_response)?;

    info!("Search '{}' returned {} products", term, products.len());
    Ok(Json(SearchPage { term, products }))
}

/// Product detail.
///
/// Query parameters other than `engraving` are read as the shopper's
/// current option picks and folded into the WhatsApp inquiry link.
#[instrument(skip(state, session, params))]
pub async fn product(
    State(state): State<AppState>,
    session: Session,
    Path(product_id): Path<u64>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<ProductPage>, ApiError> {
    let api = SessionApi::open(&state, session)
        .await
        .map_err(shop_error_to_response)?;
    let (product, related) = tokio::join!(api.product(product_id), api.related_products(product_id));
    api.finish(Ok(())).await.map_err(shop_error_to_response)?;

    let product = product.ok_or_else(|| {
        shop_error_to_response(ShopError::ProductNotFound {
            product_id: product_id.to_string(),
        })
    })?;

    let engraving = params.get("engraving").map(String::as_str);
    let selected: SelectedOptions = params
        .iter()
        .filter(|(k, v)| k.as_str() != "engraving" && !v.trim().is_empty())
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    let whatsapp_url = whatsapp_inquiry_url(
        &state.config.whatsapp_number,
        &product.name,
        &selected,
        engraving,
    );

    Ok(Json(ProductPage {
        display_price: product.effective_price().display(),
        option_groups: product.grouped_attributes(),
        related,
        whatsapp_url,
        product,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_params_into_filter() {
        let filter = PriceFilter::from(CategoryParams {
            min_price: Some("100".into()),
            max_price: None,
            material: Some("Prata 925".into()),
        });
        assert_eq!(filter.material, vec!["Prata 925".to_string()]);

        let blank = PriceFilter::from(CategoryParams {
            material: Some(" ".into()),
            ..Default::default()
        });
        assert!(blank.material.is_empty());
    }
}
