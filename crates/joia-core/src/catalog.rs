//! # Catalog Types
//!
//! Products, categories and the filters the storefront applies to them.
//! Shapes follow the store API's JSON; the filtering helpers are the
//! linear filter/sort passes the listing screens run.

use crate::money::Price;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Materials offered in the category sidebar filter
pub const MATERIALS: &[&str] = &["Ouro 18k", "Prata 925", "Ouro Branco", "Ouro Rosé"];

/// A catalog category, possibly with nested subcategories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub parent: Option<u64>,
    #[serde(default)]
    pub show_on_home: bool,
    #[serde(default)]
    pub subcategories: Vec<Category>,
}

impl Category {
    /// Depth-first walk over this category and all of its descendants
    pub fn flatten(&self) -> Vec<&Category> {
        let mut out = vec![self];
        for child in &self.subcategories {
            out.extend(child.flatten());
        }
        out
    }

    /// Storefront path for the category
    pub fn path(&self) -> String {
        format!("/categoria/{}", self.slug)
    }
}

/// Image attached to a product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductImage {
    pub id: u64,
    pub image: String,
    #[serde(default)]
    pub is_cover: bool,
}

/// One selectable attribute value, e.g. `Material: Ouro 18k`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeValue {
    pub id: u64,
    #[serde(default)]
    pub attribute: Option<u64>,
    pub attribute_name: String,
    pub value: String,
}

/// Options offered under one attribute name
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeGroup {
    pub name: String,
    pub values: Vec<String>,
}

/// A product as served by `GET /products/`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    pub base_price: Price,
    #[serde(default)]
    pub promotional_price: Option<Price>,
    #[serde(default)]
    pub category: Option<u64>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub attributes: Vec<AttributeValue>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

impl Product {
    /// Cover image: the one flagged `is_cover`, else the first
    pub fn cover_image(&self) -> Option<&ProductImage> {
        self.images
            .iter()
            .find(|img| img.is_cover)
            .or_else(|| self.images.first())
    }

    /// Check if a positive promotional price is set
    pub fn is_on_offer(&self) -> bool {
        self.promotional_price.map(|p| !p.is_zero()).unwrap_or(false)
    }

    /// Price the shopper pays
    pub fn effective_price(&self) -> Price {
        match self.promotional_price {
            Some(promo) if !promo.is_zero() => promo,
            _ => self.base_price,
        }
    }

    /// Attribute values grouped by attribute name, first-seen order kept
    pub fn grouped_attributes(&self) -> Vec<AttributeGroup> {
        let mut groups: Vec<AttributeGroup> = Vec::new();
        for attr in &self.attributes {
            match groups.iter_mut().find(|g| g.name == attr.attribute_name) {
                Some(group) => group.values.push(attr.value.clone()),
                None => groups.push(AttributeGroup {
                    name: attr.attribute_name.clone(),
                    values: vec![attr.value.clone()],
                }),
            }
        }
        groups
    }

    /// Storefront path for the product page
    pub fn path(&self) -> String {
        format!("/produto/{}/{}", self.id, self.slug)
    }
}

/// Sidebar filter form on a category page.
///
/// Blank inputs mean "no bound".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceFilter {
    #[serde(default)]
    pub min_price: Option<String>,
    #[serde(default)]
    pub max_price: Option<String>,
    #[serde(default)]
    pub material: Vec<String>,
}

impl PriceFilter {
    fn bound(raw: &Option<String>) -> Option<&str> {
        raw.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Apply this filter to a category query
    pub fn apply(&self, query: ProductQuery) -> ProductQuery {
        let mut query = query;
        if let Some(min) = Self::bound(&self.min_price) {
            query = query.min_price(min);
        }
        if let Some(max) = Self::bound(&self.max_price) {
            query = query.max_price(max);
        }
        // The API filters a single attribute value; the first selection wins.
        if let Some(material) = self.material.first() {
            query = query.material(material.clone());
        }
        query
    }
}

/// Query string builder for `GET /products/`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    params: Vec<(&'static str, String)>,
}

impl ProductQuery {
    pub fn new() -> Self {
        Self::default()
    }

    fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.params.retain(|(k, _)| *k != key);
        self.params.push((key, value.into()));
        self
    }

    /// Restrict to a category slug
    pub fn category(self, slug: impl Into<String>) -> Self {
        self.with("category__slug", slug)
    }

    /// Strict lower bound on the base price
    pub fn min_price(self, min: impl Into<String>) -> Self {
        self.with("base_price__gt", min)
    }

    /// Strict upper bound on the base price
    pub fn max_price(self, max: impl Into<String>) -> Self {
        self.with("base_price__lt", max)
    }

    /// Attribute value match
    pub fn material(self, value: impl Into<String>) -> Self {
        self.with("attributes__value", value)
    }

    /// Free text search
    pub fn search(self, term: impl Into<String>) -> Self {
        self.with("search", term)
    }

    /// Ordering expression, e.g. `-id`
    pub fn ordering(self, ordering: impl Into<String>) -> Self {
        self.with("ordering", ordering)
    }

    /// Only categories flagged for the home page
    pub fn show_on_home(self) -> Self {
        self.with("show_on_home", "true")
    }

    /// Query pairs in insertion order
    pub fn pairs(&self) -> &[(&'static str, String)] {
        &self.params
    }

    /// Check if no parameter is set
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

/// Products with a positive promotional price
pub fn filter_offers(products: Vec<Product>) -> Vec<Product> {
    products.into_iter().filter(Product::is_on_offer).collect()
}

/// Newest first (highest id first)
pub fn sort_newest_first(products: &mut [Product]) {
    products.sort_by(|a, b| b.id.cmp(&a.id));
}

/// Case-insensitive name match, as the admin product table does
pub fn search_by_name<'a>(products: &'a [Product], term: &str) -> Vec<&'a Product> {
    let needle = term.trim().to_lowercase();
    products
        .iter()
        .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle))
        .collect()
}

/// Page title derived from a category slug: `aneis-de-formatura` → `Aneis De Formatura`
pub fn category_title(slug: &str) -> String {
    if slug.trim().is_empty() {
        return "Categoria".to_string();
    }
    slug.split('-')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_product() -> Product {
        serde_json::from_value(json!({
            "id": 7,
            "name": "Anel Solitário",
            "slug": "anel-solitario",
            "description": "Ouro 18k com diamante",
            "base_price": "1599.90",
            "promotional_price": null,
            "category": 2,
            "category_name": "Anéis",
            "images": [
                {"id": 1, "image": "/media/a.jpg", "is_cover": false},
                {"id": 2, "image": "/media/b.jpg", "is_cover": true}
            ],
            "attributes": [
                {"id": 10, "attribute": 1, "attribute_name": "Material", "value": "Ouro 18k"},
                {"id": 11, "attribute": 2, "attribute_name": "Aro", "value": "14"},
                {"id": 12, "attribute": 1, "attribute_name": "Material", "value": "Ouro Branco"},
                {"id": 13, "attribute": 2, "attribute_name": "Aro", "value": "16"}
            ],
            "is_active": true,
            "is_featured": false
        }))
        .unwrap()
    }

    #[test]
    fn test_product_from_api_json() {
        let product = sample_product();
        assert_eq!(product.base_price.cents(), 159990);
        assert_eq!(product.path(), "/produto/7/anel-solitario");
        assert_eq!(product.cover_image().unwrap().id, 2);
        assert!(!product.is_on_offer());
        assert_eq!(product.effective_price(), product.base_price);
    }

    #[test]
    fn test_cover_falls_back_to_first_image() {
        let mut product = sample_product();
        for img in &mut product.images {
            img.is_cover = false;
        }
        assert_eq!(product.cover_image().unwrap().id, 1);

        product.images.clear();
        assert!(product.cover_image().is_none());
    }

    #[test]
    fn test_grouped_attributes_keep_first_seen_order() {
        let groups = sample_product().grouped_attributes();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].name, "Material");
        assert_eq!(groups[0].values, vec!["Ouro 18k", "Ouro Branco"]);
        assert_eq!(groups[1].name, "Aro");
        assert_eq!(groups[1].values, vec!["14", "16"]);
    }

    #[test]
    fn test_offers_and_effective_price() {
        let mut promo = sample_product();
        promo.id = 8;
        promo.promotional_price = Some(Price::parse("999.00").unwrap());

        let mut zero_promo = sample_product();
        zero_promo.id = 9;
        zero_promo.promotional_price = Some(Price::ZERO);

        assert_eq!(promo.effective_price().cents(), 99900);
        assert_eq!(zero_promo.effective_price(), zero_promo.base_price);

        let offers = filter_offers(vec![sample_product(), promo, zero_promo]);
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].id, 8);
    }

    #[test]
    fn test_sort_and_search() {
        let mut a = sample_product();
        a.id = 1;
        a.name = "Colar Pérola".into();
        let mut b = sample_product();
        b.id = 3;
        let mut products = vec![a, b];

        sort_newest_first(&mut products);
        assert_eq!(products[0].id, 3);

        let hits = search_by_name(&products, "COLAR");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);
        assert_eq!(search_by_name(&products, "  ").len(), 2);
    }

    #[test]
    fn test_price_filter_builds_category_query() {
        let filter = PriceFilter {
            min_price: Some("100".into()),
            max_price: Some(" ".into()),
            material: vec!["Prata 925".into(), "Ouro 18k".into()],
        };
        let query = filter.apply(ProductQuery::new().category("aneis"));
        assert_eq!(
            query.pairs(),
            &[
                ("category__slug", "aneis".to_string()),
                ("base_price__gt", "100".to_string()),
                ("attributes__value", "Prata 925".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_replaces_duplicate_keys() {
        let query = ProductQuery::new().search("ouro").search("prata");
        assert_eq!(query.pairs(), &[("search", "prata".to_string())]);
    }

    #[test]
    fn test_category_title() {
        assert_eq!(category_title("aneis-de-formatura"), "Aneis De Formatura");
        assert_eq!(category_title("colares"), "Colares");
        assert_eq!(category_title(""), "Categoria");
    }

    #[test]
    fn test_category_flatten() {
        let tree: Category = serde_json::from_value(json!({
            "id": 1, "name": "Anéis", "slug": "aneis", "show_on_home": true,
            "subcategories": [
                {"id": 2, "name": "Solitários", "slug": "solitarios", "parent": 1,
                 "subcategories": [{"id": 4, "name": "Noivado", "slug": "noivado", "parent": 2}]},
                {"id": 3, "name": "Formatura", "slug": "formatura", "parent": 1}
            ]
        }))
        .unwrap();

        let slugs: Vec<_> = tree.flatten().iter().map(|c| c.slug.as_str()).collect();
        assert_eq!(slugs, vec!["aneis", "solitarios", "noivado", "formatura"]);
        assert_eq!(tree.path(), "/categoria/aneis");
    }
}
