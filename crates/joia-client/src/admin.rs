//! # Admin Catalog Writes
//!
//! Product create/update/delete for the admin panel. Unlike the storefront
//! reads these propagate every error so the form can show it.

use crate::http::{ApiClient, FormPart};
use joia_core::{Price, Product, ShopError, ShopResult};
use tracing::{info, instrument};

/// Multipart field carrying new product images
pub const IMAGE_FIELD: &str = "uploaded_images";

/// An image file picked in the product form
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Admin product form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductForm {
    pub name: String,
    pub description: String,
    pub base_price: String,
    pub promotional_price: Option<String>,
    pub category: Option<u64>,
    pub images: Vec<ImageUpload>,
}

impl ProductForm {
    /// Check the form before it is sent
    pub fn validate(&self) -> ShopResult<()> {
        if self.name.trim().is_empty() {
            return Err(ShopError::validation("name", "Informe o nome do produto."));
        }
        Price::parse(&self.base_price)?;
        if let Some(promo) = self.promo() {
            Price::parse(promo)?;
        }
        Ok(())
    }

    fn promo(&self) -> Option<&str> {
        self.promotional_price
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
    }

    /// Multipart fields; empty optional fields are left out
    pub fn to_parts(&self) -> ShopResult<Vec<FormPart>> {
        self.validate()?;

        let mut parts = vec![
            FormPart::text("name", self.name.trim()),
            FormPart::text("description", self.description.clone()),
            FormPart::text("base_price", Price::parse(&self.base_price)?.to_decimal_string()),
        ];
        if let Some(promo) = self.promo() {
            parts.push(FormPart::text(
                "promotional_price",
                Price::parse(promo)?.to_decimal_string(),
            ));
        }
        if let Some(category) = self.category {
            parts.push(FormPart::text("category", category.to_string()));
        }
        for image in &self.images {
            parts.push(FormPart::file(
                IMAGE_FIELD,
                image.file_name.clone(),
                image.content_type.clone(),
                image.bytes.clone(),
            ));
        }
        Ok(parts)
    }
}

impl ApiClient {
    /// `POST /products/`
    #[instrument(skip(self, form), fields(name = %form.name))]
    pub async fn create_product(&self, form: &ProductForm) -> ShopResult<Product> {
        let product: Product = self.post_multipart("/products/", form.to_parts()?).await?;
        info!("Created product {}", product.id);
        Ok(product)
    }

    /// `PATCH /products/{id}/`
    #[instrument(skip(self, form))]
    pub async fn update_product(&self, id: u64, form: &ProductForm) -> ShopResult<Product> {
        let product: Product = self
            .patch_multipart(&format!("/products/{}/", id), form.to_parts()?)
            .await?;
        info!("Updated product {}", id);
        Ok(product)
    }

    /// `DELETE /products/{id}/`
    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: u64) -> ShopResult<()> {
        self.delete(&format!("/products/{}/", id)).await?;
        info!("Deleted product {}", id);
        Ok(())
    }

    /// `DELETE /product-images/{id}/`
    #[instrument(skip(self))]
    pub async fn delete_product_image(&self, image_id: u64) -> ShopResult<()> {
        self.delete(&format!("/product-images/{}/", image_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> ProductForm {
        ProductForm {
            name: " Anel Solitário ".into(),
            description: "Ouro 18k".into(),
            base_price: "1599,9".into(),
            promotional_price: Some("  ".into()),
            category: Some(2),
            images: vec![ImageUpload {
                file_name: "anel.jpg".into(),
                content_type: "image/jpeg".into(),
                bytes: vec![0xFF, 0xD8],
            }],
        }
    }

    #[test]
    fn test_parts_normalize_prices_and_skip_blanks() {
        let parts = form().to_parts().unwrap();
        let names: Vec<&str> = parts.iter().map(FormPart::name).collect();
        assert_eq!(
            names,
            vec!["name", "description", "base_price", "category", "uploaded_images"]
        );
        assert_eq!(parts[0], FormPart::text("name", "Anel Solitário"));
        assert_eq!(parts[2], FormPart::text("base_price", "1599.90"));
    }

    #[test]
    fn test_invalid_price_rejected() {
        let mut f = form();
        f.base_price = "abc".into();
        assert!(f.to_parts().is_err());

        let mut f = form();
        f.name.clear();
        assert_eq!(f.validate().unwrap_err().status_code(), 422);
    }
}
