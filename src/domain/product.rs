use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;
use super::shop::Shop;
use super::validation::{self, required};

/// Stock at or below this level counts as low in product stats.
pub const LOW_STOCK_THRESHOLD: i32 = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: i64,
    /// Pre-sale price, shown struck through. Always above `price`.
    pub original_price: Option<i64>,
    pub stock: i32,
    pub category: String,
    pub image: String,
    pub images: Vec<String>,
    pub features: Vec<String>,
    pub shop_id: Uuid,
    /// Shop name when the product was listed. Not a live join.
    pub shop_name: String,
    /// Derived from `stock`; never taken from callers.
    pub is_available: bool,
    pub views: i32,
    pub orders: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Re-derives `is_available` from `stock`.
    pub fn derive_availability(&mut self) {
        self.is_available = self.stock > 0;
    }

    pub fn is_low_stock(&self) -> bool {
        self.stock <= LOW_STOCK_THRESHOLD
    }

    fn validate(&self) -> Result<(), DomainError> {
        required("name", &self.name)?;
        required("category", &self.category)?;
        validation::price("price", self.price)?;
        validation::stock(self.stock)?;
        if let Some(original) = self.original_price {
            if original <= self.price {
                return Err(DomainError::validation(
                    "originalPrice",
                    "must be above the sale price",
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub shop_id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: i64,
    #[serde(default)]
    pub original_price: Option<i64>,
    pub stock: i32,
    pub category: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    /// Ignored: availability follows stock.
    #[serde(default)]
    pub is_available: Option<bool>,
}

impl NewProduct {
    pub fn into_product(self, shop: &Shop, now: DateTime<Utc>) -> Result<Product, DomainError> {
        let mut product = Product {
            id: Uuid::new_v4(),
            name: self.name,
            description: self.description,
            price: self.price,
            original_price: self.original_price,
            stock: self.stock,
            category: self.category,
            image: self.image,
            images: self.images,
            features: self.features,
            shop_id: shop.id,
            shop_name: shop.name.clone(),
            is_available: false,
            views: 0,
            orders: 0,
            created_at: now,
            updated_at: now,
        };
        product.validate()?;
        product.derive_availability();
        Ok(product)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    /// Absent leaves the list price alone; `null` clears it.
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<i64>)]
    pub original_price: Option<Option<i64>>,
    pub stock: Option<i32>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub images: Option<Vec<String>>,
    pub features: Option<Vec<String>>,
    /// Overridden by the stock-derived value.
    pub is_available: Option<bool>,
}

/// Tells a field sent as `null` apart from one left out.
fn present<'de, D>(deserializer: D) -> Result<Option<Option<i64>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<i64>::deserialize(deserializer).map(Some)
}

impl ProductPatch {
    /// Merges the patch and re-validates. Availability is left for the
    /// catalog rules to derive.
    pub fn apply(self, product: &mut Product) -> Result<(), DomainError> {
        if let Some(name) = self.name {
            product.name = name;
        }
        if let Some(description) = self.description {
            product.description = description;
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(original_price) = self.original_price {
            product.original_price = original_price;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(category) = self.category {
            product.category = category;
        }
        if let Some(image) = self.image {
            product.image = image;
        }
        if let Some(images) = self.images {
            product.images = images;
        }
        if let Some(features) = self.features {
            product.features = features;
        }
        if let Some(is_available) = self.is_available {
            product.is_available = is_available;
        }
        product.validate()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::shop::tests::sample_shop;

    pub(crate) fn sample_product(stock: i32, price: i64) -> Product {
        NewProduct {
            shop_id: Uuid::nil(),
            name: "Embroidered kurta".to_string(),
            description: "Hand-stitched cotton".to_string(),
            price,
            original_price: None,
            stock,
            category: "Kurtas".to_string(),
            image: "https://img.example/kurta.jpg".to_string(),
            images: vec![],
            features: vec![],
            is_available: None,
        }
        .into_product(&sample_shop(), Utc::now())
        .expect("valid product")
    }

    #[test]
    fn new_product_starts_with_zero_counters() {
        let product = sample_product(4, 1500);
        assert_eq!(product.views, 0);
        assert_eq!(product.orders, 0);
        assert!(product.is_available);
    }

    #[test]
    fn out_of_stock_product_is_unavailable() {
        assert!(!sample_product(0, 1500).is_available);
    }

    #[test]
    fn non_positive_price_is_rejected() {
        let shop = sample_shop();
        let result = NewProduct {
            shop_id: shop.id,
            name: "Shawl".to_string(),
            description: String::new(),
            price: 0,
            original_price: None,
            stock: 1,
            category: "Shawls".to_string(),
            image: String::new(),
            images: vec![],
            features: vec![],
            is_available: None,
        }
        .into_product(&shop, Utc::now());
        assert!(matches!(result, Err(DomainError::Validation { field: "price", .. })));
    }

    #[test]
    fn patch_rejects_negative_stock() {
        let mut product = sample_product(3, 100);
        let patch = ProductPatch {
            stock: Some(-1),
            ..Default::default()
        };
        assert!(matches!(
            patch.apply(&mut product),
            Err(DomainError::Validation { field: "stock", .. })
        ));
    }

    #[test]
    fn original_price_must_exceed_price() {
        let mut product = sample_product(3, 100);
        let patch = ProductPatch {
            original_price: Some(Some(80)),
            ..Default::default()
        };
        assert!(patch.apply(&mut product).is_err());
    }

    #[test]
    fn null_original_price_clears_the_sale() {
        let mut product = sample_product(3, 100);
        product.original_price = Some(150);

        let raise: ProductPatch =
            serde_json::from_value(serde_json::json!({ "price": 200 })).unwrap();
        assert!(raise.apply(&mut product.clone()).is_err());

        let raise_and_clear: ProductPatch =
            serde_json::from_value(serde_json::json!({ "price": 200, "originalPrice": null }))
                .unwrap();
        raise_and_clear.apply(&mut product).unwrap();
        assert_eq!(product.price, 200);
        assert_eq!(product.original_price, None);
    }

    #[test]
    fn low_stock_includes_threshold() {
        assert!(sample_product(5, 100).is_low_stock());
        assert!(!sample_product(6, 100).is_low_stock());
    }
}
