//! Conjunctive list filters.
//!
//! Stores narrow results with the equality parts of a filter; [`refine`]
//! then re-applies the whole filter, including free-text search and the
//! result limit, to an already materialised sequence. Refining never
//! reorders, so whatever stable order the store returned is kept.

use serde::{Deserialize, Deserializer};
use utoipa::IntoParams;
use uuid::Uuid;

use super::order::{Order, OrderStatus};
use super::product::Product;
use super::shop::Shop;

pub trait Filter<T> {
    fn matches(&self, item: &T) -> bool;
    fn limit(&self) -> Option<usize>;
}

/// Keeps the items matching `filter`, in their given order, up to its limit.
pub fn refine<T, F: Filter<T>>(filter: &F, items: Vec<T>) -> Vec<T> {
    let matching = items.into_iter().filter(|item| filter.matches(item));
    match filter.limit() {
        Some(limit) => matching.take(limit).collect(),
        None => matching.collect(),
    }
}

/// The "All" pseudo-value and blank strings mean "no constraint".
pub fn constraint(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

fn equals(wanted: &Option<String>, actual: &str) -> bool {
    constraint(wanted).map_or(true, |wanted| wanted == actual)
}

fn contains_any(needle: &Option<String>, haystacks: &[&str]) -> bool {
    let Some(needle) = constraint(needle) else {
        return true;
    };
    let needle = needle.to_lowercase();
    haystacks
        .iter()
        .any(|haystack| haystack.to_lowercase().contains(&needle))
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ShopFilter {
    pub category: Option<String>,
    pub city: Option<String>,
    pub featured: Option<bool>,
    pub verified: Option<bool>,
    /// Case-insensitive match on name or description.
    pub search: Option<String>,
    pub limit: Option<usize>,
}

impl Filter<Shop> for ShopFilter {
    fn matches(&self, shop: &Shop) -> bool {
        equals(&self.category, &shop.category)
            && equals(&self.city, &shop.city)
            && self.featured.map_or(true, |f| shop.is_featured == f)
            && self.verified.map_or(true, |v| shop.is_verified == v)
            && contains_any(&self.search, &[shop.name.as_str(), shop.description.as_str()])
    }

    fn limit(&self) -> Option<usize> {
        self.limit
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ProductFilter {
    pub shop_id: Option<Uuid>,
    pub category: Option<String>,
    pub available: Option<bool>,
    /// Case-insensitive match on name or description.
    pub search: Option<String>,
    pub limit: Option<usize>,
}

impl ProductFilter {
    pub fn for_shop(shop_id: Uuid) -> Self {
        ProductFilter {
            shop_id: Some(shop_id),
            ..Default::default()
        }
    }
}

impl Filter<Product> for ProductFilter {
    fn matches(&self, product: &Product) -> bool {
        self.shop_id.map_or(true, |id| product.shop_id == id)
            && equals(&self.category, &product.category)
            && self.available.map_or(true, |a| product.is_available == a)
            && contains_any(&self.search, &[product.name.as_str(), product.description.as_str()])
    }

    fn limit(&self) -> Option<usize> {
        self.limit
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct OrderFilter {
    pub shop_id: Option<Uuid>,
    /// Any case; "All" or blank means every status.
    #[serde(default, deserialize_with = "status_constraint")]
    #[param(value_type = Option<String>)]
    pub status: Option<OrderStatus>,
    pub customer_phone: Option<String>,
    /// Case-insensitive match on order id, product name or customer name.
    pub search: Option<String>,
    pub limit: Option<usize>,
}

fn status_constraint<'de, D>(deserializer: D) -> Result<Option<OrderStatus>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    constraint(&raw)
        .map(str::parse)
        .transpose()
        .map_err(serde::de::Error::custom)
}

impl OrderFilter {
    pub fn for_shop(shop_id: Uuid) -> Self {
        OrderFilter {
            shop_id: Some(shop_id),
            ..Default::default()
        }
    }
}

impl Filter<Order> for OrderFilter {
    fn matches(&self, order: &Order) -> bool {
        self.shop_id.map_or(true, |id| order.shop_id == id)
            && self.status.map_or(true, |s| order.status == s)
            && equals(&self.customer_phone, &order.customer.phone)
            && contains_any(
                &self.search,
                &[
                    order.id.to_string().as_str(),
                    order.product_name.as_str(),
                    order.customer.name.as_str(),
                ],
            )
    }

    fn limit(&self) -> Option<usize> {
        self.limit
    }
}
