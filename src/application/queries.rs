use uuid::Uuid;

use super::entity_store::EntityStore;
use super::live::{Collection, Subscription};
use crate::domain::errors::DomainError;
use crate::domain::filter::{refine, OrderFilter, ProductFilter, ShopFilter};
use crate::domain::order::Order;
use crate::domain::product::Product;
use crate::domain::shop::Shop;
use crate::domain::stats::{OrderStats, ProductStats};
use crate::domain::story::Story;

/// How many related products a product page shows by default.
pub const RELATED_PRODUCTS_LIMIT: usize = 4;

/// Filtered views and statistics. Every result is recomputed from the
/// current collection contents; nothing is maintained incrementally.
#[derive(Clone)]
pub struct QueryService {
    entities: EntityStore,
}

impl QueryService {
    pub fn new(entities: EntityStore) -> Self {
        Self { entities }
    }

    pub fn list_shops(&self, filter: &ShopFilter) -> Result<Vec<Shop>, DomainError> {
        Ok(refine(filter, self.entities.list_shops(filter)?))
    }

    pub fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, DomainError> {
        Ok(refine(filter, self.entities.list_products(filter)?))
    }

    pub fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, DomainError> {
        Ok(refine(filter, self.entities.list_orders(filter)?))
    }

    /// A customer's order history, newest first.
    pub fn list_orders_by_customer(&self, phone: &str) -> Result<Vec<Order>, DomainError> {
        self.list_orders(&OrderFilter {
            customer_phone: Some(phone.to_string()),
            ..Default::default()
        })
    }

    /// Other available products from the same shop.
    pub fn related_products(
        &self,
        shop_id: Uuid,
        exclude: Uuid,
        limit: Option<usize>,
    ) -> Result<Vec<Product>, DomainError> {
        let filter = ProductFilter {
            shop_id: Some(shop_id),
            available: Some(true),
            ..Default::default()
        };
        Ok(self
            .list_products(&filter)?
            .into_iter()
            .filter(|p| p.id != exclude)
            .take(limit.unwrap_or(RELATED_PRODUCTS_LIMIT))
            .collect())
    }

    pub fn get_order_stats(&self, shop_id: Uuid) -> Result<OrderStats, DomainError> {
        self.entities.require_shop(shop_id)?;
        let orders = self.list_orders(&OrderFilter::for_shop(shop_id))?;
        Ok(OrderStats::from_orders(&orders))
    }

    pub fn get_product_stats(&self, shop_id: Uuid) -> Result<ProductStats, DomainError> {
        self.entities.require_shop(shop_id)?;
        let products = self.list_products(&ProductFilter::for_shop(shop_id))?;
        Ok(ProductStats::from_products(&products))
    }

    pub fn list_stories(&self, limit: Option<usize>) -> Result<Vec<Story>, DomainError> {
        self.entities.list_stories(limit)
    }

    pub fn featured_story(&self) -> Result<Option<Story>, DomainError> {
        Ok(self.entities.list_stories(Some(1))?.into_iter().next())
    }

    // ── Live views ─────────────────────────────────────────────────────────

    // Each subscription is a task on the Tokio runtime it was opened from.
    // Callbacks run on the blocking pool, never on the writer's thread.

    pub fn subscribe_shops(
        &self,
        filter: ShopFilter,
        on_change: impl Fn(Result<Vec<Shop>, DomainError>) + Send + Sync + 'static,
    ) -> Subscription {
        let queries = self.clone();
        self.subscribe(Collection::Shops, move || {
            on_change(queries.list_shops(&filter))
        })
    }

    pub fn subscribe_products(
        &self,
        filter: ProductFilter,
        on_change: impl Fn(Result<Vec<Product>, DomainError>) + Send + Sync + 'static,
    ) -> Subscription {
        let queries = self.clone();
        self.subscribe(Collection::Products, move || {
            on_change(queries.list_products(&filter))
        })
    }

    pub fn subscribe_orders(
        &self,
        filter: OrderFilter,
        on_change: impl Fn(Result<Vec<Order>, DomainError>) + Send + Sync + 'static,
    ) -> Subscription {
        let queries = self.clone();
        self.subscribe(Collection::Orders, move || {
            on_change(queries.list_orders(&filter))
        })
    }

    /// Order stats for a shop, re-derived from the full order set on every
    /// change.
    pub fn subscribe_order_stats(
        &self,
        shop_id: Uuid,
        on_change: impl Fn(Result<OrderStats, DomainError>) + Send + Sync + 'static,
    ) -> Subscription {
        let queries = self.clone();
        self.subscribe(Collection::Orders, move || {
            on_change(queries.get_order_stats(shop_id))
        })
    }

    fn subscribe(
        &self,
        collection: Collection,
        listener: impl Fn() + Send + Sync + 'static,
    ) -> Subscription {
        self.entities.feed().register(collection, listener)
    }
}
