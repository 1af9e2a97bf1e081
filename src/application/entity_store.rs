use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use super::catalog;
use super::live::{ChangeFeed, Collection};
use crate::domain::errors::{DomainError, EntityKind};
use crate::domain::filter::{OrderFilter, ProductFilter, ShopFilter};
use crate::domain::order::{NewOrder, Order, OrderPatch, OrderTransition};
use crate::domain::ports::Store;
use crate::domain::product::{NewProduct, Product, ProductPatch};
use crate::domain::shop::{NewShop, Shop, ShopPatch};
use crate::domain::story::Story;
use crate::domain::user::UserProfile;

/// Typed CRUD over the marketplace collections. The only component that
/// talks to the store; every write is stamped here and published to live
/// subscribers.
#[derive(Clone)]
pub struct EntityStore {
    repo: Arc<dyn Store>,
    feed: Arc<ChangeFeed>,
}

impl EntityStore {
    pub fn new(repo: Arc<dyn Store>, feed: Arc<ChangeFeed>) -> Self {
        Self { repo, feed }
    }

    // ── Shops ──────────────────────────────────────────────────────────────

    pub fn create_shop(&self, owner_id: &str, data: NewShop) -> Result<Shop, DomainError> {
        let shop = data.into_shop(owner_id, Utc::now())?;
        self.repo.insert_shop(&shop)?;
        log::info!("shop {} created for user {owner_id}", shop.id);
        self.feed.publish(Collection::Shops);
        Ok(shop)
    }

    pub fn get_shop_by_id(&self, id: Uuid) -> Result<Option<Shop>, DomainError> {
        self.repo.find_shop(id)
    }

    pub fn get_shop_by_owner(&self, owner_id: &str) -> Result<Option<Shop>, DomainError> {
        self.repo.find_shop_by_owner(owner_id)
    }

    pub fn list_shops(&self, filter: &ShopFilter) -> Result<Vec<Shop>, DomainError> {
        self.repo.list_shops(filter)
    }

    pub fn update_shop(&self, id: Uuid, patch: ShopPatch) -> Result<Shop, DomainError> {
        let mut shop = self.require_shop(id)?;
        patch.apply(&mut shop)?;
        shop.updated_at = Utc::now();
        if !self.repo.save_shop(&shop)? {
            return Err(DomainError::not_found(EntityKind::Shop, id));
        }
        self.feed.publish(Collection::Shops);
        Ok(shop)
    }

    pub(crate) fn require_shop(&self, id: Uuid) -> Result<Shop, DomainError> {
        self.get_shop_by_id(id)?
            .ok_or_else(|| DomainError::not_found(EntityKind::Shop, id))
    }

    // ── Products ───────────────────────────────────────────────────────────

    pub fn create_product(&self, data: NewProduct) -> Result<Product, DomainError> {
        let shop = self.require_shop(data.shop_id)?;
        let now = Utc::now();
        let product = data.into_product(&shop, now)?;
        self.repo.insert_product(&product)?;
        let counted = catalog::product_created(self.repo.as_ref(), &product, now);
        self.feed.publish(Collection::Products);
        self.feed.publish(Collection::Shops);
        counted?;
        Ok(product)
    }

    /// Plain read, no side effects.
    pub fn get_product_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        self.repo.find_product(id)
    }

    /// Read for a product detail page: also counts the view, best effort and
    /// off the read path. The returned product shows the count from before
    /// this view.
    pub fn view_product(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        let product = self.repo.find_product(id)?;
        if product.is_some() {
            catalog::product_viewed(Arc::clone(&self.repo), id);
        }
        Ok(product)
    }

    pub fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, DomainError> {
        self.repo.list_products(filter)
    }

    pub fn update_product(&self, id: Uuid, patch: ProductPatch) -> Result<Product, DomainError> {
        let mut product = self.require_product(id)?;
        patch.apply(&mut product)?;
        catalog::before_product_saved(&mut product);
        product.updated_at = Utc::now();
        if !self.repo.save_product(&product)? {
            return Err(DomainError::not_found(EntityKind::Product, id));
        }
        self.feed.publish(Collection::Products);
        Ok(product)
    }

    pub fn delete_product(&self, id: Uuid) -> Result<Product, DomainError> {
        let product = self
            .repo
            .delete_product(id)?
            .ok_or_else(|| DomainError::not_found(EntityKind::Product, id))?;
        log::info!("product {id} deleted from shop {}", product.shop_id);
        let counted = catalog::product_deleted(self.repo.as_ref(), &product, Utc::now());
        self.feed.publish(Collection::Products);
        self.feed.publish(Collection::Shops);
        counted?;
        Ok(product)
    }

    pub(crate) fn require_product(&self, id: Uuid) -> Result<Product, DomainError> {
        self.get_product_by_id(id)?
            .ok_or_else(|| DomainError::not_found(EntityKind::Product, id))
    }

    // ── Orders ─────────────────────────────────────────────────────────────

    /// Checkout. Stock is checked, not taken: it only moves again if the
    /// order is cancelled before shipping.
    pub fn create_order(&self, data: NewOrder) -> Result<Order, DomainError> {
        let product = self.require_product(data.product_id)?;
        let order = data.into_order(&product, Utc::now())?;
        self.repo.insert_order(&order)?;
        log::info!(
            "order {} placed for product {} (qty {}, amount {})",
            order.id,
            order.product_id,
            order.quantity,
            order.amount
        );
        self.feed.publish(Collection::Orders);
        Ok(order)
    }

    pub fn get_order_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        self.repo.find_order(id)
    }

    pub fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, DomainError> {
        self.repo.list_orders(filter)
    }

    pub fn update_order(&self, id: Uuid, patch: OrderPatch) -> Result<Order, DomainError> {
        let mut order = self.require_order(id)?;
        patch.apply(&mut order);
        order.updated_at = Utc::now();
        if !self.repo.save_order(&order)? {
            return Err(DomainError::not_found(EntityKind::Order, id));
        }
        self.feed.publish(Collection::Orders);
        Ok(order)
    }

    pub(crate) fn require_order(&self, id: Uuid) -> Result<Order, DomainError> {
        self.get_order_by_id(id)?
            .ok_or_else(|| DomainError::not_found(EntityKind::Order, id))
    }

    pub(crate) fn commit_transition(
        &self,
        transition: &OrderTransition,
    ) -> Result<Option<Order>, DomainError> {
        let committed = self.repo.commit_transition(transition)?;
        if committed.is_some() {
            self.feed.publish(Collection::Orders);
            if transition.completed_sale.is_some() {
                self.feed.publish(Collection::Shops);
            }
            if transition.completed_sale.is_some() || transition.restore_stock.is_some() {
                self.feed.publish(Collection::Products);
            }
        }
        Ok(committed)
    }

    // ── Stories ────────────────────────────────────────────────────────────

    pub fn create_story(&self, story: &Story) -> Result<(), DomainError> {
        self.repo.insert_story(story)
    }

    pub fn list_stories(&self, limit: Option<usize>) -> Result<Vec<Story>, DomainError> {
        self.repo.list_stories(limit)
    }

    // ── User profiles ──────────────────────────────────────────────────────

    pub fn get_profile(&self, uid: &str) -> Result<Option<UserProfile>, DomainError> {
        self.repo.find_profile(uid)
    }

    pub(crate) fn insert_profile(&self, profile: &UserProfile) -> Result<bool, DomainError> {
        self.repo.insert_profile(profile)
    }

    pub(crate) fn save_profile(&self, profile: &UserProfile) -> Result<(), DomainError> {
        if !self.repo.save_profile(profile)? {
            return Err(DomainError::not_found(EntityKind::UserProfile, &profile.uid));
        }
        Ok(())
    }

    pub(crate) fn feed(&self) -> &Arc<ChangeFeed> {
        &self.feed
    }
}
