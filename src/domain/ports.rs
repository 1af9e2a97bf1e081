//! Persistence ports. Adapters return records in a stable order: creation
//! time descending for shops, products and orders, display order ascending
//! for stories.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;
use super::filter::{OrderFilter, ProductFilter, ShopFilter};
use super::order::{Order, OrderTransition};
use super::product::Product;
use super::shop::Shop;
use super::story::Story;
use super::user::UserProfile;

pub trait ShopRepository: Send + Sync + 'static {
    fn insert_shop(&self, shop: &Shop) -> Result<(), DomainError>;
    fn find_shop(&self, id: Uuid) -> Result<Option<Shop>, DomainError>;
    fn find_shop_by_owner(&self, owner_id: &str) -> Result<Option<Shop>, DomainError>;
    /// Applies the equality parts of `filter`; search and limit are left to
    /// the caller.
    fn list_shops(&self, filter: &ShopFilter) -> Result<Vec<Shop>, DomainError>;
    /// Replaces the editable fields. Returns false when the shop is gone.
    fn save_shop(&self, shop: &Shop) -> Result<bool, DomainError>;
    /// Adds `delta` to `products_count`, never going below zero.
    fn adjust_products_count(
        &self,
        id: Uuid,
        delta: i32,
        at: DateTime<Utc>,
    ) -> Result<bool, DomainError>;
}

pub trait ProductRepository: Send + Sync + 'static {
    fn insert_product(&self, product: &Product) -> Result<(), DomainError>;
    fn find_product(&self, id: Uuid) -> Result<Option<Product>, DomainError>;
    /// Applies the equality parts of `filter`.
    fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, DomainError>;
    fn save_product(&self, product: &Product) -> Result<bool, DomainError>;
    fn delete_product(&self, id: Uuid) -> Result<Option<Product>, DomainError>;
    fn increment_views(&self, id: Uuid) -> Result<bool, DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    fn insert_order(&self, order: &Order) -> Result<(), DomainError>;
    fn find_order(&self, id: Uuid) -> Result<Option<Order>, DomainError>;
    /// Applies the equality parts of `filter`.
    fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, DomainError>;
    /// Saves notes and `updated_at`. Status and amount are never written here.
    fn save_order(&self, order: &Order) -> Result<bool, DomainError>;
    /// Moves the order from `transition.from` to `transition.to` and applies
    /// the planned counter and stock updates, all or nothing. Returns `None`
    /// without writing anything if the order is missing or no longer in
    /// `transition.from`.
    fn commit_transition(&self, transition: &OrderTransition) -> Result<Option<Order>, DomainError>;
}

pub trait StoryRepository: Send + Sync + 'static {
    fn insert_story(&self, story: &Story) -> Result<(), DomainError>;
    fn list_stories(&self, limit: Option<usize>) -> Result<Vec<Story>, DomainError>;
}

pub trait UserProfileRepository: Send + Sync + 'static {
    fn find_profile(&self, uid: &str) -> Result<Option<UserProfile>, DomainError>;
    /// Inserts unless a profile for the uid exists. Returns whether it inserted.
    fn insert_profile(&self, profile: &UserProfile) -> Result<bool, DomainError>;
    fn save_profile(&self, profile: &UserProfile) -> Result<bool, DomainError>;
}

/// Everything the marketplace persists.
pub trait Store:
    ShopRepository + ProductRepository + OrderRepository + StoryRepository + UserProfileRepository
{
}

impl<T> Store for T where
    T: ShopRepository
        + ProductRepository
        + OrderRepository
        + StoryRepository
        + UserProfileRepository
{
}
