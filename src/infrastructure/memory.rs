use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::filter::{Filter, OrderFilter, ProductFilter, ShopFilter};
use crate::domain::order::{Order, OrderTransition};
use crate::domain::ports::{
    OrderRepository, ProductRepository, ShopRepository, StoryRepository, UserProfileRepository,
};
use crate::domain::product::Product;
use crate::domain::shop::Shop;
use crate::domain::story::Story;
use crate::domain::user::UserProfile;
use crate::domain::validation;

/// Port operations that can be made to fail or stall on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    AdjustProductsCount,
    IncrementViews,
    CommitTransition,
    ListOrders,
}

#[derive(Default)]
struct Tables {
    shops: Vec<Shop>,
    products: Vec<Product>,
    orders: Vec<Order>,
    stories: Vec<Story>,
    profiles: Vec<UserProfile>,
}

/// In-process store for tests and local runs. Rows are kept in insertion
/// order and listed newest first; one lock covers every table, so a
/// transition commit is atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    failing: Mutex<HashSet<StoreOp>>,
    delays: Mutex<HashMap<StoreOp, Duration>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later call of `op` fail with a transient error until
    /// [`MemoryStore::recover`] is called.
    pub fn fail_on(&self, op: StoreOp) {
        lock(&self.failing).insert(op);
    }

    /// Makes every later call of `op` sleep for `delay` before running.
    pub fn slow_on(&self, op: StoreOp, delay: Duration) {
        lock(&self.delays).insert(op, delay);
    }

    pub fn recover(&self) {
        lock(&self.failing).clear();
        lock(&self.delays).clear();
    }

    fn check(&self, op: StoreOp) -> Result<(), DomainError> {
        let delay = lock(&self.delays).get(&op).copied();
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        if lock(&self.failing).contains(&op) {
            return Err(DomainError::TransientIo(format!("{op:?} unavailable")));
        }
        Ok(())
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        lock(&self.tables)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn newest_first<'a, T: Clone + 'a>(
    rows: impl DoubleEndedIterator<Item = &'a T>,
    keep: impl Fn(&T) -> bool,
) -> Vec<T> {
    rows.rev().filter(|row| keep(row)).cloned().collect()
}

impl ShopRepository for MemoryStore {
    fn insert_shop(&self, shop: &Shop) -> Result<(), DomainError> {
        self.tables().shops.push(shop.clone());
        Ok(())
    }

    fn find_shop(&self, id: Uuid) -> Result<Option<Shop>, DomainError> {
        Ok(self.tables().shops.iter().find(|s| s.id == id).cloned())
    }

    fn find_shop_by_owner(&self, owner_id: &str) -> Result<Option<Shop>, DomainError> {
        Ok(self
            .tables()
            .shops
            .iter()
            .find(|s| s.owner_id == owner_id)
            .cloned())
    }

    fn list_shops(&self, filter: &ShopFilter) -> Result<Vec<Shop>, DomainError> {
        Ok(newest_first(self.tables().shops.iter(), |s| filter.matches(s)))
    }

    fn save_shop(&self, shop: &Shop) -> Result<bool, DomainError> {
        let mut tables = self.tables();
        let Some(stored) = tables.shops.iter_mut().find(|s| s.id == shop.id) else {
            return Ok(false);
        };
        let (products_count, orders_completed) = (stored.products_count, stored.orders_completed);
        *stored = shop.clone();
        stored.products_count = products_count;
        stored.orders_completed = orders_completed;
        Ok(true)
    }

    fn adjust_products_count(
        &self,
        id: Uuid,
        delta: i32,
        at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        self.check(StoreOp::AdjustProductsCount)?;
        let mut tables = self.tables();
        let Some(shop) = tables.shops.iter_mut().find(|s| s.id == id) else {
            return Ok(false);
        };
        shop.products_count = shop.products_count.saturating_add(delta).max(0);
        shop.updated_at = at;
        Ok(true)
    }
}

impl ProductRepository for MemoryStore {
    fn insert_product(&self, product: &Product) -> Result<(), DomainError> {
        self.tables().products.push(product.clone());
        Ok(())
    }

    fn find_product(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        Ok(self.tables().products.iter().find(|p| p.id == id).cloned())
    }

    fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, DomainError> {
        Ok(newest_first(self.tables().products.iter(), |p| {
            filter.matches(p)
        }))
    }

    fn save_product(&self, product: &Product) -> Result<bool, DomainError> {
        let mut tables = self.tables();
        let Some(stored) = tables.products.iter_mut().find(|p| p.id == product.id) else {
            return Ok(false);
        };
        let (views, orders) = (stored.views, stored.orders);
        *stored = product.clone();
        stored.views = views;
        stored.orders = orders;
        Ok(true)
    }

    fn delete_product(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        let mut tables = self.tables();
        let position = tables.products.iter().position(|p| p.id == id);
        Ok(position.map(|i| tables.products.remove(i)))
    }

    fn increment_views(&self, id: Uuid) -> Result<bool, DomainError> {
        self.check(StoreOp::IncrementViews)?;
        let mut tables = self.tables();
        let Some(product) = tables.products.iter_mut().find(|p| p.id == id) else {
            return Ok(false);
        };
        product.views += 1;
        Ok(true)
    }
}

impl OrderRepository for MemoryStore {
    fn insert_order(&self, order: &Order) -> Result<(), DomainError> {
        self.tables().orders.push(order.clone());
        Ok(())
    }

    fn find_order(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        Ok(self.tables().orders.iter().find(|o| o.id == id).cloned())
    }

    fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, DomainError> {
        self.check(StoreOp::ListOrders)?;
        Ok(newest_first(self.tables().orders.iter(), |o| filter.matches(o)))
    }

    fn save_order(&self, order: &Order) -> Result<bool, DomainError> {
        let mut tables = self.tables();
        let Some(stored) = tables.orders.iter_mut().find(|o| o.id == order.id) else {
            return Ok(false);
        };
        stored.notes = order.notes.clone();
        stored.updated_at = order.updated_at;
        Ok(true)
    }

    fn commit_transition(&self, t: &OrderTransition) -> Result<Option<Order>, DomainError> {
        self.check(StoreOp::CommitTransition)?;
        let mut tables = self.tables();

        let Some(index) = tables
            .orders
            .iter()
            .position(|o| o.id == t.order_id && o.status == t.from)
        else {
            return Ok(None);
        };

        // Checked before anything moves so a failure leaves no trace.
        let restock = match &t.restore_stock {
            Some(restore) => tables
                .products
                .iter()
                .position(|p| p.id == restore.product_id)
                .map(|i| {
                    validation::restocked(tables.products[i].stock, restore.quantity)
                        .map(|stock| (i, stock))
                })
                .transpose()?,
            None => None,
        };

        let order = &mut tables.orders[index];
        order.status = t.to;
        order.updated_at = t.at;
        let committed = order.clone();

        if let Some(sale) = &t.completed_sale {
            if let Some(shop) = tables.shops.iter_mut().find(|s| s.id == sale.shop_id) {
                shop.orders_completed += 1;
                shop.updated_at = t.at;
            }
            if let Some(product) = tables.products.iter_mut().find(|p| p.id == sale.product_id) {
                product.orders += 1;
            }
        }

        if let Some((i, stock)) = restock {
            let product = &mut tables.products[i];
            product.stock = stock;
            product.derive_availability();
            product.updated_at = t.at;
        }

        Ok(Some(committed))
    }
}

impl StoryRepository for MemoryStore {
    fn insert_story(&self, story: &Story) -> Result<(), DomainError> {
        self.tables().stories.push(story.clone());
        Ok(())
    }

    fn list_stories(&self, limit: Option<usize>) -> Result<Vec<Story>, DomainError> {
        let mut stories = self.tables().stories.clone();
        stories.sort_by_key(|s| s.order);
        stories.truncate(limit.unwrap_or(usize::MAX));
        Ok(stories)
    }
}

impl UserProfileRepository for MemoryStore {
    fn find_profile(&self, uid: &str) -> Result<Option<UserProfile>, DomainError> {
        Ok(self
            .tables()
            .profiles
            .iter()
            .find(|p| p.uid == uid)
            .cloned())
    }

    fn insert_profile(&self, profile: &UserProfile) -> Result<bool, DomainError> {
        let mut tables = self.tables();
        if tables.profiles.iter().any(|p| p.uid == profile.uid) {
            return Ok(false);
        }
        tables.profiles.push(profile.clone());
        Ok(true)
    }

    fn save_profile(&self, profile: &UserProfile) -> Result<bool, DomainError> {
        let mut tables = self.tables();
        let Some(stored) = tables.profiles.iter_mut().find(|p| p.uid == profile.uid) else {
            return Ok(false);
        };
        *stored = profile.clone();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::domain::order::{Customer, NewOrder, OrderStatus};
    use crate::domain::product::tests::sample_product;
    use crate::domain::shop::tests::sample_shop;

    fn seeded(stock: i32) -> (MemoryStore, Shop, Product) {
        let store = MemoryStore::new();
        let shop = sample_shop();
        store.insert_shop(&shop).unwrap();
        let mut product = sample_product(stock, 800);
        product.shop_id = shop.id;
        store.insert_product(&product).unwrap();
        (store, shop, product)
    }

    fn order_for(product: &Product, quantity: i32) -> Order {
        NewOrder {
            product_id: product.id,
            customer: Customer {
                name: "Bilal".to_string(),
                phone: "+923331112222".to_string(),
                address: "Flat 3".to_string(),
                city: "Karachi".to_string(),
            },
            quantity,
            notes: None,
            status: None,
        }
        .into_order(product, Utc::now())
        .unwrap()
    }

    #[test]
    fn lists_newest_first() {
        let (store, shop, first) = seeded(3);
        let mut second = sample_product(3, 900);
        second.shop_id = shop.id;
        store.insert_product(&second).unwrap();

        let ids: Vec<Uuid> = store
            .list_products(&ProductFilter::for_shop(shop.id))
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn save_product_keeps_counters() {
        let (store, _, mut product) = seeded(3);
        store.increment_views(product.id).unwrap();

        product.name = "Block-printed kurta".to_string();
        assert!(store.save_product(&product).unwrap());

        let saved = store.find_product(product.id).unwrap().unwrap();
        assert_eq!(saved.name, "Block-printed kurta");
        assert_eq!(saved.views, 1);
    }

    #[test]
    fn commit_transition_is_compare_and_set() {
        let (store, shop, product) = seeded(4);
        let order = order_for(&product, 1);
        store.insert_order(&order).unwrap();

        let mut delivered = order.clone();
        delivered.status = OrderStatus::Shipped;
        let plan = OrderTransition::plan(&delivered, OrderStatus::Delivered, Utc::now()).unwrap();

        // The stored order is still pending, so the plan does not apply.
        assert!(store.commit_transition(&plan).unwrap().is_none());
        assert_eq!(store.find_shop(shop.id).unwrap().unwrap().orders_completed, 0);
    }

    #[test]
    fn cancel_restores_stock_and_availability() {
        let (store, _, mut product) = seeded(1);
        let order = order_for(&product, 1);
        store.insert_order(&order).unwrap();
        product.stock = 0;
        product.derive_availability();
        store.save_product(&product).unwrap();

        let plan = OrderTransition::plan(&order, OrderStatus::Cancelled, Utc::now()).unwrap();
        let cancelled = store.commit_transition(&plan).unwrap().unwrap();

        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        let product = store.find_product(product.id).unwrap().unwrap();
        assert_eq!(product.stock, 1);
        assert!(product.is_available);
    }

    #[test]
    fn restock_overflow_rejects_the_whole_cancellation() {
        let (store, _, mut product) = seeded(1);
        let order = order_for(&product, 1);
        store.insert_order(&order).unwrap();
        product.stock = i32::MAX;
        store.save_product(&product).unwrap();

        let plan = OrderTransition::plan(&order, OrderStatus::Cancelled, Utc::now()).unwrap();
        let err = store.commit_transition(&plan).unwrap_err();

        assert!(matches!(err, DomainError::Validation { field: "stock", .. }));
        assert_eq!(store.find_product(product.id).unwrap().unwrap().stock, i32::MAX);
        assert_eq!(
            store.find_order(order.id).unwrap().unwrap().status,
            OrderStatus::Pending
        );
    }

    #[test]
    fn injected_failures_last_until_recovery() {
        let (store, shop, _) = seeded(1);
        store.fail_on(StoreOp::AdjustProductsCount);
        assert!(store
            .adjust_products_count(shop.id, 1, Utc::now())
            .unwrap_err()
            .is_retryable());

        store.recover();
        assert!(store.adjust_products_count(shop.id, 1, Utc::now()).unwrap());
    }

    #[test]
    fn stories_follow_display_order() {
        let store = MemoryStore::new();
        for (order, name) in [(2, "Second"), (1, "First"), (3, "Third")] {
            store
                .insert_story(&Story {
                    id: Uuid::new_v4(),
                    owner_name: name.to_string(),
                    shop_name: name.to_string(),
                    category: "Crafts".to_string(),
                    city: "Multan".to_string(),
                    quote: String::new(),
                    full_story: String::new(),
                    image: String::new(),
                    shop_image: String::new(),
                    products_count: 0,
                    orders_completed: 0,
                    impact: String::new(),
                    order,
                })
                .unwrap();
        }

        let names: Vec<String> = store
            .list_stories(Some(2))
            .unwrap()
            .into_iter()
            .map(|s| s.owner_name)
            .collect();
        assert_eq!(names, vec!["First", "Second"]);
    }
}
