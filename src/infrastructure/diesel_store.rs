use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::filter::{constraint, OrderFilter, ProductFilter, ShopFilter};
use crate::domain::order::{Order, OrderTransition};
use crate::domain::ports::{
    OrderRepository, ProductRepository, ShopRepository, StoryRepository, UserProfileRepository,
};
use crate::domain::product::Product;
use crate::domain::shop::Shop;
use crate::domain::story::Story;
use crate::domain::user::UserProfile;
use crate::domain::validation;
use crate::schema::{orders, products, shops, stories, user_profiles};

use super::models::{
    OrderRow, ProductChanges, ProductRow, ShopChanges, ShopRow, StoryRow, UserProfileRow,
};

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<diesel::result::Error> for DomainError {
    fn from(e: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};

        match &e {
            // The schema rejected the row itself; retrying cannot help.
            Error::DatabaseError(
                kind @ (DatabaseErrorKind::CheckViolation
                | DatabaseErrorKind::ForeignKeyViolation
                | DatabaseErrorKind::NotNullViolation
                | DatabaseErrorKind::UniqueViolation),
                info,
            ) => {
                let field = constrained_field(info.constraint_name().or(info.column_name()));
                log::debug!("{kind:?} on {field}: {}", info.message());
                DomainError::validation(field, info.message().to_string())
            }
            _ => DomainError::TransientIo(e.to_string()),
        }
    }
}

/// API field behind a Postgres constraint or column name. More specific
/// names come first so `customer_phone` is not read as `phone`.
fn constrained_field(name: Option<&str>) -> &'static str {
    const FIELDS: [(&str, &str); 12] = [
        ("customer_phone", "customer.phone"),
        ("phone", "phone"),
        ("whatsapp", "whatsapp"),
        ("original_price", "originalPrice"),
        ("price", "price"),
        ("stock", "stock"),
        ("quantity", "quantity"),
        ("rating", "rating"),
        ("products_count", "productsCount"),
        ("orders_completed", "ordersCompleted"),
        ("shop_id", "shopId"),
        ("pkey", "id"),
    ];
    name.and_then(|name| {
        FIELDS
            .iter()
            .find(|(column, _)| name.contains(column))
            .map(|(_, field)| *field)
    })
    .unwrap_or("record")
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::TransientIo(e.to_string())
    }
}

// ── Store ─────────────────────────────────────────────────────────────────────

/// Postgres-backed store. Every port call checks a connection out of the
/// pool and blocks until the database answers.
pub struct DieselStore {
    pool: DbPool,
}

impl DieselStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ShopRepository for DieselStore {
    fn insert_shop(&self, shop: &Shop) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        diesel::insert_into(shops::table)
            .values(&ShopRow::from(shop))
            .execute(&mut conn)?;
        Ok(())
    }

    fn find_shop(&self, id: Uuid) -> Result<Option<Shop>, DomainError> {
        let mut conn = self.pool.get()?;
        shops::table
            .find(id)
            .select(ShopRow::as_select())
            .first::<ShopRow>(&mut conn)
            .optional()?
            .map(Shop::try_from)
            .transpose()
    }

    fn find_shop_by_owner(&self, owner_id: &str) -> Result<Option<Shop>, DomainError> {
        let mut conn = self.pool.get()?;
        shops::table
            .filter(shops::owner_id.eq(owner_id))
            .order(shops::created_at.asc())
            .select(ShopRow::as_select())
            .first::<ShopRow>(&mut conn)
            .optional()?
            .map(Shop::try_from)
            .transpose()
    }

    fn list_shops(&self, filter: &ShopFilter) -> Result<Vec<Shop>, DomainError> {
        let mut conn = self.pool.get()?;

        let mut query = shops::table.select(ShopRow::as_select()).into_boxed();
        if let Some(category) = constraint(&filter.category) {
            query = query.filter(shops::category.eq(category.to_owned()));
        }
        if let Some(city) = constraint(&filter.city) {
            query = query.filter(shops::city.eq(city.to_owned()));
        }
        if let Some(featured) = filter.featured {
            query = query.filter(shops::is_featured.eq(featured));
        }
        if let Some(verified) = filter.verified {
            query = query.filter(shops::is_verified.eq(verified));
        }

        query
            .order((shops::created_at.desc(), shops::id.desc()))
            .load::<ShopRow>(&mut conn)?
            .into_iter()
            .map(Shop::try_from)
            .collect()
    }

    fn save_shop(&self, shop: &Shop) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let updated = diesel::update(shops::table.find(shop.id))
            .set(&ShopChanges::from(shop))
            .execute(&mut conn)?;
        Ok(updated > 0)
    }

    fn adjust_products_count(
        &self,
        id: Uuid,
        delta: i32,
        at: DateTime<Utc>,
    ) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let current: Option<i32> = shops::table
                .find(id)
                .select(shops::products_count)
                .for_update()
                .first(conn)
                .optional()?;
            let Some(current) = current else {
                return Ok(false);
            };

            diesel::update(shops::table.find(id))
                .set((
                    shops::products_count.eq(current.saturating_add(delta).max(0)),
                    shops::updated_at.eq(at),
                ))
                .execute(conn)?;
            Ok(true)
        })
    }
}

impl ProductRepository for DieselStore {
    fn insert_product(&self, product: &Product) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        diesel::insert_into(products::table)
            .values(&ProductRow::from(product))
            .execute(&mut conn)?;
        Ok(())
    }

    fn find_product(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = products::table
            .find(id)
            .select(ProductRow::as_select())
            .first::<ProductRow>(&mut conn)
            .optional()?;
        Ok(row.map(Product::from))
    }

    fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;

        let mut query = products::table.select(ProductRow::as_select()).into_boxed();
        if let Some(shop_id) = filter.shop_id {
            query = query.filter(products::shop_id.eq(shop_id));
        }
        if let Some(category) = constraint(&filter.category) {
            query = query.filter(products::category.eq(category.to_owned()));
        }
        if let Some(available) = filter.available {
            query = query.filter(products::is_available.eq(available));
        }

        let rows = query
            .order((products::created_at.desc(), products::id.desc()))
            .load::<ProductRow>(&mut conn)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    fn save_product(&self, product: &Product) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let updated = diesel::update(products::table.find(product.id))
            .set(&ProductChanges::from(product))
            .execute(&mut conn)?;
        Ok(updated > 0)
    }

    fn delete_product(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::delete(products::table.find(id))
            .returning(ProductRow::as_returning())
            .get_result::<ProductRow>(&mut conn)
            .optional()?;
        Ok(row.map(Product::from))
    }

    fn increment_views(&self, id: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let updated = diesel::update(products::table.find(id))
            .set(products::views.eq(products::views + 1))
            .execute(&mut conn)?;
        Ok(updated > 0)
    }
}

impl OrderRepository for DieselStore {
    fn insert_order(&self, order: &Order) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        diesel::insert_into(orders::table)
            .values(&OrderRow::from(order))
            .execute(&mut conn)?;
        Ok(())
    }

    fn find_order(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;
        orders::table
            .find(id)
            .select(OrderRow::as_select())
            .first::<OrderRow>(&mut conn)
            .optional()?
            .map(Order::try_from)
            .transpose()
    }

    fn list_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        let mut query = orders::table.select(OrderRow::as_select()).into_boxed();
        if let Some(shop_id) = filter.shop_id {
            query = query.filter(orders::shop_id.eq(shop_id));
        }
        if let Some(status) = filter.status {
            query = query.filter(orders::status.eq(status.as_str()));
        }
        if let Some(phone) = constraint(&filter.customer_phone) {
            query = query.filter(orders::customer_phone.eq(phone.to_owned()));
        }

        query
            .order((orders::created_at.desc(), orders::id.desc()))
            .load::<OrderRow>(&mut conn)?
            .into_iter()
            .map(Order::try_from)
            .collect()
    }

    fn save_order(&self, order: &Order) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let updated = diesel::update(orders::table.find(order.id))
            .set((
                orders::notes.eq(order.notes.as_deref()),
                orders::updated_at.eq(order.updated_at),
            ))
            .execute(&mut conn)?;
        Ok(updated > 0)
    }

    fn commit_transition(&self, t: &OrderTransition) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // Compare-and-set on the status we planned from: a concurrent
            // writer that got there first leaves zero rows to update.
            let row = diesel::update(
                orders::table
                    .filter(orders::id.eq(t.order_id))
                    .filter(orders::status.eq(t.from.as_str())),
            )
            .set((
                orders::status.eq(t.to.as_str()),
                orders::updated_at.eq(t.at),
            ))
            .returning(OrderRow::as_returning())
            .get_result::<OrderRow>(conn)
            .optional()?;

            let Some(row) = row else {
                return Ok(None);
            };

            if let Some(sale) = &t.completed_sale {
                diesel::update(shops::table.find(sale.shop_id))
                    .set((
                        shops::orders_completed.eq(shops::orders_completed + 1),
                        shops::updated_at.eq(t.at),
                    ))
                    .execute(conn)?;
                diesel::update(products::table.find(sale.product_id))
                    .set(products::order_count.eq(products::order_count + 1))
                    .execute(conn)?;
            }

            if let Some(restore) = &t.restore_stock {
                let stock: Option<i32> = products::table
                    .find(restore.product_id)
                    .select(products::stock)
                    .for_update()
                    .first(conn)
                    .optional()?;
                if let Some(stock) = stock {
                    // An error here rolls the status change back too.
                    let stock = validation::restocked(stock, restore.quantity)?;
                    diesel::update(products::table.find(restore.product_id))
                        .set((
                            products::stock.eq(stock),
                            products::is_available.eq(stock > 0),
                            products::updated_at.eq(t.at),
                        ))
                        .execute(conn)?;
                }
            }

            Order::try_from(row).map(Some)
        })
    }
}

impl StoryRepository for DieselStore {
    fn insert_story(&self, story: &Story) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        diesel::insert_into(stories::table)
            .values(&StoryRow::from(story))
            .execute(&mut conn)?;
        Ok(())
    }

    fn list_stories(&self, limit: Option<usize>) -> Result<Vec<Story>, DomainError> {
        let mut conn = self.pool.get()?;

        let mut query = stories::table
            .select(StoryRow::as_select())
            .order((stories::display_order.asc(), stories::id.asc()))
            .into_boxed();
        if let Some(limit) = limit {
            query = query.limit(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let rows = query.load::<StoryRow>(&mut conn)?;
        Ok(rows.into_iter().map(Story::from).collect())
    }
}

impl UserProfileRepository for DieselStore {
    fn find_profile(&self, uid: &str) -> Result<Option<UserProfile>, DomainError> {
        let mut conn = self.pool.get()?;
        user_profiles::table
            .find(uid)
            .select(UserProfileRow::as_select())
            .first::<UserProfileRow>(&mut conn)
            .optional()?
            .map(UserProfile::try_from)
            .transpose()
    }

    fn insert_profile(&self, profile: &UserProfile) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let inserted = diesel::insert_into(user_profiles::table)
            .values(&UserProfileRow::from(profile))
            .on_conflict_do_nothing()
            .execute(&mut conn)?;
        Ok(inserted > 0)
    }

    fn save_profile(&self, profile: &UserProfile) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let row = UserProfileRow::from(profile);
        let updated = diesel::update(user_profiles::table.find(&row.uid))
            .set((
                user_profiles::email.eq(&row.email),
                user_profiles::display_name.eq(row.display_name.as_deref()),
                user_profiles::role.eq(&row.role),
                user_profiles::shop_id.eq(row.shop_id),
            ))
            .execute(&mut conn)?;
        Ok(updated > 0)
    }
}
