use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{Customer, Order};
use crate::domain::product::Product;
use crate::domain::shop::Shop;
use crate::domain::story::Story;
use crate::domain::user::{Role, UserProfile};
use crate::schema::{orders, products, shops, stories, user_profiles};

// ── Shops ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Insertable)]
#[diesel(table_name = shops)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ShopRow {
    pub id: Uuid,
    pub name: String,
    pub owner_name: String,
    pub email: String,
    pub phone: String,
    pub whatsapp: Option<String>,
    pub address: String,
    pub city: String,
    pub category: String,
    pub description: String,
    pub story: String,
    pub image: String,
    pub owner_image: Option<String>,
    pub is_verified: bool,
    pub is_featured: bool,
    pub products_count: i32,
    pub orders_completed: i32,
    pub rating: f64,
    pub owner_id: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Profile fields written by a shop save. Counters are only ever moved by
/// single-statement increments.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = shops)]
#[diesel(treat_none_as_null = true)]
pub struct ShopChanges<'a> {
    pub name: &'a str,
    pub owner_name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub whatsapp: Option<&'a str>,
    pub address: &'a str,
    pub city: &'a str,
    pub category: &'a str,
    pub description: &'a str,
    pub story: &'a str,
    pub image: &'a str,
    pub owner_image: Option<&'a str>,
    pub is_verified: bool,
    pub is_featured: bool,
    pub rating: f64,
    pub status: &'a str,
    pub updated_at: DateTime<Utc>,
}

impl From<&Shop> for ShopRow {
    fn from(shop: &Shop) -> Self {
        ShopRow {
            id: shop.id,
            name: shop.name.clone(),
            owner_name: shop.owner_name.clone(),
            email: shop.email.clone(),
            phone: shop.phone.clone(),
            whatsapp: shop.whatsapp.clone(),
            address: shop.address.clone(),
            city: shop.city.clone(),
            category: shop.category.clone(),
            description: shop.description.clone(),
            story: shop.story.clone(),
            image: shop.image.clone(),
            owner_image: shop.owner_image.clone(),
            is_verified: shop.is_verified,
            is_featured: shop.is_featured,
            products_count: shop.products_count,
            orders_completed: shop.orders_completed,
            rating: shop.rating,
            owner_id: shop.owner_id.clone(),
            status: shop.status.as_str().to_string(),
            created_at: shop.created_at,
            updated_at: shop.updated_at,
        }
    }
}

impl<'a> From<&'a Shop> for ShopChanges<'a> {
    fn from(shop: &'a Shop) -> Self {
        ShopChanges {
            name: &shop.name,
            owner_name: &shop.owner_name,
            email: &shop.email,
            phone: &shop.phone,
            whatsapp: shop.whatsapp.as_deref(),
            address: &shop.address,
            city: &shop.city,
            category: &shop.category,
            description: &shop.description,
            story: &shop.story,
            image: &shop.image,
            owner_image: shop.owner_image.as_deref(),
            is_verified: shop.is_verified,
            is_featured: shop.is_featured,
            rating: shop.rating,
            status: shop.status.as_str(),
            updated_at: shop.updated_at,
        }
    }
}

impl TryFrom<ShopRow> for Shop {
    type Error = DomainError;

    fn try_from(row: ShopRow) -> Result<Self, Self::Error> {
        Ok(Shop {
            id: row.id,
            name: row.name,
            owner_name: row.owner_name,
            email: row.email,
            phone: row.phone,
            whatsapp: row.whatsapp,
            address: row.address,
            city: row.city,
            category: row.category,
            description: row.description,
            story: row.story,
            image: row.image,
            owner_image: row.owner_image,
            is_verified: row.is_verified,
            is_featured: row.is_featured,
            products_count: row.products_count,
            orders_completed: row.orders_completed,
            rating: row.rating,
            owner_id: row.owner_id,
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ── Products ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Insertable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: i64,
    pub original_price: Option<i64>,
    pub stock: i32,
    pub category: String,
    pub image: String,
    pub images: Vec<String>,
    pub features: Vec<String>,
    pub shop_id: Uuid,
    pub shop_name: String,
    pub is_available: bool,
    pub views: i32,
    pub order_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Catalog fields written by a product save; view and order counters are
/// left to their increments.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = products)]
#[diesel(treat_none_as_null = true)]
pub struct ProductChanges<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub price: i64,
    pub original_price: Option<i64>,
    pub stock: i32,
    pub category: &'a str,
    pub image: &'a str,
    pub images: &'a [String],
    pub features: &'a [String],
    pub is_available: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        ProductRow {
            id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            original_price: product.original_price,
            stock: product.stock,
            category: product.category.clone(),
            image: product.image.clone(),
            images: product.images.clone(),
            features: product.features.clone(),
            shop_id: product.shop_id,
            shop_name: product.shop_name.clone(),
            is_available: product.is_available,
            views: product.views,
            order_count: product.orders,
            created_at: product.created_at,
            updated_at: product.updated_at,
        }
    }
}

impl<'a> From<&'a Product> for ProductChanges<'a> {
    fn from(product: &'a Product) -> Self {
        ProductChanges {
            name: &product.name,
            description: &product.description,
            price: product.price,
            original_price: product.original_price,
            stock: product.stock,
            category: &product.category,
            image: &product.image,
            images: &product.images,
            features: &product.features,
            is_available: product.is_available,
            updated_at: product.updated_at,
        }
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            original_price: row.original_price,
            stock: row.stock,
            category: row.category,
            image: row.image,
            images: row.images,
            features: row.features,
            shop_id: row.shop_id,
            shop_name: row.shop_name,
            is_available: row.is_available,
            views: row.views,
            orders: row.order_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// ── Orders ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Insertable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_image: String,
    pub shop_id: Uuid,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub customer_city: String,
    pub quantity: i32,
    pub amount: i64,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        OrderRow {
            id: order.id,
            product_id: order.product_id,
            product_name: order.product_name.clone(),
            product_image: order.product_image.clone(),
            shop_id: order.shop_id,
            customer_name: order.customer.name.clone(),
            customer_phone: order.customer.phone.clone(),
            customer_address: order.customer.address.clone(),
            customer_city: order.customer.city.clone(),
            quantity: order.quantity,
            amount: order.amount,
            status: order.status.as_str().to_string(),
            notes: order.notes.clone(),
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

impl TryFrom<OrderRow> for Order {
    type Error = DomainError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Order {
            id: row.id,
            product_id: row.product_id,
            product_name: row.product_name,
            product_image: row.product_image,
            shop_id: row.shop_id,
            customer: Customer {
                name: row.customer_name,
                phone: row.customer_phone,
                address: row.customer_address,
                city: row.customer_city,
            },
            quantity: row.quantity,
            amount: row.amount,
            status: row.status.parse()?,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

// ── Stories ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Insertable)]
#[diesel(table_name = stories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct StoryRow {
    pub id: Uuid,
    pub owner_name: String,
    pub shop_name: String,
    pub category: String,
    pub city: String,
    pub quote: String,
    pub full_story: String,
    pub image: String,
    pub shop_image: String,
    pub products_count: i32,
    pub orders_completed: i32,
    pub impact: String,
    pub display_order: i32,
}

impl From<&Story> for StoryRow {
    fn from(story: &Story) -> Self {
        StoryRow {
            id: story.id,
            owner_name: story.owner_name.clone(),
            shop_name: story.shop_name.clone(),
            category: story.category.clone(),
            city: story.city.clone(),
            quote: story.quote.clone(),
            full_story: story.full_story.clone(),
            image: story.image.clone(),
            shop_image: story.shop_image.clone(),
            products_count: story.products_count,
            orders_completed: story.orders_completed,
            impact: story.impact.clone(),
            display_order: story.order,
        }
    }
}

impl From<StoryRow> for Story {
    fn from(row: StoryRow) -> Self {
        Story {
            id: row.id,
            owner_name: row.owner_name,
            shop_name: row.shop_name,
            category: row.category,
            city: row.city,
            quote: row.quote,
            full_story: row.full_story,
            image: row.image,
            shop_image: row.shop_image,
            products_count: row.products_count,
            orders_completed: row.orders_completed,
            impact: row.impact,
            order: row.display_order,
        }
    }
}

// ── User profiles ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable, Insertable)]
#[diesel(table_name = user_profiles)]
#[diesel(primary_key(uid))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserProfileRow {
    pub uid: String,
    pub email: String,
    pub display_name: Option<String>,
    pub role: String,
    pub shop_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl From<&UserProfile> for UserProfileRow {
    fn from(profile: &UserProfile) -> Self {
        UserProfileRow {
            uid: profile.uid.clone(),
            email: profile.email.clone(),
            display_name: profile.display_name.clone(),
            role: profile.role.as_str().to_string(),
            shop_id: profile.role.shop_id(),
            created_at: profile.created_at,
        }
    }
}

impl TryFrom<UserProfileRow> for UserProfile {
    type Error = DomainError;

    fn try_from(row: UserProfileRow) -> Result<Self, Self::Error> {
        Ok(UserProfile {
            role: Role::from_parts(&row.role, row.shop_id)?,
            uid: row.uid,
            email: row.email,
            display_name: row.display_name,
            created_at: row.created_at,
        })
    }
}
