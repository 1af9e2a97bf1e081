use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::errors::DomainError;
use super::validation::{self, required};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ShopStatus {
    Active,
    Pending,
    Suspended,
}

impl ShopStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ShopStatus::Active => "active",
            ShopStatus::Pending => "pending",
            ShopStatus::Suspended => "suspended",
        }
    }
}

impl fmt::Display for ShopStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShopStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ShopStatus::Active),
            "pending" => Ok(ShopStatus::Pending),
            "suspended" => Ok(ShopStatus::Suspended),
            other => Err(DomainError::validation(
                "status",
                format!("unknown shop status '{other}'"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Shop {
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
    /// Set by the platform operator only.
    pub is_verified: bool,
    pub is_featured: bool,
    /// Number of products listed under this shop.
    pub products_count: i32,
    /// Number of delivered orders.
    pub orders_completed: i32,
    pub rating: f64,
    /// Identity-provider user id of the vendor.
    pub owner_id: String,
    pub status: ShopStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Shop {
    fn validate(&self) -> Result<(), DomainError> {
        required("name", &self.name)?;
        required("ownerName", &self.owner_name)?;
        validation::email("email", &self.email)?;
        validation::phone("phone", &self.phone)?;
        if let Some(whatsapp) = &self.whatsapp {
            validation::at_most("whatsapp", whatsapp, validation::SHORT_TEXT_MAX)?;
        }
        required("address", &self.address)?;
        required("city", &self.city)?;
        if !(0.0..=5.0).contains(&self.rating) {
            return Err(DomainError::validation("rating", "must be between 0 and 5"));
        }
        Ok(())
    }
}

/// Vendor registration form.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewShop {
    pub name: String,
    pub owner_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub whatsapp: Option<String>,
    pub address: String,
    pub city: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub story: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub owner_image: Option<String>,
}

impl NewShop {
    pub fn into_shop(self, owner_id: &str, now: DateTime<Utc>) -> Result<Shop, DomainError> {
        let shop = Shop {
            id: Uuid::new_v4(),
            name: self.name,
            owner_name: self.owner_name,
            email: self.email,
            phone: self.phone,
            whatsapp: self.whatsapp,
            address: self.address,
            city: self.city,
            category: self.category,
            description: self.description,
            story: self.story,
            image: self.image,
            owner_image: self.owner_image,
            is_verified: false,
            is_featured: false,
            products_count: 0,
            orders_completed: 0,
            rating: 0.0,
            owner_id: owner_id.to_string(),
            status: ShopStatus::Active,
            created_at: now,
            updated_at: now,
        };
        shop.validate()?;
        Ok(shop)
    }
}

/// Profile edits. The derived counters are not editable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShopPatch {
    pub name: Option<String>,
    pub owner_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub whatsapp: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub story: Option<String>,
    pub image: Option<String>,
    pub owner_image: Option<String>,
    pub is_verified: Option<bool>,
    pub is_featured: Option<bool>,
    pub rating: Option<f64>,
    pub status: Option<ShopStatus>,
}

impl ShopPatch {
    /// True when the patch touches fields only the platform may set.
    pub fn touches_platform_fields(&self) -> bool {
        self.is_verified.is_some()
            || self.is_featured.is_some()
            || self.rating.is_some()
            || self.status.is_some()
    }

    pub fn apply(self, shop: &mut Shop) -> Result<(), DomainError> {
        if let Some(name) = self.name {
            shop.name = name;
        }
        if let Some(owner_name) = self.owner_name {
            shop.owner_name = owner_name;
        }
        if let Some(email) = self.email {
            shop.email = email;
        }
        if let Some(phone) = self.phone {
            shop.phone = phone;
        }
        if let Some(address) = self.address {
            shop.address = address;
        }
        if let Some(city) = self.city {
            shop.city = city;
        }
        if let Some(category) = self.category {
            shop.category = category;
        }
        if let Some(description) = self.description {
            shop.description = description;
        }
        if let Some(story) = self.story {
            shop.story = story;
        }
        if let Some(image) = self.image {
            shop.image = image;
        }
        if let Some(is_verified) = self.is_verified {
            shop.is_verified = is_verified;
        }
        if let Some(is_featured) = self.is_featured {
            shop.is_featured = is_featured;
        }
        if let Some(rating) = self.rating {
            shop.rating = rating;
        }
        if let Some(status) = self.status {
            shop.status = status;
        }
        if let Some(whatsapp) = self.whatsapp {
            shop.whatsapp = Some(whatsapp);
        }
        if let Some(owner_image) = self.owner_image {
            shop.owner_image = Some(owner_image);
        }
        shop.validate()
    }
}
