use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Editorial piece about a shop, shown on the stories page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Story {
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
    /// Display position, ascending.
    pub order: i32,
}
