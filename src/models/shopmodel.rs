use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
pub struct ShopItem {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    /// Price in points.
    pub cost: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewShopItem {
    pub name: String,
    pub description: String,
    pub cost: i64,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub id: Uuid,
    pub user_id: String,
    pub user_email: String,
    pub product_id: Uuid,
    pub product_name: String,
    pub image_url: Option<String>,
    pub points_spent: i64,
    pub claimed_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewClaim {
    pub user_id: String,
    pub user_email: String,
    pub product_id: Uuid,
    pub product_name: String,
    pub image_url: Option<String>,
    pub points_spent: i64,
}
