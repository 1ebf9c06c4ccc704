use async_trait::async_trait;
use uuid::Uuid;

use super::DBClient;
use crate::models::shopmodel::{Claim, NewClaim, NewShopItem, ShopItem};

#[async_trait]
pub trait ShopExt {
    async fn get_shop_items(&self) -> Result<Vec<ShopItem>, sqlx::Error>;

    async fn get_shop_item(&self, item_id: Uuid) -> Result<Option<ShopItem>, sqlx::Error>;

    async fn create_shop_item(&self, item: NewShopItem) -> Result<ShopItem, sqlx::Error>;

    async fn create_claim(&self, claim: NewClaim) -> Result<Claim, sqlx::Error>;

    /// Newest first.
    async fn get_user_claims(&self, user_id: &str) -> Result<Vec<Claim>, sqlx::Error>;
}

#[async_trait]
impl ShopExt for DBClient {
    async fn get_shop_items(&self) -> Result<Vec<ShopItem>, sqlx::Error> {
        sqlx::query_as::<_, ShopItem>(
            r#"
            SELECT id, name, description, cost, image
            FROM shop_items
            ORDER BY cost ASC, created_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn get_shop_item(&self, item_id: Uuid) -> Result<Option<ShopItem>, sqlx::Error> {
        sqlx::query_as::<_, ShopItem>(
            "SELECT id, name, description, cost, image FROM shop_items WHERE id = $1",
        )
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_shop_item(&self, item: NewShopItem) -> Result<ShopItem, sqlx::Error> {
        sqlx::query_as::<_, ShopItem>(
            r#"
            INSERT INTO shop_items (name, description, cost, image)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, description, cost, image
            "#,
        )
        .bind(item.name)
        .bind(item.description)
        .bind(item.cost)
        .bind(item.image)
        .fetch_one(&self.pool)
        .await
    }

    async fn create_claim(&self, claim: NewClaim) -> Result<Claim, sqlx::Error> {
        sqlx::query_as::<_, Claim>(
            r#"
            INSERT INTO claims (user_id, user_email, product_id, product_name, image_url, points_spent)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, user_email, product_id, product_name, image_url, points_spent, claimed_at
            "#,
        )
        .bind(claim.user_id)
        .bind(claim.user_email)
        .bind(claim.product_id)
        .bind(claim.product_name)
        .bind(claim.image_url)
        .bind(claim.points_spent)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_user_claims(&self, user_id: &str) -> Result<Vec<Claim>, sqlx::Error> {
        sqlx::query_as::<_, Claim>(
            r#"
            SELECT id, user_id, user_email, product_id, product_name, image_url, points_spent, claimed_at
            FROM claims
            WHERE user_id = $1
            ORDER BY claimed_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }
}
