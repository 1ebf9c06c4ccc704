use std::sync::Arc;

use uuid::Uuid;

use super::error::ServiceError;
use crate::{
    db::Store,
    models::shopmodel::{Claim, NewClaim, NewShopItem, ShopItem},
};

#[derive(Debug, Clone, PartialEq)]
pub struct ClaimOutcome {
    pub claim: Claim,
    pub remaining_points: i64,
}

#[derive(Clone)]
pub struct ShopService {
    db_client: Arc<dyn Store>,
}

impl ShopService {
    pub fn new(db_client: Arc<dyn Store>) -> Self {
        Self { db_client }
    }

    pub async fn list_items(&self) -> Result<Vec<ShopItem>, ServiceError> {
        Ok(self.db_client.get_shop_items().await?)
    }

    pub async fn add_item(&self, item: NewShopItem) -> Result<ShopItem, ServiceError> {
        if item.cost < 0 {
            return Err(ServiceError::Validation("Cost must not be negative.".to_string()));
        }

        let item = self.db_client.create_shop_item(item).await?;
        tracing::info!(item = %item.id, cost = item.cost, "shop item added");
        Ok(item)
    }

    /// Spends the item's cost from the user's balance and records the claim.
    pub async fn claim_item(&self, user_id: &str, item_id: Uuid) -> Result<ClaimOutcome, ServiceError> {
        let user = self
            .db_client
            .get_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::UserNotFound(user_id.to_string()))?;

        let item = self
            .db_client
            .get_shop_item(item_id)
            .await?
            .ok_or(ServiceError::ShopItemNotFound(item_id))?;

        if user.points < item.cost {
            return Err(ServiceError::InsufficientPoints {
                required: item.cost,
                available: user.points,
            });
        }

        // Conditional on the balance, so a concurrent claim cannot overspend.
        let updated = self
            .db_client
            .spend_points(user_id, item.cost)
            .await?
            .ok_or(ServiceError::InsufficientPoints {
                required: item.cost,
                available: user.points,
            })?;

        let claim = self
            .db_client
            .create_claim(NewClaim {
                user_id: user.id.clone(),
                user_email: user.email.clone(),
                product_id: item.id,
                product_name: item.name.clone(),
                image_url: item.image.clone(),
                points_spent: item.cost,
            })
            .await;

        let claim = match claim {
            Ok(claim) => claim,
            Err(err) => {
                if let Err(e) = self.db_client.refund_points(user_id, item.cost).await {
                    tracing::error!(user = %user_id, "failed to refund points after claim failure: {}", e);
                }
                return Err(err.into());
            }
        };

        tracing::info!(user = %user_id, item = %item.id, spent = item.cost, "item claimed");
        Ok(ClaimOutcome {
            claim,
            remaining_points: updated.points,
        })
    }

    pub async fn user_claims(&self, user_id: &str) -> Result<Vec<Claim>, ServiceError> {
        Ok(self.db_client.get_user_claims(user_id).await?)
    }
}
