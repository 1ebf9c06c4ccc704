use std::sync::Arc;

use serde::Serialize;

use super::{error::ServiceError, referral::ReferralCodeGenerator};
use crate::{
    db::Store,
    models::usermodel::{email_label, NewUser, User},
};

const LEADERBOARD_SIZE: i64 = 5;
const ANONYMOUS: &str = "Anonymous";

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub name: String,
    /// One point is earned per referral.
    pub referrals: i64,
}

/// Ranks the top users and appends `current` when it is not among them.
pub fn build_leaderboard(top: &[User], current: Option<&User>) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = top
        .iter()
        .enumerate()
        .map(|(index, user)| LeaderboardEntry {
            rank: index + 1,
            name: user.display_label(ANONYMOUS),
            referrals: user.points,
        })
        .collect();

    if let Some(current) = current {
        if !top.iter().any(|user| user.id == current.id) {
            entries.push(LeaderboardEntry {
                rank: entries.len() + 1,
                name: current.display_label(ANONYMOUS),
                referrals: current.points,
            });
        }
    }

    entries
}

#[derive(Clone)]
pub struct UserService {
    db_client: Arc<dyn Store>,
    codes: ReferralCodeGenerator,
}

impl UserService {
    pub fn new(db_client: Arc<dyn Store>, codes: ReferralCodeGenerator) -> Self {
        Self { db_client, codes }
    }

    /// Creates the caller's record on first signup; later calls return the
    /// stored record unchanged.
    pub async fn register(
        &self,
        user_id: &str,
        email: &str,
        display_name: Option<&str>,
        referred_by: Option<&str>,
    ) -> Result<(User, bool), ServiceError> {
        if let Some(existing) = self.db_client.get_user(user_id).await? {
            return Ok((existing, false));
        }

        let referral_code = self.codes.assign_unique(self.db_client.as_ref(), user_id).await?;
        let display_name = display_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| email_label(email));

        let user = self
            .db_client
            .save_user(NewUser {
                id: user_id.to_string(),
                email: email.to_string(),
                display_name: Some(display_name),
                points: 0,
                referral_code: Some(referral_code),
                referred_by: referred_by
                    .map(str::trim)
                    .filter(|code| !code.is_empty())
                    .map(str::to_string),
            })
            .await?;

        tracing::info!(user = %user.id, "user record created");
        Ok((user, true))
    }

    pub async fn get_profile(&self, user_id: &str) -> Result<User, ServiceError> {
        self.db_client
            .get_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::UserNotFound(user_id.to_string()))
    }

    pub async fn update_display_name(
        &self,
        user_id: &str,
        display_name: &str,
    ) -> Result<User, ServiceError> {
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(ServiceError::Validation("Display name is required.".to_string()));
        }

        self.db_client
            .update_display_name(user_id, display_name)
            .await?
            .ok_or_else(|| ServiceError::UserNotFound(user_id.to_string()))
    }

    pub async fn leaderboard(&self, user_id: &str) -> Result<Vec<LeaderboardEntry>, ServiceError> {
        let top = self.db_client.get_users_by_points(LEADERBOARD_SIZE).await?;
        let current = self.db_client.get_user(user_id).await?;
        Ok(build_leaderboard(&top, current.as_ref()))
    }
}
