use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{models::usermodel::User, service::user_service::LeaderboardEntry};

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserDto {
    #[validate(length(max = 100, message = "Display name must be at most 100 characters"))]
    pub display_name: Option<String>,

    /// Referral code the user signed up with, if any.
    #[validate(length(max = 64, message = "Referral code is too long"))]
    pub referred_by: Option<String>,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileDto {
    #[validate(length(min = 1, max = 100, message = "Display name must be between 1-100 characters"))]
    pub display_name: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponseDto {
    pub status: String,
    #[serde(flatten)]
    pub user: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral_link: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LeaderboardResponseDto {
    pub status: String,
    pub leaderboard: Vec<LeaderboardEntry>,
}
