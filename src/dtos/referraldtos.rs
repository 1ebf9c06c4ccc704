use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{
    models::referralmodel::Referral,
    service::{referral_service::ReferralOutcome, referral_validator::ReferralRequest},
};

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReferralDto {
    #[serde(default)]
    #[validate(
        length(min = 1, message = "newUserEmail is required"),
        email(message = "newUserEmail must be a valid email")
    )]
    pub new_user_email: String,

    #[serde(default, rename = "newUserUID")]
    #[validate(length(min = 1, message = "newUserUID is required"))]
    pub new_user_uid: String,

    pub new_user_name: Option<String>,

    /// The referral code taken from the join link.
    #[serde(default)]
    #[validate(length(min = 1, message = "referrerId is required"))]
    pub referrer_id: String,

    #[serde(rename = "newUserIP")]
    pub new_user_ip: Option<String>,
}

impl CreateReferralDto {
    pub fn trimmed(self) -> Self {
        let non_empty = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        CreateReferralDto {
            new_user_email: self.new_user_email.trim().to_string(),
            new_user_uid: self.new_user_uid.trim().to_string(),
            new_user_name: non_empty(self.new_user_name),
            referrer_id: self.referrer_id.trim().to_string(),
            new_user_ip: non_empty(self.new_user_ip),
        }
    }

    pub fn into_request(self, fallback_ip: Option<String>) -> ReferralRequest {
        ReferralRequest {
            referral_code: self.referrer_id,
            new_user_uid: self.new_user_uid,
            new_user_email: self.new_user_email,
            new_user_name: self.new_user_name,
            new_user_ip: self.new_user_ip.or(fallback_ip),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReferralResponseDto {
    pub success: bool,
    pub message: String,
    pub referrer_name: String,
    pub milestone_unlocked: Option<String>,
}

impl From<ReferralOutcome> for ReferralResponseDto {
    fn from(outcome: ReferralOutcome) -> Self {
        ReferralResponseDto {
            success: true,
            message: "Referral recorded.".to_string(),
            referrer_name: outcome.referrer_name,
            milestone_unlocked: outcome.milestone_unlocked,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralLinkDto {
    pub referral_code: String,
    pub referral_link: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralActivityDto {
    pub id: Uuid,
    pub new_user_email: String,
    pub created_at: DateTime<Utc>,
}

impl ReferralActivityDto {
    pub fn filter_referrals(referrals: &[Referral]) -> Vec<ReferralActivityDto> {
        referrals
            .iter()
            .map(|referral| ReferralActivityDto {
                id: referral.id,
                new_user_email: referral.new_user_email.clone(),
                created_at: referral.created_at,
            })
            .collect()
    }
}
