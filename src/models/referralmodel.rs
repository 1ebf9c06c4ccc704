use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Referral {
    pub id: Uuid,
    /// Referral code of the credited user.
    pub referrer_id: String,
    #[serde(rename = "newUserUID")]
    pub new_user_uid: String,
    pub new_user_email: String,
    pub new_user_name: Option<String>,
    #[serde(rename = "newUserIP")]
    pub new_user_ip: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReferral {
    pub referrer_id: String,
    pub new_user_uid: String,
    pub new_user_email: String,
    pub new_user_name: Option<String>,
    pub new_user_ip: Option<String>,
}
