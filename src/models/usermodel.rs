use chrono::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Opaque UID issued by the identity provider.
    pub id: String,
    pub email: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub points: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral_code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub referred_by: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Trimmed `displayName`, then `email`, then `fallback`.
    pub fn display_label(&self, fallback: &str) -> String {
        self.display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .or_else(|| Some(self.email.as_str()).filter(|email| !email.is_empty()))
            .unwrap_or(fallback)
            .to_string()
    }
}

/// Fields for inserting or merging a user record.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub points: i64,
    pub referral_code: Option<String>,
    pub referred_by: Option<String>,
}

/// Label derived from an email address when no display name was given.
pub fn email_label(email: &str) -> String {
    email.split('@').next().unwrap_or(email).to_string()
}
