use std::{fmt, str::FromStr, time::Duration};

use rand::{distr::Alphanumeric, Rng};

use super::error::ServiceError;
use crate::db::UserExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeStrategy {
    /// Uppercase alphanumeric characters.
    Random,
    /// First six characters of the UID plus a three-digit suffix.
    UidPrefix,
}

impl FromStr for CodeStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random" => Ok(CodeStrategy::Random),
            "uid-prefix" => Ok(CodeStrategy::UidPrefix),
            other => Err(format!("unknown referral code strategy {other:?}")),
        }
    }
}

impl fmt::Display for CodeStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodeStrategy::Random => f.write_str("random"),
            CodeStrategy::UidPrefix => f.write_str("uid-prefix"),
        }
    }
}

pub fn generate_referral_code(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect::<String>()
        .to_uppercase()
}

pub fn generate_uid_prefixed_code(user_id: &str) -> String {
    let prefix: String = user_id.chars().take(6).collect();
    format!("{}{}", prefix, rand::rng().random_range(100..1000))
}

pub fn generate_referral_link(base_url: &str, code: &str) -> String {
    format!("{}/join?ref={}", base_url, urlencoding::encode(code))
}

/// Produces candidate codes and checks them against the user store.
#[derive(Debug, Clone)]
pub struct ReferralCodeGenerator {
    strategy: CodeStrategy,
    length: usize,
    max_attempts: u32,
    base_backoff: Duration,
}

impl ReferralCodeGenerator {
    pub fn new(strategy: CodeStrategy, length: usize, max_attempts: u32, base_backoff: Duration) -> Self {
        ReferralCodeGenerator {
            strategy,
            length,
            max_attempts: max_attempts.max(1),
            base_backoff,
        }
    }

    pub fn candidate(&self, user_id: &str) -> String {
        match self.strategy {
            CodeStrategy::Random => generate_referral_code(self.length),
            CodeStrategy::UidPrefix => generate_uid_prefixed_code(user_id),
        }
    }

    /// A code absent from every user record at the time of the check.
    pub async fn assign_unique<S>(&self, store: &S, user_id: &str) -> Result<String, ServiceError>
    where
        S: UserExt + Sync + ?Sized,
    {
        self.assign_unique_with(store, || self.candidate(user_id)).await
    }

    pub async fn assign_unique_with<S, F>(
        &self,
        store: &S,
        mut next_candidate: F,
    ) -> Result<String, ServiceError>
    where
        S: UserExt + Sync + ?Sized,
        F: FnMut() -> String + Send,
    {
        for attempt in 0..self.max_attempts {
            let code = next_candidate();
            if !store.referral_code_exists(&code).await? {
                return Ok(code);
            }

            tracing::warn!(attempt = attempt + 1, "referral code collision");
            if attempt + 1 < self.max_attempts {
                tokio::time::sleep(self.base_backoff.saturating_mul(1 << attempt.min(16))).await;
            }
        }

        Err(ServiceError::CodeGenerationExhausted(self.max_attempts))
    }
}
