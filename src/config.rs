use std::time::Duration;

use thiserror::Error;

use crate::service::{milestones::MilestoneTable, referral::CodeStrategy};

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    /// Public base URL used to build join links.
    pub app_url: String,
    pub jwt_secret: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    pub admin_uids: Vec<String>,
    pub referral_fraud_checks: bool,
    pub referral_code_strategy: CodeStrategy,
    pub referral_code_length: usize,
    pub referral_code_max_attempts: u32,
    pub referral_code_backoff: Duration,
    pub milestones: MilestoneTable,
}

impl Config {
    pub fn init() -> Result<Config, ConfigError> {
        Config::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        let database_url = required("DATABASE_URL")?;
        let app_url = required("APP_URL")?.trim_end_matches('/').to_string();
        let jwt_secret = required("JWT_SECRET_KEY")?;

        let port = parse_or(&lookup, "PORT", 8000u16)?;
        let allowed_origins = lookup("ALLOWED_ORIGINS")
            .map(|value| split_list(&value))
            .unwrap_or_else(|| vec!["http://localhost:3000".to_string()]);
        let admin_uids = lookup("ADMIN_UIDS")
            .map(|value| split_list(&value))
            .unwrap_or_default();

        let referral_fraud_checks = parse_or(&lookup, "REFERRAL_FRAUD_CHECKS", false)?;
        let referral_code_strategy =
            parse_or(&lookup, "REFERRAL_CODE_STRATEGY", CodeStrategy::Random)?;
        let referral_code_length = parse_or(&lookup, "REFERRAL_CODE_LENGTH", 8usize)?;
        if !(4..=32).contains(&referral_code_length) {
            return Err(ConfigError::Invalid {
                key: "REFERRAL_CODE_LENGTH",
                reason: "must be between 4 and 32".to_string(),
            });
        }
        let referral_code_max_attempts = parse_or(&lookup, "REFERRAL_CODE_MAX_ATTEMPTS", 5u32)?;
        if referral_code_max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "REFERRAL_CODE_MAX_ATTEMPTS",
                reason: "must be at least 1".to_string(),
            });
        }
        let referral_code_backoff =
            Duration::from_millis(parse_or(&lookup, "REFERRAL_CODE_BACKOFF_MS", 20u64)?);
        let milestones = parse_or(&lookup, "MILESTONES", MilestoneTable::default())?;

        Ok(Config {
            database_url,
            app_url,
            jwt_secret,
            port,
            allowed_origins,
            admin_uids,
            referral_fraud_checks,
            referral_code_strategy,
            referral_code_length,
            referral_code_max_attempts,
            referral_code_backoff,
            milestones,
        })
    }

    pub fn is_admin(&self, user_id: &str) -> bool {
        self.admin_uids.iter().any(|uid| uid == user_id)
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key).filter(|value| !value.trim().is_empty()) {
        Some(value) => value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
