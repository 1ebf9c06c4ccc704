use thiserror::Error;
use uuid::Uuid;

use crate::error::{ErrorMessage, HttpError};

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Invalid referral code.")]
    InvalidReferralCode,

    #[error("You cannot refer yourself.")]
    SelfReferral,

    #[error("User has already been referred.")]
    DuplicateReferral,

    #[error("This email has already been referred.")]
    DuplicateEmail,

    #[error("This network address has already been used for a referral.")]
    DuplicateIpAddress,

    #[error("Could not generate a unique referral code after {0} attempts")]
    CodeGenerationExhausted(u32),

    #[error("You need {required} points to claim this.")]
    InsufficientPoints { required: i64, available: i64 },

    #[error("User {0} not found")]
    UserNotFound(String),

    #[error("Shop item {0} not found")]
    ShopItemNotFound(Uuid),

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::InvalidReferralCode
            | ServiceError::SelfReferral
            | ServiceError::DuplicateReferral
            | ServiceError::DuplicateEmail
            | ServiceError::DuplicateIpAddress
            | ServiceError::Validation(_) => HttpError::bad_request(error.to_string()),

            ServiceError::InsufficientPoints { .. } => HttpError::payment_required(error.to_string()),

            ServiceError::UserNotFound(_) => {
                HttpError::not_found(ErrorMessage::UserNotFound.to_string())
            }
            ServiceError::ShopItemNotFound(_) => {
                HttpError::not_found(ErrorMessage::ShopItemNotFound.to_string())
            }

            ServiceError::CodeGenerationExhausted(_) | ServiceError::Database(_) => {
                tracing::error!("internal failure: {}", error);
                HttpError::server_error()
            }
        }
    }
}
