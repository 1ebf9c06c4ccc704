pub mod error;
pub mod milestones;
pub mod referral;
pub mod referral_service;
pub mod referral_validator;
pub mod shop_service;
pub mod user_service;
