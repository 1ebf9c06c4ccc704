pub mod referrals;
pub mod shop;
pub mod users;
