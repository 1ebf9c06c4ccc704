use sqlx::{Pool, Postgres};

pub mod referraldb;
pub mod shopdb;
pub mod userdb;

#[cfg(test)]
pub mod memory;

pub use referraldb::ReferralExt;
pub use shopdb::ShopExt;
pub use userdb::UserExt;

#[derive(Debug, Clone)]
pub struct DBClient {
    pool: Pool<Postgres>,
}

impl DBClient {
    pub fn new(pool: Pool<Postgres>) -> Self {
        DBClient { pool }
    }
}

/// Every collection the application reads and writes.
pub trait Store: UserExt + ReferralExt + ShopExt + Send + Sync {}

impl<T> Store for T where T: UserExt + ReferralExt + ShopExt + Send + Sync {}
