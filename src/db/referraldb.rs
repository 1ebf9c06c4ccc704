use async_trait::async_trait;
use uuid::Uuid;

use super::DBClient;
use crate::models::referralmodel::{NewReferral, Referral};

#[async_trait]
pub trait ReferralExt {
    async fn referral_exists_for_user(&self, new_user_uid: &str) -> Result<bool, sqlx::Error>;

    async fn referral_exists_for_email(&self, new_user_email: &str) -> Result<bool, sqlx::Error>;

    async fn referral_exists_for_ip(&self, new_user_ip: &str) -> Result<bool, sqlx::Error>;

    async fn create_referral(&self, referral: NewReferral) -> Result<Referral, sqlx::Error>;

    async fn delete_referral(&self, referral_id: Uuid) -> Result<(), sqlx::Error>;

    /// Newest first.
    async fn get_recent_referrals(
        &self,
        referrer_id: &str,
        limit: i64,
    ) -> Result<Vec<Referral>, sqlx::Error>;
}

#[async_trait]
impl ReferralExt for DBClient {
    async fn referral_exists_for_user(&self, new_user_uid: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM referrals WHERE new_user_uid = $1)",
        )
        .bind(new_user_uid)
        .fetch_one(&self.pool)
        .await
    }

    async fn referral_exists_for_email(&self, new_user_email: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM referrals WHERE LOWER(new_user_email) = LOWER($1))",
        )
        .bind(new_user_email)
        .fetch_one(&self.pool)
        .await
    }

    async fn referral_exists_for_ip(&self, new_user_ip: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM referrals WHERE new_user_ip = $1)",
        )
        .bind(new_user_ip)
        .fetch_one(&self.pool)
        .await
    }

    async fn create_referral(&self, referral: NewReferral) -> Result<Referral, sqlx::Error> {
        sqlx::query_as::<_, Referral>(
            r#"
            INSERT INTO referrals (referrer_id, new_user_uid, new_user_email, new_user_name, new_user_ip)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, referrer_id, new_user_uid, new_user_email, new_user_name, new_user_ip, created_at
            "#,
        )
        .bind(referral.referrer_id)
        .bind(referral.new_user_uid)
        .bind(referral.new_user_email)
        .bind(referral.new_user_name)
        .bind(referral.new_user_ip)
        .fetch_one(&self.pool)
        .await
    }

    async fn delete_referral(&self, referral_id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM referrals WHERE id = $1")
            .bind(referral_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn get_recent_referrals(
        &self,
        referrer_id: &str,
        limit: i64,
    ) -> Result<Vec<Referral>, sqlx::Error> {
        sqlx::query_as::<_, Referral>(
            r#"
            SELECT id, referrer_id, new_user_uid, new_user_email, new_user_name, new_user_ip, created_at
            FROM referrals
            WHERE referrer_id = $1
            ORDER BY created_at DESC
            LIMIT $2
            "#,
        )
        .bind(referrer_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }
}
