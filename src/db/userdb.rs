use async_trait::async_trait;

use super::DBClient;
use crate::models::usermodel::{NewUser, User};

#[async_trait]
pub trait UserExt {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, sqlx::Error>;

    async fn get_user_by_referral_code(
        &self,
        referral_code: &str,
    ) -> Result<Option<User>, sqlx::Error>;

    async fn referral_code_exists(&self, referral_code: &str) -> Result<bool, sqlx::Error>;

    /// Inserts a new record. Fails if the id or referral code is taken.
    async fn save_user(&self, new_user: NewUser) -> Result<User, sqlx::Error>;

    /// Inserts or merges. `referralCode` and `referredBy` keep their stored
    /// values once set.
    async fn merge_user(&self, new_user: NewUser) -> Result<User, sqlx::Error>;

    /// Adds one point and sets the referral code when it is unset. Returns the
    /// record after the increment, or `None` if the user does not exist.
    async fn credit_referrer(
        &self,
        user_id: &str,
        referral_code: Option<String>,
    ) -> Result<Option<User>, sqlx::Error>;

    async fn set_milestone(&self, user_id: &str, milestone: &str) -> Result<(), sqlx::Error>;

    /// Undoes `credit_referrer`: removes one point and restores the milestone.
    async fn revert_referral_credit(
        &self,
        user_id: &str,
        previous_milestone: Option<String>,
    ) -> Result<(), sqlx::Error>;

    async fn update_display_name(
        &self,
        user_id: &str,
        display_name: &str,
    ) -> Result<Option<User>, sqlx::Error>;

    /// Deducts `cost` only if the balance covers it. Returns `None` otherwise.
    async fn spend_points(&self, user_id: &str, cost: i64) -> Result<Option<User>, sqlx::Error>;

    async fn refund_points(&self, user_id: &str, amount: i64) -> Result<(), sqlx::Error>;

    async fn get_users_by_points(&self, limit: i64) -> Result<Vec<User>, sqlx::Error>;
}

#[async_trait]
impl UserExt for DBClient {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, display_name, points, referral_code, referred_by, milestone, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_user_by_referral_code(
        &self,
        referral_code: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, display_name, points, referral_code, referred_by, milestone, created_at
            FROM users
            WHERE referral_code = $1
            LIMIT 1
            "#,
        )
        .bind(referral_code)
        .fetch_optional(&self.pool)
        .await
    }

    async fn referral_code_exists(&self, referral_code: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE referral_code = $1)",
        )
        .bind(referral_code)
        .fetch_one(&self.pool)
        .await
    }

    async fn save_user(&self, new_user: NewUser) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, display_name, points, referral_code, referred_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, email, display_name, points, referral_code, referred_by, milestone, created_at
            "#,
        )
        .bind(new_user.id)
        .bind(new_user.email)
        .bind(new_user.display_name)
        .bind(new_user.points)
        .bind(new_user.referral_code)
        .bind(new_user.referred_by)
        .fetch_one(&self.pool)
        .await
    }

    async fn merge_user(&self, new_user: NewUser) -> Result<User, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, display_name, points, referral_code, referred_by)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE
            SET email = EXCLUDED.email,
                display_name = COALESCE(EXCLUDED.display_name, users.display_name),
                referral_code = COALESCE(users.referral_code, EXCLUDED.referral_code),
                referred_by = COALESCE(users.referred_by, EXCLUDED.referred_by)
            RETURNING id, email, display_name, points, referral_code, referred_by, milestone, created_at
            "#,
        )
        .bind(new_user.id)
        .bind(new_user.email)
        .bind(new_user.display_name)
        .bind(new_user.points)
        .bind(new_user.referral_code)
        .bind(new_user.referred_by)
        .fetch_one(&self.pool)
        .await
    }

    async fn credit_referrer(
        &self,
        user_id: &str,
        referral_code: Option<String>,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET points = points + 1,
                referral_code = COALESCE(referral_code, $2)
            WHERE id = $1
            RETURNING id, email, display_name, points, referral_code, referred_by, milestone, created_at
            "#,
        )
        .bind(user_id)
        .bind(referral_code)
        .fetch_optional(&self.pool)
        .await
    }

    async fn set_milestone(&self, user_id: &str, milestone: &str) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET milestone = $2
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(milestone)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn revert_referral_credit(
        &self,
        user_id: &str,
        previous_milestone: Option<String>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            UPDATE users
            SET points = GREATEST(points - 1, 0), milestone = $2
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(previous_milestone)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_display_name(
        &self,
        user_id: &str,
        display_name: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET display_name = $2
            WHERE id = $1
            RETURNING id, email, display_name, points, referral_code, referred_by, milestone, created_at
            "#,
        )
        .bind(user_id)
        .bind(display_name)
        .fetch_optional(&self.pool)
        .await
    }

    async fn spend_points(&self, user_id: &str, cost: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET points = points - $2
            WHERE id = $1 AND points >= $2
            RETURNING id, email, display_name, points, referral_code, referred_by, milestone, created_at
            "#,
        )
        .bind(user_id)
        .bind(cost)
        .fetch_optional(&self.pool)
        .await
    }

    async fn refund_points(&self, user_id: &str, amount: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET points = points + $2 WHERE id = $1")
            .bind(user_id)
            .bind(amount)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn get_users_by_points(&self, limit: i64) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, display_name, points, referral_code, referred_by, milestone, created_at
            FROM users
            ORDER BY points DESC, created_at ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
    }
}
