//! In-memory `Store` used by the unit and router tests.

use std::{
    collections::{HashMap, HashSet},
    fmt,
    sync::Mutex,
};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::error::{DatabaseError, ErrorKind};
use uuid::Uuid;

use super::{ReferralExt, ShopExt, UserExt};
use crate::models::{
    referralmodel::{NewReferral, Referral},
    shopmodel::{Claim, NewClaim, NewShopItem, ShopItem},
    usermodel::{NewUser, User},
};

#[derive(Default)]
struct State {
    users: HashMap<String, User>,
    referrals: Vec<Referral>,
    shop_items: Vec<ShopItem>,
    claims: Vec<Claim>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    failing: Mutex<HashSet<&'static str>>,
    conflicting: Mutex<HashSet<&'static str>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later call to `operation` fail with a protocol error.
    pub fn fail_on(&self, operation: &'static str) {
        self.failing.lock().unwrap().insert(operation);
    }

    /// Makes every later call to `operation` fail with a unique violation, as
    /// when a concurrent request wins the insert.
    pub fn conflict_on(&self, operation: &'static str) {
        self.conflicting.lock().unwrap().insert(operation);
    }

    pub fn insert_user(&self, id: &str, email: &str, points: i64, referral_code: Option<&str>) -> User {
        let user = User {
            id: id.to_string(),
            email: email.to_string(),
            display_name: None,
            points,
            referral_code: referral_code.map(str::to_string),
            referred_by: None,
            milestone: None,
            created_at: Utc::now(),
        };
        self.state.lock().unwrap().users.insert(id.to_string(), user.clone());
        user
    }

    pub fn update_user(&self, id: &str, update: impl FnOnce(&mut User)) {
        if let Some(user) = self.state.lock().unwrap().users.get_mut(id) {
            update(user);
        }
    }

    pub fn remove_user(&self, id: &str) {
        self.state.lock().unwrap().users.remove(id);
    }

    pub fn user(&self, id: &str) -> Option<User> {
        self.state.lock().unwrap().users.get(id).cloned()
    }

    pub fn referrals(&self) -> Vec<Referral> {
        self.state.lock().unwrap().referrals.clone()
    }

    pub fn claims(&self) -> Vec<Claim> {
        self.state.lock().unwrap().claims.clone()
    }

    pub fn insert_shop_item(&self, name: &str, cost: i64) -> ShopItem {
        let item = ShopItem {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: format!("{name} description"),
            cost,
            image: None,
        };
        self.state.lock().unwrap().shop_items.push(item.clone());
        item
    }

    fn check(&self, operation: &'static str) -> Result<(), sqlx::Error> {
        if self.failing.lock().unwrap().contains(operation) {
            return Err(sqlx::Error::Protocol(format!("injected failure in {operation}")));
        }
        if self.conflicting.lock().unwrap().contains(operation) {
            return Err(unique_violation(operation));
        }
        Ok(())
    }
}

#[derive(Debug)]
struct UniqueViolation(String);

impl fmt::Display for UniqueViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for UniqueViolation {}

impl DatabaseError for UniqueViolation {
    fn message(&self) -> &str {
        &self.0
    }

    fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
        self
    }

    fn kind(&self) -> ErrorKind {
        ErrorKind::UniqueViolation
    }
}

fn unique_violation(what: &str) -> sqlx::Error {
    sqlx::Error::Database(Box::new(UniqueViolation(format!(
        "duplicate key value violates unique constraint on {what}"
    ))))
}

#[async_trait]
impl UserExt for MemoryStore {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, sqlx::Error> {
        self.check("get_user")?;
        Ok(self.user(user_id))
    }

    async fn get_user_by_referral_code(
        &self,
        referral_code: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        self.check("get_user_by_referral_code")?;
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .values()
            .find(|user| user.referral_code.as_deref() == Some(referral_code))
            .cloned())
    }

    async fn referral_code_exists(&self, referral_code: &str) -> Result<bool, sqlx::Error> {
        self.check("referral_code_exists")?;
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .values()
            .any(|user| user.referral_code.as_deref() == Some(referral_code)))
    }

    async fn save_user(&self, new_user: NewUser) -> Result<User, sqlx::Error> {
        self.check("save_user")?;
        let mut state = self.state.lock().unwrap();
        if state.users.contains_key(&new_user.id) {
            return Err(unique_violation("users.id"));
        }
        if let Some(code) = &new_user.referral_code {
            if state.users.values().any(|u| u.referral_code.as_ref() == Some(code)) {
                return Err(unique_violation("users.referral_code"));
            }
        }
        let user = User {
            id: new_user.id.clone(),
            email: new_user.email,
            display_name: new_user.display_name,
            points: new_user.points,
            referral_code: new_user.referral_code,
            referred_by: new_user.referred_by,
            milestone: None,
            created_at: Utc::now(),
        };
        state.users.insert(new_user.id, user.clone());
        Ok(user)
    }

    async fn merge_user(&self, new_user: NewUser) -> Result<User, sqlx::Error> {
        self.check("merge_user")?;
        let mut state = self.state.lock().unwrap();
        let user = state.users.entry(new_user.id.clone()).or_insert_with(|| User {
            id: new_user.id.clone(),
            email: new_user.email.clone(),
            display_name: None,
            points: new_user.points,
            referral_code: None,
            referred_by: None,
            milestone: None,
            created_at: Utc::now(),
        });
        user.email = new_user.email;
        if new_user.display_name.is_some() {
            user.display_name = new_user.display_name;
        }
        if user.referral_code.is_none() {
            user.referral_code = new_user.referral_code;
        }
        if user.referred_by.is_none() {
            user.referred_by = new_user.referred_by;
        }
        Ok(user.clone())
    }

    async fn credit_referrer(
        &self,
        user_id: &str,
        referral_code: Option<String>,
    ) -> Result<Option<User>, sqlx::Error> {
        self.check("credit_referrer")?;
        let mut state = self.state.lock().unwrap();
        let Some(user) = state.users.get_mut(user_id) else {
            return Ok(None);
        };
        user.points += 1;
        if user.referral_code.is_none() {
            user.referral_code = referral_code;
        }
        Ok(Some(user.clone()))
    }

    async fn set_milestone(&self, user_id: &str, milestone: &str) -> Result<(), sqlx::Error> {
        self.check("set_milestone")?;
        if let Some(user) = self.state.lock().unwrap().users.get_mut(user_id) {
            user.milestone = Some(milestone.to_string());
        }
        Ok(())
    }

    async fn revert_referral_credit(
        &self,
        user_id: &str,
        previous_milestone: Option<String>,
    ) -> Result<(), sqlx::Error> {
        self.check("revert_referral_credit")?;
        if let Some(user) = self.state.lock().unwrap().users.get_mut(user_id) {
            user.points = (user.points - 1).max(0);
            user.milestone = previous_milestone;
        }
        Ok(())
    }

    async fn update_display_name(
        &self,
        user_id: &str,
        display_name: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        self.check("update_display_name")?;
        let mut state = self.state.lock().unwrap();
        Ok(state.users.get_mut(user_id).map(|user| {
            user.display_name = Some(display_name.to_string());
            user.clone()
        }))
    }

    async fn spend_points(&self, user_id: &str, cost: i64) -> Result<Option<User>, sqlx::Error> {
        self.check("spend_points")?;
        let mut state = self.state.lock().unwrap();
        Ok(state
            .users
            .get_mut(user_id)
            .filter(|user| user.points >= cost)
            .map(|user| {
                user.points -= cost;
                user.clone()
            }))
    }

    async fn refund_points(&self, user_id: &str, amount: i64) -> Result<(), sqlx::Error> {
        self.check("refund_points")?;
        if let Some(user) = self.state.lock().unwrap().users.get_mut(user_id) {
            user.points += amount;
        }
        Ok(())
    }

    async fn get_users_by_points(&self, limit: i64) -> Result<Vec<User>, sqlx::Error> {
        self.check("get_users_by_points")?;
        let state = self.state.lock().unwrap();
        let mut users: Vec<User> = state.users.values().cloned().collect();
        users.sort_by(|a, b| b.points.cmp(&a.points).then(a.created_at.cmp(&b.created_at)));
        users.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(users)
    }
}

#[async_trait]
impl ReferralExt for MemoryStore {
    async fn referral_exists_for_user(&self, new_user_uid: &str) -> Result<bool, sqlx::Error> {
        self.check("referral_exists_for_user")?;
        let state = self.state.lock().unwrap();
        Ok(state.referrals.iter().any(|r| r.new_user_uid == new_user_uid))
    }

    async fn referral_exists_for_email(&self, new_user_email: &str) -> Result<bool, sqlx::Error> {
        self.check("referral_exists_for_email")?;
        let state = self.state.lock().unwrap();
        Ok(state
            .referrals
            .iter()
            .any(|r| r.new_user_email.eq_ignore_ascii_case(new_user_email)))
    }

    async fn referral_exists_for_ip(&self, new_user_ip: &str) -> Result<bool, sqlx::Error> {
        self.check("referral_exists_for_ip")?;
        let state = self.state.lock().unwrap();
        Ok(state
            .referrals
            .iter()
            .any(|r| r.new_user_ip.as_deref() == Some(new_user_ip)))
    }

    async fn create_referral(&self, referral: NewReferral) -> Result<Referral, sqlx::Error> {
        self.check("create_referral")?;
        let mut state = self.state.lock().unwrap();
        if state.referrals.iter().any(|r| r.new_user_uid == referral.new_user_uid) {
            return Err(unique_violation("referrals.new_user_uid"));
        }
        let record = Referral {
            id: Uuid::new_v4(),
            referrer_id: referral.referrer_id,
            new_user_uid: referral.new_user_uid,
            new_user_email: referral.new_user_email,
            new_user_name: referral.new_user_name,
            new_user_ip: referral.new_user_ip,
            created_at: Utc::now(),
        };
        state.referrals.push(record.clone());
        Ok(record)
    }

    async fn delete_referral(&self, referral_id: Uuid) -> Result<(), sqlx::Error> {
        self.check("delete_referral")?;
        self.state.lock().unwrap().referrals.retain(|r| r.id != referral_id);
        Ok(())
    }

    async fn get_recent_referrals(
        &self,
        referrer_id: &str,
        limit: i64,
    ) -> Result<Vec<Referral>, sqlx::Error> {
        self.check("get_recent_referrals")?;
        let state = self.state.lock().unwrap();
        let mut referrals: Vec<Referral> = state
            .referrals
            .iter()
            .filter(|r| r.referrer_id == referrer_id)
            .cloned()
            .collect();
        referrals.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        referrals.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(referrals)
    }
}

#[async_trait]
impl ShopExt for MemoryStore {
    async fn get_shop_items(&self) -> Result<Vec<ShopItem>, sqlx::Error> {
        self.check("get_shop_items")?;
        Ok(self.state.lock().unwrap().shop_items.clone())
    }

    async fn get_shop_item(&self, item_id: Uuid) -> Result<Option<ShopItem>, sqlx::Error> {
        self.check("get_shop_item")?;
        let state = self.state.lock().unwrap();
        Ok(state.shop_items.iter().find(|item| item.id == item_id).cloned())
    }

    async fn create_shop_item(&self, item: NewShopItem) -> Result<ShopItem, sqlx::Error> {
        self.check("create_shop_item")?;
        let item = ShopItem {
            id: Uuid::new_v4(),
            name: item.name,
            description: item.description,
            cost: item.cost,
            image: item.image,
        };
        self.state.lock().unwrap().shop_items.push(item.clone());
        Ok(item)
    }

    async fn create_claim(&self, claim: NewClaim) -> Result<Claim, sqlx::Error> {
        self.check("create_claim")?;
        let claim = Claim {
            id: Uuid::new_v4(),
            user_id: claim.user_id,
            user_email: claim.user_email,
            product_id: claim.product_id,
            product_name: claim.product_name,
            image_url: claim.image_url,
            points_spent: claim.points_spent,
            claimed_at: Utc::now(),
        };
        self.state.lock().unwrap().claims.push(claim.clone());
        Ok(claim)
    }

    async fn get_user_claims(&self, user_id: &str) -> Result<Vec<Claim>, sqlx::Error> {
        self.check("get_user_claims")?;
        let state = self.state.lock().unwrap();
        let mut claims: Vec<Claim> = state
            .claims
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        claims.sort_by(|a, b| b.claimed_at.cmp(&a.claimed_at));
        Ok(claims)
    }
}
