use std::sync::Arc;

use uuid::Uuid;

use super::{
    error::ServiceError,
    milestones::MilestoneTable,
    referral::{generate_referral_link, ReferralCodeGenerator},
    referral_validator::{validate, ReferralRequest},
};
use crate::{
    db::Store,
    models::{
        referralmodel::{NewReferral, Referral},
        usermodel::{email_label, NewUser, User},
    },
};

const REFERRER_FALLBACK_NAME: &str = "Someone";
const RECENT_ACTIVITY_LIMIT: i64 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct ReferralOutcome {
    pub referrer_name: String,
    pub milestone_unlocked: Option<String>,
}

/// What the credit step changed, kept so it can be undone.
#[derive(Debug)]
struct AppliedCredit {
    referrer_id: String,
    referrer_name: String,
    previous_milestone: Option<String>,
    milestone: Option<String>,
}

#[derive(Clone)]
pub struct ReferralService {
    db_client: Arc<dyn Store>,
    codes: ReferralCodeGenerator,
    milestones: MilestoneTable,
    fraud_checks: bool,
    app_url: String,
}

impl ReferralService {
    pub fn new(
        db_client: Arc<dyn Store>,
        codes: ReferralCodeGenerator,
        milestones: MilestoneTable,
        fraud_checks: bool,
        app_url: String,
    ) -> Self {
        Self {
            db_client,
            codes,
            milestones,
            fraud_checks,
            app_url,
        }
    }

    /// Validates the referral, records it, credits the referrer and stores
    /// the referred user. Later failures undo the earlier writes.
    pub async fn record_referral(
        &self,
        request: ReferralRequest,
    ) -> Result<ReferralOutcome, ServiceError> {
        let referrer = validate(self.db_client.as_ref(), &request, self.fraud_checks).await?;

        let referral = self
            .db_client
            .create_referral(NewReferral {
                referrer_id: request.referral_code.clone(),
                new_user_uid: request.new_user_uid.clone(),
                new_user_email: request.new_user_email.clone(),
                new_user_name: request.new_user_name.clone(),
                new_user_ip: request.new_user_ip.clone(),
            })
            .await
            .map_err(|err| {
                // Lost a race with an identical request after both passed validation.
                if err
                    .as_database_error()
                    .is_some_and(|db_err| db_err.is_unique_violation())
                {
                    ServiceError::DuplicateReferral
                } else {
                    ServiceError::Database(err)
                }
            })?;

        let credit = match self.credit_referrer(&referrer).await {
            Ok(credit) => credit,
            Err(err) => {
                self.discard_referral(referral.id).await;
                return Err(err);
            }
        };

        if let Err(err) = self.save_referred_user(&request).await {
            self.revert_credit(&credit).await;
            self.discard_referral(referral.id).await;
            return Err(err);
        }

        tracing::info!(
            referrer = %credit.referrer_id,
            new_user = %request.new_user_uid,
            milestone = ?credit.milestone,
            "referral recorded"
        );

        Ok(ReferralOutcome {
            referrer_name: credit.referrer_name,
            milestone_unlocked: credit.milestone,
        })
    }

    async fn credit_referrer(&self, referrer: &User) -> Result<AppliedCredit, ServiceError> {
        let referral_code = match referrer.referral_code {
            Some(_) => None,
            None => Some(self.codes.assign_unique(self.db_client.as_ref(), &referrer.id).await?),
        };

        let Some(updated) = self
            .db_client
            .credit_referrer(&referrer.id, referral_code)
            .await?
        else {
            return self.create_stub_referrer(referrer).await;
        };

        let mut credit = AppliedCredit {
            referrer_id: updated.id.clone(),
            referrer_name: updated.display_label(REFERRER_FALLBACK_NAME),
            previous_milestone: updated.milestone.clone(),
            milestone: None,
        };

        // Tiers follow the total returned by the increment, not the validated read.
        if let Some(label) = self
            .milestones
            .unlocked(updated.milestone.as_deref(), updated.points)
        {
            if let Err(err) = self.db_client.set_milestone(&updated.id, label).await {
                self.revert_credit(&credit).await;
                return Err(err.into());
            }
            credit.milestone = Some(label.to_string());
        }

        Ok(credit)
    }

    /// The referrer disappeared after validation; recreate a minimal record
    /// already holding this referral's point.
    async fn create_stub_referrer(&self, referrer: &User) -> Result<AppliedCredit, ServiceError> {
        tracing::warn!(referrer = %referrer.id, "referrer record missing, creating stub");

        let stub = self
            .db_client
            .save_user(NewUser {
                id: referrer.id.clone(),
                email: referrer.email.clone(),
                display_name: referrer.display_name.clone(),
                points: 1,
                referral_code: referrer.referral_code.clone(),
                referred_by: None,
            })
            .await?;

        Ok(AppliedCredit {
            referrer_id: stub.id.clone(),
            referrer_name: stub.display_label(REFERRER_FALLBACK_NAME),
            previous_milestone: None,
            milestone: None,
        })
    }

    async fn save_referred_user(&self, request: &ReferralRequest) -> Result<User, ServiceError> {
        let existing = self.db_client.get_user(&request.new_user_uid).await?;

        let referral_code = match existing.as_ref().and_then(|user| user.referral_code.as_ref()) {
            Some(_) => None,
            None => Some(
                self.codes
                    .assign_unique(self.db_client.as_ref(), &request.new_user_uid)
                    .await?,
            ),
        };

        let display_name = match request.new_user_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => Some(name.to_string()),
            _ if existing.is_none() => Some(email_label(&request.new_user_email)),
            _ => None,
        };

        let user = self
            .db_client
            .merge_user(NewUser {
                id: request.new_user_uid.clone(),
                email: request.new_user_email.clone(),
                display_name,
                points: 0,
                referral_code,
                referred_by: Some(request.referral_code.clone()),
            })
            .await?;

        Ok(user)
    }

    async fn revert_credit(&self, credit: &AppliedCredit) {
        if let Err(e) = self
            .db_client
            .revert_referral_credit(&credit.referrer_id, credit.previous_milestone.clone())
            .await
        {
            tracing::error!(
                referrer = %credit.referrer_id,
                "failed to revert referral credit: {}",
                e
            );
        }
    }

    async fn discard_referral(&self, referral_id: Uuid) {
        if let Err(e) = self.db_client.delete_referral(referral_id).await {
            tracing::error!(%referral_id, "failed to delete referral record: {}", e);
        }
    }

    /// The caller's code and shareable join link, assigning a code if the
    /// account predates code generation.
    pub async fn referral_link(&self, user_id: &str) -> Result<(String, String), ServiceError> {
        let user = self
            .db_client
            .get_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::UserNotFound(user_id.to_string()))?;

        let code = match user.referral_code {
            Some(code) => code,
            None => {
                let code = self.codes.assign_unique(self.db_client.as_ref(), user_id).await?;
                self.db_client
                    .merge_user(NewUser {
                        id: user.id.clone(),
                        email: user.email.clone(),
                        referral_code: Some(code),
                        ..NewUser::default()
                    })
                    .await?
                    .referral_code
                    .ok_or_else(|| ServiceError::UserNotFound(user_id.to_string()))?
            }
        };

        let link = generate_referral_link(&self.app_url, &code);
        Ok((code, link))
    }

    pub async fn recent_activity(&self, user_id: &str) -> Result<Vec<Referral>, ServiceError> {
        let user = self
            .db_client
            .get_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::UserNotFound(user_id.to_string()))?;

        let Some(code) = user.referral_code else {
            return Ok(Vec::new());
        };

        Ok(self
            .db_client
            .get_recent_referrals(&code, RECENT_ACTIVITY_LIMIT)
            .await?)
    }
}
