use super::error::ServiceError;
use crate::{
    db::{ReferralExt, UserExt},
    models::usermodel::User,
};

/// A proposed referral as submitted during signup.
#[derive(Debug, Clone)]
pub struct ReferralRequest {
    pub referral_code: String,
    pub new_user_uid: String,
    pub new_user_email: String,
    pub new_user_name: Option<String>,
    pub new_user_ip: Option<String>,
}

/// Read-only admissibility checks. Returns the referrer on success.
pub async fn validate<S>(
    store: &S,
    request: &ReferralRequest,
    fraud_checks: bool,
) -> Result<User, ServiceError>
where
    S: UserExt + ReferralExt + Sync + ?Sized,
{
    if request.referral_code == request.new_user_uid {
        return Err(ServiceError::SelfReferral);
    }

    let referrer = store
        .get_user_by_referral_code(&request.referral_code)
        .await?
        .ok_or(ServiceError::InvalidReferralCode)?;

    if referrer.id == request.new_user_uid {
        return Err(ServiceError::SelfReferral);
    }

    if store.referral_exists_for_user(&request.new_user_uid).await? {
        return Err(ServiceError::DuplicateReferral);
    }

    if fraud_checks {
        if store.referral_exists_for_email(&request.new_user_email).await? {
            return Err(ServiceError::DuplicateEmail);
        }

        if let Some(ip) = request.new_user_ip.as_deref() {
            if store.referral_exists_for_ip(ip).await? {
                return Err(ServiceError::DuplicateIpAddress);
            }
        }
    }

    Ok(referrer)
}
