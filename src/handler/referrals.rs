use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    http::HeaderMap,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use validator::{Validate, ValidationErrors};

use crate::{
    dtos::{CreateReferralDto, ReferralActivityDto, ReferralLinkDto, ReferralResponseDto},
    error::{ErrorMessage, HttpError},
    middleware::{auth, AuthenticatedUser},
    AppState,
};

pub fn referral_handler() -> Router {
    // Called during signup, before the new account can present a token.
    let public_routes = Router::new().route("/", post(create_referral));

    let protected_routes = Router::new()
        .route("/link", get(get_referral_link))
        .route("/activity", get(get_referral_activity))
        .layer(middleware::from_fn(auth));

    Router::new().merge(public_routes).merge(protected_routes)
}

fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
}

/// Empty fields win over a malformed email.
fn validation_error(errors: ValidationErrors) -> HttpError {
    let missing = errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .any(|err| err.code == "length");

    if missing {
        HttpError::bad_request(ErrorMessage::MissingFields.to_string())
    } else {
        HttpError::bad_request(ErrorMessage::InvalidEmail.to_string())
    }
}

pub async fn create_referral(
    Extension(app_state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    body: Result<Json<CreateReferralDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let Json(body) = body?;
    let body = body.trimmed();
    body.validate().map_err(validation_error)?;

    let outcome = app_state
        .referral_service
        .record_referral(body.into_request(forwarded_ip(&headers)))
        .await?;

    Ok(Json(ReferralResponseDto::from(outcome)))
}

pub async fn get_referral_link(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, HttpError> {
    let (referral_code, referral_link) = app_state.referral_service.referral_link(&user.uid).await?;

    Ok(Json(ReferralLinkDto {
        referral_code,
        referral_link,
    }))
}

pub async fn get_referral_activity(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, HttpError> {
    let referrals = app_state.referral_service.recent_activity(&user.uid).await?;

    Ok(Json(ReferralActivityDto::filter_referrals(&referrals)))
}
