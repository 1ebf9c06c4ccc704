use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    dtos::{LeaderboardResponseDto, RegisterUserDto, UpdateProfileDto, UserResponseDto},
    error::HttpError,
    middleware::AuthenticatedUser,
    service::referral::generate_referral_link,
    AppState,
};

pub fn users_handler() -> Router {
    Router::new()
        .route("/", post(register_user))
        .route("/me", get(get_me).put(update_me))
        .route("/leaderboard", get(get_leaderboard))
}

fn user_response(app_state: &AppState, user: crate::models::usermodel::User) -> UserResponseDto {
    let referral_link = user
        .referral_code
        .as_deref()
        .map(|code| generate_referral_link(&app_state.env.app_url, code));

    UserResponseDto {
        status: "success".to_string(),
        user,
        referral_link,
    }
}

pub async fn register_user(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    body: Result<Json<RegisterUserDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let Json(body) = body?;
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let (record, created) = app_state
        .user_service
        .register(
            &user.uid,
            &user.email,
            body.display_name.as_deref(),
            body.referred_by.as_deref(),
        )
        .await?;

    let status = if created { StatusCode::CREATED } else { StatusCode::OK };
    Ok((status, Json(user_response(&app_state, record))))
}

pub async fn get_me(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, HttpError> {
    let record = app_state.user_service.get_profile(&user.uid).await?;

    Ok(Json(user_response(&app_state, record)))
}

pub async fn update_me(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    body: Result<Json<UpdateProfileDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let Json(body) = body?;
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let record = app_state
        .user_service
        .update_display_name(&user.uid, &body.display_name)
        .await?;

    Ok(Json(user_response(&app_state, record)))
}

pub async fn get_leaderboard(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, HttpError> {
    let leaderboard = app_state.user_service.leaderboard(&user.uid).await?;

    Ok(Json(LeaderboardResponseDto {
        status: "success".to_string(),
        leaderboard,
    }))
}
