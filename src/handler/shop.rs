use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path},
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{ClaimListResponseDto, ClaimResponseDto, CreateShopItemDto},
    error::HttpError,
    middleware::{admin_only, auth, AuthenticatedUser},
    AppState,
};

pub fn shop_handler() -> Router {
    let public_routes = Router::new().route("/", get(get_shop_items));

    let admin_routes = Router::new()
        .route("/", post(create_shop_item))
        .layer(middleware::from_fn(admin_only))
        .layer(middleware::from_fn(auth));

    let member_routes = Router::new()
        .route("/:id/claim", post(claim_shop_item))
        .layer(middleware::from_fn(auth));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .merge(member_routes)
}

pub fn claims_handler() -> Router {
    Router::new()
        .route("/", get(get_my_claims))
        .layer(middleware::from_fn(auth))
}

pub async fn get_shop_items(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let items = app_state.shop_service.list_items().await?;

    Ok(Json(items))
}

pub async fn create_shop_item(
    Extension(app_state): Extension<Arc<AppState>>,
    body: Result<Json<CreateShopItemDto>, JsonRejection>,
) -> Result<impl IntoResponse, HttpError> {
    let Json(body) = body?;
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let item = app_state.shop_service.add_item(body.into()).await?;

    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn claim_shop_item(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(item_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let outcome = app_state.shop_service.claim_item(&user.uid, item_id).await?;

    Ok(Json(ClaimResponseDto {
        success: true,
        message: format!("You successfully claimed {}!", outcome.claim.product_name),
        claim: outcome.claim,
        remaining_points: outcome.remaining_points,
    }))
}

pub async fn get_my_claims(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, HttpError> {
    let claims = app_state.shop_service.user_claims(&user.uid).await?;

    Ok(Json(ClaimListResponseDto {
        status: "success".to_string(),
        claims,
    }))
}
