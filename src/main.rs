mod config;
mod db;
mod dtos;
mod error;
mod handler;
mod middleware;
mod models;
mod routes;
mod service;
mod utils;

use std::sync::Arc;

use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use config::Config;
use db::{DBClient, Store};
use dotenv::dotenv;
use routes::create_router;
use service::{
    referral::ReferralCodeGenerator, referral_service::ReferralService,
    shop_service::ShopService, user_service::UserService,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::filter::LevelFilter;

#[derive(Clone)]
pub struct AppState {
    pub env: Config,
    pub referral_service: Arc<ReferralService>,
    pub user_service: Arc<UserService>,
    pub shop_service: Arc<ShopService>,
}

impl AppState {
    pub fn new(db_client: Arc<dyn Store>, env: Config) -> Self {
        let codes = ReferralCodeGenerator::new(
            env.referral_code_strategy,
            env.referral_code_length,
            env.referral_code_max_attempts,
            env.referral_code_backoff,
        );

        let referral_service = Arc::new(ReferralService::new(
            db_client.clone(),
            codes.clone(),
            env.milestones.clone(),
            env.referral_fraud_checks,
            env.app_url.clone(),
        ));
        let user_service = Arc::new(UserService::new(db_client.clone(), codes));
        let shop_service = Arc::new(ShopService::new(db_client));

        Self {
            env,
            referral_service,
            user_service,
            shop_service,
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::DEBUG)
        .init();

    dotenv().ok();

    let config = match Config::init() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("invalid configuration: {}", err);
            std::process::exit(1);
        }
    };

    let pool = match PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            tracing::info!("connection to the database is successful");
            pool
        }
        Err(err) => {
            tracing::error!("failed to connect to the database: {:?}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = sqlx::migrate!("./migrations").run(&pool).await {
        tracing::error!("failed to run migrations: {:?}", err);
        std::process::exit(1);
    }

    let allowed_origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT]);

    let db_client: Arc<dyn Store> = Arc::new(DBClient::new(pool));
    let app_state = AppState::new(db_client, config.clone());

    let app = create_router(Arc::new(app_state)).layer(cors);

    let listener = match tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind port {}: {}", config.port, err);
            std::process::exit(1);
        }
    };

    tracing::info!("server is running on http://localhost:{}", config.port);

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!("server error: {}", err);
    }
}
