mod config;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use banter_api::auth::{self, AppState, AppStateInner};
use banter_api::friends;
use banter_api::mail::SmtpMailer;
use banter_api::messages;
use banter_api::middleware::require_auth;
use banter_api::otp;
use banter_api::session::SessionService;

use crate::config::{AppConfig, Environment};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "banter=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let config = AppConfig::from_env()?;

    // Init database
    let db = banter_db::Database::open(&PathBuf::from(&config.db_path))?;

    // Services wired from the config object, not ambient state
    let mailer = Arc::new(SmtpMailer::new(&config.smtp)?);
    let sessions = SessionService::new(
        config.jwt_secret.clone(),
        config.environment == Environment::Production,
    );

    let state: AppState = Arc::new(AppStateInner {
        db,
        sessions,
        mailer,
    });

    // Routes
    let public_routes = Router::new()
        .route("/user/signup", post(auth::signup))
        .route("/auth/otp/request", post(otp::request_code))
        .route("/auth/otp/verify", post(otp::verify_code))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/user/me", get(auth::me))
        .route("/user/friends", post(friends::add_friend))
        .route("/messages", post(messages::send_message))
        .route("/messages/{peer_id}", get(messages::get_messages))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state);

    let app = Router::new()
        .route("/", get(|| async { "Server is running" }))
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors_layer(&config)?)
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Banter server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Cookies require credentialed CORS, so origins are an explicit allow-list.
fn cors_layer(config: &AppConfig) -> anyhow::Result<CorsLayer> {
    let origins = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>()
                .map_err(|_| anyhow::anyhow!("invalid CORS origin: {}", o))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true))
}
