use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod constants;
mod decoding;
mod error;
mod integrations;
mod models;
mod services;

use config::Config;
use constants::API_VERSION;
use integrations::ToriiClient;
use services::RealmService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "realm_resource_viewer=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting Realm Resource Viewer");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("API Version: {}", API_VERSION);

    let calibration = config.load_calibration()?;
    calibration.validate()?;

    let torii = ToriiClient::new(&config.torii_sql_url, config.query_timeout())?;
    tracing::info!("Torii SQL endpoint: {}", config.torii_sql_url);

    let realms = RealmService::new(Arc::new(torii), calibration, config.realm_cache_size);

    let app_state = api::AppState {
        config: config.clone(),
        realms: Arc::new(realms),
    };

    // Build router
    let app = build_router(app_state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: api::AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        // Realms
        .route("/api/v1/realms", get(api::realms::list_realms))
        .route("/api/v1/realms/{realm_id}", get(api::realms::get_realm))
        // Offline decoding
        .route(
            "/api/v1/resources/decode",
            post(api::resources::decode_record),
        )
        .route(
            "/api/v1/resources/classify/{field}",
            get(api::resources::classify_field),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
