//! E-Paper Backend - library for app logic and testing
//!
//! The HTTP API lives in [`routes`]. [`directory::EpaperReader`] and
//! [`viewer::DocumentViewer`] are client-facing models of a reader's session
//! and of the PDF viewer; the server itself only uses
//! [`directory::EpaperDirectory`].

pub mod config;
pub mod db;
pub mod directory;
pub mod error;
pub mod logging;
pub mod routes;
pub mod state;
pub mod storage;
pub mod viewer;

#[cfg(test)]
pub(crate) mod test_support;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;
use thiserror::Error;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
    services::ServeDir, trace::TraceLayer,
};

use crate::config::{AppConfig, ConfigError};
use crate::db::{DbConfig, MemoryStore, NewsStore, PgStore};
use crate::state::AppState;

/// Headroom for multipart framing and the date field on top of the file itself.
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Configure CORS for the configured frontend origins.
pub fn configure_cors(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::AUTHORIZATION,
        ])
        .allow_credentials(true)
}

/// API and health routes, waiting for their state.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/verify", post(routes::auth::verify_token))
        .route(
            "/api/papers",
            get(routes::papers::current_paper).post(routes::papers::create_paper),
        )
        .route("/api/papers/all", get(routes::papers::list_all))
        .route("/api/papers/dates", get(routes::papers::list_dates))
        .route("/api/papers/date/{date}", get(routes::papers::paper_by_date))
        .route(
            "/api/papers/date/{date}/navigation",
            get(routes::papers::paper_navigation),
        )
        .route(
            "/api/papers/{id}",
            axum::routing::delete(routes::papers::delete_paper),
        )
        .route("/api/papers/{id}/views", post(routes::papers::record_view))
        .route(
            "/api/upload-epaper",
            // Size is enforced by the handler and the global body limit.
            post(routes::upload::upload_epaper).layer(DefaultBodyLimit::disable()),
        )
        .route(
            "/api/contact",
            get(routes::contact::list_messages).post(routes::contact::create_message),
        )
        .route(
            "/api/contact/{id}",
            patch(routes::contact::update_message).delete(routes::contact::delete_message),
        )
        .route("/health", get(routes::health::health_ping))
        .route("/health/ready", get(routes::health::health_ready))
}

/// Create and configure the application router.
pub fn create_app(state: AppState, config: &AppConfig) -> Router {
    let body_limit = state.max_upload_bytes + MULTIPART_OVERHEAD;

    let mut app = api_router();

    // Local uploads are served by us; ImageKit serves its own.
    if config.storage.imagekit_private_key.is_none() {
        app = app.nest_service(
            storage::LOCAL_PUBLIC_PATH,
            ServeDir::new(&config.storage.upload_dir),
        );
    }

    app.with_state(state)
        .layer(logging::middleware::propagate_request_id_layer())
        .layer(middleware::from_fn(logging::middleware::log_request))
        .layer(logging::middleware::request_id_layer())
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(configure_cors(&config.allowed_origins))
}

/// Pick the store: PostgreSQL when `DATABASE_URL` is set, memory otherwise.
async fn connect_store(config: &AppConfig) -> Result<Arc<dyn NewsStore>, StartupError> {
    match &config.database_url {
        Some(url) => {
            let pool = db::init_pool(&DbConfig::new(url.clone())).await?;
            let store = PgStore::new(pool);
            store.run_migrations().await?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::warn!(
                "DATABASE_URL not set. Using the in-memory store; nothing will survive a restart."
            );
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

/// Run the server (used by main).
pub async fn run() -> Result<(), StartupError> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;

    let _log_guards = logging::init(&config.environment);

    routes::health::init_start_time();

    config.check_production()?;

    let store = connect_store(&config).await?;
    let storage = storage::from_config(&config.storage);
    tracing::info!(backend = storage.name(), "file storage configured");

    let state = AppState::new(
        store,
        storage,
        config.auth.clone(),
        config.max_upload_bytes,
    );
    let app = create_app(state, &config);

    let addr = config.bind_addr()?;
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
