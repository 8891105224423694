//! FlowSentinel API Server
//!
//! HTTP/WS serving layer around the ensemble detection pipeline.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      FLOWSENTINEL SERVER                     │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌────────────────┐  ┌─────────────────────┐  │
//! │  │  API      │  │  Detection     │  │  Telemetry          │  │
//! │  │  Gateway  │  │  Pipeline      │  │  Collector          │  │
//! │  │  (Axum)   │  │  (3-model      │  │  (1 Hz broadcast)   │  │
//! │  │           │  │   ensemble)    │  │                     │  │
//! │  └─────┬─────┘  └───────┬────────┘  └──────────┬──────────┘  │
//! │        └────────────────┼──────────────────────┘             │
//! │                         ▼                                    │
//! │    ┌─────────────┐  ┌──────────────┐  ┌──────────────┐      │
//! │    │ PostgreSQL  │  │ Alert        │  │ Ledger       │      │
//! │    │             │  │ Webhooks     │  │ Sink         │      │
//! │    └─────────────┘  └──────────────┘  └──────────────┘      │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod alerts;
mod config;
mod db;
mod error;
mod handlers;
mod ledger;
mod models;
mod telemetry;

use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::sync::watch;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flowsentinel_core::{DetectionPipeline, ModelRegistry};

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() {
    // Initialize logging; the core crate logs through the `log` facade and
    // is picked up by the subscriber's compatibility layer.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "flowsentinel_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    tracing::info!("FlowSentinel server starting...");
    tracing::info!(
        "Database: {}",
        config.database_url.split('@').last().unwrap_or("***")
    );

    // Initialize database pool
    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");

    // Run migrations
    tracing::info!("Running database migrations...");
    db::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    // Load model artifacts (best-effort; missing slots force demo mode)
    let registry = Arc::new(ModelRegistry::load(Path::new(&config.models_dir)));
    let pipeline = DetectionPipeline::new(registry.clone());

    // Start the telemetry collector
    let stats_rx = telemetry::spawn_collector();

    let alert_channels = Arc::new(alerts::channels_from_config(&config));
    if alert_channels.is_empty() {
        tracing::warn!("no alert webhooks configured; notifications disabled");
    }

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()
        .expect("Failed to build HTTP client");

    // Build application state
    let state = AppState {
        pool,
        config: config.clone(),
        registry,
        pipeline,
        stats_rx,
        http,
        alert_channels,
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: sqlx::PgPool,
    pub config: config::Config,
    pub registry: Arc<ModelRegistry>,
    pub pipeline: DetectionPipeline,
    pub stats_rx: watch::Receiver<telemetry::SystemSnapshot>,
    pub http: reqwest::Client,
    pub alert_channels: Arc<Vec<alerts::AlertChannel>>,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::check))
        .route("/ingest", post(handlers::ingest::ingest))
        .route("/explain", post(handlers::explain::explain))
        .route("/mitigate", post(handlers::mitigate::mitigate))
        .route("/dashboard", get(handlers::dashboard::dashboard))
        .route("/stats", get(handlers::stats::stats))
        .route("/ws/stats", get(handlers::stats::ws_stats))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
