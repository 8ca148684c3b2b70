//! Tyre Stock Ledger - Backend
//!
//! Tracks per-item daily inventory for a tyre shop and keeps it reconciled
//! with recorded sales.

use std::{sync::Arc, time::Duration};

use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod store;

pub use config::Config;

use config::StorageBackend;
use services::{notifier_from_config, StockService};
use store::{InMemoryStore, PgStore};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub stock: StockService,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(stock: StockService, config: Config) -> Self {
        Self {
            stock,
            config: Arc::new(config),
        }
    }
}

/// Wire the configured stores and notifier into an application state
pub async fn build_state(config: Config) -> anyhow::Result<AppState> {
    let notifier = notifier_from_config(&config.notification);

    let stock = match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; the ledger is lost on restart");
            let store = Arc::new(InMemoryStore::new());
            StockService::new(store.clone(), store, notifier)
        }
        StorageBackend::Postgres => {
            tracing::info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .min_connections(config.database.min_connections)
                .acquire_timeout(Duration::from_secs(30))
                .connect(&config.database.url)
                .await?;
            tracing::info!("Database connection established");

            // Run migrations in development
            if config.is_development() {
                tracing::info!("Running database migrations...");
                sqlx::migrate!("./migrations").run(&db_pool).await?;
                tracing::info!("Migrations completed");
            }

            let store = Arc::new(PgStore::new(db_pool));
            StockService::new(store.clone(), store, notifier)
        }
    };

    Ok(AppState::new(stock, config))
}

/// Create the application router with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", routes::api_routes(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Root endpoint
async fn root() -> &'static str {
    "Tyre Stock Ledger API v1.0"
}
