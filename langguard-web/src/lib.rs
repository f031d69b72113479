//! langguard-web library interface
//!
//! Exposes the router, state and pipeline for the binary and for integration
//! tests.

pub mod api;
pub mod clients;
pub mod config;
pub mod db;
pub mod error;
pub mod languages;
pub mod models;
pub mod services;
pub mod types;
pub mod workflow;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use langguard_common::events::EventBus;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::workflow::Pipeline;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Artifact store
    pub db: SqlitePool,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    pub pipeline: Arc<Pipeline>,
    pub config: Arc<AppConfig>,
    /// Parent of every invocation's cancellation token
    pub shutdown: CancellationToken,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
    /// Last failed invocation, reported by /health
    pub last_error: Arc<RwLock<Option<String>>>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        event_bus: EventBus,
        pipeline: Pipeline,
        config: AppConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            db,
            event_bus,
            pipeline: Arc::new(pipeline),
            config: Arc::new(config),
            shutdown,
            startup_time: Utc::now(),
            last_error: Arc::new(RwLock::new(None)),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let max_upload_bytes = state.config.max_upload_bytes;

    Router::new()
        .merge(api::ui_routes())
        .merge(api::translate_routes())
        .merge(api::result_routes())
        .merge(api::download_routes())
        .merge(api::language_routes())
        .merge(api::health_routes())
        .route("/events", get(api::event_stream))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
