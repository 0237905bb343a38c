//! plantarium-web library interface
//!
//! Exposes the application state and router so integration tests can
//! drive the service in-process.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod photos;
pub mod rate_limit;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::auth::AuthGate;
use crate::config::Config;
use crate::photos::PhotoStore;
use crate::rate_limit::RateLimiter;
use crate::services::{PerenualClient, TrefleClient};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (catalogue + rate-limit windows)
    pub db: SqlitePool,
    /// Resolved deployment configuration
    pub config: Arc<Config>,
    /// Session credential verifier
    pub auth: AuthGate,
    /// Durable sliding-window rate limiter
    pub limiter: RateLimiter,
    /// Trefle search adapter
    pub trefle: TrefleClient,
    /// Perenual search and care-guide adapter
    pub perenual: PerenualClient,
    /// Uploaded-photo object store
    pub photos: PhotoStore,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Wire up application state from resolved configuration.
    ///
    /// Every collaborator is constructed here and injected; a missing
    /// credential surfaces when the corresponding feature is used,
    /// never as a silent downgrade.
    pub fn new(config: Config, db: SqlitePool) -> plantarium_common::Result<Self> {
        let trefle = TrefleClient::new(config.trefle_api_key.clone())
            .map_err(|e| plantarium_common::Error::Internal(e.to_string()))?;
        let perenual = PerenualClient::new(config.perenual_api_key.clone())
            .map_err(|e| plantarium_common::Error::Internal(e.to_string()))?;
        let photos = PhotoStore::new(config.photos_dir())?;
        let auth = AuthGate::new(config.session_secret.clone());
        let limiter = RateLimiter::new(db.clone());

        Ok(Self {
            db,
            config: Arc::new(config),
            auth,
            limiter,
            trefle,
            perenual,
            photos,
            startup_time: Utc::now(),
        })
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::plant_routes())
        .merge(api::search_routes())
        .merge(api::photo_routes())
        .merge(api::health_routes())
        .with_state(state)
}
