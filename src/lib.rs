//! Chronoview - authenticated per-user record API
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      API Layer (Axum)                        │
//! │  - POST /chrono/signup, POST /chrono/login (public)         │
//! │  - GET /chrono/view/* (bearer token required)               │
//! │  - /health, /metrics                                        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Service Layer                            │
//! │  - Credentials: register, authenticate                      │
//! │  - Records: owner-scoped listing                            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Data Layer                              │
//! │  - DocumentStore trait                                      │
//! │  - SQLite (sqlx) or in-memory                               │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: HTTP handlers for record views and metrics
//! - `auth`: Password hashing, session tokens, signup/login, access gate
//! - `service`: Business logic layer
//! - `data`: Document store
//! - `config`: Configuration management
//! - `error`: Error types

pub mod api;
pub mod auth;
pub mod config;
pub mod data;
pub mod error;
pub mod metrics;
pub mod service;

use std::sync::Arc;

/// Application state shared across all handlers
///
/// Cloned for each request. Everything inside is read-only after
/// startup; the store handles its own connection sharing.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Document store
    pub store: Arc<dyn data::DocumentStore>,

    /// Session token signer (holds the process-wide secret)
    pub signer: Arc<auth::TokenSigner>,
}

impl AppState {
    /// Initialize application state
    ///
    /// # Steps
    /// 1. Connect to the document store
    /// 2. Build the token signer from the configured or a random secret
    ///
    /// # Errors
    /// Returns error if any initialization step fails
    pub async fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        let store = data::connect_store(&config.database).await?;

        let key = match &config.auth.secret_key {
            Some(secret) => auth::SigningKey::from_secret(secret),
            None => {
                tracing::warn!(
                    "auth.secret_key not set; generated a random signing key, tokens will not survive a restart"
                );
                auth::SigningKey::generate()
            }
        };
        let ttl = chrono::Duration::try_seconds(config.auth.token_ttl_seconds).ok_or_else(|| {
            error::AppError::Config(format!(
                "auth.token_ttl_seconds out of range: {}",
                config.auth.token_ttl_seconds
            ))
        })?;
        let signer = auth::TokenSigner::new(key, ttl);

        tracing::info!("Application state initialized successfully");

        Ok(Self::from_parts(config, store, signer))
    }

    /// Assemble state from already-built parts
    pub fn from_parts(
        config: config::AppConfig,
        store: Arc<dyn data::DocumentStore>,
        signer: auth::TokenSigner,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store,
            signer: Arc::new(signer),
        }
    }
}

/// Largest accepted request body
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> axum::Router {
    use axum::{Router, middleware};
    use tower_http::{
        compression::CompressionLayer, cors::CorsLayer, limit::RequestBodyLimitLayer,
        trace::TraceLayer,
    };

    let chrono_routes = Router::new()
        .merge(auth::auth_router())
        .merge(api::views_router(state.clone()));

    Router::new()
        .route("/health", axum::routing::get(health_check))
        .nest("/chrono", chrono_routes)
        .merge(api::metrics_router())
        .layer(middleware::from_fn(api::track_http_requests))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
