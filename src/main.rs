//! Slack Webhook Inspector
//!
//! Receives Slack Events API callbacks, labels where each request came from,
//! and keeps a short in-memory history for debugging the integration.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  SLACK WEBHOOK INSPECTOR                    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌───────────┐  ┌─────────────────────────┐ │
//! │  │  Webhook  │  │  Source   │  │  Event Dispatch         │ │
//! │  │  Handler  │─▶│  Classif. │  │  (spawned after ack)    │ │
//! │  │  (Axum)   │  │           │  │                         │ │
//! │  └─────┬─────┘  └───────────┘  └─────────────────────────┘ │
//! │        ▼                                                    │
//! │  ┌─────────────────┐                                        │
//! │  │ Request History │  newest first, fixed capacity          │
//! │  └─────────────────┘                                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod models;
mod analysis;
mod history;
mod dispatch;
mod handlers;
mod error;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    routing::{any, get, post},
};
use tower_http::{
    compression::CompressionLayer,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};

use config::{Config, LogFormat};
use dispatch::{DispatchHook, DispatchedEvent};
use history::HistoryStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Initialize logging
    init_tracing(config.log_format);

    tracing::info!("Slack Webhook Inspector starting...");
    tracing::info!(
        environment = %config.environment,
        history_capacity = config.history_capacity,
        retain_raw_payload = config.retain_raw_payload,
        body_limit_bytes = config.body_limit_bytes,
        trust_envelope_shape = config.trust_envelope_shape,
        "Configuration loaded"
    );

    // Build application state
    let addr = config.socket_addr()?;
    let state = AppState::new(config);
    tracing::info!("Request history capacity: {}", state.history.capacity());

    // Build router
    let app = create_router(state);

    // Start server
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "slack_webhook_inspector=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub history: Arc<HistoryStore>,
    pub config: Config,
    pub dispatch_hook: Option<DispatchHook>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            history: Arc::new(HistoryStore::new(config.history_capacity)),
            config,
            dispatch_hook: None,
        }
    }

    /// Observe every dispatched event
    #[cfg_attr(not(test), allow(dead_code))]
    pub fn with_dispatch_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&DispatchedEvent) + Send + Sync + 'static,
    {
        self.dispatch_hook = Some(Arc::new(hook));
        self
    }
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    let body_limit = state.config.body_limit_bytes;

    Router::new()
        // Inspector endpoint
        .route("/", any(handlers::webhook::handle))
        .route("/api/webhook", any(handlers::webhook::handle))

        // Standalone history endpoints
        .route(
            "/api/requests",
            get(handlers::requests::list).fallback(handlers::method_fallback),
        )
        .route(
            "/api/clear",
            post(handlers::requests::clear).fallback(handlers::method_fallback),
        )

        // Liveness
        .route(
            "/health",
            get(handlers::health::check).fallback(handlers::method_fallback),
        )

        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, OPTIONS"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type"),
        ))
        .with_state(state)
}
