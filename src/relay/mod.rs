//! Relay server
//!
//! A thin axum service that forwards three request kinds to the
//! chat-completion provider, each paired with a fixed system prompt.
//! Requests are stateless and independent.

pub mod error;
pub mod handlers;

pub use error::RelayError;
pub use handlers::{AnswerResponse, PlanResponse};

use crate::config::Config;
use crate::error::{Result, StudyError};
use crate::providers::{self, Provider};

use axum::http::HeaderValue;
use axum::routing::post;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// State shared by every relay handler
pub struct RelayState {
    pub provider: Arc<dyn Provider>,
    /// Forward client-supplied history on `/ask`
    pub forward_history: bool,
}

impl RelayState {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            forward_history: false,
        }
    }
}

/// CORS layer allowing the configured origins, or any origin when unset
pub fn cors_layer(allowed_origins: Option<&[String]>) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .unwrap_or_default()
        .iter()
        .filter_map(|origin| origin.trim().parse().ok())
        .collect();

    let cors = CorsLayer::new().allow_headers(Any).allow_methods(Any);
    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        cors.allow_origin(origins)
    }
}

/// Build the relay router
pub fn router(state: Arc<RelayState>, allowed_origins: Option<&[String]>) -> Router {
    Router::new()
        .route("/ask", post(handlers::ask))
        .route("/diagramise", post(handlers::diagramise))
        .route("/plan", post(handlers::plan))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Run the relay server until Ctrl-C
///
/// # Errors
///
/// Returns error if the provider cannot be created (for example, a missing
/// API key) or the address cannot be bound
pub async fn serve(config: &Config) -> Result<()> {
    let provider: Arc<dyn Provider> = Arc::from(providers::create_provider(&config.provider)?);
    let state = Arc::new(RelayState {
        provider,
        forward_history: config.relay.forward_history,
    });
    let app = router(state, config.relay.cors_allowed_origins.as_deref());

    let addr = config.relay_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| StudyError::Config(format!("Failed to bind {}: {}", addr, e)))?;
    tracing::info!(%addr, "Relay server listening");
    println!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Relay server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to install Ctrl-C handler");
    }
}
