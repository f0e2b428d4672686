//! HTTP server for the goal breaker
//!
//! Exposes goal creation (with AI breakdown), listing, lookup and deletion as
//! a JSON API, scoped per browser by a session cookie.

pub mod routes;
pub mod session;
pub mod state;
pub mod types;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{header, request::Parts, HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::{Config, ServerConfig};
use crate::decomposition::GoalDecomposer;
use crate::llm::{self, LlmClient, UnavailableClient};
use crate::persistence::GoalStore;
use state::AppState;

/// Build the application router around shared state
pub fn build_router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    Router::new()
        .route("/", get(routes::health::service_info))
        // Health & config
        .route("/api/health", get(routes::health::health_check))
        .route("/api/config", get(routes::config::get_config))

        // Goals
        .route(
            "/api/goals",
            get(routes::goals::list_goals).post(routes::goals::create_goal),
        )
        .route(
            "/api/goals/:id",
            get(routes::goals::get_goal).delete(routes::goals::delete_goal),
        )

        // OpenAPI docs
        .route("/api/openapi.json", get(routes::openapi::openapi_spec))

        .with_state(state)
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
}

/// CORS for the configured browser origins, with credentials (the session cookie)
fn cors_layer(origins: &[String]) -> CorsLayer {
    let patterns = origins.to_vec();

    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _parts: &Parts| {
            origin
                .to_str()
                .map(|origin| patterns.iter().any(|pattern| origin_matches(pattern, origin)))
                .unwrap_or(false)
        }))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

/// Match an origin against an allowed pattern.
///
/// A single `*` stands for one or more host labels, e.g.
/// `https://*.vercel.app` matches `https://my-app.vercel.app`.
pub fn origin_matches(pattern: &str, origin: &str) -> bool {
    match pattern.split_once('*') {
        None => pattern == origin,
        Some((prefix, suffix)) => {
            if origin.len() <= prefix.len() + suffix.len()
                || !origin.starts_with(prefix)
                || !origin.ends_with(suffix)
            {
                return false;
            }
            let middle = &origin[prefix.len()..origin.len() - suffix.len()];
            middle
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'.')
        }
    }
}

/// Start the HTTP server
pub async fn start_server(config: Config) -> anyhow::Result<()> {
    // Fall back to in-memory storage rather than refusing to start
    let store = match GoalStore::open(&config.database).await {
        Ok(store) => {
            tracing::info!("Goal persistence enabled (SQLite)");
            store
        }
        Err(e) => {
            tracing::warn!("Failed to open goal database: {:#}. Using in-memory storage.", e);
            GoalStore::in_memory().await?
        }
    };

    // Without a usable backend every goal gets the fallback breakdown
    let client: Arc<dyn LlmClient> = match llm::create_client(&config) {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!("LLM backend unavailable: {:#}. Goals will use the fallback breakdown.", e);
            Arc::new(UnavailableClient::new(config.llm.model.clone(), format!("{:#}", e)))
        }
    };

    let decomposer = GoalDecomposer::new(client, Duration::from_secs(config.llm.timeout_secs));
    let server_config = config.server.clone();
    let state = Arc::new(AppState::new(config, store, decomposer));
    let app = build_router(state, &server_config);

    // Bind and serve
    let addr: SocketAddr = format!("{}:{}", server_config.host, server_config.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    tracing::info!("Starting goal-breaker server on http://{}", addr);
    tracing::info!("API documentation: http://{}/api/openapi.json", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
