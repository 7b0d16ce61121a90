//! Querylens API Server
//!
//! This crate provides the HTTP server of the Querylens query profiler. It
//! collects the statement log of profiled requests, keeps the resulting
//! profiles in memory and serves the database panel, SQL highlighting and
//! the explain action.
//!
//! # Architecture
//!
//! The API server is built on Axum and Tokio, providing:
//! - Profile submission, listing and panel endpoints
//! - An explain action backed by `ClickHouse`
//! - ORM configuration and SQL formatting endpoints
//!
//! # Example
//!
//! ```no_run
//! use api::run_server;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     run_server().await
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod config;
pub mod db;
mod routes;
mod state;

pub use config::Config;
pub use state::AppState;

use anyhow::{Context, Result};
use axum::Router;
use shared::config::{
    DelimiterScheme, OrmConfiguration, OrmContext, INNER_GLUE_KEY, OUTER_GLUE_KEY,
};
use shared::explain::{ExplainBackend, UnsupportedExplainBackend};
use shared::logger::TracingSink;
use shared::storage::InMemoryProfileStore;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Runs the Querylens API server.
///
/// This function initializes the server with configuration from environment variables
/// and starts listening for incoming connections. It handles graceful shutdown on
/// SIGTERM/SIGINT signals.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration cannot be loaded from environment
/// - The server fails to bind to the configured address
/// - A fatal error occurs during operation
pub async fn run_server() -> Result<()> {
    let config = Config::from_env()?;
    run_server_with_config(config).await
}

/// Runs the Querylens API server with the provided configuration.
///
/// This is useful for testing or when you want to provide configuration programmatically.
///
/// # Errors
///
/// Returns an error if:
/// - The configured address is invalid or cannot be bound
/// - The configured glues are identical
/// - The ORM context cannot host a query collector
/// - A fatal error occurs during operation
pub async fn run_server_with_config(config: Config) -> Result<()> {
    let addr = config.socket_addr()?;

    tracing::info!(
        host = %config.host,
        port = %config.port,
        profile_capacity = config.profile_capacity,
        explain = config.explain,
        "Querylens API server starting"
    );

    let state = build_state(&config)?;
    let app = create_router(state);
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(%addr, "Listening for connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// Builds the application state described by `config`.
fn build_state(config: &Config) -> Result<AppState> {
    let orm_config = OrmConfiguration::new();
    if let Some(glue) = &config.outer_glue {
        orm_config.set_parameter(OUTER_GLUE_KEY, glue.as_str());
    }
    if let Some(glue) = &config.inner_glue {
        orm_config.set_parameter(INNER_GLUE_KEY, glue.as_str());
    }
    DelimiterScheme::from_configuration(&orm_config)
        .validate_scheme()
        .context("QUERYLENS_OUTER_GLUE and QUERYLENS_INNER_GLUE do not form a usable scheme")?;

    let orm = OrmContext::new(orm_config, config.default_connection.as_str());

    let explain_backend: Arc<dyn ExplainBackend> = if config.explain {
        Arc::new(db::ClickHouseExplainBackend::new(
            db::DatabaseConfig::from_env(),
            config.default_connection.as_str(),
        ))
    } else {
        Arc::new(UnsupportedExplainBackend)
    };

    let state = AppState::new(
        Arc::new(InMemoryProfileStore::with_capacity(config.profile_capacity)),
        explain_backend,
        orm,
    )?;

    Ok(if config.forward_queries {
        state.with_delegate(Arc::new(TracingSink::new()))
    } else {
        state
    })
}

/// Creates the main application router with all routes and middleware.
///
/// This function is public to allow testing the router without starting a full server.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health_routes(state.clone()))
        .merge(routes::format_routes())
        .merge(routes::configuration_routes(state.clone()))
        .merge(routes::profile_routes(state))
        .layer(TraceLayer::new_for_http())
}

/// Waits for a shutdown signal (SIGTERM or SIGINT).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_endpoint_returns_200() {
        let app = create_router(AppState::with_in_memory_store());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_endpoint_returns_json() {
        let app = create_router(AppState::with_in_memory_store());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok());

        assert!(content_type.is_some_and(|ct| ct.contains("application/json")));
    }

    #[test]
    fn test_build_state_applies_glue_overrides() {
        let config = Config {
            outer_glue: Some(" ; ".to_string()),
            inner_glue: Some("=".to_string()),
            ..Config::default()
        };

        let state = build_state(&config).unwrap();
        let scheme = DelimiterScheme::from_configuration(state.orm().configuration());

        assert_eq!(scheme, DelimiterScheme::new(" ; ", "="));
        assert!(!state.new_query_logger().has_delegate());
    }

    #[test]
    fn test_build_state_rejects_identical_glues() {
        let config = Config {
            outer_glue: Some(": ".to_string()),
            ..Config::default()
        };

        let err = build_state(&config).err().unwrap();
        assert!(err.to_string().contains("QUERYLENS_OUTER_GLUE"));
    }

    #[test]
    fn test_build_state_forwards_queries() {
        let config = Config {
            forward_queries: true,
            profile_capacity: 5,
            ..Config::default()
        };

        let state = build_state(&config).unwrap();

        assert!(state.new_query_logger().has_delegate());
        assert_eq!(state.orm().default_connection(), "default");
    }
}
