//! Health check endpoint.
//!
//! Reports whether the profiler can take new profiles, how full the profile
//! window is and whether the explain action can produce plans.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

/// Fill level of the profile window.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileWindow {
    /// Profiles currently kept.
    pub stored: usize,
    /// Maximum number of profiles kept before the oldest is evicted.
    pub capacity: usize,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"healthy"`, or `"degraded"` when the profile store is unusable.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
    /// Whether explain requests reach a database.
    pub explain_enabled: bool,
    /// Profile window, absent when the store cannot be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profiles: Option<ProfileWindow>,
}

/// Creates the health check routes with application state.
pub fn health_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(state)
}

/// Answers 200 while profiles can be stored, 503 once the store is poisoned.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let store = state.profile_store();
    let profiles = match store.count() {
        Ok(stored) => Some(ProfileWindow {
            stored,
            capacity: store.capacity(),
        }),
        Err(e) => {
            tracing::error!(error = %e, "Profile store unavailable");
            None
        }
    };

    let (code, status) = if profiles.is_some() {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            service: "querylens-api".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            explain_enabled: state.explain_backend().is_supported(),
            profiles,
        }),
    )
}
