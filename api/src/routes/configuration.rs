//! ORM configuration panel endpoint.

use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use shared::config::OrmSummary;

/// Creates the configuration routes with application state.
pub fn configuration_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/configuration", get(show_configuration))
        .with_state(state)
}

/// Returns the ORM version, default connection and every parameter.
async fn show_configuration(State(state): State<AppState>) -> Json<OrmSummary> {
    Json(state.orm().summary())
}
