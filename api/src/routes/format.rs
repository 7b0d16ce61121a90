//! SQL highlighting endpoint.

use axum::{routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use shared::format::format_sql;

/// Request body for SQL highlighting.
#[derive(Debug, Deserialize)]
pub struct FormatRequest {
    /// The SQL to highlight.
    pub sql: String,
}

/// Highlighted SQL.
#[derive(Debug, Serialize, Deserialize)]
pub struct FormatResponse {
    /// HTML markup with `SQLKeyword`, `SQLComment` and `SQLName` spans.
    pub html: String,
}

/// Creates the formatting routes.
pub fn format_routes() -> Router {
    Router::new().route("/api/v1/format", post(format))
}

async fn format(Json(request): Json<FormatRequest>) -> Json<FormatResponse> {
    Json(FormatResponse {
        html: format_sql(&request.sql),
    })
}
