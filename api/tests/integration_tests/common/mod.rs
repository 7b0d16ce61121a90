//! Common test utilities and helpers for integration tests.
//!
//! Every helper builds the full router from `create_router`, so requests go
//! through the same middleware stack as in production.

use api::{create_router, AppState};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use shared::explain::{ExplainBackend, ExplainError, ExplainPlan};
use std::sync::Arc;
use tower::ServiceExt;

/// Creates a test router with a fresh in-memory profile store and no explain
/// support.
///
/// # Returns
///
/// A tuple containing the configured router and the app state.
pub fn test_app() -> (Router, AppState) {
    let state = AppState::with_in_memory_store();
    let router = create_router(state.clone());
    (router, state)
}

/// Creates a test router whose explain backend answers with a one-row plan
/// naming the connection and the SQL it was given.
pub fn test_app_with_explain() -> (Router, AppState) {
    let state = AppState::with_in_memory_store().with_explain_backend(Arc::new(EchoBackend));
    let router = create_router(state.clone());
    (router, state)
}

struct EchoBackend;

#[async_trait]
impl ExplainBackend for EchoBackend {
    async fn explain_plan(&self, connection: &str, sql: &str) -> Result<ExplainPlan, ExplainError> {
        Ok(ExplainPlan::new(
            vec!["explain".to_string()],
            vec![vec![format!("{connection}: {sql}")]],
        ))
    }
}

/// Sends `request` and decodes the JSON body, `Null` when there is none.
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();

    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

/// POSTs `body` as JSON to `uri`.
pub async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// GETs `uri`.
pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}
