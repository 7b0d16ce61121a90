//! Integration tests for the health check.
//!
//! Tests cover:
//! - Liveness with an empty profile window
//! - The window filling up as profiles are submitted
//! - Explain support reporting

use axum::http::StatusCode;
use serde_json::json;

use super::common::{get, post_json, test_app, test_app_with_explain};

#[tokio::test]
async fn test_health_check_on_fresh_server() {
    let (app, _state) = test_app();

    let (status, response) = get(app.clone(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["status"], "healthy");
    assert_eq!(response["service"], "querylens-api");
    assert_eq!(response["explain_enabled"], false);
    assert_eq!(response["profiles"]["stored"], 0);
    assert_eq!(response["profiles"]["capacity"], 100);

    let (status, listing) = get(app, "/api/v1/profiles").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["total_count"], 0);
    assert!(listing["profiles"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_health_counts_submitted_profiles() {
    let (app, _state) = test_app();

    for _ in 0..3 {
        let (status, _) =
            post_json(app.clone(), "/api/v1/profiles", json!({ "statements": [] })).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, response) = get(app, "/health").await;
    assert_eq!(response["profiles"]["stored"], 3);
}

#[tokio::test]
async fn test_health_reports_explain_backend() {
    let (app, _state) = test_app_with_explain();

    let (status, response) = get(app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["explain_enabled"], true);
}
