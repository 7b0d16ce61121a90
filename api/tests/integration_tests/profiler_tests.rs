//! Integration tests for the database profiler panel.
//!
//! Tests cover:
//! - Profile submission and the panel view
//! - Malformed and empty statement logs
//! - Explain action outcomes
//! - SQL formatting and ORM configuration endpoints

use axum::http::StatusCode;
use serde_json::json;

use super::common::{get, post_json, test_app, test_app_with_explain};

const USERS_LINE: &str =
    "Time: 0.0012 | Memory: 1,048,576 | Con: default | SELECT * FROM users WHERE id = 1";
const REPORT_LINE: &str =
    "Time: 0.5 | Memory: 2,097,152 | Con: reporting | SELECT `total` FROM orders.daily";

#[tokio::test]
async fn test_full_profiling_flow() {
    let (app, _state) = test_app();

    let (status, created) = post_json(
        app.clone(),
        "/api/v1/profiles",
        json!({
            "method": "GET",
            "url": "/users/1",
            "statements": [USERS_LINE, { "message": REPORT_LINE, "severity": "info" }]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["query_count"], 2);
    assert_eq!(created["skipped"], 0);
    assert!((created["time"].as_f64().unwrap() - 0.5012).abs() < 1e-9);

    let token = created["token"].as_str().unwrap().to_string();
    let (status, panel) = get(app.clone(), &format!("/api/v1/profiles/{token}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(panel["collector"], "database");
    assert_eq!(panel["method"], "GET");
    assert_eq!(panel["url"], "/users/1");
    assert_eq!(panel["query_count"], 2);

    let first = &panel["queries"][0];
    assert_eq!(first["connection"], "default");
    assert_eq!(first["sql"], "SELECT * FROM users WHERE id = 1");
    assert_eq!(first["time"], "0.0012");
    assert_eq!(first["memory"], "1,048,576");
    assert_eq!(
        first["formatted_sql"],
        r#"<span class="SQLKeyword">SELECT</span> * <br /><span class="SQLKeyword">FROM</span> users <br /><span class="SQLKeyword">WHERE</span> id = 1"#
    );

    let second = &panel["queries"][1];
    assert_eq!(second["connection"], "reporting");
    assert!(second["formatted_sql"]
        .as_str()
        .unwrap()
        .contains(r#"<span class="SQLName">orders.daily</span>"#));

    let (status, listing) = get(app, "/api/v1/profiles").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listing["total_count"], 1);
    assert_eq!(listing["profiles"][0]["token"], token.as_str());
}

#[tokio::test]
async fn test_empty_statement_log() {
    let (app, _state) = test_app();

    let (status, created) =
        post_json(app.clone(), "/api/v1/profiles", json!({ "statements": [] })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["query_count"], 0);
    assert_eq!(created["time"], 0.0);
    assert!(!created["time"].as_f64().unwrap().is_sign_negative());

    let token = created["token"].as_str().unwrap();
    let (status, panel) = get(app, &format!("/api/v1/profiles/{token}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(panel["queries"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_lines_are_skipped() {
    let (app, _state) = test_app();

    let (status, created) = post_json(
        app,
        "/api/v1/profiles",
        json!({
            "statements": [
                "Connected to database",
                USERS_LINE,
                "Time: 0.1 | Memory 12 | Con: default | SELECT 1",
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["query_count"], 1);
    assert_eq!(created["skipped"], 2);
}

#[tokio::test]
async fn test_explain_returns_plan() {
    let (app, _state) = test_app_with_explain();

    let (_, created) = post_json(
        app.clone(),
        "/api/v1/profiles",
        json!({ "statements": [USERS_LINE, REPORT_LINE] }),
    )
    .await;
    let token = created["token"].as_str().unwrap();

    let (status, outcome) = get(app, &format!("/api/v1/profiles/{token}/explain/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["status"], "plan");
    assert_eq!(outcome["query"], 1);
    assert_eq!(outcome["connection"], "reporting");
    assert_eq!(
        outcome["plan"]["rows"][0][0],
        "reporting: SELECT `total` FROM orders.daily"
    );
}

#[tokio::test]
async fn test_explain_never_fails() {
    let (app, _state) = test_app();

    let (_, created) = post_json(
        app.clone(),
        "/api/v1/profiles",
        json!({ "statements": [USERS_LINE] }),
    )
    .await;
    let token = created["token"].as_str().unwrap();

    let (status, outcome) = get(app.clone(), &format!("/api/v1/profiles/{token}/explain/0")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["status"], "unavailable");
    assert_eq!(outcome["message"], "This query cannot be explained.");

    let (status, outcome) = get(app.clone(), &format!("/api/v1/profiles/{token}/explain/7")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["status"], "query_not_found");
    assert_eq!(outcome["message"], "This query does not exist.");

    let (status, outcome) = get(app, "/api/v1/profiles/unknown/explain/0").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["status"], "query_not_found");
}

#[tokio::test]
async fn test_custom_glue_from_configuration() {
    let (app, state) = test_app();
    let config = state.orm().configuration();
    config.set_parameter("debugpdo.logging.outerglue", " ## ");
    config.set_parameter("debugpdo.logging.innerglue", "=");

    let (status, created) = post_json(
        app.clone(),
        "/api/v1/profiles",
        json!({ "statements": ["Time=0.25 ## Memory=64 ## Con=default ## DELETE FROM sessions"] }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["query_count"], 1);

    let (_, summary) = get(app, "/api/v1/configuration").await;
    assert_eq!(summary["parameters"]["debugpdo.logging.outerglue"], " ## ");
    assert_eq!(summary["parameters"]["debugpdo.logging.details.time.enabled"], "true");
    assert_eq!(summary["parameters"]["debugpdo.logging.details.method.enabled"], "true");
}

#[tokio::test]
async fn test_format_endpoint_escapes_html() {
    let (app, _state) = test_app();

    let (status, response) = post_json(
        app,
        "/api/v1/format",
        json!({ "sql": "SELECT a FROM t WHERE b < 3 /* <note> */" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let html = response["html"].as_str().unwrap();
    assert!(html.contains("b &lt; 3"));
    assert!(html.contains(r#"<span class="SQLComment">/* &lt;note&gt; */</span>"#));
}
