//! Profiler panel endpoints.
//!
//! A profiled request is submitted as the raw statement log lines the ORM
//! produced while serving it. Each submission runs one collection lifecycle
//! (fresh logger, log every statement, collect once) and stores the result
//! under a new token. The panel and the explain action refer back to it by
//! that token.

use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::collector::{QueryCollector, COLLECTOR_NAME};
use shared::explain::{explain_query, ExplainOutcome};
use shared::format::format_sql;
use shared::logger::StatementLogger;
use shared::models::Severity;
use shared::storage::{Profile, ProfileStoreError};

/// Default number of profiles returned by the listing.
const DEFAULT_LIST_LIMIT: usize = 20;

/// A statement log message, either bare or with its severity.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StatementRequest {
    /// A bare log line, logged at debug severity.
    Plain(String),
    /// A log line with an explicit severity.
    Detailed {
        /// The log line.
        message: String,
        /// Severity the ORM logged it with.
        #[serde(default)]
        severity: Severity,
    },
}

impl StatementRequest {
    fn into_parts(self) -> (String, Severity) {
        match self {
            Self::Plain(message) => (message, Severity::default()),
            Self::Detailed { message, severity } => (message, severity),
        }
    }
}

/// Request body for submitting a profiled request.
#[derive(Debug, Deserialize)]
pub struct ProfileRequest {
    /// HTTP method of the profiled request (optional).
    pub method: Option<String>,
    /// URL of the profiled request (optional).
    pub url: Option<String>,
    /// Statement log lines, in execution order.
    #[serde(default)]
    pub statements: Vec<StatementRequest>,
}

/// Response for a stored profile.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileCreated {
    /// Token of the new profile.
    pub token: String,
    /// Number of parsed queries.
    pub query_count: usize,
    /// Number of log lines that could not be parsed.
    pub skipped: usize,
    /// Total query time, in seconds.
    pub time: f64,
}

/// Summary of a stored profile.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileSummary {
    /// Profile token.
    pub token: String,
    /// When the data was collected.
    pub collected_at: DateTime<Utc>,
    /// HTTP method of the profiled request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// URL of the profiled request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Number of queries.
    pub query_count: usize,
    /// Total query time, in seconds.
    pub time: f64,
}

impl From<&Profile> for ProfileSummary {
    fn from(profile: &Profile) -> Self {
        Self {
            token: profile.token.clone(),
            collected_at: profile.collected_at,
            method: profile.method.clone(),
            url: profile.url.clone(),
            query_count: profile.data.query_count(),
            time: profile.data.time(),
        }
    }
}

/// Response for the profile listing.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileListResponse {
    /// Most recent profiles first.
    pub profiles: Vec<ProfileSummary>,
    /// Total number of stored profiles.
    pub total_count: usize,
}

/// Query parameters of the profile listing.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Maximum number of profiles returned.
    pub limit: Option<usize>,
}

/// One query as shown by the panel.
#[derive(Debug, Serialize, Deserialize)]
pub struct PanelQuery {
    /// Ordinal of the query within the request.
    pub index: usize,
    /// Connection name.
    pub connection: String,
    /// Raw SQL.
    pub sql: String,
    /// Highlighted SQL markup.
    pub formatted_sql: String,
    /// Elapsed time as reported.
    pub time: String,
    /// Memory usage as reported.
    pub memory: String,
}

/// Panel data of one profile.
#[derive(Debug, Serialize, Deserialize)]
pub struct PanelResponse {
    /// Profile token.
    pub token: String,
    /// Collector name.
    pub collector: String,
    /// When the data was collected.
    pub collected_at: DateTime<Utc>,
    /// HTTP method of the profiled request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// URL of the profiled request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Number of queries.
    pub query_count: usize,
    /// Total query time, in seconds.
    pub time: f64,
    /// The queries, in execution order.
    pub queries: Vec<PanelQuery>,
}

impl From<Profile> for PanelResponse {
    fn from(profile: Profile) -> Self {
        let queries = profile
            .data
            .queries()
            .iter()
            .enumerate()
            .map(|(index, record)| PanelQuery {
                index,
                connection: record.connection.clone(),
                formatted_sql: format_sql(&record.sql),
                sql: record.sql.clone(),
                time: record.time.clone(),
                memory: record.memory.clone(),
            })
            .collect();

        Self {
            collector: COLLECTOR_NAME.to_string(),
            query_count: profile.data.query_count(),
            time: profile.data.time(),
            token: profile.token,
            collected_at: profile.collected_at,
            method: profile.method,
            url: profile.url,
            queries,
        }
    }
}

/// Error response for profile operations.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileError {
    /// Error type.
    pub error: String,
    /// Detailed error message.
    pub message: String,
}

impl ProfileError {
    fn new(error: &str, message: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
        }
    }
}

type ProfileResult<T> = Result<T, (StatusCode, Json<ProfileError>)>;

fn storage_error(e: ProfileStoreError) -> (StatusCode, Json<ProfileError>) {
    tracing::error!(error = %e, "Profile storage failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ProfileError::new("storage_error", e.to_string())),
    )
}

/// Creates the profiler routes with application state.
pub fn profile_routes(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/profiles", post(create_profile).get(list_profiles))
        .route("/api/v1/profiles/{token}", get(get_profile))
        .route("/api/v1/profiles/{token}/explain/{query}", get(explain))
        .with_state(state)
}

/// Handler for profile submission.
///
/// Returns 201 Created with the new token. Unparsable log lines are skipped
/// and reported in `skipped`.
async fn create_profile(
    State(state): State<AppState>,
    payload: Result<Json<ProfileRequest>, JsonRejection>,
) -> ProfileResult<(StatusCode, Json<ProfileCreated>)> {
    let Json(request) = payload.map_err(|rejection| {
        (
            StatusCode::BAD_REQUEST,
            Json(ProfileError::new("invalid_json", rejection.body_text())),
        )
    })?;

    let mut collector = QueryCollector::new(state.new_query_logger(), state.orm()).map_err(|e| {
        tracing::error!(error = %e, "Failed to attach query collector");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ProfileError::new("collector_error", e.to_string())),
        )
    })?;

    let submitted = request.statements.len();
    for statement in request.statements {
        let (message, severity) = statement.into_parts();
        collector.logger_mut().log(&message, severity);
    }
    collector.collect();

    let mut profile = Profile::new(collector.into_data());
    profile.method = request.method;
    profile.url = request.url;

    let created = ProfileCreated {
        token: profile.token.clone(),
        query_count: profile.data.query_count(),
        skipped: submitted - profile.data.query_count(),
        time: profile.data.time(),
    };

    state
        .profile_store()
        .insert(profile)
        .map_err(storage_error)?;

    tracing::debug!(
        token = %created.token,
        queries = created.query_count,
        skipped = created.skipped,
        "Stored profile"
    );

    Ok((StatusCode::CREATED, Json(created)))
}

/// Handler for the profile listing.
async fn list_profiles(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> ProfileResult<Json<ProfileListResponse>> {
    let store = state.profile_store();
    let limit = params.limit.unwrap_or(DEFAULT_LIST_LIMIT);

    let profiles = store.recent(limit).map_err(storage_error)?;
    let total_count = store.count().map_err(storage_error)?;

    Ok(Json(ProfileListResponse {
        profiles: profiles.iter().map(ProfileSummary::from).collect(),
        total_count,
    }))
}

/// Handler for the panel of one profile.
async fn get_profile(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ProfileResult<Json<PanelResponse>> {
    let profile = state.profile_store().get(&token).map_err(storage_error)?;

    let profile = profile.ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(ProfileError::new(
                "not_found",
                format!("No profile for token '{token}'"),
            )),
        )
    })?;

    Ok(Json(PanelResponse::from(profile)))
}

/// Handler for the explain action.
///
/// Always answers 200: failures are reported in the outcome's notice.
async fn explain(
    State(state): State<AppState>,
    Path((token, query)): Path<(String, usize)>,
) -> Json<ExplainOutcome> {
    Json(explain_query(state.profile_store(), state.explain_backend(), &token, query).await)
}
