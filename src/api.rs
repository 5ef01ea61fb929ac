// src/api.rs
//! Thin request-routing entry point: one route per pipeline operation.
//! Handlers parse parameters, dispatch to the `Curator`, and map typed
//! outcomes onto JSON envelopes. A single error boundary converts anything
//! uncaught into a `{"status":"error"}` envelope.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::curate::{Curator, CustomOutcome, SummaryOutcome};
use crate::feeds::{self, FeedProvider};
use crate::notify::DynNotifier;

const DEFAULT_HISTORY_DAYS: i64 = 7;
const LIST_LIMIT: usize = 20;

#[derive(Clone)]
pub struct AppState {
    curator: Arc<Curator>,
    providers: Arc<Vec<Box<dyn FeedProvider>>>,
    notifier: DynNotifier,
}

impl AppState {
    pub fn new(
        curator: Arc<Curator>,
        providers: Arc<Vec<Box<dyn FeedProvider>>>,
        notifier: DynNotifier,
    ) -> Self {
        Self {
            curator,
            providers,
            notifier,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/collect", post(collect))
        .route("/summary", post(summary))
        .route("/history", get(history))
        .route("/custom", get(custom))
        .route("/list", get(list))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

/// Top-level error boundary: anything uncaught becomes a 500 envelope
/// instead of propagating into the transport layer.
struct ApiError(anyhow::Error);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!(error = ?self.0, "request failed at the boundary");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "status": "error", "message": self.0.to_string() })),
        )
            .into_response()
    }
}

impl<E: Into<anyhow::Error>> From<E> for ApiError {
    fn from(e: E) -> Self {
        Self(e.into())
    }
}

type ApiResult = Result<(StatusCode, Json<Value>), ApiError>;

fn timestamp() -> String {
    Utc::now().to_rfc3339()
}

async fn collect(State(state): State<AppState>) -> ApiResult {
    let candidates = feeds::collect_candidates(&state.providers).await;
    let report = state.curator.collect(candidates, state.providers.len()).await;

    if !report.accepted.is_empty() {
        if let Err(e) = state.notifier.notify_articles(&report.accepted).await {
            warn!(error = ?e, "article notification failed");
        }
    }

    Ok((
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "action": "collect",
            "new_articles": report.accepted_count,
            "articles": report.accepted,
            "total_feeds_checked": report.feeds_checked,
            "timestamp": timestamp(),
        })),
    ))
}

async fn summary(State(state): State<AppState>) -> ApiResult {
    match state.curator.summary().await {
        SummaryOutcome::Created {
            digest,
            articles_used,
        } => {
            if let Err(e) = state.notifier.notify_digest(&digest, articles_used).await {
                warn!(error = ?e, "digest notification failed");
            }
            Ok((
                StatusCode::OK,
                Json(json!({
                    "status": "success",
                    "action": "summary_created",
                    "articles_used": articles_used,
                    "digest": digest,
                    "timestamp": timestamp(),
                })),
            ))
        }
        // A precondition miss is a reported outcome, not an error.
        SummaryOutcome::Skipped { unused, minimum } => Ok((
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "action": "summary_skipped",
                "reason": format!("not enough unused articles ({unused} found, {minimum} required)"),
                "timestamp": timestamp(),
            })),
        )),
        SummaryOutcome::Failed { unused } => Ok((
            StatusCode::BAD_GATEWAY,
            Json(json!({
                "status": "error",
                "action": "summary_failed",
                "message": format!("digest generation failed for {unused} articles; nothing marked used"),
                "timestamp": timestamp(),
            })),
        )),
    }
}

#[derive(serde::Deserialize)]
struct HistoryParams {
    days: Option<i64>,
}

async fn history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> ApiResult {
    let days = params.days.unwrap_or(DEFAULT_HISTORY_DAYS).max(1);
    let buckets = state.curator.history(days).await;

    let mut thread_history = serde_json::Map::new();
    for (bucket_start, records) in &buckets {
        thread_history.insert(bucket_start.to_rfc3339(), json!(records));
    }

    Ok((
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "action": "history",
            "thread_history": thread_history,
            "thread_count": buckets.len(),
            "timestamp": timestamp(),
        })),
    ))
}

#[derive(serde::Deserialize)]
struct CustomParams {
    ids: Option<String>,
}

async fn custom(
    State(state): State<AppState>,
    Query(params): Query<CustomParams>,
) -> ApiResult {
    let ids: Vec<String> = params
        .ids
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if ids.is_empty() {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(json!({
                "status": "error",
                "message": "ids parameter is required (comma-separated)",
            })),
        ));
    }

    match state.curator.custom(&ids).await {
        CustomOutcome::NoIdsResolved => Ok((
            StatusCode::NOT_FOUND,
            Json(json!({
                "status": "error",
                "message": "none of the requested ids resolved to articles",
            })),
        )),
        CustomOutcome::Failed => Ok((
            StatusCode::BAD_GATEWAY,
            Json(json!({
                "status": "error",
                "message": "custom thread generation failed",
            })),
        )),
        CustomOutcome::Created { digest, articles } => Ok((
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "action": "custom_thread_created",
                "articles_used": articles.len(),
                "digest": digest,
                "articles": articles,
                "timestamp": timestamp(),
            })),
        )),
    }
}

async fn list(State(state): State<AppState>) -> ApiResult {
    let articles = state.curator.list_recent(LIST_LIMIT).await;
    Ok((
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "articles": articles,
            "count": articles.len(),
        })),
    ))
}
