//! HTTP surface: the page endpoint plus a liveness probe.

use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::trace::TraceLayer;

use crate::service::{PageError, StoryService};

/// Shared state for the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<StoryService>,
}

/// Query parameters of the page endpoint.
///
/// Both parameters are required. Values outside the valid range are passed
/// through so the service applies its own validation; absent or
/// non-numeric values are rejected at extraction with the same status.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageParams {
    page_size: i64,
    page: i64,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/beststories", get(best_stories))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn best_stories(
    State(state): State<AppState>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Response {
    let Query(params) = match params {
        Ok(params) => params,
        Err(rejection) => {
            return bad_request(rejection.body_text());
        }
    };

    match state.service.page(params.page_size, params.page).await {
        Ok(stories) => (StatusCode::OK, Json(stories)).into_response(),
        Err(e @ PageError::InvalidRequest { .. }) => bad_request(e.to_string()),
    }
}

fn bad_request(error: String) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorBody { error })).into_response()
}
