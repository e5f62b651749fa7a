use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use curio_core::{AppConfig, EnrichmentConfig, ProcessingRun};
use curio_db::HistoryFilter;

use crate::middleware::RequestId;

use super::{
    map_db_error, map_upstream_error, normalize_limit, ApiError, ApiResponse, AppState,
    ResponseMeta,
};

#[derive(Debug, Deserialize)]
pub(super) struct RunRequest {
    bookmark_ids: Vec<String>,
    #[serde(default)]
    config: Option<RunConfigBody>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RunAllRequest {
    #[serde(default)]
    config: Option<RunConfigBody>,
}

/// Per-request overrides for the run configuration. Absent fields fall back
/// to the stage defaults and the server's configured limits.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(super) struct RunConfigBody {
    pub extract_tags: Option<bool>,
    pub generate_summary: Option<bool>,
    pub update_remote: Option<bool>,
    pub override_classified: Option<bool>,
    pub max_tags_per_item: Option<usize>,
    pub max_content_chars: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub(super) struct RunsQuery {
    pub limit: Option<i64>,
    pub failed_only: Option<bool>,
    pub since: Option<DateTime<Utc>>,
}

pub(super) fn effective_config(defaults: &AppConfig, body: Option<RunConfigBody>) -> EnrichmentConfig {
    let body = body.unwrap_or_default();
    EnrichmentConfig {
        extract_tags: body.extract_tags.unwrap_or(true),
        generate_summary: body.generate_summary.unwrap_or(true),
        update_remote: body.update_remote.unwrap_or(true),
        override_classified: body.override_classified.unwrap_or(false),
        max_tags_per_item: body.max_tags_per_item.unwrap_or(defaults.max_tags_per_item),
        max_content_chars: body
            .max_content_chars
            .unwrap_or(defaults.max_content_chars),
    }
}

pub(super) async fn create_run(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<RunRequest>,
) -> Result<Json<ApiResponse<ProcessingRun>>, ApiError> {
    if body.bookmark_ids.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "bookmark_ids must not be empty",
        ));
    }

    let config = effective_config(&state.config, body.config);
    let run = state.pipeline.run(&body.bookmark_ids, &config).await;

    curio_db::append_processing_run(&state.pool, &run)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: run,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn create_run_all(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Option<Json<RunAllRequest>>,
) -> Result<Json<ApiResponse<ProcessingRun>>, ApiError> {
    let ids = state
        .pipeline
        .unclassified_ids()
        .await
        .map_err(|e| map_upstream_error(req_id.0.clone(), &e))?;

    let config = effective_config(&state.config, body.and_then(|Json(b)| b.config));
    let run = state.pipeline.run(&ids, &config).await;

    curio_db::append_processing_run(&state.pool, &run)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: run,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn list_runs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<RunsQuery>,
) -> Result<Json<ApiResponse<Vec<ProcessingRun>>>, ApiError> {
    let filter = HistoryFilter {
        limit: Some(normalize_limit(query.limit)),
        failed_only: query.failed_only.unwrap_or(false),
        since: query.since,
    };

    let data = curio_db::list_processing_runs(&state.pool, &filter)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}

pub(super) async fn get_run(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(run_id): Path<Uuid>,
) -> Result<Json<ApiResponse<ProcessingRun>>, ApiError> {
    let data = match curio_db::get_processing_run(&state.pool, run_id).await {
        Ok(run) => run,
        Err(curio_db::DbError::NotFound) => {
            return Err(ApiError::new(req_id.0, "not_found", "run not found"));
        }
        Err(e) => return Err(map_db_error(req_id.0, &e)),
    };

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
