use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use curio_core::MARKER_TAG;
use curio_raindrop::RaindropType;

use crate::middleware::RequestId;

use super::{map_upstream_error, ApiError, ApiResponse, AppState, ResponseMeta};

#[derive(Debug, Deserialize)]
pub(super) struct BookmarksQuery {
    pub include_classified: Option<bool>,
}

#[derive(Debug, Serialize)]
pub(super) struct BookmarkItem {
    id: String,
    link: String,
    kind: RaindropType,
    title: String,
    excerpt: Option<String>,
    note: Option<String>,
    tags: Vec<String>,
    created: DateTime<Utc>,
}

pub(super) async fn list_bookmarks(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<BookmarksQuery>,
) -> Result<Json<ApiResponse<Vec<BookmarkItem>>>, ApiError> {
    let include_classified = query.include_classified.unwrap_or(false);

    let items = state
        .pipeline
        .raindrop()
        .fetch_unsorted()
        .await
        .map_err(|e| map_upstream_error(req_id.0.clone(), &e))?;

    let data = items
        .into_iter()
        .filter(|r| include_classified || !r.tags.iter().any(|t| t == MARKER_TAG))
        .map(|r| BookmarkItem {
            id: r.id,
            link: r.link,
            kind: r.kind,
            title: r.title,
            excerpt: r.excerpt,
            note: r.note,
            tags: r.tags,
            created: r.created,
        })
        .collect();

    Ok(Json(ApiResponse {
        data,
        meta: ResponseMeta::new(req_id.0),
    }))
}
