use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::repo::{self, Content, CONTENT_TYPES};
use crate::{db::clamp_limit, error::ApiError, state::AppState};

const DEFAULT_PAGE_SIZE: i64 = 10;
const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentQuery {
    pub content_type: Option<String>,
    #[serde(default)]
    pub page: i64,
    #[serde(default)]
    pub limit: i64,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct PageInfo {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub pages: i64,
}

impl PageInfo {
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        Self {
            total,
            page,
            limit,
            pages: (total + limit - 1) / limit,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ContentPage {
    pub content: Vec<Content>,
    pub pagination: PageInfo,
}

pub fn content_routes() -> Router<AppState> {
    Router::new()
        .route("/cms/content", get(list_content))
        .route("/cms/content/:slug", get(get_content))
}

#[instrument(skip(state))]
pub async fn list_content(
    State(state): State<AppState>,
    Query(q): Query<ContentQuery>,
) -> Result<Json<ContentPage>, ApiError> {
    let content_type = q
        .content_type
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase);
    if let Some(t) = content_type.as_deref() {
        if !CONTENT_TYPES.contains(&t) {
            return Err(ApiError::BadRequest(format!("unknown contentType {t:?}")));
        }
    }

    let limit = clamp_limit(q.limit, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE);
    let page = q.page.max(1);
    let offset = (page - 1)
        .checked_mul(limit)
        .ok_or_else(|| ApiError::BadRequest("page out of range".into()))?;

    let (content, total) =
        repo::list_published(&state.db, content_type.as_deref(), limit, offset).await?;

    Ok(Json(ContentPage {
        content,
        pagination: PageInfo::new(total, page, limit),
    }))
}

#[instrument(skip(state))]
pub async fn get_content(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Content>, ApiError> {
    let slug = slug.trim().to_lowercase();
    repo::find_published_by_slug(&state.db, &slug)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Content not found".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(PageInfo::new(0, 1, 10).pages, 0);
        assert_eq!(PageInfo::new(10, 1, 10).pages, 1);
        assert_eq!(PageInfo::new(11, 2, 10).pages, 2);
    }

    #[test]
    fn query_accepts_camel_case() {
        let q: ContentQuery =
            serde_json::from_value(serde_json::json!({ "contentType": "faq", "page": 2 }))
                .unwrap();
        assert_eq!(q.content_type.as_deref(), Some("faq"));
        assert_eq!(q.page, 2);
        assert_eq!(q.limit, 0);
    }
}
