use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use bible_reader::SearchPage;
use serde::Deserialize;

use super::{bad_request, store_error, ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub page: Option<i64>,
}

/// 经文搜索（分页）
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<SearchPage> {
    let page = query.page.unwrap_or(0);
    if page < 0 {
        return Err(bad_request("Invalid page"));
    }

    let library = state.library().await.map_err(store_error)?;
    let result = library.search_page(&query.q, page).await.map_err(store_error)?;
    Ok(Json(ApiResponse::success(result)))
}
