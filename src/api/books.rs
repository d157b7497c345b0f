use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use bible_reader::{catalog, BookEntry, NavTarget, Verse};
use serde::Serialize;
use serde_json::{json, Value};

use super::{bad_request, store_error, ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ChaptersResponse {
    pub book: i64,
    pub book_name: Option<&'static str>,
    pub chapters: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct ChapterResponse {
    pub book: i64,
    pub book_name: Option<&'static str>,
    pub chapter: i64,
    pub verses: Vec<Verse>,
    pub prev: NavTarget,
    pub next: NavTarget,
}

/// 服务状态
pub async fn health(State(state): State<Arc<AppState>>) -> Json<ApiResponse<Value>> {
    Json(ApiResponse::success(json!({
        "version": env!("CARGO_PKG_VERSION"),
        "build_time": env!("BUILD_TIME"),
        "started_at": state.started_at.to_rfc3339(),
        "store_ready": state.is_ready(),
        "database": state.provisioner.destination().display().to_string(),
    })))
}

/// 书卷列表
pub async fn list_books(State(state): State<Arc<AppState>>) -> ApiResult<Vec<BookEntry>> {
    let library = state.library().await.map_err(store_error)?;
    let books = library.books().await.map_err(store_error)?;
    Ok(Json(ApiResponse::success(books)))
}

/// 章节列表
pub async fn list_chapters(
    State(state): State<Arc<AppState>>,
    Path(book): Path<i64>,
) -> ApiResult<ChaptersResponse> {
    if book < 0 {
        return Err(bad_request("Invalid book index"));
    }
    let library = state.library().await.map_err(store_error)?;
    let chapters = library.chapters_of(book).await.map_err(store_error)?;
    Ok(Json(ApiResponse::success(ChaptersResponse {
        book,
        book_name: catalog::book_name(book),
        chapters,
    })))
}

/// Verses of one chapter plus its neighbours / 章节经文及前后章节
pub async fn get_chapter(
    State(state): State<Arc<AppState>>,
    Path((book, chapter)): Path<(i64, i64)>,
) -> ApiResult<ChapterResponse> {
    if book < 0 || chapter < 1 {
        return Err(bad_request("Invalid chapter reference"));
    }
    let library = state.library().await.map_err(store_error)?;

    let (verses, targets) = tokio::try_join!(
        library.list_verses(book, chapter),
        library.prev_next_for(book, chapter)
    )
    .map_err(store_error)?;

    Ok(Json(ApiResponse::success(ChapterResponse {
        book,
        book_name: catalog::book_name(book),
        chapter,
        verses,
        prev: targets.prev,
        next: targets.next,
    })))
}
