pub mod books;
pub mod search;

use std::sync::Arc;

use axum::{http::StatusCode, routing::get, Json, Router};
use bible_reader::{ErrorKind, StoreError};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 200,
            message: "success".to_string(),
            data: Some(data),
        }
    }

    pub fn error(code: i32, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
            data: None,
        }
    }
}

pub type ApiError = (StatusCode, Json<ApiResponse<()>>);
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Map a store error onto an HTTP error / 错误转换
///
/// Provisioning and open failures are 503 so clients retry later.
pub fn store_error(e: StoreError) -> ApiError {
    let status = match e.kind() {
        ErrorKind::Provision | ErrorKind::StoreOpen => {
            tracing::error!("Corpus store unavailable: {}", e);
            StatusCode::SERVICE_UNAVAILABLE
        }
        ErrorKind::Query => {
            tracing::warn!("Corpus query failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let message = if e.is_fatal() {
        "数据库暂不可用，请稍后重试 / Corpus store unavailable, retry later".to_string()
    } else {
        format!("查询失败 / Query failed: {}", e)
    };
    (
        status,
        Json(ApiResponse::error(status.as_u16() as i32, &message)),
    )
}

pub fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse::error(400, message)),
    )
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/health", get(books::health))
        .route("/api/books", get(books::list_books))
        .route("/api/books/:book/chapters", get(books::list_chapters))
        .route("/api/books/:book/chapters/:chapter", get(books::get_chapter))
        .route("/api/search", get(search::search))
        .with_state(state)
}
