use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The job source's hard request limit was hit. The pipeline downgrades
    /// this to a warning and keeps whatever was fetched before it.
    #[error("job source quota exceeded")]
    QuotaExceeded,

    #[error("job source error: {0}")]
    Source(String),

    #[error("store at {path} could not be parsed: {reason}")]
    StoreParse { path: String, reason: String },

    #[error("store write failed: {0}")]
    StoreWrite(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("template error: {0}")]
    Template(#[from] askama::Error),

    #[error("bad request: {0}")]
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::QuotaExceeded => (
                StatusCode::TOO_MANY_REQUESTS,
                "Job source quota exceeded".to_string(),
            ),
            AppError::Source(msg) => {
                tracing::error!("Job source error: {msg}");
                (StatusCode::BAD_GATEWAY, "Job source error".to_string())
            }
            AppError::StoreParse { path, reason } => {
                tracing::error!("Store parse failure in {path}: {reason}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Stored postings are unreadable; fix or clear the store".to_string(),
                )
            }
            AppError::StoreWrite(msg) => {
                tracing::error!("Store write failure: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to persist postings".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Template(e) => {
                tracing::error!("Template error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        };

        let body = axum::Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

/// Wrapper for form/page handlers so failures render as HTML, not JSON.
pub struct HtmlError(pub AppError);

impl From<AppError> for HtmlError {
    fn from(err: AppError) -> Self {
        HtmlError(err)
    }
}

impl IntoResponse for HtmlError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::QuotaExceeded => StatusCode::TOO_MANY_REQUESTS,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let page = format!(
            "<!DOCTYPE html><html><body><h1>Something went wrong</h1><p>{}</p>\
             <p><a href=\"/\">Back to search</a></p></body></html>",
            self.0
        );
        (status, Html(page)).into_response()
    }
}
