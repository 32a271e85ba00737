use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::routing::post;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::company::Grouped;
use crate::pipeline;
use crate::routes::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/search", post(search))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub titles: Vec<String>,
    #[serde(default = "default_location")]
    pub location: String,
}

fn default_location() -> String {
    "Singapore".to_string()
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub companies: Grouped,
    pub fetched: usize,
    pub skipped: usize,
    pub quota_exceeded: bool,
}

/// POST /api/v1/search
///
/// Run the aggregation pipeline for the requested titles and return the
/// employer → roles mapping along with run counters.
pub async fn search(
    State(state): State<AppState>,
    Json(input): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, AppError> {
    let titles: Vec<String> = input
        .titles
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    if titles.is_empty() {
        return Err(AppError::BadRequest("no search titles given".to_string()));
    }

    let outcome =
        pipeline::run(state.source.as_ref(), state.store.as_ref(), &titles, &input.location)
            .await?;

    Ok(Json(SearchResponse {
        companies: outcome.grouped,
        fetched: outcome.stats.fetched,
        skipped: outcome.stats.skipped,
        quota_exceeded: outcome.stats.quota_exceeded,
    }))
}
