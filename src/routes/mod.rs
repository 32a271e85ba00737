pub mod api;
pub mod ui;

use std::sync::Arc;

use axum::Router;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::source::JobSource;
use crate::store::PostingStore;

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn JobSource>,
    pub store: Arc<dyn PostingStore>,
}

async fn healthz() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .merge(ui::router(state.clone()))
        .merge(api::router(state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
