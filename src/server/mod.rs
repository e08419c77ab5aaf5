//! HTTP API server.
//!
//! REST endpoints for video registration, catalog browsing and semantic
//! scene search. All state lives in memory behind [`AppState`]; the routes
//! are thin wrappers over [`VideoProcessor`] and [`SearchEngine`].

mod search;
mod videos;

use crate::config::Settings;
use crate::error::{Result, SiktError};
use crate::processing::VideoProcessor;
use crate::search::SearchEngine;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Shared application state.
pub struct AppState {
    pub processor: Arc<VideoProcessor>,
    pub engine: SearchEngine,
    pub settings: Settings,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Map a pipeline error to an HTTP response.
fn error_response(e: SiktError) -> Response {
    let status = match &e {
        SiktError::VideoNotFound(_) | SiktError::SceneNotFound(_) => StatusCode::NOT_FOUND,
        SiktError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse { error: e.to_string() })).into_response()
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/videos", post(videos::register).get(videos::list))
        .route(
            "/api/videos/{video_id}",
            get(videos::get_video).delete(videos::delete_video),
        )
        .route("/api/videos/{video_id}/scenes", get(videos::scenes))
        .route("/api/videos/{video_id}/status", get(videos::status))
        .route(
            "/api/videos/{video_id}/scenes/{scene_id}/questions",
            get(videos::study_questions),
        )
        .route("/api/search", post(search::search))
        .route("/api/search/suggest", get(search::suggest))
        .route(
            "/api/search/related/{video_id}/{scene_id}",
            get(search::related),
        )
        .route("/api/search/intent", post(search::intent))
        .route("/api/search/feedback", post(search::feedback))
        .route("/api/search/topics", get(search::topics))
        .route("/api/search/subjects", get(search::subjects))
        .route("/api/search/stats", get(search::stats))
        .layer(cors)
        .with_state(state)
}

/// Build the shared state from settings with production components.
pub fn build_state(settings: Settings) -> Result<Arc<AppState>> {
    let processor = Arc::new(VideoProcessor::new(&settings)?);
    let engine = SearchEngine::new(
        processor.embedder(),
        processor.index(),
        processor.llm(),
        processor.catalog(),
        processor.prompts(),
        settings.search.clone(),
    );
    Ok(Arc::new(AppState {
        processor,
        engine,
        settings,
    }))
}

/// Bind and serve until shutdown.
pub async fn run(host: &str, port: u16, settings: Settings) -> Result<()> {
    let state = build_state(settings)?;
    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

async fn root() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": "Sikt",
        "description": "Semantic search over educational video scenes",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
