//! Search routes.

use super::{error_response, AppState, ErrorResponse};
use crate::search::{QueryIntent, SceneHit, SearchQuery};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

/// Curated starting points shown before the user has typed anything.
const POPULAR_TOPICS: &[&str] = &[
    "photosynthesis",
    "fractions and decimals",
    "Newton's laws of motion",
    "chemical reactions",
    "essay structure",
    "world war history",
    "cell biology",
    "algebra basics",
];

#[derive(Deserialize)]
pub struct SuggestParams {
    q: String,
    #[serde(default = "default_suggest_limit")]
    limit: usize,
}

fn default_suggest_limit() -> usize {
    5
}

#[derive(Serialize)]
struct SuggestResponse {
    query: String,
    suggestions: Vec<String>,
}

#[derive(Deserialize)]
pub struct RelatedParams {
    #[serde(default = "default_related_limit")]
    limit: usize,
}

fn default_related_limit() -> usize {
    5
}

#[derive(Serialize)]
struct RelatedResponse {
    video_id: String,
    scene_id: String,
    related: Vec<SceneHit>,
}

#[derive(Deserialize)]
pub struct IntentRequest {
    query: String,
}

#[derive(Serialize)]
struct IntentResponse {
    query: String,
    analysis: QueryIntent,
}

#[derive(Deserialize)]
pub struct FeedbackRequest {
    query: String,
    video_id: String,
    scene_id: String,
    helpful: bool,
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Json(query): Json<SearchQuery>,
) -> impl IntoResponse {
    match state.engine.search(&query).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn suggest(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SuggestParams>,
) -> impl IntoResponse {
    if params.q.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Query cannot be empty".to_string(),
            }),
        )
            .into_response();
    }

    let suggestions = state.engine.suggest(&params.q, params.limit).await;
    Json(SuggestResponse {
        query: params.q,
        suggestions,
    })
    .into_response()
}

pub async fn related(
    State(state): State<Arc<AppState>>,
    Path((video_id, scene_id)): Path<(String, String)>,
    Query(params): Query<RelatedParams>,
) -> impl IntoResponse {
    match state
        .engine
        .related_scenes(&video_id, &scene_id, params.limit)
        .await
    {
        Ok(related) => Json(RelatedResponse {
            video_id,
            scene_id,
            related,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

/// Classify the learning intent behind a query.
pub async fn intent(
    State(state): State<Arc<AppState>>,
    Json(req): Json<IntentRequest>,
) -> impl IntoResponse {
    match state.engine.classify_intent(&req.query).await {
        Ok(analysis) => Json(IntentResponse {
            query: req.query,
            analysis,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

/// Record relevance feedback. Currently only logged; a future ranking model
/// can consume the log.
pub async fn feedback(Json(req): Json<FeedbackRequest>) -> impl IntoResponse {
    info!(
        query = %req.query,
        video_id = %req.video_id,
        scene_id = %req.scene_id,
        helpful = req.helpful,
        "Search feedback received"
    );
    Json(serde_json::json!({ "status": "recorded" }))
}

pub async fn topics() -> impl IntoResponse {
    Json(serde_json::json!({ "topics": POPULAR_TOPICS }))
}

pub async fn subjects(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let subjects = state.processor.catalog().subjects();
    Json(serde_json::json!({ "subjects": subjects }))
}

pub async fn stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.engine.stats().await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => error_response(e),
    }
}
