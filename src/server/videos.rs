//! Video catalog routes.

use super::{error_response, AppState, ErrorResponse};
use crate::catalog::{Scene, VideoFilter, VideoMetadata, VideoStatus};
use crate::processing::VideoSubmission;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Serialize)]
struct RegisterResponse {
    video_id: String,
    status: VideoStatus,
    message: String,
}

#[derive(Deserialize)]
pub struct ListParams {
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    difficulty: Option<String>,
    #[serde(default)]
    status: Option<VideoStatus>,
}

#[derive(Serialize)]
struct ListResponse {
    videos: Vec<VideoMetadata>,
    total: usize,
}

#[derive(Serialize)]
struct ScenesResponse {
    video_id: String,
    scenes: Vec<Scene>,
    total: usize,
}

#[derive(Serialize)]
struct StatusResponse {
    video_id: String,
    status: VideoStatus,
    scene_count: usize,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Deserialize)]
pub struct QuestionParams {
    #[serde(default = "default_question_count")]
    count: usize,
}

fn default_question_count() -> usize {
    5
}

#[derive(Serialize)]
struct QuestionsResponse {
    video_id: String,
    scene_id: String,
    questions: Vec<String>,
}

/// Register a video and start processing it in the background.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(submission): Json<VideoSubmission>,
) -> impl IntoResponse {
    match state.processor.register(&submission) {
        Ok(video_id) => {
            state.processor.process_in_background(video_id.clone());
            (
                StatusCode::ACCEPTED,
                Json(RegisterResponse {
                    video_id,
                    status: VideoStatus::Uploading,
                    message: "Video registered, processing started".to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => error_response(e),
    }
}

pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> impl IntoResponse {
    let filter = VideoFilter {
        subject: params.subject,
        difficulty: params.difficulty,
        status: params.status,
    };
    let videos = state.processor.catalog().list(&filter);
    Json(ListResponse {
        total: videos.len(),
        videos,
    })
}

pub async fn get_video(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> impl IntoResponse {
    match state.processor.catalog().get(&video_id) {
        Some(metadata) => Json(metadata).into_response(),
        None => not_found(&video_id),
    }
}

pub async fn scenes(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> impl IntoResponse {
    match state.processor.catalog().get_record(&video_id) {
        Some(record) if record.metadata.status != VideoStatus::Indexed => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!(
                    "Video is not indexed yet (status: {})",
                    record.metadata.status
                ),
            }),
        )
            .into_response(),
        Some(record) => Json(ScenesResponse {
            video_id,
            total: record.scenes.len(),
            scenes: record.scenes,
        })
        .into_response(),
        None => not_found(&video_id),
    }
}

pub async fn status(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> impl IntoResponse {
    match state.processor.catalog().get_record(&video_id) {
        Some(record) => Json(StatusResponse {
            video_id,
            status: record.metadata.status,
            scene_count: record.scenes.len(),
            created_at: record.metadata.created_at,
            updated_at: record.metadata.updated_at,
        })
        .into_response(),
        None => not_found(&video_id),
    }
}

pub async fn delete_video(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<String>,
) -> impl IntoResponse {
    match state.processor.delete_video(&video_id).await {
        Ok(()) => Json(serde_json::json!({
            "video_id": video_id,
            "deleted": true,
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}

/// Generate study questions for a single scene.
pub async fn study_questions(
    State(state): State<Arc<AppState>>,
    Path((video_id, scene_id)): Path<(String, String)>,
    Query(params): Query<QuestionParams>,
) -> impl IntoResponse {
    match state
        .engine
        .study_questions(&video_id, &scene_id, params.count)
        .await
    {
        Ok(questions) => Json(QuestionsResponse {
            video_id,
            scene_id,
            questions,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

fn not_found(video_id: &str) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Video not found: {}", video_id),
        }),
    )
        .into_response()
}
