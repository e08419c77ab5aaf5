//! Video and scene data model.
//!
//! The catalog is the single shared store for video metadata, transcripts and
//! detected scenes. All routes and the processing pipeline go through it.

mod store;

pub use store::{Catalog, VideoFilter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Video processing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    Uploading,
    Processing,
    Indexed,
    Failed,
}

impl std::fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VideoStatus::Uploading => write!(f, "uploading"),
            VideoStatus::Processing => write!(f, "processing"),
            VideoStatus::Indexed => write!(f, "indexed"),
            VideoStatus::Failed => write!(f, "failed"),
        }
    }
}

/// A raw scene boundary, as supplied by an external scene detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneSpan {
    pub start_seconds: f64,
    pub end_seconds: f64,
}

impl SceneSpan {
    pub fn duration(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }
}

/// A time-bounded segment of a video with its analysis results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    /// Scene identifier, unique within its video.
    pub id: String,
    /// Scene start time in seconds.
    pub start_seconds: f64,
    /// Scene end time in seconds.
    pub end_seconds: f64,
    /// Description of what is taught in the scene.
    pub description: String,
    /// Transcript fragment for the scene time range.
    pub transcript: Option<String>,
    /// Educational labels/tags.
    pub labels: Vec<String>,
    /// Confidence score of scene detection.
    pub confidence: f32,
    /// Detected content type (explanation, demonstration, ...).
    pub content_type: Option<String>,
}

impl Scene {
    /// Scene duration in seconds.
    pub fn duration(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }

    /// Text used for embedding: description plus transcript fragment.
    pub fn embedding_text(&self) -> String {
        match &self.transcript {
            Some(t) if !t.is_empty() => format!("{} {}", self.description, t),
            _ => self.description.clone(),
        }
    }
}

/// Video metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoMetadata {
    /// Unique video identifier.
    pub id: String,
    /// Video title.
    pub title: String,
    /// Video description.
    pub description: Option<String>,
    /// Video duration in seconds (0 until processed).
    pub duration_seconds: f64,
    /// Processing status.
    pub status: VideoStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Video tags.
    pub tags: Vec<String>,
    /// Subject category.
    pub subject: Option<String>,
    /// Difficulty level.
    pub difficulty: Option<String>,
}

/// A catalog entry: metadata plus processing outputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRecord {
    pub metadata: VideoMetadata,
    /// Full transcript supplied at registration.
    pub transcript: Option<String>,
    /// Scene boundaries supplied at registration, if any.
    pub boundaries: Option<Vec<SceneSpan>>,
    /// Scenes produced by processing.
    pub scenes: Vec<Scene>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_embedding_text() {
        let scene = Scene {
            id: "scene_0".to_string(),
            start_seconds: 0.0,
            end_seconds: 30.0,
            description: "Introduces variables".to_string(),
            transcript: Some("a variable is a symbol".to_string()),
            labels: vec![],
            confidence: 0.8,
            content_type: None,
        };
        assert_eq!(
            scene.embedding_text(),
            "Introduces variables a variable is a symbol"
        );

        let no_transcript = Scene {
            transcript: None,
            ..scene
        };
        assert_eq!(no_transcript.embedding_text(), "Introduces variables");
    }

    #[test]
    fn test_status_serde() {
        let json = serde_json::to_string(&VideoStatus::Indexed).unwrap();
        assert_eq!(json, "\"indexed\"");
        let status: VideoStatus = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(status, VideoStatus::Failed);
    }
}
