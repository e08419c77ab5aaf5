//! In-memory video catalog.
//!
//! Stands in for a database. A single instance is shared between the HTTP
//! routes and the processing pipeline so that readers always observe the
//! writer's updates.

use super::{Scene, SceneSpan, VideoMetadata, VideoRecord, VideoStatus};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;
use uuid::Uuid;

/// Filter for listing videos.
#[derive(Debug, Clone, Default)]
pub struct VideoFilter {
    pub subject: Option<String>,
    pub difficulty: Option<String>,
    pub status: Option<VideoStatus>,
}

/// Shared in-memory video catalog.
pub struct Catalog {
    videos: RwLock<HashMap<String, VideoRecord>>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self {
            videos: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new video and return its generated ID.
    pub fn register(
        &self,
        title: &str,
        description: Option<String>,
        subject: Option<String>,
        difficulty: Option<String>,
        tags: Vec<String>,
        transcript: Option<String>,
        boundaries: Option<Vec<SceneSpan>>,
    ) -> String {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        let record = VideoRecord {
            metadata: VideoMetadata {
                id: id.clone(),
                title: title.to_string(),
                description,
                duration_seconds: 0.0,
                status: VideoStatus::Uploading,
                created_at: now,
                updated_at: now,
                tags,
                subject,
                difficulty,
            },
            transcript,
            boundaries,
            scenes: Vec::new(),
        };

        let mut videos = self.videos.write().unwrap();
        videos.insert(id.clone(), record);
        id
    }

    /// Get a video's metadata.
    pub fn get(&self, video_id: &str) -> Option<VideoMetadata> {
        let videos = self.videos.read().unwrap();
        videos.get(video_id).map(|r| r.metadata.clone())
    }

    /// Get a full video record (metadata, transcript, scenes).
    pub fn get_record(&self, video_id: &str) -> Option<VideoRecord> {
        let videos = self.videos.read().unwrap();
        videos.get(video_id).cloned()
    }

    /// List videos matching the filter, newest first.
    pub fn list(&self, filter: &VideoFilter) -> Vec<VideoMetadata> {
        let videos = self.videos.read().unwrap();

        let mut result: Vec<VideoMetadata> = videos
            .values()
            .map(|r| &r.metadata)
            .filter(|m| {
                filter
                    .subject
                    .as_ref()
                    .is_none_or(|s| m.subject.as_deref() == Some(s.as_str()))
            })
            .filter(|m| {
                filter
                    .difficulty
                    .as_ref()
                    .is_none_or(|d| m.difficulty.as_deref() == Some(d.as_str()))
            })
            .filter(|m| filter.status.is_none_or(|s| m.status == s))
            .cloned()
            .collect();

        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        result
    }

    /// Update a video's processing status.
    pub fn set_status(&self, video_id: &str, status: VideoStatus) {
        let mut videos = self.videos.write().unwrap();
        if let Some(record) = videos.get_mut(video_id) {
            record.metadata.status = status;
            record.metadata.updated_at = Utc::now();
        }
    }

    /// Store processing results: scenes and total duration.
    pub fn set_scenes(&self, video_id: &str, scenes: Vec<Scene>) {
        let mut videos = self.videos.write().unwrap();
        if let Some(record) = videos.get_mut(video_id) {
            record.metadata.duration_seconds = scenes
                .iter()
                .map(|s| s.end_seconds)
                .fold(record.metadata.duration_seconds, f64::max);
            record.scenes = scenes;
            record.metadata.updated_at = Utc::now();
        }
    }

    /// Find a single scene.
    pub fn get_scene(&self, video_id: &str, scene_id: &str) -> Option<Scene> {
        let videos = self.videos.read().unwrap();
        videos
            .get(video_id)
            .and_then(|r| r.scenes.iter().find(|s| s.id == scene_id).cloned())
    }

    /// Remove a video. Returns the removed record if it existed.
    pub fn remove(&self, video_id: &str) -> Option<VideoRecord> {
        let mut videos = self.videos.write().unwrap();
        videos.remove(video_id)
    }

    /// Distinct subjects across all videos, sorted.
    pub fn subjects(&self) -> Vec<String> {
        let videos = self.videos.read().unwrap();
        let mut subjects: Vec<String> = videos
            .values()
            .filter_map(|r| r.metadata.subject.clone())
            .collect();
        subjects.sort();
        subjects.dedup();
        subjects
    }

    /// Total number of videos.
    pub fn video_count(&self) -> usize {
        self.videos.read().unwrap().len()
    }

    /// Number of videos with a given status.
    pub fn count_with_status(&self, status: VideoStatus) -> usize {
        let videos = self.videos.read().unwrap();
        videos
            .values()
            .filter(|r| r.metadata.status == status)
            .count()
    }

    /// Total number of scenes across all videos.
    pub fn scene_count(&self) -> usize {
        let videos = self.videos.read().unwrap();
        videos.values().map(|r| r.scenes.len()).sum()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(id: &str, start: f64, end: f64) -> Scene {
        Scene {
            id: id.to_string(),
            start_seconds: start,
            end_seconds: end,
            description: "desc".to_string(),
            transcript: None,
            labels: vec![],
            confidence: 0.8,
            content_type: None,
        }
    }

    #[test]
    fn test_register_and_get() {
        let catalog = Catalog::new();
        let id = catalog.register(
            "Algebra Basics",
            None,
            Some("Mathematics".to_string()),
            Some("Beginner".to_string()),
            vec!["math".to_string()],
            Some("transcript".to_string()),
            None,
        );

        let meta = catalog.get(&id).unwrap();
        assert_eq!(meta.title, "Algebra Basics");
        assert_eq!(meta.status, VideoStatus::Uploading);
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn test_list_filters() {
        let catalog = Catalog::new();
        let a = catalog.register("A", None, Some("Math".to_string()), None, vec![], None, None);
        let _b = catalog.register("B", None, Some("Physics".to_string()), None, vec![], None, None);
        catalog.set_status(&a, VideoStatus::Indexed);

        let math = catalog.list(&VideoFilter {
            subject: Some("Math".to_string()),
            ..Default::default()
        });
        assert_eq!(math.len(), 1);
        assert_eq!(math[0].title, "A");

        let indexed = catalog.list(&VideoFilter {
            status: Some(VideoStatus::Indexed),
            ..Default::default()
        });
        assert_eq!(indexed.len(), 1);

        let all = catalog.list(&VideoFilter::default());
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_set_scenes_updates_duration() {
        let catalog = Catalog::new();
        let id = catalog.register("A", None, None, None, vec![], None, None);
        catalog.set_scenes(&id, vec![scene("scene_0", 0.0, 30.0), scene("scene_1", 30.0, 75.0)]);

        let meta = catalog.get(&id).unwrap();
        assert!((meta.duration_seconds - 75.0).abs() < f64::EPSILON);
        assert_eq!(catalog.scene_count(), 2);
        assert!(catalog.get_scene(&id, "scene_1").is_some());
    }

    #[test]
    fn test_remove_and_subjects() {
        let catalog = Catalog::new();
        let a = catalog.register("A", None, Some("Math".to_string()), None, vec![], None, None);
        let _ = catalog.register("B", None, Some("Math".to_string()), None, vec![], None, None);

        assert_eq!(catalog.subjects(), vec!["Math".to_string()]);
        assert!(catalog.remove(&a).is_some());
        assert!(catalog.remove(&a).is_none());
        assert_eq!(catalog.video_count(), 1);
    }
}
