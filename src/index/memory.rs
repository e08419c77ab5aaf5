//! In-memory scene index.
//!
//! Useful for testing and small datasets.

use super::{cosine_similarity, rank, SceneEntry, SceneIndex, ScoredScene};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory scene index keyed by (video_id, scene_id).
pub struct MemoryIndex {
    entries: RwLock<HashMap<(String, String), SceneEntry>>,
}

impl MemoryIndex {
    /// Create a new in-memory index.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SceneIndex for MemoryIndex {
    async fn upsert_batch(&self, entries: &[SceneEntry]) -> Result<usize> {
        let mut store = self.entries.write().unwrap();
        for entry in entries {
            store.insert(
                (entry.video_id.clone(), entry.scene_id.clone()),
                entry.clone(),
            );
        }
        Ok(entries.len())
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        video_id: Option<&str>,
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<ScoredScene>> {
        let entries = self.entries.read().unwrap();

        let results: Vec<ScoredScene> = entries
            .values()
            .filter(|e| video_id.is_none_or(|v| e.video_id == v))
            .map(|e| ScoredScene {
                score: cosine_similarity(query_embedding, &e.embedding),
                entry: e.clone(),
            })
            .collect();

        Ok(rank(results, limit, min_score))
    }

    async fn get(&self, video_id: &str, scene_id: &str) -> Result<Option<SceneEntry>> {
        let entries = self.entries.read().unwrap();
        Ok(entries
            .get(&(video_id.to_string(), scene_id.to_string()))
            .cloned())
    }

    async fn delete_video(&self, video_id: &str) -> Result<usize> {
        let mut entries = self.entries.write().unwrap();
        let initial_len = entries.len();
        entries.retain(|(v, _), _| v != video_id);
        Ok(initial_len - entries.len())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.entries.read().unwrap().len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(video_id: &str, scene_id: &str, embedding: Vec<f32>) -> SceneEntry {
        SceneEntry {
            scene_id: scene_id.to_string(),
            video_id: video_id.to_string(),
            embedding,
            content: format!("content for {}", scene_id),
        }
    }

    #[tokio::test]
    async fn test_memory_index_roundtrip() {
        let index = MemoryIndex::new();

        index
            .upsert_batch(&[
                entry("v1", "scene_0", vec![1.0, 0.0, 0.0]),
                entry("v1", "scene_1", vec![0.0, 1.0, 0.0]),
                entry("v2", "scene_0", vec![0.9, 0.1, 0.0]),
            ])
            .await
            .unwrap();

        assert_eq!(index.count().await.unwrap(), 3);

        let results = index.search(&[1.0, 0.0, 0.0], None, 10, 0.0).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].entry.scene_id, "scene_0");
        assert!(results[0].score >= results[1].score);

        // Scoped search only sees the one video
        let scoped = index
            .search(&[1.0, 0.0, 0.0], Some("v2"), 10, 0.0)
            .await
            .unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].entry.video_id, "v2");
    }

    #[tokio::test]
    async fn test_threshold_excludes_low_scores() {
        let index = MemoryIndex::new();
        index
            .upsert_batch(&[
                entry("v1", "scene_0", vec![1.0, 0.0]),
                entry("v1", "scene_1", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let results = index.search(&[1.0, 0.0], None, 10, 0.5).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entry.scene_id, "scene_0");
    }

    #[tokio::test]
    async fn test_delete_video() {
        let index = MemoryIndex::new();
        index
            .upsert_batch(&[
                entry("v1", "scene_0", vec![1.0]),
                entry("v1", "scene_1", vec![1.0]),
                entry("v2", "scene_0", vec![1.0]),
            ])
            .await
            .unwrap();

        assert_eq!(index.delete_video("v1").await.unwrap(), 2);
        assert_eq!(index.count().await.unwrap(), 1);
        assert!(index.get("v1", "scene_0").await.unwrap().is_none());
        assert!(index.get("v2", "scene_0").await.unwrap().is_some());
    }
}
