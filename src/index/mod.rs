//! Scene vector index.
//!
//! Provides a trait-based interface over stores of per-scene embeddings, with
//! cosine-similarity search used by the retrieval pipeline.

mod fs;
mod memory;

pub use fs::FsIndex;
pub use memory::MemoryIndex;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// An indexed scene: its embedding plus the text it was embedded from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneEntry {
    /// Scene identifier, unique within its video.
    pub scene_id: String,
    /// Video the scene belongs to.
    pub video_id: String,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// Text the embedding was generated from.
    pub content: String,
}

/// A scene entry with its similarity score.
#[derive(Debug, Clone)]
pub struct ScoredScene {
    pub entry: SceneEntry,
    /// Cosine similarity to the query (higher is better).
    pub score: f32,
}

/// Trait for scene index implementations.
#[async_trait]
pub trait SceneIndex: Send + Sync {
    /// Store scene entries, replacing any with the same video/scene ID.
    async fn upsert_batch(&self, entries: &[SceneEntry]) -> Result<usize>;

    /// Search for scenes similar to the query embedding.
    ///
    /// When `video_id` is given, only that video's scenes are considered.
    /// Results are those with similarity at or above `min_score`, sorted
    /// descending by score and truncated to `limit`.
    async fn search(
        &self,
        query_embedding: &[f32],
        video_id: Option<&str>,
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<ScoredScene>>;

    /// Look up a single scene entry.
    async fn get(&self, video_id: &str, scene_id: &str) -> Result<Option<SceneEntry>>;

    /// Delete all entries for a video. Returns the number removed.
    async fn delete_video(&self, video_id: &str) -> Result<usize>;

    /// Total number of indexed scenes.
    async fn count(&self) -> Result<usize>;
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Rank candidates by similarity: threshold filter, stable descending sort,
/// truncate. Shared by the index implementations.
pub(crate) fn rank(mut results: Vec<ScoredScene>, limit: usize, min_score: f32) -> Vec<ScoredScene> {
    results.retain(|r| r.score >= min_score);
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(limit);
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_degenerate() {
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    fn scored(scene_id: &str, score: f32) -> ScoredScene {
        ScoredScene {
            entry: SceneEntry {
                scene_id: scene_id.to_string(),
                video_id: "v".to_string(),
                embedding: vec![],
                content: String::new(),
            },
            score,
        }
    }

    #[test]
    fn test_rank_filters_sorts_truncates() {
        let results = vec![scored("a", 0.2), scored("b", 0.9), scored("c", 0.5), scored("d", 0.7)];
        let ranked = rank(results, 2, 0.3);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].entry.scene_id, "b");
        assert_eq!(ranked[1].entry.scene_id, "d");
    }
}
