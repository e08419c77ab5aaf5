//! File-backed scene index.
//!
//! Persists one JSON document per scene under
//! `<root>/<video_id>/<scene_id>.json`, each holding the scene ID, its
//! embedding and the embedded text. Entries that cannot be read or parsed are
//! skipped during search rather than failing the query.

use super::{cosine_similarity, rank, SceneEntry, SceneIndex, ScoredScene};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// On-disk form of an entry. The owning video is implied by the directory.
#[derive(Debug, Serialize, Deserialize)]
struct StoredScene {
    scene_id: String,
    embedding: Vec<f32>,
    content: String,
}

/// Scene index persisted as per-scene JSON files.
pub struct FsIndex {
    root: PathBuf,
}

impl FsIndex {
    /// Create an index rooted at the given embeddings directory.
    pub fn new(root: &Path) -> Result<Self> {
        std::fs::create_dir_all(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    fn scene_path(&self, video_id: &str, scene_id: &str) -> PathBuf {
        self.root.join(video_id).join(format!("{}.json", scene_id))
    }

    fn read_entry(&self, path: &Path, video_id: &str) -> Option<SceneEntry> {
        let content = std::fs::read_to_string(path).ok()?;
        let stored: StoredScene = match serde_json::from_str(&content) {
            Ok(s) => s,
            Err(e) => {
                debug!("Skipping unreadable scene file {}: {}", path.display(), e);
                return None;
            }
        };
        Some(SceneEntry {
            scene_id: stored.scene_id,
            video_id: video_id.to_string(),
            embedding: stored.embedding,
            content: stored.content,
        })
    }

    /// Load all entries, optionally scoped to a single video.
    fn load_entries(&self, video_id: Option<&str>) -> Vec<SceneEntry> {
        let video_dirs: Vec<PathBuf> = match video_id {
            Some(v) => vec![self.root.join(v)],
            None => match std::fs::read_dir(&self.root) {
                Ok(iter) => iter
                    .flatten()
                    .map(|e| e.path())
                    .filter(|p| p.is_dir())
                    .collect(),
                Err(e) => {
                    warn!("Cannot read embeddings directory: {}", e);
                    return Vec::new();
                }
            },
        };

        let mut entries = Vec::new();
        for dir in video_dirs {
            let Some(video) = dir.file_name().and_then(|n| n.to_str()).map(String::from) else {
                continue;
            };
            let Ok(files) = std::fs::read_dir(&dir) else {
                continue;
            };
            for file in files.flatten() {
                let path = file.path();
                if path.extension().and_then(|e| e.to_str()) != Some("json") {
                    continue;
                }
                if let Some(entry) = self.read_entry(&path, &video) {
                    entries.push(entry);
                }
            }
        }
        entries
    }
}

#[async_trait]
impl SceneIndex for FsIndex {
    async fn upsert_batch(&self, entries: &[SceneEntry]) -> Result<usize> {
        for entry in entries {
            let dir = self.root.join(&entry.video_id);
            std::fs::create_dir_all(&dir)?;

            let stored = StoredScene {
                scene_id: entry.scene_id.clone(),
                embedding: entry.embedding.clone(),
                content: entry.content.clone(),
            };
            let path = self.scene_path(&entry.video_id, &entry.scene_id);
            std::fs::write(&path, serde_json::to_string(&stored)?)?;
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
        let results: Vec<ScoredScene> = self
            .load_entries(video_id)
            .into_iter()
            .map(|entry| ScoredScene {
                score: cosine_similarity(query_embedding, &entry.embedding),
                entry,
            })
            .collect();

        Ok(rank(results, limit, min_score))
    }

    async fn get(&self, video_id: &str, scene_id: &str) -> Result<Option<SceneEntry>> {
        let path = self.scene_path(video_id, scene_id);
        if !path.exists() {
            return Ok(None);
        }
        Ok(self.read_entry(&path, video_id))
    }

    async fn delete_video(&self, video_id: &str) -> Result<usize> {
        let dir = self.root.join(video_id);
        if !dir.exists() {
            return Ok(0);
        }

        let removed = std::fs::read_dir(&dir)
            .map(|iter| iter.flatten().count())
            .unwrap_or(0);
        std::fs::remove_dir_all(&dir)?;
        Ok(removed)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.load_entries(None).len())
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
    async fn test_fs_index_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let index = FsIndex::new(tmp.path()).unwrap();

        index
            .upsert_batch(&[
                entry("v1", "scene_0", vec![1.0, 0.0]),
                entry("v1", "scene_1", vec![0.0, 1.0]),
                entry("v2", "scene_0", vec![0.8, 0.2]),
            ])
            .await
            .unwrap();

        assert_eq!(index.count().await.unwrap(), 3);

        let results = index.search(&[1.0, 0.0], None, 10, 0.0).await.unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].entry.video_id, "v1");
        assert_eq!(results[0].entry.scene_id, "scene_0");

        let scoped = index.search(&[1.0, 0.0], Some("v2"), 10, 0.0).await.unwrap();
        assert_eq!(scoped.len(), 1);

        let fetched = index.get("v1", "scene_1").await.unwrap().unwrap();
        assert_eq!(fetched.content, "content for scene_1");
    }

    #[tokio::test]
    async fn test_corrupt_files_are_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let index = FsIndex::new(tmp.path()).unwrap();

        index
            .upsert_batch(&[entry("v1", "scene_0", vec![1.0, 0.0])])
            .await
            .unwrap();

        // Drop a broken file next to the valid one
        std::fs::write(tmp.path().join("v1").join("scene_1.json"), "not json").unwrap();

        let results = index.search(&[1.0, 0.0], None, 10, 0.0).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].entry.scene_id, "scene_0");
    }

    #[tokio::test]
    async fn test_delete_missing_video_is_ok() {
        let tmp = tempfile::tempdir().unwrap();
        let index = FsIndex::new(tmp.path()).unwrap();
        assert_eq!(index.delete_video("nope").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing() {
        let tmp = tempfile::tempdir().unwrap();
        let index = FsIndex::new(tmp.path()).unwrap();

        index
            .upsert_batch(&[entry("v1", "scene_0", vec![1.0, 0.0])])
            .await
            .unwrap();
        index
            .upsert_batch(&[entry("v1", "scene_0", vec![0.0, 1.0])])
            .await
            .unwrap();

        assert_eq!(index.count().await.unwrap(), 1);
        let fetched = index.get("v1", "scene_0").await.unwrap().unwrap();
        assert_eq!(fetched.embedding, vec![0.0, 1.0]);
    }
}
