//! Video processing pipeline.
//!
//! Takes a registered transcript (plus optional scene boundaries from an
//! external detector), cuts it into scenes, enhances each scene with an
//! LLM-generated description and labels, embeds the result and writes it to
//! the scene index. Status moves uploading -> processing -> indexed, or
//! failed if any step errors out.

pub mod analysis;

use crate::catalog::{Catalog, Scene, SceneSpan, VideoStatus};
use crate::config::{ProcessingSettings, Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{Result, SiktError};
use crate::index::{FsIndex, MemoryIndex, SceneEntry, SceneIndex};
use crate::llm::{LanguageModel, OpenAiChat};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

/// A video registration request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoSubmission {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Full transcript of the video.
    pub transcript: String,
    /// Scene boundaries from an external detector. Absent boundaries fall
    /// back to fixed-interval segmentation.
    #[serde(default)]
    pub scenes: Option<Vec<SceneSpan>>,
}

/// Scene metadata as returned by the enhancement prompt.
#[derive(Debug, Deserialize)]
struct SceneMetadata {
    description: String,
    #[serde(default)]
    labels: Vec<String>,
}

/// The video processing pipeline.
pub struct VideoProcessor {
    catalog: Arc<Catalog>,
    index: Arc<dyn SceneIndex>,
    embedder: Arc<dyn Embedder>,
    llm: Arc<dyn LanguageModel>,
    prompts: Prompts,
    settings: ProcessingSettings,
}

impl VideoProcessor {
    /// Create a processor with production components from settings.
    pub fn new(settings: &Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let index: Arc<dyn SceneIndex> = match settings.index.provider.as_str() {
            "memory" => Arc::new(MemoryIndex::new()),
            _ => Arc::new(FsIndex::new(&settings.embeddings_dir())?),
        };

        Ok(Self {
            catalog: Arc::new(Catalog::new()),
            index,
            embedder: Arc::new(OpenAIEmbedder::new(&settings.embedding)),
            llm: Arc::new(OpenAiChat::new(&settings.llm)),
            prompts,
            settings: settings.processing.clone(),
        })
    }

    /// Create a processor from explicit components.
    pub fn with_components(
        catalog: Arc<Catalog>,
        index: Arc<dyn SceneIndex>,
        embedder: Arc<dyn Embedder>,
        llm: Arc<dyn LanguageModel>,
        prompts: Prompts,
        settings: ProcessingSettings,
    ) -> Self {
        Self {
            catalog,
            index,
            embedder,
            llm,
            prompts,
            settings,
        }
    }

    /// Shared catalog.
    pub fn catalog(&self) -> Arc<Catalog> {
        self.catalog.clone()
    }

    /// Shared scene index.
    pub fn index(&self) -> Arc<dyn SceneIndex> {
        self.index.clone()
    }

    /// Shared embedder.
    pub fn embedder(&self) -> Arc<dyn Embedder> {
        self.embedder.clone()
    }

    /// Shared language model.
    pub fn llm(&self) -> Arc<dyn LanguageModel> {
        self.llm.clone()
    }

    /// Loaded prompt templates.
    pub fn prompts(&self) -> Prompts {
        self.prompts.clone()
    }

    /// Validate and register a submission. Returns the new video ID.
    pub fn register(&self, submission: &VideoSubmission) -> Result<String> {
        if submission.title.trim().is_empty() {
            return Err(SiktError::InvalidInput("Title cannot be empty".to_string()));
        }
        if submission.transcript.trim().is_empty() && submission.scenes.is_none() {
            return Err(SiktError::InvalidInput(
                "Submission needs a transcript or scene boundaries".to_string(),
            ));
        }
        if let Some(spans) = &submission.scenes {
            for span in spans {
                if span.end_seconds <= span.start_seconds {
                    return Err(SiktError::InvalidInput(format!(
                        "Scene end time must be after start time ({} <= {})",
                        span.end_seconds, span.start_seconds
                    )));
                }
            }
        }

        let id = self.catalog.register(
            &submission.title,
            submission.description.clone(),
            submission.subject.clone(),
            submission.difficulty.clone(),
            submission.tags.clone(),
            Some(submission.transcript.clone()),
            submission.scenes.clone(),
        );
        info!("Registered video {} ({})", id, submission.title);
        Ok(id)
    }

    /// Run the full pipeline for a registered video.
    #[instrument(skip(self))]
    pub async fn process(&self, video_id: &str) -> Result<()> {
        let record = self
            .catalog
            .get_record(video_id)
            .ok_or_else(|| SiktError::VideoNotFound(video_id.to_string()))?;

        self.catalog.set_status(video_id, VideoStatus::Processing);

        let transcript = record.transcript.unwrap_or_default();
        let spans = self.resolve_spans(&record.boundaries, &transcript)?;
        info!("Processing {} scenes for video {}", spans.len(), video_id);

        let mut scenes = Vec::with_capacity(spans.len());
        for (i, span) in spans.into_iter().enumerate() {
            let fragment = analysis::extract_segment(
                &transcript,
                span.start_seconds,
                span.end_seconds,
                self.settings.words_per_second,
            );

            let score = analysis::education_score(&fragment);
            if score < self.settings.min_education_score {
                debug!("Skipping scene {} (education score {:.2})", i, score);
                continue;
            }

            let (description, labels) = self.enhance_scene(&fragment).await;

            scenes.push(Scene {
                id: format!("scene_{}", i),
                start_seconds: span.start_seconds,
                end_seconds: span.end_seconds,
                description,
                transcript: (!fragment.is_empty()).then_some(fragment.clone()),
                labels,
                confidence: 0.8,
                content_type: Some(analysis::detect_content_type(&fragment)),
            });
        }

        self.index_scenes(video_id, &scenes).await?;
        self.catalog.set_scenes(video_id, scenes);
        self.catalog.set_status(video_id, VideoStatus::Indexed);

        info!("Video {} indexed", video_id);
        Ok(())
    }

    /// Run the pipeline on a background task, recording failure in the catalog.
    pub fn process_in_background(self: &Arc<Self>, video_id: String) {
        let processor = self.clone();
        tokio::spawn(async move {
            if let Err(e) = processor.process(&video_id).await {
                error!("Processing failed for video {}: {}", video_id, e);
                processor.catalog.set_status(&video_id, VideoStatus::Failed);
            }
        });
    }

    /// Remove a video from the catalog and the scene index.
    pub async fn delete_video(&self, video_id: &str) -> Result<()> {
        self.catalog
            .remove(video_id)
            .ok_or_else(|| SiktError::VideoNotFound(video_id.to_string()))?;
        let removed = self.index.delete_video(video_id).await?;
        debug!("Deleted video {} ({} index entries)", video_id, removed);
        Ok(())
    }

    /// Determine scene spans: supplied boundaries (merged for minimum
    /// length), or fixed intervals over the estimated transcript duration.
    fn resolve_spans(
        &self,
        boundaries: &Option<Vec<SceneSpan>>,
        transcript: &str,
    ) -> Result<Vec<SceneSpan>> {
        let spans = match boundaries {
            Some(spans) => {
                analysis::merge_short_spans(spans.clone(), self.settings.min_scene_seconds)
            }
            None => {
                let word_count = transcript.split_whitespace().count();
                let duration = word_count as f64 / self.settings.words_per_second;
                analysis::fixed_interval_spans(duration, self.settings.interval_seconds)
            }
        };

        if spans.is_empty() {
            return Err(SiktError::Processing(
                "No scenes could be derived from the submission".to_string(),
            ));
        }
        Ok(spans)
    }

    /// Ask the model for a scene description and labels, with a static
    /// fallback when the call or the JSON parse fails.
    async fn enhance_scene(&self, fragment: &str) -> (String, Vec<String>) {
        if fragment.trim().is_empty() {
            return (
                "Scene with no audio content".to_string(),
                vec!["visual-content".to_string()],
            );
        }

        let mut vars = HashMap::new();
        vars.insert("transcript".to_string(), fragment.to_string());
        let system = self.prompts.render_with_custom(&self.prompts.scene.system, &vars);
        let user = self.prompts.render_with_custom(&self.prompts.scene.user, &vars);

        match self.llm.complete(&system, &user).await {
            Ok(response) => match parse_scene_metadata(&response) {
                Some(meta) => (meta.description, meta.labels),
                None => {
                    warn!("Could not parse scene metadata, using fallback");
                    fallback_metadata(fragment)
                }
            },
            Err(e) => {
                warn!("Scene enhancement failed: {}", e);
                fallback_metadata(fragment)
            }
        }
    }

    /// Embed the scenes and write them to the index, replacing any previous
    /// entries for the video.
    async fn index_scenes(&self, video_id: &str, scenes: &[Scene]) -> Result<()> {
        if scenes.is_empty() {
            return Ok(());
        }

        let texts: Vec<String> = scenes.iter().map(|s| s.embedding_text()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;

        let entries: Vec<SceneEntry> = scenes
            .iter()
            .zip(embeddings)
            .zip(texts)
            .map(|((scene, embedding), content)| SceneEntry {
                scene_id: scene.id.clone(),
                video_id: video_id.to_string(),
                embedding,
                content,
            })
            .collect();

        self.index.delete_video(video_id).await?;
        self.index.upsert_batch(&entries).await?;
        Ok(())
    }
}

/// Extract the JSON object from a model response.
fn parse_scene_metadata(response: &str) -> Option<SceneMetadata> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&response[start..=end]).ok()
}

fn fallback_metadata(fragment: &str) -> (String, Vec<String>) {
    let preview: String = fragment.chars().take(100).collect();
    (
        format!("Educational segment: {}...", preview),
        vec!["general-content".to_string()],
    )
}
