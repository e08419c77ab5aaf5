//! Semantic scene search.
//!
//! The retrieval pipeline runs in four steps: embed the query, pull
//! candidates from the scene index by cosine similarity, re-rank them with a
//! language model, then generate per-result explanations and follow-up
//! suggestions. Every model-dependent step degrades to a sensible fallback
//! instead of failing the search.

mod rerank;

pub use rerank::{apply_ranking, parse_ranking};

use crate::catalog::{Catalog, VideoStatus};
use crate::config::{Prompts, SearchSettings};
use crate::embedding::Embedder;
use crate::error::{Result, SiktError};
use crate::index::{SceneIndex, ScoredScene};
use crate::llm::LanguageModel;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// A search request.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    /// Natural-language query.
    pub query: String,
    /// Restrict the search to a single video.
    #[serde(default)]
    pub video_id: Option<String>,
    /// Maximum number of results (defaults from settings).
    #[serde(default)]
    pub max_results: Option<usize>,
    /// Minimum similarity score (defaults from settings).
    #[serde(default)]
    pub min_score: Option<f32>,
}

/// A single search result.
#[derive(Debug, Clone, Serialize)]
pub struct SceneHit {
    pub scene_id: String,
    pub video_id: String,
    pub video_title: String,
    /// Cosine similarity to the query.
    pub relevance_score: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    pub start_seconds: f64,
    pub end_seconds: f64,
}

/// A complete search response.
#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub query: String,
    pub results: Vec<SceneHit>,
    pub total_results: usize,
    /// Wall-clock time spent serving the search, in seconds.
    pub processing_seconds: f64,
    pub suggestions: Vec<String>,
}

/// Classified learning intent behind a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryIntent {
    /// definition, explanation, example, demonstration, problem_solving, review.
    pub intent_type: String,
    /// general, specific, very_specific.
    pub specificity: String,
    /// low, medium, high.
    pub urgency: String,
    /// Bloom level: remember, understand, apply, analyze, evaluate, create.
    pub cognitive_level: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub suggested_content_types: Vec<String>,
}

/// Statistics about the indexed content.
#[derive(Debug, Clone, Serialize)]
pub struct SearchStats {
    pub total_videos: usize,
    pub indexed_videos: usize,
    pub total_scenes: usize,
    pub indexed_scenes: usize,
}

/// The semantic search engine.
pub struct SearchEngine {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn SceneIndex>,
    llm: Arc<dyn LanguageModel>,
    catalog: Arc<Catalog>,
    prompts: Prompts,
    settings: SearchSettings,
}

impl SearchEngine {
    /// Create a new search engine.
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn SceneIndex>,
        llm: Arc<dyn LanguageModel>,
        catalog: Arc<Catalog>,
        prompts: Prompts,
        settings: SearchSettings,
    ) -> Self {
        Self {
            embedder,
            index,
            llm,
            catalog,
            prompts,
            settings,
        }
    }

    /// Run the full retrieval pipeline for a query.
    #[instrument(skip(self, query), fields(query = %query.query))]
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchOutcome> {
        let text = query.query.trim();
        if text.is_empty() {
            return Err(SiktError::InvalidInput("Query cannot be empty".to_string()));
        }

        let started = Instant::now();
        let limit = query.max_results.unwrap_or(self.settings.max_results);
        let min_score = query.min_score.unwrap_or(self.settings.similarity_threshold);

        // Candidate retrieval
        let query_embedding = self.embedder.embed(text).await?;
        let candidates = self
            .index
            .search(&query_embedding, query.video_id.as_deref(), limit, min_score)
            .await?;
        debug!("Retrieved {} candidates", candidates.len());

        // Relevance re-ranking
        let ranked = if self.settings.rerank {
            rerank::rerank(self.llm.as_ref(), &self.prompts, text, candidates).await
        } else {
            candidates
        };

        // Explanations and suggestions
        let explanations = self.explain_all(text, &ranked).await;
        let suggestions = self.followup_suggestions(text, ranked.first()).await;

        let results: Vec<SceneHit> = ranked
            .into_iter()
            .zip(explanations)
            .map(|(candidate, explanation)| self.to_hit(candidate, Some(explanation)))
            .collect();

        info!("Search returned {} results", results.len());

        Ok(SearchOutcome {
            query: text.to_string(),
            total_results: results.len(),
            processing_seconds: started.elapsed().as_secs_f64(),
            results,
            suggestions,
        })
    }

    /// Find scenes similar to an already-indexed scene, across all videos.
    ///
    /// Reuses the stored embedding of the source scene; the source itself is
    /// excluded from the results.
    #[instrument(skip(self))]
    pub async fn related_scenes(
        &self,
        video_id: &str,
        scene_id: &str,
        limit: usize,
    ) -> Result<Vec<SceneHit>> {
        let source = self
            .index
            .get(video_id, scene_id)
            .await?
            .ok_or_else(|| SiktError::SceneNotFound(format!("{}/{}", video_id, scene_id)))?;

        let mut results = self
            .index
            .search(
                &source.embedding,
                None,
                limit.saturating_add(1),
                self.settings.similarity_threshold,
            )
            .await?;

        results.retain(|r| !(r.entry.video_id == video_id && r.entry.scene_id == scene_id));
        results.truncate(limit);

        Ok(results
            .into_iter()
            .map(|candidate| self.to_hit(candidate, None))
            .collect())
    }

    /// Suggest complete questions for a partially typed query.
    pub async fn suggest(&self, partial: &str, limit: usize) -> Vec<String> {
        let mut vars = HashMap::new();
        vars.insert("query".to_string(), partial.to_string());
        vars.insert("count".to_string(), limit.to_string());
        let user = self.prompts.render_with_custom(&self.prompts.suggest.partial, &vars);

        match self.llm.complete("", &user).await {
            Ok(response) => {
                let items = parse_list_items(&response, limit);
                if items.is_empty() {
                    fallback_suggestions(partial, limit)
                } else {
                    items
                }
            }
            Err(e) => {
                warn!("Suggestion generation failed, using fallback: {}", e);
                fallback_suggestions(partial, limit)
            }
        }
    }

    /// Generate study questions for an indexed scene.
    pub async fn study_questions(
        &self,
        video_id: &str,
        scene_id: &str,
        count: usize,
    ) -> Result<Vec<String>> {
        let scene = self
            .catalog
            .get_scene(video_id, scene_id)
            .ok_or_else(|| SiktError::SceneNotFound(format!("{}/{}", video_id, scene_id)))?;

        let difficulty = self
            .catalog
            .get(video_id)
            .and_then(|m| m.difficulty)
            .unwrap_or_else(|| "intermediate".to_string());

        let mut vars = HashMap::new();
        vars.insert("content".to_string(), scene.embedding_text());
        vars.insert("count".to_string(), count.to_string());
        vars.insert("difficulty".to_string(), difficulty);
        let user = self.prompts.render_with_custom(&self.prompts.study.user, &vars);

        let response = self.llm.complete("", &user).await?;
        Ok(parse_list_items(&response, count))
    }

    /// Classify the learning intent behind a query.
    ///
    /// Falls back to a generic "explanation" classification with the query
    /// words as keywords when the model call or the JSON parse fails.
    pub async fn classify_intent(&self, query: &str) -> Result<QueryIntent> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SiktError::InvalidInput("Query cannot be empty".to_string()));
        }

        let mut vars = HashMap::new();
        vars.insert("query".to_string(), query.to_string());
        let user = self.prompts.render_with_custom(&self.prompts.intent.user, &vars);

        match self.llm.complete("", &user).await {
            Ok(response) => match parse_intent(&response) {
                Some(intent) => Ok(intent),
                None => {
                    warn!("Could not parse intent classification, using fallback");
                    Ok(fallback_intent(query))
                }
            },
            Err(e) => {
                warn!("Intent classification failed, using fallback: {}", e);
                Ok(fallback_intent(query))
            }
        }
    }

    /// Index statistics.
    pub async fn stats(&self) -> Result<SearchStats> {
        Ok(SearchStats {
            total_videos: self.catalog.video_count(),
            indexed_videos: self.catalog.count_with_status(VideoStatus::Indexed),
            total_scenes: self.catalog.scene_count(),
            indexed_scenes: self.index.count().await?,
        })
    }

    /// Generate one explanation per candidate, concurrently. A failed call
    /// degrades to a generic sentence rather than failing the search.
    async fn explain_all(&self, query: &str, candidates: &[ScoredScene]) -> Vec<String> {
        let futures = candidates.iter().map(|candidate| async move {
            let mut vars = HashMap::new();
            vars.insert("query".to_string(), query.to_string());
            vars.insert("content".to_string(), candidate.entry.content.clone());

            let system = self.prompts.render_with_custom(&self.prompts.explain.system, &vars);
            let user = self.prompts.render_with_custom(&self.prompts.explain.user, &vars);

            match self.llm.complete(&system, &user).await {
                Ok(explanation) if !explanation.is_empty() => explanation,
                Ok(_) => fallback_explanation(query),
                Err(e) => {
                    warn!("Explanation generation failed: {}", e);
                    fallback_explanation(query)
                }
            }
        });

        futures::future::join_all(futures).await
    }

    /// Follow-up suggestions from the top-ranked result.
    async fn followup_suggestions(&self, query: &str, top: Option<&ScoredScene>) -> Vec<String> {
        let count = self.settings.suggestion_count;
        let Some(top) = top else {
            return fallback_suggestions(query, count);
        };

        let mut vars = HashMap::new();
        vars.insert("query".to_string(), query.to_string());
        vars.insert("content".to_string(), top.entry.content.clone());
        vars.insert("count".to_string(), count.to_string());
        let user = self.prompts.render_with_custom(&self.prompts.suggest.followup, &vars);

        match self.llm.complete("", &user).await {
            Ok(response) => {
                let items = parse_list_items(&response, count);
                if items.is_empty() {
                    fallback_suggestions(query, count)
                } else {
                    items
                }
            }
            Err(e) => {
                warn!("Follow-up suggestion generation failed: {}", e);
                fallback_suggestions(query, count)
            }
        }
    }

    /// Turn a scored index entry into an API result using catalog metadata.
    fn to_hit(&self, candidate: ScoredScene, explanation: Option<String>) -> SceneHit {
        let video_title = self
            .catalog
            .get(&candidate.entry.video_id)
            .map(|m| m.title)
            .unwrap_or_else(|| "Unknown video".to_string());

        let (start_seconds, end_seconds) = self
            .catalog
            .get_scene(&candidate.entry.video_id, &candidate.entry.scene_id)
            .map(|s| (s.start_seconds, s.end_seconds))
            .unwrap_or((0.0, 0.0));

        SceneHit {
            scene_id: candidate.entry.scene_id,
            video_id: candidate.entry.video_id,
            video_title,
            relevance_score: candidate.score,
            explanation,
            start_seconds,
            end_seconds,
        }
    }
}

/// Static explanation used when the model call fails.
fn fallback_explanation(query: &str) -> String {
    format!(
        "This scene covers material related to '{}' in an educational context.",
        query
    )
}

/// Templated suggestions used when the model call fails.
fn fallback_suggestions(query: &str, limit: usize) -> Vec<String> {
    let base = [
        format!("How does {} work?", query),
        format!("Examples of {}", query),
        format!("Advanced {} concepts", query),
        format!("{} applications", query),
        format!("Common mistakes in {}", query),
    ];
    base.into_iter().take(limit).collect()
}

/// Extract the JSON object from an intent classification response.
fn parse_intent(response: &str) -> Option<QueryIntent> {
    let start = response.find('{')?;
    let end = response.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&response[start..=end]).ok()
}

/// Generic classification used when the model call fails.
fn fallback_intent(query: &str) -> QueryIntent {
    QueryIntent {
        intent_type: "explanation".to_string(),
        specificity: "general".to_string(),
        urgency: "medium".to_string(),
        cognitive_level: "understand".to_string(),
        keywords: query.split_whitespace().map(String::from).collect(),
        suggested_content_types: vec!["explanation".to_string(), "example".to_string()],
    }
}

/// Parse a plain or numbered list response into items, one per line.
fn parse_list_items(response: &str, limit: usize) -> Vec<String> {
    response
        .lines()
        .map(strip_list_marker)
        .filter(|line| !line.is_empty())
        .take(limit)
        .map(String::from)
        .collect()
}

/// Remove a leading "1." / "2)" numbering or a "-"/"*" bullet. Lines that
/// merely start with a number ("2024 exam prep") keep it.
fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    let unnumbered = line.trim_start_matches(|c: char| c.is_ascii_digit());
    if unnumbered.len() < line.len() {
        return match unnumbered.strip_prefix(['.', ')']) {
            Some(rest) => rest.trim(),
            None => line,
        };
    }
    line.trim_start_matches(['-', '*']).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{MemoryIndex, SceneEntry};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Embedder that returns fixed vectors per known text.
    struct StubEmbedder;

    #[async_trait]
    impl Embedder for StubEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            // Queries about fractions point at the fraction scene.
            if text.contains("fraction") {
                Ok(vec![1.0, 0.0])
            } else {
                Ok(vec![0.0, 1.0])
            }
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut out = Vec::new();
            for t in texts {
                out.push(self.embed(t).await?);
            }
            Ok(out)
        }

        fn dimensions(&self) -> usize {
            2
        }
    }

    /// Language model returning canned responses in order.
    struct ScriptedModel {
        responses: Mutex<Vec<Result<String>>>,
    }

    impl ScriptedModel {
        fn new(responses: Vec<Result<String>>) -> Self {
            Self {
                responses: Mutex::new(responses),
            }
        }

        fn failing() -> Self {
            Self::new(vec![])
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String> {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(SiktError::OpenAI("scripted failure".to_string()));
            }
            responses.remove(0)
        }
    }

    async fn engine_with(llm: Arc<dyn LanguageModel>) -> SearchEngine {
        let catalog = Arc::new(Catalog::new());
        let video_id = catalog.register("Fractions 101", None, None, None, vec![], None, None);
        catalog.set_scenes(
            &video_id,
            vec![
                crate::catalog::Scene {
                    id: "scene_0".to_string(),
                    start_seconds: 0.0,
                    end_seconds: 30.0,
                    description: "Adding fractions".to_string(),
                    transcript: None,
                    labels: vec![],
                    confidence: 0.8,
                    content_type: None,
                },
                crate::catalog::Scene {
                    id: "scene_1".to_string(),
                    start_seconds: 30.0,
                    end_seconds: 60.0,
                    description: "Decimals".to_string(),
                    transcript: None,
                    labels: vec![],
                    confidence: 0.8,
                    content_type: None,
                },
            ],
        );
        catalog.set_status(&video_id, VideoStatus::Indexed);

        let index = Arc::new(MemoryIndex::new());
        index
            .upsert_batch(&[
                SceneEntry {
                    scene_id: "scene_0".to_string(),
                    video_id: video_id.clone(),
                    embedding: vec![1.0, 0.0],
                    content: "Adding fractions step by step".to_string(),
                },
                SceneEntry {
                    scene_id: "scene_1".to_string(),
                    video_id: video_id.clone(),
                    embedding: vec![0.6, 0.8],
                    content: "Converting fractions to decimals".to_string(),
                },
            ])
            .await
            .unwrap();

        SearchEngine::new(
            Arc::new(StubEmbedder),
            index,
            llm,
            catalog,
            Prompts::default(),
            SearchSettings {
                max_results: 5,
                similarity_threshold: 0.1,
                rerank: true,
                suggestion_count: 2,
            },
        )
    }

    #[tokio::test]
    async fn test_search_rejects_blank_query() {
        let engine = engine_with(Arc::new(ScriptedModel::failing())).await;
        let result = engine
            .search(&SearchQuery {
                query: "   ".to_string(),
                video_id: None,
                max_results: None,
                min_score: None,
            })
            .await;
        assert!(matches!(result, Err(SiktError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_search_degrades_when_model_fails() {
        // Every LLM call fails: rerank keeps similarity order, explanations
        // and suggestions use fallbacks, and the search still succeeds.
        let engine = engine_with(Arc::new(ScriptedModel::failing())).await;
        let outcome = engine
            .search(&SearchQuery {
                query: "how do I add fractions".to_string(),
                video_id: None,
                max_results: None,
                min_score: None,
            })
            .await
            .unwrap();

        assert_eq!(outcome.total_results, 2);
        assert_eq!(outcome.results[0].scene_id, "scene_0");
        assert!(outcome.results[0].explanation.as_ref().unwrap().contains("fractions"));
        assert_eq!(outcome.suggestions.len(), 2);
        assert_eq!(outcome.results[0].video_title, "Fractions 101");
        assert!((outcome.results[0].end_seconds - 30.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_search_applies_model_ranking() {
        // First scripted response answers the rerank prompt, the rest cover
        // the two explanations and the suggestion call.
        let llm = ScriptedModel::new(vec![
            Ok("2,1".to_string()),
            Ok("Explains the second scene.".to_string()),
            Ok("Explains the first scene.".to_string()),
            Ok("What about mixed numbers?\nHow do decimals round?".to_string()),
        ]);
        let engine = engine_with(Arc::new(llm)).await;

        let outcome = engine
            .search(&SearchQuery {
                query: "fraction arithmetic".to_string(),
                video_id: None,
                max_results: None,
                min_score: None,
            })
            .await
            .unwrap();

        // Similarity order would be scene_0 first; the model flipped it.
        assert_eq!(outcome.results[0].scene_id, "scene_1");
        assert_eq!(outcome.results[1].scene_id, "scene_0");
        assert_eq!(outcome.suggestions[0], "What about mixed numbers?");
    }

    #[tokio::test]
    async fn test_related_scenes_excludes_source() {
        let engine = engine_with(Arc::new(ScriptedModel::failing())).await;
        let video_id = engine.catalog.list(&Default::default())[0].id.clone();

        let related = engine.related_scenes(&video_id, "scene_0", 5).await.unwrap();
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].scene_id, "scene_1");

        let missing = engine.related_scenes(&video_id, "scene_9", 5).await;
        assert!(matches!(missing, Err(SiktError::SceneNotFound(_))));
    }

    #[tokio::test]
    async fn test_related_scenes_with_maximum_limit() {
        // The limit comes straight from a query parameter; the largest
        // possible value must not overflow the internal limit + 1.
        let engine = engine_with(Arc::new(ScriptedModel::failing())).await;
        let video_id = engine.catalog.list(&Default::default())[0].id.clone();

        let related = engine
            .related_scenes(&video_id, "scene_0", usize::MAX)
            .await
            .unwrap();
        assert_eq!(related.len(), 1);
    }

    #[tokio::test]
    async fn test_suggest_fallback() {
        let engine = engine_with(Arc::new(ScriptedModel::failing())).await;
        let suggestions = engine.suggest("photosynthesis", 3).await;
        assert_eq!(suggestions.len(), 3);
        assert!(suggestions[0].contains("photosynthesis"));

        // The template set covers the server's default suggestion count
        let five = engine.suggest("photosynthesis", 5).await;
        assert_eq!(five.len(), 5);
    }

    #[tokio::test]
    async fn test_classify_intent() {
        let llm = ScriptedModel::new(vec![Ok(r#"{
            "intent_type": "definition",
            "specificity": "specific",
            "urgency": "low",
            "cognitive_level": "remember",
            "keywords": ["fraction"],
            "suggested_content_types": ["definition"]
        }"#
        .to_string())]);
        let engine = engine_with(Arc::new(llm)).await;

        let intent = engine.classify_intent("what is a fraction").await.unwrap();
        assert_eq!(intent.intent_type, "definition");
        assert_eq!(intent.keywords, vec!["fraction"]);

        let blank = engine.classify_intent("  ").await;
        assert!(matches!(blank, Err(SiktError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_classify_intent_falls_back_on_failure() {
        let engine = engine_with(Arc::new(ScriptedModel::failing())).await;
        let intent = engine.classify_intent("how do fractions add").await.unwrap();
        assert_eq!(intent.intent_type, "explanation");
        assert_eq!(intent.cognitive_level, "understand");
        assert_eq!(intent.keywords, vec!["how", "do", "fractions", "add"]);
    }

    #[test]
    fn test_parse_list_items() {
        let response = "1. What is a fraction?\n2) Why use decimals?\n- A bullet\n\nplain line";
        let items = parse_list_items(response, 10);
        assert_eq!(
            items,
            vec![
                "What is a fraction?",
                "Why use decimals?",
                "A bullet",
                "plain line"
            ]
        );

        assert_eq!(parse_list_items("1.\n2.", 5), Vec::<String>::new());
        assert_eq!(parse_list_items("a\nb\nc", 2).len(), 2);

        // Leading digits without a list delimiter are content, not numbering
        assert_eq!(
            parse_list_items("2024 exam prep tips", 5),
            vec!["2024 exam prep tips"]
        );
    }
}
