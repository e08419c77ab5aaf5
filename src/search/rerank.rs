//! LLM-based relevance re-ranking of retrieved candidates.
//!
//! The model is shown every candidate in one prompt and asked for an ordinal
//! ranking as comma-separated 1-based indices. Parsing is strict: if the
//! response is not a clean index list the caller keeps the original
//! similarity order. Indices out of range are dropped and candidates the
//! model did not mention are appended in their original order, so the result
//! is always a permutation of the input.

use crate::config::Prompts;
use crate::error::Result;
use crate::index::ScoredScene;
use crate::llm::LanguageModel;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Maximum characters of scene content shown to the model per candidate.
const CANDIDATE_PREVIEW_CHARS: usize = 300;

/// Re-rank candidates by asking the language model for a permutation.
///
/// Falls back to the input order on any model or parse failure.
pub async fn rerank(
    llm: &dyn LanguageModel,
    prompts: &Prompts,
    query: &str,
    candidates: Vec<ScoredScene>,
) -> Vec<ScoredScene> {
    if candidates.len() < 2 {
        return candidates;
    }

    let response = match request_ranking(llm, prompts, query, &candidates).await {
        Ok(r) => r,
        Err(e) => {
            warn!("Re-ranking call failed, keeping similarity order: {}", e);
            return candidates;
        }
    };

    match parse_ranking(&response, candidates.len()) {
        Some(order) => {
            debug!("Re-ranked {} candidates: {:?}", candidates.len(), order);
            apply_ranking(candidates, &order)
        }
        None => {
            let shown: String = response.chars().take(200).collect();
            warn!(
                "Could not parse ranking response, keeping similarity order: {}",
                shown
            );
            candidates
        }
    }
}

async fn request_ranking(
    llm: &dyn LanguageModel,
    prompts: &Prompts,
    query: &str,
    candidates: &[ScoredScene],
) -> Result<String> {
    let mut vars = HashMap::new();
    vars.insert("query".to_string(), query.to_string());
    vars.insert("candidates".to_string(), format_candidates(candidates));

    let system = prompts.render_with_custom(&prompts.rerank.system, &vars);
    let user = prompts.render_with_custom(&prompts.rerank.user, &vars);

    llm.complete(&system, &user).await
}

/// Format candidates as a numbered list for the ranking prompt.
pub fn format_candidates(candidates: &[ScoredScene]) -> String {
    candidates
        .iter()
        .enumerate()
        .map(|(i, c)| format!("{}. {}", i + 1, preview(&c.entry.content)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn preview(content: &str) -> String {
    if content.chars().count() <= CANDIDATE_PREVIEW_CHARS {
        return content.to_string();
    }
    let truncated: String = content.chars().take(CANDIDATE_PREVIEW_CHARS).collect();
    format!("{}...", truncated)
}

/// Parse a ranking response into 0-based candidate positions.
///
/// Accepts a comma-separated list of 1-based indices. Out-of-range indices
/// and duplicates are dropped. Returns None when any token is not an index,
/// which callers treat as "keep the original order."
pub fn parse_ranking(response: &str, candidate_count: usize) -> Option<Vec<usize>> {
    let cleaned = response.trim().trim_end_matches('.');
    if cleaned.is_empty() {
        return None;
    }

    let mut order = Vec::new();
    for token in cleaned.split(',') {
        let index: usize = token.trim().parse().ok()?;
        if index == 0 || index > candidate_count {
            continue;
        }
        let position = index - 1;
        if !order.contains(&position) {
            order.push(position);
        }
    }

    if order.is_empty() {
        return None;
    }
    Some(order)
}

/// Reorder candidates by the given positions, appending any candidate the
/// ranking did not mention in its original order.
pub fn apply_ranking(candidates: Vec<ScoredScene>, order: &[usize]) -> Vec<ScoredScene> {
    let mut slots: Vec<Option<ScoredScene>> = candidates.into_iter().map(Some).collect();
    let mut ranked = Vec::with_capacity(slots.len());

    for &position in order {
        if let Some(slot) = slots.get_mut(position) {
            if let Some(candidate) = slot.take() {
                ranked.push(candidate);
            }
        }
    }

    for slot in slots {
        if let Some(candidate) = slot {
            ranked.push(candidate);
        }
    }

    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::SceneEntry;

    fn scored(scene_id: &str, score: f32) -> ScoredScene {
        ScoredScene {
            entry: SceneEntry {
                scene_id: scene_id.to_string(),
                video_id: "v".to_string(),
                embedding: vec![],
                content: format!("content {}", scene_id),
            },
            score,
        }
    }

    fn ids(candidates: &[ScoredScene]) -> Vec<&str> {
        candidates.iter().map(|c| c.entry.scene_id.as_str()).collect()
    }

    #[test]
    fn test_parse_ranking_happy_path() {
        assert_eq!(parse_ranking("3,1,2", 3), Some(vec![2, 0, 1]));
        assert_eq!(parse_ranking(" 2 , 1 ", 2), Some(vec![1, 0]));
        assert_eq!(parse_ranking("1,2,3.", 3), Some(vec![0, 1, 2]));
    }

    #[test]
    fn test_parse_ranking_drops_out_of_range_and_duplicates() {
        assert_eq!(parse_ranking("5,2,1", 3), Some(vec![1, 0]));
        assert_eq!(parse_ranking("2,2,1", 3), Some(vec![1, 0]));
        assert_eq!(parse_ranking("0,1", 3), Some(vec![0]));
    }

    #[test]
    fn test_parse_ranking_rejects_garbage() {
        assert_eq!(parse_ranking("the best is segment 3", 3), None);
        assert_eq!(parse_ranking("", 3), None);
        assert_eq!(parse_ranking("1, two, 3", 3), None);
        assert_eq!(parse_ranking("9,10", 3), None);
    }

    #[test]
    fn test_apply_ranking_is_permutation() {
        let candidates = vec![scored("a", 0.9), scored("b", 0.8), scored("c", 0.7)];
        let ranked = apply_ranking(candidates, &[2, 0]);
        // Unmentioned "b" is appended at the end
        assert_eq!(ids(&ranked), vec!["c", "a", "b"]);
    }

    #[test]
    fn test_apply_ranking_full_order() {
        let candidates = vec![scored("a", 0.9), scored("b", 0.8)];
        let ranked = apply_ranking(candidates, &[1, 0]);
        assert_eq!(ids(&ranked), vec!["b", "a"]);
    }

    #[test]
    fn test_format_candidates_numbering() {
        let candidates = vec![scored("a", 0.9), scored("b", 0.8)];
        let formatted = format_candidates(&candidates);
        assert!(formatted.starts_with("1. content a"));
        assert!(formatted.contains("\n2. content b"));
    }

    #[test]
    fn test_preview_truncates_long_content() {
        let long = "x".repeat(500);
        let p = preview(&long);
        assert!(p.ends_with("..."));
        assert_eq!(p.chars().count(), CANDIDATE_PREVIEW_CHARS + 3);
    }
}
