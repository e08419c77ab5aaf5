//! Prompt templates for Sikt.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub scene: ScenePrompts,
    pub rerank: RerankPrompts,
    pub explain: ExplainPrompts,
    pub suggest: SuggestPrompts,
    pub study: StudyPrompts,
    pub intent: IntentPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for scene description and label generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenePrompts {
    pub system: String,
    pub user: String,
}

impl Default for ScenePrompts {
    fn default() -> Self {
        Self {
            system: r#"You are an educational content analyst. You examine short transcript segments from teaching videos and summarize what is being taught.

Focus on identifying:
- Concept explanations
- Demonstrations and experiments
- Problem-solving steps
- Definitions
- Examples
- Visual aids and diagrams

Always answer with a single JSON object and nothing else."#
                .to_string(),

            user: r#"Analyze this educational video segment transcript and provide:
1. A concise description (1-2 sentences) of what is being taught or demonstrated
2. Educational labels/tags that categorize the content type

Transcript: "{{transcript}}"

Return as JSON: {"description": "...", "labels": ["label1", "label2"]}"#
                .to_string(),
        }
    }
}

/// Prompts for relevance re-ranking of search candidates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RerankPrompts {
    pub system: String,
    pub user: String,
}

impl Default for RerankPrompts {
    fn default() -> Self {
        Self {
            system: r#"You rank educational video segments by how well they answer a student's question.

Rules:
- Judge educational relevance, not keyword overlap
- Prefer segments that directly teach or demonstrate what was asked
- Output ONLY a comma-separated list of the segment numbers, best first
- Do not add explanations or any other text"#
                .to_string(),

            user: r#"Student question: "{{query}}"

Candidate segments:
{{candidates}}

Rank the segments from most to least relevant. Answer with the segment numbers as a comma-separated list (e.g. "3,1,2")."#
                .to_string(),
        }
    }
}

/// Prompts for per-result explanation generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplainPrompts {
    pub system: String,
    pub user: String,
}

impl Default for ExplainPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a study assistant. You explain to a student, in one or two sentences, why a video segment is relevant to their question. Be concrete about what the segment covers."#.to_string(),

            user: r#"Student question: "{{query}}"

Video segment content: "{{content}}"

In 1-2 sentences, explain why this segment helps answer the question."#
                .to_string(),
        }
    }
}

/// Prompts for follow-up and partial-query suggestions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestPrompts {
    /// Follow-up questions based on the best search result.
    pub followup: String,
    /// Completions for a partially typed query.
    pub partial: String,
}

impl Default for SuggestPrompts {
    fn default() -> Self {
        Self {
            followup: r#"A student searched for: "{{query}}"

The best matching video segment covers: "{{content}}"

Suggest {{count}} natural follow-up questions the student might ask next to deepen their understanding. Return one question per line, without numbering."#
                .to_string(),

            partial: r#"A student is typing a search query: "{{query}}"

Suggest {{count}} complete educational questions they might be trying to ask.
Focus on common learning needs and make them specific and helpful.

Return as a simple list, one suggestion per line, without numbering."#
                .to_string(),
        }
    }
}

/// Prompts for study question generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StudyPrompts {
    pub user: String,
}

impl Default for StudyPrompts {
    fn default() -> Self {
        Self {
            user: r#"Based on this educational content, generate {{count}} study questions at {{difficulty}} level:

Content: "{{content}}"

Generate questions that:
1. Test understanding of key concepts
2. Encourage critical thinking
3. Are appropriate for the difficulty level

Return as a simple numbered list."#
                .to_string(),
        }
    }
}

/// Prompts for query-intent classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentPrompts {
    pub user: String,
}

impl Default for IntentPrompts {
    fn default() -> Self {
        Self {
            user: r#"Analyze this student question and classify their learning intent.

Question: "{{query}}"

Classify as JSON:
{
  "intent_type": "definition|explanation|example|demonstration|problem_solving|review",
  "specificity": "general|specific|very_specific",
  "urgency": "low|medium|high",
  "cognitive_level": "remember|understand|apply|analyze|evaluate|create",
  "keywords": ["keyword1", "keyword2"],
  "suggested_content_types": ["content_type1", "content_type2"]
}

Answer with the JSON object and nothing else."#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let scene_path = custom_path.join("scene.toml");
            if scene_path.exists() {
                let content = std::fs::read_to_string(&scene_path)?;
                prompts.scene = toml::from_str(&content)?;
            }

            let rerank_path = custom_path.join("rerank.toml");
            if rerank_path.exists() {
                let content = std::fs::read_to_string(&rerank_path)?;
                prompts.rerank = toml::from_str(&content)?;
            }

            let explain_path = custom_path.join("explain.toml");
            if explain_path.exists() {
                let content = std::fs::read_to_string(&explain_path)?;
                prompts.explain = toml::from_str(&content)?;
            }

            let suggest_path = custom_path.join("suggest.toml");
            if suggest_path.exists() {
                let content = std::fs::read_to_string(&suggest_path)?;
                prompts.suggest = toml::from_str(&content)?;
            }

            let study_path = custom_path.join("study.toml");
            if study_path.exists() {
                let content = std::fs::read_to_string(&study_path)?;
                prompts.study = toml::from_str(&content)?;
            }

            let intent_path = custom_path.join("intent.toml");
            if intent_path.exists() {
                let content = std::fs::read_to_string(&intent_path)?;
                prompts.intent = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(!prompts.scene.system.is_empty());
        assert!(!prompts.rerank.user.is_empty());
        assert!(prompts.rerank.user.contains("{{candidates}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Question: {{query}} ({{count}} results)";
        let mut vars = std::collections::HashMap::new();
        vars.insert("query".to_string(), "photosynthesis".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Question: photosynthesis (5 results)");
    }

    #[test]
    fn test_custom_variables_precedence() {
        let mut prompts = Prompts::default();
        prompts
            .variables
            .insert("count".to_string(), "99".to_string());

        let mut vars = std::collections::HashMap::new();
        vars.insert("count".to_string(), "3".to_string());

        let result = prompts.render_with_custom("{{count}}", &vars);
        assert_eq!(result, "3");
    }
}
