//! Search command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::search::{SearchEngine, SearchQuery};
use crate::processing::VideoProcessor;
use anyhow::Result;

/// Run the search command.
pub async fn run_search(
    query: &str,
    limit: usize,
    min_score: f32,
    video: Option<String>,
    settings: Settings,
) -> Result<()> {
    let processor = VideoProcessor::new(&settings)?;
    let engine = SearchEngine::new(
        processor.embedder(),
        processor.index(),
        processor.llm(),
        processor.catalog(),
        processor.prompts(),
        settings.search.clone(),
    );

    let outcome = engine
        .search(&SearchQuery {
            query: query.to_string(),
            video_id: video,
            max_results: Some(limit),
            min_score: Some(min_score),
        })
        .await;

    match outcome {
        Ok(outcome) => {
            if outcome.results.is_empty() {
                Output::warning("No results found matching your query.");
            } else {
                Output::success(&format!(
                    "Found {} results in {:.2}s",
                    outcome.total_results, outcome.processing_seconds
                ));

                for hit in &outcome.results {
                    Output::search_result(
                        &hit.video_title,
                        hit.start_seconds,
                        hit.end_seconds,
                        hit.relevance_score,
                        hit.explanation.as_deref(),
                    );
                }

                if !outcome.suggestions.is_empty() {
                    println!();
                    Output::info("You might also ask:");
                    for suggestion in &outcome.suggestions {
                        Output::list_item(suggestion);
                    }
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
