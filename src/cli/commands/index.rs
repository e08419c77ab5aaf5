//! Index command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::processing::{VideoProcessor, VideoSubmission};
use anyhow::Result;

/// Run the index command: register and process a JSON submission.
pub async fn run_index(file: &str, settings: Settings) -> Result<()> {
    let content = std::fs::read_to_string(file)?;
    let submission: VideoSubmission = serde_json::from_str(&content)?;

    let processor = VideoProcessor::new(&settings)?;
    let video_id = processor.register(&submission)?;

    Output::info(&format!("Processing \"{}\"...", submission.title));
    processor.process(&video_id).await?;

    let record = processor
        .catalog()
        .get_record(&video_id)
        .ok_or_else(|| anyhow::anyhow!("Video disappeared during processing"))?;

    Output::success(&format!(
        "Indexed {} scenes from \"{}\"",
        record.scenes.len(),
        submission.title
    ));
    Output::kv("Video ID", &video_id);
    for scene in &record.scenes {
        Output::list_item(&format!(
            "{} [{:.0}s-{:.0}s]: {}",
            scene.id, scene.start_seconds, scene.end_seconds, scene.description
        ));
    }

    Ok(())
}
