//! List command implementation.

use crate::cli::Output;
use crate::catalog::VideoFilter;
use crate::config::Settings;
use crate::processing::VideoProcessor;
use anyhow::Result;

/// Run the list command.
pub async fn run_list(settings: Settings) -> Result<()> {
    let processor = VideoProcessor::new(&settings)?;
    let catalog = processor.catalog();
    let videos = catalog.list(&VideoFilter::default());

    if videos.is_empty() {
        Output::info("No videos registered yet. Use 'sikt index <file>' to add content.");
        let indexed = processor.index().count().await?;
        if indexed > 0 {
            Output::kv("Indexed scene embeddings on disk", &indexed.to_string());
        }
    } else {
        Output::header(&format!("Registered Videos ({})", videos.len()));
        println!();

        for video in &videos {
            let scene_count = catalog
                .get_record(&video.id)
                .map(|r| r.scenes.len())
                .unwrap_or(0);
            Output::video_info(
                &video.title,
                &video.id,
                &video.status.to_string(),
                scene_count,
                video.duration_seconds,
            );
        }

        println!();
        Output::kv("Total videos", &videos.len().to_string());
        Output::kv("Total scenes", &catalog.scene_count().to_string());
    }

    Ok(())
}
