//! CLI output formatting utilities.

use console::style;

/// Output helper for CLI formatting.
pub struct Output;

impl Output {
    /// Print an info message.
    pub fn info(msg: &str) {
        println!("{} {}", style(">>").cyan().bold(), msg);
    }

    /// Print a success message.
    pub fn success(msg: &str) {
        println!("{} {}", style(">>").green().bold(), msg);
    }

    /// Print a warning message.
    pub fn warning(msg: &str) {
        eprintln!("{} {}", style(">>").yellow().bold(), msg);
    }

    /// Print an error message.
    pub fn error(msg: &str) {
        eprintln!("{} {}", style(">>").red().bold(), msg);
    }

    /// Print a header.
    pub fn header(msg: &str) {
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print a key-value pair.
    pub fn kv(key: &str, value: &str) {
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Print a list item.
    pub fn list_item(msg: &str) {
        println!("  {} {}", style("*").cyan(), msg);
    }

    /// Print video info.
    pub fn video_info(title: &str, id: &str, status: &str, scenes: usize, duration: f64) {
        println!(
            "  {} {} ({}, {}, {} scenes, {})",
            style("*").cyan(),
            style(title).bold(),
            style(id).dim(),
            status,
            scenes,
            format_duration(duration)
        );
    }

    /// Print a search result.
    pub fn search_result(
        title: &str,
        start_seconds: f64,
        end_seconds: f64,
        score: f32,
        explanation: Option<&str>,
    ) {
        println!(
            "\n{} {} @ {}-{} (score: {:.2})",
            style(">>").green(),
            style(title).bold(),
            style(format_timestamp(start_seconds)).cyan(),
            style(format_timestamp(end_seconds)).cyan(),
            score
        );
        if let Some(text) = explanation {
            println!("   {}", content_preview(text, 200));
        }
    }
}

/// Format duration in seconds to a human-readable string.
fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as u32;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Format a scene offset as mm:ss.
fn format_timestamp(seconds: f64) -> String {
    let total_seconds = seconds as u32;
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// Truncate content with ellipsis.
fn content_preview(content: &str, max_len: usize) -> String {
    let content = content.replace('\n', " ");
    if content.chars().count() <= max_len {
        content
    } else {
        let truncated: String = content.chars().take(max_len).collect();
        format!("{}...", truncated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(42.0), "42s");
        assert_eq!(format_duration(125.0), "2m 5s");
        assert_eq!(format_duration(3725.0), "1h 2m 5s");
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "0:00");
        assert_eq!(format_timestamp(95.0), "1:35");
    }

    #[test]
    fn test_content_preview() {
        assert_eq!(content_preview("short", 10), "short");
        assert_eq!(content_preview("line\nbreak", 20), "line break");
        assert_eq!(content_preview("abcdefgh", 4), "abcd...");
    }
}
