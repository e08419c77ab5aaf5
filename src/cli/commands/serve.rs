//! Serve command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::server;
use anyhow::Result;

/// Run the HTTP API server.
pub async fn run_serve(host: Option<&str>, port: Option<u16>, settings: Settings) -> Result<()> {
    let host = host.unwrap_or(&settings.server.host).to_string();
    let port = port.unwrap_or(settings.server.port);

    Output::header("Sikt API Server");
    println!();
    Output::success(&format!("Listening on http://{}:{}", host, port));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET    /health");
    Output::kv("Register video", "POST   /api/videos");
    Output::kv("List videos", "GET    /api/videos");
    Output::kv("Video scenes", "GET    /api/videos/:id/scenes");
    Output::kv("Search", "POST   /api/search");
    Output::kv("Suggestions", "GET    /api/search/suggest");
    Output::kv("Related scenes", "GET    /api/search/related/:video/:scene");
    Output::kv("Statistics", "GET    /api/search/stats");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    server::run(&host, port, settings).await?;
    Ok(())
}
