//! Shared OpenAI client construction.

use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Requests that take longer than this are abandoned.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Build an OpenAI client for embeddings and chat completions.
///
/// The API key is read from the `OPENAI_API_KEY` environment variable by the
/// underlying client configuration.
pub fn create_client() -> Client<OpenAIConfig> {
    let http_client = reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_default();

    Client::with_config(OpenAIConfig::default()).with_http_client(http_client)
}
