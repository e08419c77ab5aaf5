//! Sikt - Educational Video Scene Search
//!
//! A backend service for searching educational video content by natural
//! language. Videos are registered with a transcript (and optionally scene
//! boundaries from an external detector), processed into time-stamped scenes,
//! embedded, and indexed for semantic retrieval.
//!
//! The name "Sikt" comes from the Norwegian word for "sight."
//!
//! # Overview
//!
//! Sikt allows you to:
//! - Register videos with transcripts and index their scenes
//! - Search scenes semantically with LLM-based relevance re-ranking
//! - Get per-result explanations and follow-up query suggestions
//! - Serve the whole thing as a JSON HTTP API
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Configuration management
//! - `catalog` - Video and scene data model with the shared catalog store
//! - `embedding` - Embedding generation
//! - `llm` - Chat-completion client abstraction
//! - `index` - Scene vector index (in-memory and file-backed)
//! - `search` - Retrieval pipeline: candidates, re-ranking, explanations
//! - `processing` - Video processing pipeline and content analysis
//! - `server` - HTTP API
//!
//! # Example
//!
//! ```rust,no_run
//! use sikt::config::Settings;
//! use sikt::processing::{VideoProcessor, VideoSubmission};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let processor = VideoProcessor::new(&settings)?;
//!
//!     let submission = VideoSubmission {
//!         title: "Intro to Algebra".to_string(),
//!         transcript: "Today we will learn about variables...".to_string(),
//!         ..Default::default()
//!     };
//!     let video_id = processor.register(&submission)?;
//!     processor.process(&video_id).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod index;
pub mod llm;
pub mod openai;
pub mod processing;
pub mod search;
pub mod server;

pub use error::{Result, SiktError};
