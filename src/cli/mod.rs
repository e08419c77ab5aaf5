//! CLI module for Sikt.

pub mod commands;
mod output;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Sikt - Educational Video Scene Search
///
/// Index educational video transcripts and search them semantically, scene
/// by scene. The name "Sikt" comes from the Norwegian word for "sight."
#[derive(Parser, Debug)]
#[command(name = "sikt")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Sikt and verify configuration
    Init,

    /// Index a video submission from a JSON file
    Index {
        /// Path to a JSON file with title, transcript and optional scene boundaries
        file: String,
    },

    /// Search indexed scenes
    Search {
        /// Search query
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value = "5")]
        limit: usize,

        /// Minimum similarity score (0.0-1.0)
        #[arg(short, long, default_value = "0.3")]
        min_score: f32,

        /// Restrict to a single video ID
        #[arg(long)]
        video: Option<String>,
    },

    /// List registered videos
    List,

    /// Start the HTTP API server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
