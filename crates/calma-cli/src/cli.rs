use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "calma")]
#[command(
    author,
    version,
    about = "Classify diary entries and community posts, and suggest meditations"
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "./calma.yaml", env = "CALMA_CONFIG")]
    pub config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sentiment of a diary entry
    Sentiment {
        /// Entry text
        text: String,
    },

    /// Safety verdict for a piece of community content
    Moderate {
        /// Content text
        text: String,
    },

    /// Safety verdict for a community post (title and content together)
    Post {
        #[arg(long)]
        title: String,

        #[arg(long)]
        content: String,
    },

    /// Meditation category for a mood
    Suggest {
        /// Mood description, e.g. "ansioso"
        mood: String,
    },

    /// Sentiment and moderation of the same text, run concurrently
    Analyze {
        text: String,
    },

    /// Mood statistics over classified diary entries
    Stats {
        /// JSON file with an array of `{ "date": .., "sentiment": .. }` entries
        #[arg(long)]
        entries: PathBuf,

        /// Window size in days
        #[arg(long, default_value = "30")]
        days: u32,
    },
}
