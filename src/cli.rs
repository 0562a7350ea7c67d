use clap::{Parser, Subcommand};
use posterforge::metadata::PosterSize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "posterforge")]
#[command(author, version, about = "Poster URL resolution and normalization")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Look up the TMDB poster URL for a movie or show
    Poster {
        /// Provider identifier (the show ID for episodes)
        #[arg(required = true)]
        id: String,

        /// Media type: movie, episode or live_episode
        #[arg(short = 't', long = "type", default_value = "movie")]
        media_type: String,

        /// Poster size token
        #[arg(short, long, default_value = "w500")]
        size: PosterSize,
    },

    /// Resolve a cached poster by key, normalizing the source image on a miss
    Resolve {
        /// Cache key
        #[arg(required = true)]
        key: String,

        /// URL of the source image
        #[arg(required = true)]
        source_url: String,
    },

    /// Normalize a local image file and write the PNG result
    Normalize {
        /// Input image
        #[arg(required = true)]
        input: PathBuf,

        /// Output PNG path
        #[arg(required = true)]
        output: PathBuf,

        /// Pad to square (defaults to display.posters.fit)
        #[arg(long)]
        fit: Option<bool>,

        /// Maximum width/height (defaults to display.posters.maxSize)
        #[arg(long)]
        max_size: Option<u32>,
    },

    /// Check whether a value would be accepted as a cached poster URL
    CheckUrl {
        /// Candidate URL
        candidate: String,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },
}
