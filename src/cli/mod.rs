//! Command-line interface.

mod commands;

use clap::{Parser, Subcommand};

use crate::gallery::ConnectionQuality;

/// Showreel - video portfolio catalog and hover-preview gallery
#[derive(Parser)]
#[command(name = "showreel")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the catalog HTTP service until Ctrl+C
    #[command(alias = "daemon")]
    Serve,

    /// List the catalog, newest first
    #[command(alias = "ls", alias = "l")]
    List,

    /// Add a video to the catalog
    #[command(alias = "a")]
    Add {
        title: String,

        /// Absolute URL of the video file
        url: String,

        #[arg(long, short)]
        description: Option<String>,

        /// Cinematic, Editing, Animation or Other
        #[arg(long, short)]
        category: Option<String>,
    },

    /// Remove a video by id
    #[command(alias = "rm", alias = "r")]
    Remove {
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Print the thumbnail and preview URLs derived for a video URL
    Thumbnail {
        url: String,

        #[arg(long, short, default_value = "medium")]
        quality: ConnectionQuality,
    },

    /// Render the gallery of a running catalog service
    Gallery {
        /// Base URL of the service
        #[arg(long, default_value = "http://localhost:3000")]
        server: String,
    },

    /// Create default config file
    Init,
}

pub use commands::*;
