//! Command-line interface definition for MapChat
//!
//! This module defines the CLI structure using clap's derive API.

use clap::{Parser, Subcommand};

/// MapChat - map-aware chat assistant
///
/// Ask questions about a place, search for locations and manage map
/// selections against a MapChat backend.
#[derive(Parser, Debug, Clone)]
#[command(name = "mapchat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Override the backend base URL from config
    #[arg(long, env = "MAPCHAT_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for MapChat
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the interactive map chat session
    Chat {
        /// Model to start with (gpt-4, gpt-3, claude-2, gemmni, deepseek)
        #[arg(short, long)]
        model: Option<String>,

        /// Map style to start with (openstreetmap, satellite, terrain)
        #[arg(short, long)]
        style: Option<String>,
    },

    /// Resolve a place name or `lat, lng` pair and print the map center
    Search {
        /// Place name or coordinates, e.g. "New York" or "40.7128, -74.0060"
        #[arg(required = true, num_args = 1.., allow_negative_numbers = true)]
        query: Vec<String>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// List available map styles
    Styles,

    /// List selectable chat models
    Models,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            json_logs: false,
            backend_url: None,
            command: Commands::Styles,
        }
    }
}
