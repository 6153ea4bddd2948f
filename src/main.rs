//! MapChat - map-aware chat assistant CLI
//!
#![doc = "MapChat - map-aware chat assistant CLI"]
#![doc = "Main entry point for the MapChat terminal client."]

use anyhow::Result;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use mapchat::cli::{Cli, Commands};
use mapchat::commands;
use mapchat::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Initialize tracing
    init_tracing(cli.verbose, cli.json_logs);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    // Execute command
    match cli.command {
        Commands::Chat { model, style } => {
            if let Some(m) = &model {
                tracing::debug!("Using model override: {}", m);
            }
            if let Some(s) = &style {
                tracing::debug!("Using map style override: {}", s);
            }
            commands::chat::run_chat(config, model, style).await?;
            Ok(())
        }
        Commands::Search { query, json } => {
            commands::search::run_search(config, query.join(" "), json).await?;
            Ok(())
        }
        Commands::Styles => {
            commands::models::list_styles(config.map.style);
            Ok(())
        }
        Commands::Models => {
            commands::models::list_models(config.chat.default_model);
            Ok(())
        }
    }
}

fn init_tracing(verbose: bool, json_logs: bool) {
    let default_directive = if verbose {
        "mapchat=debug"
    } else {
        "mapchat=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let (json_layer, text_layer) = if json_logs {
        (Some(fmt::layer().json().with_writer(std::io::stderr)), None)
    } else {
        (None, Some(fmt::layer().with_writer(std::io::stderr)))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}
