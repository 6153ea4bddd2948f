//! MapChat - map-aware chat assistant library
//!
//! This library provides the client side of a map chat assistant: the
//! coordinator that owns conversation and map state, the HTTP client for the
//! chat/geocoding backend, and the async runtime that connects the two.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `coordinator`: Application state and the pure event/effect state machine
//! - `runtime`: Executes coordinator effects on tokio tasks
//! - `backend`: Backend trait and the reqwest-based HTTP implementation
//! - `geo`: Coordinates, bounds, search-input classification and tile math
//! - `map_style` / `models`: Fixed style and model selector sets
//! - `geolocation`: Current-position sources
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli` / `commands`: Command-line interface and terminal client
//!
//! # Example
//!
//! ```no_run
//! use mapchat::{Config, Coordinator, Event, Runtime};
//! use mapchat::backend::HttpBackend;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let backend = Arc::new(HttpBackend::new(&config.backend)?);
//!     let mut runtime = Runtime::new(Coordinator::from_config(&config), backend);
//!     runtime.dispatch(Event::Startup);
//!     runtime.dispatch(Event::ChatSubmitted("What is around here?".into()));
//!     runtime.settle().await;
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod cli;
pub mod commands;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod geo;
pub mod geolocation;
pub mod map_style;
pub mod models;
pub mod runtime;

// Re-export commonly used types
pub use config::Config;
pub use coordinator::{AppState, Coordinator, Effect, Event};
pub use error::{MapChatError, Result};
pub use runtime::Runtime;

#[cfg(test)]
pub mod test_utils;
