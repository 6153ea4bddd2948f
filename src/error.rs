//! Error types for MapChat
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.
//!
//! The coordinator never exposes these variants to the user directly: every
//! failure is collapsed into the single human-readable error slot of the
//! application state. The variants exist so that library callers (and the
//! CLI) can still match on what went wrong.

use thiserror::Error;

/// Main error type for MapChat operations
#[derive(Error, Debug)]
pub enum MapChatError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session bootstrap failures
    #[error("Failed to start session: {0}")]
    Session(String),

    /// Chat round-trip failures
    #[error("Chat request failed: {0}")]
    Chat(String),

    /// Geocoding failures
    #[error("Geocoding failed: {0}")]
    Geocode(String),

    /// Current-position lookup failures
    #[error("Unable to retrieve location: {0}")]
    Geolocation(String),

    /// The environment has no way to determine the current position
    #[error("Geolocation not supported by this environment")]
    GeolocationUnsupported,

    /// Coordinates matched the pattern but fall outside the valid range
    #[error("Invalid coordinates. Latitude: -90 to 90, Longitude: -180 to 180")]
    InvalidCoordinates,

    /// Interactive command parsing errors
    #[error("Command error: {0}")]
    Command(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for MapChat operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
