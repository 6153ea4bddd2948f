//! Configuration management for MapChat
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{MapChatError, Result};
use crate::geo::LatLng;
use crate::map_style::MapStyle;
use crate::models::ChatModel;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Highest zoom level offered by the supported tile sources
pub const MAX_ZOOM: u8 = 19;

/// Main configuration structure for MapChat
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Chat/geocoding backend connection settings
    #[serde(default)]
    pub backend: BackendConfig,
    /// Initial map view
    #[serde(default)]
    pub map: MapConfig,
    /// Chat defaults
    #[serde(default)]
    pub chat: ChatConfig,
    /// Current-position source; absent means geolocation is unsupported
    #[serde(default)]
    pub geolocation: Option<GeolocationConfig>,
}

/// Backend connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL the `/api/*` paths are resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_timeout() -> u64 {
    60
}

fn default_user_agent() -> String {
    format!("mapchat/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Initial map view configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Initial center as `[lat, lng]`
    #[serde(default = "default_center")]
    pub center: LatLng,

    /// Initial zoom level
    #[serde(default = "default_zoom")]
    pub zoom: u8,

    /// Initial tile style
    #[serde(default)]
    pub style: MapStyle,
}

fn default_center() -> LatLng {
    LatLng::new(51.505, -0.09)
}

fn default_zoom() -> u8 {
    13
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: default_center(),
            zoom: default_zoom(),
            style: MapStyle::default(),
        }
    }
}

/// Chat defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Model selected at startup
    #[serde(default)]
    pub default_model: ChatModel,
}

/// Fixed position reported as the user's current location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeolocationConfig {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeolocationConfig {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| MapChatError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| MapChatError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("MAPCHAT_BACKEND_URL") {
            tracing::debug!(base_url = %base_url, "Env override: MAPCHAT_BACKEND_URL");
            self.backend.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("MAPCHAT_TIMEOUT_SECONDS") {
            match timeout.parse() {
                Ok(value) => self.backend.timeout_seconds = value,
                Err(_) => tracing::warn!("Invalid MAPCHAT_TIMEOUT_SECONDS: {}", timeout),
            }
        }

        if let Ok(model) = std::env::var("MAPCHAT_MODEL") {
            match ChatModel::parse_str(&model) {
                Ok(value) => self.chat.default_model = value,
                Err(e) => tracing::warn!("Invalid MAPCHAT_MODEL: {}", e),
            }
        }

        if let Ok(style) = std::env::var("MAPCHAT_MAP_STYLE") {
            match MapStyle::parse_str(&style) {
                Ok(value) => self.map.style = value,
                Err(e) => tracing::warn!("Invalid MAPCHAT_MAP_STYLE: {}", e),
            }
        }

        let latitude = std::env::var("MAPCHAT_LATITUDE").ok();
        let longitude = std::env::var("MAPCHAT_LONGITUDE").ok();
        if let (Some(lat), Some(lng)) = (latitude, longitude) {
            match (lat.parse::<f64>(), lng.parse::<f64>()) {
                (Ok(latitude), Ok(longitude)) => {
                    self.geolocation = Some(GeolocationConfig {
                        latitude,
                        longitude,
                    });
                    tracing::debug!(latitude, longitude, "Env override: MAPCHAT_LATITUDE/LONGITUDE");
                }
                _ => tracing::warn!("Invalid MAPCHAT_LATITUDE/MAPCHAT_LONGITUDE: {}, {}", lat, lng),
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(base_url) = &cli.backend_url {
            tracing::debug!("Using backend override from CLI: {}", base_url);
            self.backend.base_url = base_url.clone();
        }
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.backend.base_url).map_err(|e| {
            MapChatError::Config(format!(
                "Invalid backend.base_url {}: {}",
                self.backend.base_url, e
            ))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(MapChatError::Config(format!(
                "backend.base_url must use http or https, got {}",
                base.scheme()
            ))
            .into());
        }

        if self.backend.timeout_seconds == 0 {
            return Err(MapChatError::Config(
                "backend.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.map.zoom > MAX_ZOOM {
            return Err(MapChatError::Config(format!(
                "map.zoom must be between 0 and {}",
                MAX_ZOOM
            ))
            .into());
        }

        if !self.map.center.in_bounds() {
            return Err(MapChatError::Config(
                "map.center must be within latitude -90..90 and longitude -180..180".to_string(),
            )
            .into());
        }

        if let Some(geo) = &self.geolocation {
            if !geo.position().in_bounds() {
                return Err(MapChatError::Config(
                    "geolocation position must be within latitude -90..90 and longitude -180..180"
                        .to_string(),
                )
                .into());
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_file, temp_dir};
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend.base_url, "http://localhost:5000");
        assert_eq!(config.backend.timeout_seconds, 60);
        assert_eq!(config.map.center, LatLng::new(51.505, -0.09));
        assert_eq!(config.map.zoom, 13);
        assert_eq!(config.map.style, MapStyle::OpenStreetMap);
        assert_eq!(config.chat.default_model, ChatModel::Gpt4);
        assert!(config.geolocation.is_none());
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_url() {
        let mut config = Config::default();
        config.backend.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.backend.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let mut config = Config::default();
        config.backend.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zoom_too_large() {
        let mut config = Config::default();
        config.map.zoom = 20;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_center_out_of_range() {
        let mut config = Config::default();
        config.map.center = LatLng::new(91.0, 0.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_geolocation_out_of_range() {
        let mut config = Config::default();
        config.geolocation = Some(GeolocationConfig {
            latitude: 0.0,
            longitude: 181.0,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
backend:
  base_url: https://maps.example.com
  timeout_seconds: 15
map:
  center: [40.7128, -74.006]
  zoom: 10
  style: satellite
chat:
  default_model: claude-2
geolocation:
  latitude: 48.8566
  longitude: 2.3522
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.backend.base_url, "https://maps.example.com");
        assert_eq!(config.backend.timeout_seconds, 15);
        assert_eq!(config.map.center, LatLng::new(40.7128, -74.006));
        assert_eq!(config.map.zoom, 10);
        assert_eq!(config.map.style, MapStyle::Satellite);
        assert_eq!(config.chat.default_model, ChatModel::Claude2);
        assert_eq!(
            config.geolocation.unwrap().position(),
            LatLng::new(48.8566, 2.3522)
        );
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let config: Config = serde_yaml::from_str("backend:\n  timeout_seconds: 5\n").unwrap();
        assert_eq!(config.backend.timeout_seconds, 5);
        assert_eq!(config.backend.base_url, "http://localhost:5000");
        assert_eq!(config.map.zoom, 13);
    }

    #[test]
    #[serial]
    fn test_load_nonexistent_file_uses_defaults() {
        let cli = crate::cli::Cli::default();
        let config = Config::load("nonexistent.yaml", &cli).unwrap();
        assert_eq!(config.map.zoom, 13);
    }

    #[test]
    #[serial]
    fn test_load_from_file() {
        let dir = temp_dir();
        let path = create_test_file(
            &dir,
            "config.yaml",
            "map:\n  zoom: 7\n  style: terrain\n",
        );
        let cli = crate::cli::Cli::default();
        let config = Config::load(path.to_str().unwrap(), &cli).unwrap();
        assert_eq!(config.map.zoom, 7);
        assert_eq!(config.map.style, MapStyle::Terrain);
    }

    #[test]
    #[serial]
    fn test_load_invalid_yaml_is_config_error() {
        let dir = temp_dir();
        let path = create_test_file(&dir, "config.yaml", "map: [unclosed\n");
        let cli = crate::cli::Cli::default();
        let err = Config::load(path.to_str().unwrap(), &cli).unwrap_err();
        assert!(err.to_string().starts_with("Configuration error: Failed to parse config"));
    }

    #[test]
    #[serial]
    fn test_cli_backend_override() {
        let cli = crate::cli::Cli {
            backend_url: Some("http://127.0.0.1:9999".to_string()),
            ..crate::cli::Cli::default()
        };
        let config = Config::load("nonexistent.yaml", &cli).unwrap();
        assert_eq!(config.backend.base_url, "http://127.0.0.1:9999");
    }

    #[test]
    #[serial]
    fn test_apply_env_vars_overrides_fields() {
        std::env::set_var("MAPCHAT_MODEL", "deepseek");
        std::env::set_var("MAPCHAT_MAP_STYLE", "terrain");
        std::env::set_var("MAPCHAT_LATITUDE", "35.6762");
        std::env::set_var("MAPCHAT_LONGITUDE", "139.6503");

        let mut config = Config::default();
        config.apply_env_vars();

        std::env::remove_var("MAPCHAT_MODEL");
        std::env::remove_var("MAPCHAT_MAP_STYLE");
        std::env::remove_var("MAPCHAT_LATITUDE");
        std::env::remove_var("MAPCHAT_LONGITUDE");

        assert_eq!(config.chat.default_model, ChatModel::Deepseek);
        assert_eq!(config.map.style, MapStyle::Terrain);
        assert_eq!(
            config.geolocation.unwrap().position(),
            LatLng::new(35.6762, 139.6503)
        );
    }

    #[test]
    #[serial]
    fn test_apply_env_vars_ignores_invalid_values() {
        std::env::set_var("MAPCHAT_TIMEOUT_SECONDS", "soon");
        std::env::set_var("MAPCHAT_MODEL", "llama");

        let mut config = Config::default();
        config.apply_env_vars();

        std::env::remove_var("MAPCHAT_TIMEOUT_SECONDS");
        std::env::remove_var("MAPCHAT_MODEL");

        assert_eq!(config.backend.timeout_seconds, 60);
        assert_eq!(config.chat.default_model, ChatModel::Gpt4);
    }
}
