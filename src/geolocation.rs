//! Current-position sources
//!
//! A terminal has no location hardware to ask, so the position comes from
//! the `geolocation` config section. When that section is absent the
//! environment is treated as having no geolocation capability at all.

use crate::config::Config;
use crate::error::{MapChatError, Result};
use crate::geo::LatLng;
use async_trait::async_trait;
use std::sync::Arc;

/// Something that can report where the user is
#[async_trait]
pub trait Geolocator: Send + Sync {
    /// Resolve the current position
    ///
    /// Failures should be `MapChatError::Geolocation` so they render as
    /// `Unable to retrieve location: <reason>`.
    async fn current_position(&self) -> Result<LatLng>;
}

/// Geolocator returning a configured position
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocator {
    position: LatLng,
}

impl FixedGeolocator {
    pub fn new(position: LatLng) -> Self {
        Self { position }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn current_position(&self) -> Result<LatLng> {
        if !self.position.in_bounds() {
            return Err(MapChatError::Geolocation(format!(
                "position {} is out of range",
                self.position
            ))
            .into());
        }
        Ok(self.position)
    }
}

/// Build the geolocator described by `config`, if any
pub fn from_config(config: &Config) -> Option<Arc<dyn Geolocator>> {
    config.geolocation.as_ref().map(|g| {
        tracing::debug!("Geolocation enabled at {}", g.position());
        Arc::new(FixedGeolocator::new(g.position())) as Arc<dyn Geolocator>
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeolocationConfig;

    #[tokio::test]
    async fn test_fixed_geolocator_returns_position() {
        let locator = FixedGeolocator::new(LatLng::new(48.8566, 2.3522));
        let position = locator.current_position().await.unwrap();
        assert_eq!(position, LatLng::new(48.8566, 2.3522));
    }

    #[tokio::test]
    async fn test_fixed_geolocator_rejects_out_of_range() {
        let locator = FixedGeolocator::new(LatLng::new(120.0, 0.0));
        let err = locator.current_position().await.unwrap_err();
        assert!(err
            .to_string()
            .starts_with("Unable to retrieve location: "));
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        assert!(from_config(&config).is_none());

        config.geolocation = Some(GeolocationConfig {
            latitude: 1.0,
            longitude: 2.0,
        });
        assert!(from_config(&config).is_some());
    }
}
