//! Map tile styles
//!
//! The set of styles is fixed; selecting one replaces the tile source and
//! attribution and nothing else.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the supported base-map tile sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MapStyle {
    /// Standard OpenStreetMap rendering
    #[default]
    OpenStreetMap,
    /// Esri World Imagery
    Satellite,
    /// OpenTopoMap terrain rendering
    Terrain,
}

impl MapStyle {
    /// All styles in menu order
    pub const ALL: [MapStyle; 3] = [Self::OpenStreetMap, Self::Satellite, Self::Terrain];

    /// Display name shown in the style picker
    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "OpenStreetMap",
            Self::Satellite => "Satellite",
            Self::Terrain => "Terrain",
        }
    }

    /// Tile URL template with `{s}`, `{z}`, `{x}` and `{y}` placeholders
    pub fn url_template(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
            Self::Satellite => {
                "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}"
            }
            Self::Terrain => "https://{s}.tile.opentopomap.org/{z}/{x}/{y}.png",
        }
    }

    /// Attribution text, displayed verbatim
    pub fn attribution(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "© OpenStreetMap contributors",
            Self::Satellite => "Tiles © Esri",
            Self::Terrain => "OpenTopoMap",
        }
    }

    /// Expand the URL template for one tile
    ///
    /// The `{s}` subdomain rotates over `a`, `b`, `c` by `x + y` so adjacent
    /// tiles spread across hosts the same way every time.
    ///
    /// # Examples
    ///
    /// ```
    /// use mapchat::map_style::MapStyle;
    ///
    /// assert_eq!(
    ///     MapStyle::OpenStreetMap.tile_url(13, 4093, 2724),
    ///     "https://b.tile.openstreetmap.org/13/4093/2724.png"
    /// );
    /// ```
    pub fn tile_url(&self, z: u8, x: u32, y: u32) -> String {
        const SUBDOMAINS: [&str; 3] = ["a", "b", "c"];
        let subdomain = SUBDOMAINS[((u64::from(x) + u64::from(y)) % 3) as usize];
        self.url_template()
            .replace("{s}", subdomain)
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }

    /// Parse a style from its name, case-insensitively
    ///
    /// Accepts the display name as well as the short aliases `osm`, `sat`
    /// and `topo`.
    pub fn parse_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "openstreetmap" | "open_street_map" | "osm" => Ok(Self::OpenStreetMap),
            "satellite" | "sat" => Ok(Self::Satellite),
            "terrain" | "topo" => Ok(Self::Terrain),
            other => Err(format!(
                "Unknown map style: {}. Must be one of: {}",
                other,
                Self::ALL.map(|s| s.name()).join(", ")
            )),
        }
    }
}

impl fmt::Display for MapStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
