//! Geographic primitives and location-input validation
//!
//! Coordinates travel over the wire as `[lat, lng]` pairs and selection
//! rectangles as `[[south, west], [north, east]]`, so both types serialize
//! through their array forms.

use crate::error::MapChatError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

/// Latitude bound (inclusive, both signs)
pub const MAX_LATITUDE: f64 = 90.0;

/// Longitude bound (inclusive, both signs)
pub const MAX_LONGITUDE: f64 = 180.0;

/// A WGS 84 position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both components lie inside the valid WGS 84 range
    pub fn in_bounds(&self) -> bool {
        self.lat.abs() <= MAX_LATITUDE && self.lng.abs() <= MAX_LONGITUDE
    }
}

impl From<[f64; 2]> for LatLng {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<LatLng> for [f64; 2] {
    fn from(point: LatLng) -> Self {
        [point.lat, point.lng]
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.lat, self.lng)
    }
}

/// Axis-aligned rectangle given by its south-west and north-east corners
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[LatLng; 2]", into = "[LatLng; 2]")]
pub struct Bounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl Bounds {
    /// Build a rectangle from any two opposite corners
    ///
    /// # Examples
    ///
    /// ```
    /// use mapchat::geo::{Bounds, LatLng};
    ///
    /// let b = Bounds::from_corners(LatLng::new(10.0, 20.0), LatLng::new(5.0, 25.0));
    /// assert_eq!(b.south_west, LatLng::new(5.0, 20.0));
    /// assert_eq!(b.north_east, LatLng::new(10.0, 25.0));
    /// ```
    pub fn from_corners(a: LatLng, b: LatLng) -> Self {
        Self {
            south_west: LatLng::new(a.lat.min(b.lat), a.lng.min(b.lng)),
            north_east: LatLng::new(a.lat.max(b.lat), a.lng.max(b.lng)),
        }
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south_west.lat + self.north_east.lat) / 2.0,
            (self.south_west.lng + self.north_east.lng) / 2.0,
        )
    }

    pub fn contains(&self, point: LatLng) -> bool {
        (self.south_west.lat..=self.north_east.lat).contains(&point.lat)
            && (self.south_west.lng..=self.north_east.lng).contains(&point.lng)
    }
}

impl From<[LatLng; 2]> for Bounds {
    fn from([south_west, north_east]: [LatLng; 2]) -> Self {
        Self {
            south_west,
            north_east,
        }
    }
}

impl From<Bounds> for [LatLng; 2] {
    fn from(bounds: Bounds) -> Self {
        [bounds.south_west, bounds.north_east]
    }
}

/// Result of classifying free-text search input
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    /// The input was a literal `lat, lng` pair
    Coordinates(LatLng),
    /// Anything else is a place name to be geocoded verbatim
    Place(String),
}

fn coordinate_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[-+]?[0-9]+(?:\.[0-9]+)?[,\s]+[-+]?[0-9]+(?:\.[0-9]+)?$")
            .expect("coordinate pattern is a valid regex")
    })
}

/// Whether `input` has the syntactic shape of a coordinate pair
///
/// Two optionally signed decimal numbers, ASCII digits only, separated by
/// commas and/or whitespace. Range is not checked here.
pub fn looks_like_coordinates(input: &str) -> bool {
    coordinate_pattern().is_match(input)
}

/// Classify search input as a coordinate pair or a place name
///
/// Input that matches the coordinate shape is parsed and then range-checked;
/// an out-of-range pair is rejected rather than falling through to geocoding.
///
/// # Errors
///
/// Returns `MapChatError::InvalidCoordinates` when the pair matches the
/// pattern but latitude is outside [-90, 90] or longitude outside [-180, 180].
///
/// # Examples
///
/// ```
/// use mapchat::geo::{parse_location_query, LatLng, LocationQuery};
///
/// assert_eq!(
///     parse_location_query("40.7128, -74.0060").unwrap(),
///     LocationQuery::Coordinates(LatLng::new(40.7128, -74.0060))
/// );
/// assert!(parse_location_query("95, 10").is_err());
/// assert_eq!(
///     parse_location_query("New York").unwrap(),
///     LocationQuery::Place("New York".to_string())
/// );
/// ```
pub fn parse_location_query(input: &str) -> Result<LocationQuery, MapChatError> {
    let input = input.trim();
    if !looks_like_coordinates(input) {
        return Ok(LocationQuery::Place(input.to_string()));
    }

    let mut parts = input
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::parse::<f64>);
    let (lat, lng) = match (parts.next(), parts.next()) {
        (Some(Ok(lat)), Some(Ok(lng))) => (lat, lng),
        _ => return Err(MapChatError::InvalidCoordinates),
    };

    let point = LatLng::new(lat, lng);
    if !point.in_bounds() {
        return Err(MapChatError::InvalidCoordinates);
    }
    Ok(LocationQuery::Coordinates(point))
}

/// Slippy-map tile indices `(x, y)` containing `point` at `zoom`
///
/// Latitude is clamped to the Web Mercator limit so polar inputs still map
/// onto the edge row.
pub fn tile_for(point: LatLng, zoom: u8) -> (u32, u32) {
    const MERCATOR_LIMIT: f64 = 85.051_128_78;
    let n = f64::from(1u32 << zoom.min(31));
    let lat = point.lat.clamp(-MERCATOR_LIMIT, MERCATOR_LIMIT).to_radians();
    let x = ((point.lng + 180.0) / 360.0 * n).floor();
    let y = ((1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / std::f64::consts::PI) / 2.0 * n).floor();
    let max = n - 1.0;
    (x.clamp(0.0, max) as u32, y.clamp(0.0, max) as u32)
}
