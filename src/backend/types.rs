//! Wire types exchanged with the chat/geocoding backend

use crate::coordinator::state::{SelectedArea, Suggestion};
use crate::geo::LatLng;
use crate::models::ChatModel;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Spatial context attached to every chat request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapContext {
    /// Current map center as `[lat, lng]`
    pub coordinates: LatLng,
    pub zoom: u8,
    pub selected_area: Option<SelectedArea>,
}

/// Body of `POST /api/chat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub model: ChatModel,
    /// `null` when session bootstrap has not succeeded
    pub session: Option<String>,
    pub coordinates: MapContext,
}

/// Body returned by `POST /api/chat`
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ChatResponse {
    pub text: String,
    /// Some backend versions name this field `analysis`
    #[serde(default, alias = "analysis")]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default)]
    pub suggestions: Option<Vec<Suggestion>>,
}

/// Body returned by `GET /api/geocode`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum GeocodeResponse {
    Error { error: String },
    Found { lat: f64, lon: f64 },
}
