//! Application state owned by the coordinator
//!
//! Everything the three views render lives here. Nothing outside the
//! coordinator mutates it; views and the runtime only read it through
//! `Coordinator::state`.

use crate::config::Config;
use crate::geo::{Bounds, LatLng};
use crate::map_style::MapStyle;
use crate::models::ChatModel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Who wrote a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Assistant,
}

/// Follow-up action offered alongside an assistant reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub label: String,
    /// Either a URL or an opaque command token
    pub action: String,
}

impl Suggestion {
    pub fn new(label: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: action.into(),
        }
    }

    /// Whether the action should be opened as a link
    pub fn is_url(&self) -> bool {
        self.action.starts_with("http")
    }
}

/// Optional overlay requested by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visualization {
    Heatmap,
    Other(String),
}

impl Visualization {
    /// Read the visualization kind from response metadata
    ///
    /// Looks at the `visualization` key; missing, null, empty or non-string
    /// values mean no overlay.
    pub fn from_metadata(metadata: &Map<String, Value>) -> Option<Self> {
        match metadata.get("visualization").and_then(Value::as_str) {
            None | Some("") => None,
            Some("heatmap") => Some(Self::Heatmap),
            Some(kind) => Some(Self::Other(kind.to_string())),
        }
    }

    pub fn kind(&self) -> &str {
        match self {
            Self::Heatmap => "heatmap",
            Self::Other(kind) => kind,
        }
    }
}

/// One entry of the conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub text: String,
    pub sender: Sender,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<Suggestion>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            metadata: None,
            suggestions: Vec::new(),
        }
    }

    pub fn assistant(
        text: impl Into<String>,
        metadata: Option<Map<String, Value>>,
        suggestions: Vec<Suggestion>,
    ) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Assistant,
            metadata,
            suggestions,
        }
    }

    /// Visualization kind carried in this message's metadata, if any
    pub fn visualization(&self) -> Option<Visualization> {
        self.metadata.as_ref().and_then(Visualization::from_metadata)
    }
}

/// Last committed map viewport
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub center: LatLng,
    pub zoom: u8,
}

/// A user-placed pin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: Uuid,
    pub position: LatLng,
    pub created_at: DateTime<Utc>,
}

impl Marker {
    pub fn new(position: LatLng) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            created_at: Utc::now(),
        }
    }
}

/// The single user-drawn region of interest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedArea {
    pub bounds: Bounds,
    pub timestamp: DateTime<Utc>,
}

impl SelectedArea {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            bounds,
            timestamp: Utc::now(),
        }
    }
}

/// Complete client-side state
#[derive(Debug, Clone)]
pub struct AppState {
    /// Conversation in display order
    pub messages: Vec<ChatMessage>,
    /// Center most recently requested by search or current-location
    pub location: LatLng,
    /// Viewport as last reported by the map
    pub map_view: MapView,
    pub markers: Vec<Marker>,
    pub selected_area: Option<SelectedArea>,
    pub map_style: MapStyle,
    pub model: ChatModel,
    /// Opaque token from session bootstrap; `None` until it completes
    pub session: Option<String>,
    pub visualization: Option<Visualization>,
    /// Shared, dismissible error slot
    pub error: Option<String>,
    pub loading: bool,
    /// Bumped every time `location` is set, even to the same value
    pub location_revision: u64,
    /// Bumped every time an error is raised, even with the same text
    pub error_revision: u64,
}

impl AppState {
    pub fn new(center: LatLng, zoom: u8, map_style: MapStyle, model: ChatModel) -> Self {
        Self {
            messages: Vec::new(),
            location: center,
            map_view: MapView { center, zoom },
            markers: Vec::new(),
            selected_area: None,
            map_style,
            model,
            session: None,
            visualization: None,
            error: None,
            loading: false,
            location_revision: 0,
            error_revision: 0,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.map.center,
            config.map.zoom,
            config.map.style,
            config.chat.default_model,
        )
    }

    pub fn marker(&self, id: Uuid) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
