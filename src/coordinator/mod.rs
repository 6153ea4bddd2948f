//! Session, chat and map state coordination
//!
//! The [`Coordinator`] owns the [`AppState`] and is the only code that
//! mutates it. It performs no I/O: [`Coordinator::handle`] applies one
//! [`Event`] and returns the [`Effect`] (if any) the caller should run.
//! The async side lives in [`crate::runtime`].
//!
//! # Example
//!
//! ```
//! use mapchat::coordinator::{Coordinator, Effect, Event};
//! use mapchat::geo::LatLng;
//!
//! let mut coordinator = Coordinator::default();
//! assert_eq!(coordinator.handle(Event::Startup), Some(Effect::StartSession));
//!
//! let effect = coordinator.handle(Event::SearchSubmitted("40.7128, -74.0060".into()));
//! assert!(effect.is_none());
//! assert_eq!(coordinator.state().location, LatLng::new(40.7128, -74.0060));
//! ```

pub mod events;
pub mod state;

pub use events::{Effect, ErrorText, Event};
pub use state::{
    AppState, ChatMessage, MapView, Marker, SelectedArea, Sender, Suggestion, Visualization,
};

use crate::backend::types::{ChatRequest, ChatResponse, MapContext};
use crate::config::Config;
use crate::error::MapChatError;
use crate::geo::{parse_location_query, LatLng, LocationQuery};

/// Owner of all client-side state
#[derive(Debug, Clone)]
pub struct Coordinator {
    state: AppState,
    geolocation_supported: bool,
    session_requested: bool,
}

impl Coordinator {
    /// Create a coordinator around an initial state
    ///
    /// `geolocation_supported` is false when the environment offers no way
    /// to determine the current position.
    pub fn new(state: AppState, geolocation_supported: bool) -> Self {
        Self {
            state,
            geolocation_supported,
            session_requested: false,
        }
    }

    /// Create a coordinator from configuration defaults
    pub fn from_config(config: &Config) -> Self {
        Self::new(AppState::from_config(config), config.geolocation.is_some())
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn geolocation_supported(&self) -> bool {
        self.geolocation_supported
    }

    pub fn set_geolocation_supported(&mut self, supported: bool) {
        self.geolocation_supported = supported;
    }

    /// Apply one event and return the I/O it requires
    pub fn handle(&mut self, event: Event) -> Option<Effect> {
        tracing::trace!(?event, "Coordinator event");
        match event {
            Event::Startup => self.on_startup(),
            Event::SessionStarted(result) => {
                self.on_session_started(result);
                None
            }
            Event::ChatSubmitted(text) => self.on_chat_submitted(text),
            Event::ChatCompleted(result) => {
                self.on_chat_completed(result);
                None
            }
            Event::ModelSelected(model) => {
                tracing::debug!(%model, "Model selected");
                self.state.model = model;
                None
            }
            Event::SuggestionClicked(suggestion) => self.on_suggestion_clicked(suggestion),
            Event::SearchSubmitted(input) => self.on_search_submitted(&input),
            Event::Geocoded(result) => {
                self.on_position(result);
                None
            }
            Event::CurrentLocationRequested => self.on_current_location_requested(),
            Event::PositionResolved(result) => {
                self.on_position(result);
                None
            }
            Event::MapClicked(position) => {
                let marker = Marker::new(position);
                tracing::debug!(id = %marker.id, %position, "Marker added");
                self.state.markers.push(marker);
                None
            }
            Event::MapMoved { center, zoom } => {
                self.state.map_view = MapView { center, zoom };
                None
            }
            Event::MarkerRemoved(id) => {
                let before = self.state.markers.len();
                self.state.markers.retain(|m| m.id != id);
                if self.state.markers.len() == before {
                    tracing::debug!(%id, "No marker with this id");
                }
                None
            }
            Event::AreaDrawn(bounds) => {
                self.state.selected_area = Some(SelectedArea::new(bounds));
                None
            }
            Event::AreaDeleted => {
                self.state.selected_area = None;
                None
            }
            Event::StyleSelected(style) => {
                self.state.map_style = style;
                None
            }
            Event::ErrorDismissed => {
                self.state.error = None;
                None
            }
        }
    }

    fn on_startup(&mut self) -> Option<Effect> {
        if self.session_requested {
            return None;
        }
        self.session_requested = true;
        Some(Effect::StartSession)
    }

    fn on_session_started(&mut self, result: Result<String, ErrorText>) {
        match result {
            Ok(token) => {
                tracing::info!("Session established");
                self.state.session = Some(token);
            }
            Err(message) => {
                tracing::warn!("Session bootstrap failed: {}", message);
                self.set_error(message);
            }
        }
    }

    fn on_chat_submitted(&mut self, text: String) -> Option<Effect> {
        if text.trim().is_empty() || self.state.loading {
            return None;
        }

        self.state.messages.push(ChatMessage::user(text.clone()));
        self.state.loading = true;

        let request = ChatRequest {
            message: text,
            model: self.state.model,
            session: self.state.session.clone(),
            coordinates: MapContext {
                coordinates: self.state.map_view.center,
                zoom: self.state.map_view.zoom,
                selected_area: self.state.selected_area.clone(),
            },
        };
        Some(Effect::SendChat(request))
    }

    fn on_chat_completed(&mut self, result: Result<ChatResponse, ErrorText>) {
        self.state.loading = false;
        match result {
            Ok(response) => {
                let message = ChatMessage::assistant(
                    response.text,
                    response.metadata,
                    response.suggestions.unwrap_or_default(),
                );
                self.state.visualization = message.visualization();
                self.state.messages.push(message);
            }
            Err(message) => self.set_error(message),
        }
    }

    fn on_suggestion_clicked(&mut self, suggestion: Suggestion) -> Option<Effect> {
        if suggestion.is_url() {
            return Some(Effect::OpenUrl(suggestion.action));
        }
        tracing::debug!(action = %suggestion.action, "Unhandled suggestion action");
        None
    }

    fn on_search_submitted(&mut self, input: &str) -> Option<Effect> {
        let input = input.trim();
        if input.is_empty() || self.state.loading {
            return None;
        }

        self.state.error = None;
        match parse_location_query(input) {
            Ok(LocationQuery::Coordinates(point)) => {
                self.set_location(point);
                None
            }
            Ok(LocationQuery::Place(place)) => {
                self.state.loading = true;
                Some(Effect::Geocode(place))
            }
            Err(e) => {
                self.set_error(e.to_string());
                None
            }
        }
    }

    fn on_current_location_requested(&mut self) -> Option<Effect> {
        if !self.geolocation_supported {
            self.set_error(MapChatError::GeolocationUnsupported.to_string());
            return None;
        }
        if self.state.loading {
            return None;
        }
        self.state.loading = true;
        Some(Effect::LocateUser)
    }

    fn on_position(&mut self, result: Result<LatLng, ErrorText>) {
        self.state.loading = false;
        match result {
            Ok(point) => self.set_location(point),
            Err(message) => self.set_error(message),
        }
    }

    fn set_location(&mut self, point: LatLng) {
        self.state.location = point;
        self.state.location_revision += 1;
    }

    fn set_error(&mut self, message: ErrorText) {
        self.state.error = Some(message);
        self.state.error_revision += 1;
    }
}

impl Default for Coordinator {
    fn default() -> Self {
        Self::new(AppState::default(), false)
    }
}
