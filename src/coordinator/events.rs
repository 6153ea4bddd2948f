//! Messages into and out of the coordinator
//!
//! Views and the runtime describe what happened with an [`Event`]; the
//! coordinator answers with at most one [`Effect`] describing the I/O it
//! wants performed. Completion of that I/O comes back as another event.

use crate::backend::types::{ChatRequest, ChatResponse};
use crate::coordinator::state::Suggestion;
use crate::geo::{Bounds, LatLng};
use crate::map_style::MapStyle;
use crate::models::ChatModel;
use uuid::Uuid;

/// Failure text as it should appear in the error slot
pub type ErrorText = String;

/// Something the user did, or an outbound call finishing
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Application start; requests the session once
    Startup,
    SessionStarted(Result<String, ErrorText>),

    /// Text typed into the chat box
    ChatSubmitted(String),
    ChatCompleted(Result<ChatResponse, ErrorText>),
    ModelSelected(ChatModel),
    SuggestionClicked(Suggestion),

    /// Content of the location search box
    SearchSubmitted(String),
    Geocoded(Result<LatLng, ErrorText>),
    CurrentLocationRequested,
    PositionResolved(Result<LatLng, ErrorText>),

    MapClicked(LatLng),
    /// Map finished panning or zooming
    MapMoved { center: LatLng, zoom: u8 },
    MarkerRemoved(Uuid),
    AreaDrawn(Bounds),
    AreaDeleted,
    StyleSelected(MapStyle),

    ErrorDismissed,
}

/// I/O requested by the coordinator
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    StartSession,
    SendChat(ChatRequest),
    /// Geocode the raw trimmed search text
    Geocode(String),
    LocateUser,
    OpenUrl(String),
}
