//! Client side of the chat/geocoding backend
//!
//! [`Backend`] is the seam the runtime calls through; [`HttpBackend`] is the
//! production implementation speaking the `/api/*` HTTP contract.

pub mod http;
pub mod types;

pub use http::HttpBackend;
pub use types::{ChatRequest, ChatResponse, MapContext};

use crate::error::Result;
use crate::geo::LatLng;
use async_trait::async_trait;

/// Session token used when the backend answers without a cookie
pub const FALLBACK_SESSION: &str = "default-session";

/// Outbound calls made on behalf of the coordinator
///
/// Implementations must be shareable across tasks; each call is issued from
/// its own spawned task.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use mapchat::backend::{Backend, ChatRequest, ChatResponse};
/// use mapchat::error::Result;
/// use mapchat::geo::LatLng;
///
/// struct Offline;
///
/// #[async_trait]
/// impl Backend for Offline {
///     async fn start_session(&self) -> Result<String> {
///         Ok("offline".to_string())
///     }
///
///     async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
///         Ok(ChatResponse {
///             text: format!("echo: {}", request.message),
///             ..Default::default()
///         })
///     }
///
///     async fn geocode(&self, _location: &str) -> Result<LatLng> {
///         Ok(LatLng::new(0.0, 0.0))
///     }
/// }
/// ```
#[async_trait]
pub trait Backend: Send + Sync {
    /// Establish a session and return its opaque token
    async fn start_session(&self) -> Result<String>;

    /// Send one chat message with its map context
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// Resolve a free-text place name to coordinates
    async fn geocode(&self, location: &str) -> Result<LatLng>;
}
