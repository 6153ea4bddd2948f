//! HTTP implementation of the backend contract
//!
//! Speaks to a MapChat server exposing `POST /api/session`, `POST /api/chat`
//! and `GET /api/geocode`. Every failure is mapped onto the matching
//! [`MapChatError`] variant so callers see `Failed to start session: ...`,
//! `Chat request failed: ...` or `Geocoding failed: ...`.

use crate::backend::types::{ChatRequest, ChatResponse, GeocodeResponse};
use crate::backend::{Backend, FALLBACK_SESSION};
use crate::config::BackendConfig;
use crate::error::{MapChatError, Result};
use crate::geo::LatLng;

use async_trait::async_trait;
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// Error body some endpoints return alongside (or instead of) a failure status
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Backend reached over HTTP
///
/// # Examples
///
/// ```
/// use mapchat::backend::HttpBackend;
/// use mapchat::config::BackendConfig;
///
/// let backend = HttpBackend::new(&BackendConfig::default());
/// assert!(backend.is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
}

impl HttpBackend {
    /// Build a backend client from configuration
    ///
    /// # Errors
    ///
    /// Returns `MapChatError::Config` if the HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| MapChatError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let base_url = config.base_url.trim_end_matches('/').to_string();
        tracing::info!("Initialized HTTP backend: base_url={}", base_url);

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Read the session token out of the first `Set-Cookie` header
///
/// Only the `name=value` pair is kept; cookie attributes are dropped.
fn session_from_cookie(response: &Response) -> Option<String> {
    let header = response.headers().get(SET_COOKIE)?.to_str().ok()?;
    let pair = header.split(';').next()?.trim();
    if pair.is_empty() {
        None
    } else {
        Some(pair.to_string())
    }
}

/// Describe a non-success response, preferring an `{error}` body
async fn failure_reason(status: StatusCode, response: Response) -> String {
    let body = response.text().await.unwrap_or_default();
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => parsed.error,
        Err(_) => format!("Request failed with status code {}", status.as_u16()),
    }
}

/// Percent-encode a query component
///
/// Leaves ASCII alphanumerics and `-_.!~*'()` intact and encodes every
/// other UTF-8 byte, so spaces become `%20` rather than `+`.
pub fn encode_uri_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[async_trait]
impl Backend for HttpBackend {
    async fn start_session(&self) -> Result<String> {
        let url = self.url("/api/session");
        tracing::debug!("Starting session: {}", url);

        let response = self.client.post(&url).send().await.map_err(|e| {
            tracing::warn!("Session request failed: {}", e);
            MapChatError::Session(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let reason = failure_reason(status, response).await;
            tracing::warn!("Session endpoint returned {}: {}", status, reason);
            return Err(MapChatError::Session(reason).into());
        }

        Ok(session_from_cookie(&response).unwrap_or_else(|| {
            tracing::debug!("No session cookie returned, using fallback token");
            FALLBACK_SESSION.to_string()
        }))
    }

    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let url = self.url("/api/chat");
        tracing::debug!(
            "Sending chat: model={}, zoom={}, area={}",
            request.model,
            request.coordinates.zoom,
            request.coordinates.selected_area.is_some()
        );

        let mut builder = self.client.post(&url).json(request);
        if let Some(session) = request.session.as_deref().filter(|s| s.contains('=')) {
            builder = builder.header(COOKIE, session);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::warn!("Chat request failed: {}", e);
            MapChatError::Chat(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let reason = failure_reason(status, response).await;
            tracing::warn!("Chat endpoint returned {}: {}", status, reason);
            return Err(MapChatError::Chat(reason).into());
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            tracing::warn!("Failed to parse chat response: {}", e);
            MapChatError::Chat(format!("Invalid response: {}", e))
        })?;

        tracing::debug!(
            "Chat response: {} chars, {} suggestions",
            chat.text.len(),
            chat.suggestions.as_ref().map_or(0, Vec::len)
        );
        Ok(chat)
    }

    async fn geocode(&self, location: &str) -> Result<LatLng> {
        let url = format!(
            "{}?location={}",
            self.url("/api/geocode"),
            encode_uri_component(location)
        );
        tracing::debug!("Geocoding: {}", location);

        let response = self.client.get(&url).send().await.map_err(|e| {
            tracing::warn!("Geocode request failed: {}", e);
            MapChatError::Geocode(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let reason = failure_reason(status, response).await;
            tracing::warn!("Geocode endpoint returned {}: {}", status, reason);
            return Err(MapChatError::Geocode(reason).into());
        }

        let body: GeocodeResponse = response.json().await.map_err(|e| {
            tracing::warn!("Failed to parse geocode response: {}", e);
            MapChatError::Geocode(format!("Invalid response: {}", e))
        })?;

        match body {
            GeocodeResponse::Found { lat, lon } => Ok(LatLng::new(lat, lon)),
            GeocodeResponse::Error { error } => Err(MapChatError::Geocode(error).into()),
        }
    }
}
