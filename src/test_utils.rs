//! Test utilities for MapChat
//!
//! Scripted backend and geolocator doubles plus temp-file helpers.

use crate::backend::{Backend, ChatRequest, ChatResponse};
use crate::error::{MapChatError, Result};
use crate::geo::LatLng;
use crate::geolocation::Geolocator;
use crate::runtime::UrlOpener;
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Create a temporary directory for testing
pub fn temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Write `content` to `name` inside `dir` and return its path
pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Backend double with canned answers and a request log
#[derive(Default)]
pub struct MockBackend {
    pub session: Option<String>,
    pub chat_reply: Option<ChatResponse>,
    pub geocode_result: Option<LatLng>,
    pub delay: Duration,
    pub chat_requests: Mutex<Vec<ChatRequest>>,
    pub geocode_queries: Mutex<Vec<String>>,
}

impl MockBackend {
    /// Backend that answers every call successfully
    pub fn healthy() -> Self {
        Self {
            session: Some("session_id=test".to_string()),
            chat_reply: Some(ChatResponse {
                text: "Mock reply".to_string(),
                ..Default::default()
            }),
            geocode_result: Some(LatLng::new(40.7128, -74.006)),
            ..Default::default()
        }
    }

    /// Backend that fails every call
    pub fn failing() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn chat_requests(&self) -> Vec<ChatRequest> {
        self.chat_requests.lock().unwrap().clone()
    }

    pub fn geocode_queries(&self) -> Vec<String> {
        self.geocode_queries.lock().unwrap().clone()
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn start_session(&self) -> Result<String> {
        self.pause().await;
        self.session
            .clone()
            .ok_or_else(|| MapChatError::Session("connection refused".to_string()).into())
    }

    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.chat_requests.lock().unwrap().push(request.clone());
        self.pause().await;
        self.chat_reply.clone().ok_or_else(|| {
            MapChatError::Chat("Request failed with status code 500".to_string()).into()
        })
    }

    async fn geocode(&self, location: &str) -> Result<LatLng> {
        self.geocode_queries
            .lock()
            .unwrap()
            .push(location.to_string());
        self.pause().await;
        self.geocode_result
            .ok_or_else(|| MapChatError::Geocode("Location not found".to_string()).into())
    }
}

/// Geolocator that always fails with a plain error
pub struct FailingGeolocator;

#[async_trait]
impl Geolocator for FailingGeolocator {
    async fn current_position(&self) -> Result<LatLng> {
        Err(anyhow::anyhow!("permission denied"))
    }
}

/// Geolocator whose lookup panics
pub struct PanickingGeolocator;

#[async_trait]
impl Geolocator for PanickingGeolocator {
    async fn current_position(&self) -> Result<LatLng> {
        panic!("location provider crashed")
    }
}

/// URL opener that records what it was asked to open
#[derive(Clone, Default)]
pub struct RecordingOpener {
    pub opened: Arc<Mutex<Vec<String>>>,
}

impl UrlOpener for RecordingOpener {
    fn open(&self, url: &str) -> Result<()> {
        self.opened.lock().unwrap().push(url.to_string());
        Ok(())
    }
}
