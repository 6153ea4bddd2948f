//! Async executor for coordinator effects
//!
//! The [`Runtime`] feeds events into the [`Coordinator`], runs each
//! resulting [`Effect`] on its own tokio task and posts the outcome back as a
//! completion event over an mpsc channel. Completions are applied on the
//! caller's task, one at a time, so state is only ever touched serially.
//!
//! Dropping the runtime closes the channel. Calls still in flight finish on
//! their own and their results are discarded.

use crate::backend::Backend;
use crate::coordinator::{AppState, Coordinator, Effect, Event};
use crate::error::{MapChatError, Result};
use crate::geo::LatLng;
use crate::geolocation::Geolocator;
use colored::Colorize;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Opens suggestion links
pub trait UrlOpener: Send + Sync {
    fn open(&self, url: &str) -> Result<()>;
}

/// Prints links to the terminal for the user to follow
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalOpener;

impl UrlOpener for TerminalOpener {
    fn open(&self, url: &str) -> Result<()> {
        println!("{} {}", "Open:".cyan().bold(), url.underline());
        Ok(())
    }
}

/// Drives a coordinator against a backend
pub struct Runtime {
    coordinator: Coordinator,
    backend: Arc<dyn Backend>,
    geolocator: Option<Arc<dyn Geolocator>>,
    opener: Box<dyn UrlOpener>,
    tx: UnboundedSender<Event>,
    rx: UnboundedReceiver<Event>,
    in_flight: usize,
}

impl Runtime {
    /// Create a runtime without a geolocation source
    pub fn new(mut coordinator: Coordinator, backend: Arc<dyn Backend>) -> Self {
        coordinator.set_geolocation_supported(false);
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            coordinator,
            backend,
            geolocator: None,
            opener: Box::new(TerminalOpener),
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Enable current-location lookups through `geolocator`
    pub fn with_geolocator(mut self, geolocator: Arc<dyn Geolocator>) -> Self {
        self.geolocator = Some(geolocator);
        self.coordinator.set_geolocation_supported(true);
        self
    }

    pub fn with_url_opener(mut self, opener: Box<dyn UrlOpener>) -> Self {
        self.opener = opener;
        self
    }

    pub fn state(&self) -> &AppState {
        self.coordinator.state()
    }

    pub fn coordinator(&self) -> &Coordinator {
        &self.coordinator
    }

    /// Number of effects whose completion has not been applied yet
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Apply a user event and start whatever I/O it requests
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&mut self, event: Event) {
        if let Some(effect) = self.coordinator.handle(event) {
            self.execute(effect);
        }
    }

    fn execute(&mut self, effect: Effect) {
        tracing::debug!(?effect, "Executing effect");
        if let Effect::OpenUrl(url) = &effect {
            if let Err(e) = self.opener.open(url) {
                tracing::warn!("Failed to open {}: {}", url, e);
            }
            return;
        }
        let Some(aborted) = aborted_completion(&effect) else {
            return;
        };

        self.in_flight += 1;
        let tx = self.tx.clone();
        let work = tokio::spawn(run_effect(
            effect,
            Arc::clone(&self.backend),
            self.geolocator.clone(),
        ));

        // A panicking effect still has to post a completion or settle() hangs.
        tokio::spawn(async move {
            let completion = match work.await {
                Ok(Some(event)) => event,
                Ok(None) => aborted,
                Err(e) => {
                    tracing::error!("Effect task failed: {}", e);
                    aborted
                }
            };
            if tx.send(completion).is_err() {
                tracing::debug!("Runtime dropped before completion; discarding result");
            }
        });
    }

    /// Wait for and apply the next completion
    ///
    /// Returns `false` immediately when nothing is in flight.
    pub async fn next_completion(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.rx.recv().await {
            Some(event) => {
                self.apply_completion(event);
                true
            }
            None => false,
        }
    }

    /// Apply completions until nothing is in flight
    pub async fn settle(&mut self) {
        while self.next_completion().await {}
    }

    /// Apply completions that have already arrived without waiting
    ///
    /// Returns how many were applied.
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        while self.in_flight > 0 {
            match self.rx.try_recv() {
                Ok(event) => {
                    self.apply_completion(event);
                    applied += 1;
                }
                Err(_) => break,
            }
        }
        applied
    }

    fn apply_completion(&mut self, event: Event) {
        self.in_flight = self.in_flight.saturating_sub(1);
        if let Some(effect) = self.coordinator.handle(event) {
            self.execute(effect);
        }
    }
}

async fn run_effect(
    effect: Effect,
    backend: Arc<dyn Backend>,
    geolocator: Option<Arc<dyn Geolocator>>,
) -> Option<Event> {
    let completion = match effect {
        Effect::StartSession => {
            let result = backend.start_session().await;
            Event::SessionStarted(result.map_err(|e| e.to_string()))
        }
        Effect::SendChat(request) => {
            let result = backend.send_chat(&request).await;
            Event::ChatCompleted(result.map_err(|e| e.to_string()))
        }
        Effect::Geocode(location) => {
            let result = backend.geocode(&location).await;
            Event::Geocoded(result.map_err(|e| e.to_string()))
        }
        Effect::LocateUser => Event::PositionResolved(locate(geolocator).await),
        Effect::OpenUrl(_) => return None,
    };
    Some(completion)
}

/// Completion posted when an effect task dies without producing one
fn aborted_completion(effect: &Effect) -> Option<Event> {
    const REASON: &str = "request aborted";
    let event = match effect {
        Effect::StartSession => {
            Event::SessionStarted(Err(MapChatError::Session(REASON.into()).to_string()))
        }
        Effect::SendChat(_) => {
            Event::ChatCompleted(Err(MapChatError::Chat(REASON.into()).to_string()))
        }
        Effect::Geocode(_) => {
            Event::Geocoded(Err(MapChatError::Geocode(REASON.into()).to_string()))
        }
        Effect::LocateUser => {
            Event::PositionResolved(Err(MapChatError::Geolocation(REASON.into()).to_string()))
        }
        Effect::OpenUrl(_) => return None,
    };
    Some(event)
}

async fn locate(geolocator: Option<Arc<dyn Geolocator>>) -> std::result::Result<LatLng, String> {
    let Some(geolocator) = geolocator else {
        return Err(MapChatError::GeolocationUnsupported.to_string());
    };
    geolocator.current_position().await.map_err(|e| {
        match e.downcast_ref::<MapChatError>() {
            Some(MapChatError::Geolocation(_)) => e.to_string(),
            _ => MapChatError::Geolocation(e.to_string()).to_string(),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::{Sender, Suggestion};
    use crate::geolocation::FixedGeolocator;
    use crate::test_utils::{FailingGeolocator, MockBackend, PanickingGeolocator, RecordingOpener};
    use std::time::Duration;

    fn runtime(backend: MockBackend) -> (Runtime, Arc<MockBackend>) {
        let backend = Arc::new(backend);
        let runtime = Runtime::new(Coordinator::default(), backend.clone());
        (runtime, backend)
    }

    #[tokio::test]
    async fn test_startup_stores_session() {
        let (mut rt, _) = runtime(MockBackend::healthy());
        rt.dispatch(Event::Startup);
        assert_eq!(rt.in_flight(), 1);
        rt.settle().await;
        assert_eq!(rt.state().session.as_deref(), Some("session_id=test"));
        assert_eq!(rt.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_session_failure_is_reported() {
        let (mut rt, _) = runtime(MockBackend::failing());
        rt.dispatch(Event::Startup);
        rt.settle().await;
        assert_eq!(
            rt.state().error.as_deref(),
            Some("Failed to start session: connection refused")
        );
        assert!(rt.state().session.is_none());
    }

    #[tokio::test]
    async fn test_chat_round_trip_sends_session() {
        let (mut rt, backend) = runtime(MockBackend::healthy());
        rt.dispatch(Event::Startup);
        rt.settle().await;

        rt.dispatch(Event::ChatSubmitted("Hello".to_string()));
        assert!(rt.state().loading);
        rt.settle().await;

        let state = rt.state();
        assert!(!state.loading);
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[1].sender, Sender::Assistant);
        assert_eq!(state.messages[1].text, "Mock reply");

        let requests = backend.chat_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].session.as_deref(), Some("session_id=test"));
    }

    #[tokio::test]
    async fn test_chat_failure_prefixes_error() {
        let (mut rt, _) = runtime(MockBackend::failing());
        rt.dispatch(Event::ChatSubmitted("Hello".to_string()));
        rt.settle().await;
        assert_eq!(rt.state().messages.len(), 1);
        assert_eq!(
            rt.state().error.as_deref(),
            Some("Chat request failed: Request failed with status code 500")
        );
        assert!(!rt.state().loading);
    }

    #[tokio::test]
    async fn test_place_search_geocodes_raw_text() {
        let (mut rt, backend) = runtime(MockBackend::healthy());
        rt.dispatch(Event::SearchSubmitted("New York".to_string()));
        rt.settle().await;
        assert_eq!(backend.geocode_queries(), vec!["New York".to_string()]);
        assert_eq!(rt.state().location, LatLng::new(40.7128, -74.006));
    }

    #[tokio::test]
    async fn test_coordinate_search_skips_backend() {
        let (mut rt, backend) = runtime(MockBackend::healthy());
        rt.dispatch(Event::SearchSubmitted("95, 10".to_string()));
        assert_eq!(rt.in_flight(), 0);
        assert!(backend.geocode_queries().is_empty());
        assert!(rt.state().error.is_some());
    }

    #[tokio::test]
    async fn test_current_location_without_geolocator() {
        let (mut rt, _) = runtime(MockBackend::healthy());
        rt.dispatch(Event::CurrentLocationRequested);
        assert_eq!(rt.in_flight(), 0);
        assert_eq!(
            rt.state().error.as_deref(),
            Some("Geolocation not supported by this environment")
        );
    }

    #[tokio::test]
    async fn test_current_location_with_geolocator() {
        let (rt, _) = runtime(MockBackend::healthy());
        let mut rt =
            rt.with_geolocator(Arc::new(FixedGeolocator::new(LatLng::new(35.0, 139.0))));
        rt.dispatch(Event::CurrentLocationRequested);
        rt.settle().await;
        assert_eq!(rt.state().location, LatLng::new(35.0, 139.0));
        assert!(!rt.state().loading);
    }

    #[tokio::test]
    async fn test_current_location_failure_is_prefixed() {
        let (rt, _) = runtime(MockBackend::healthy());
        let mut rt = rt.with_geolocator(Arc::new(FailingGeolocator));
        rt.dispatch(Event::CurrentLocationRequested);
        rt.settle().await;
        assert_eq!(
            rt.state().error.as_deref(),
            Some("Unable to retrieve location: permission denied")
        );
    }

    #[tokio::test]
    async fn test_panicking_effect_still_completes() {
        let (rt, _) = runtime(MockBackend::healthy());
        let mut rt = rt.with_geolocator(Arc::new(PanickingGeolocator));
        rt.dispatch(Event::CurrentLocationRequested);
        tokio::time::timeout(Duration::from_secs(5), rt.settle())
            .await
            .expect("settle should return after a panicked effect");

        assert_eq!(rt.in_flight(), 0);
        assert!(!rt.state().loading);
        assert_eq!(
            rt.state().error.as_deref(),
            Some("Unable to retrieve location: request aborted")
        );
    }

    #[tokio::test]
    async fn test_url_suggestion_is_opened() {
        let opener = RecordingOpener::default();
        let (rt, _) = runtime(MockBackend::healthy());
        let mut rt = rt.with_url_opener(Box::new(opener.clone()));
        rt.dispatch(Event::SuggestionClicked(Suggestion::new(
            "Docs",
            "https://example.com/docs",
        )));
        rt.dispatch(Event::SuggestionClicked(Suggestion::new("Zoom", "zoom_in")));
        assert_eq!(rt.in_flight(), 0);
        assert_eq!(
            *opener.opened.lock().unwrap(),
            vec!["https://example.com/docs".to_string()]
        );
    }

    #[tokio::test]
    async fn test_drain_does_not_block() {
        let (mut rt, _) = runtime(MockBackend::healthy().with_delay(Duration::from_secs(5)));
        rt.dispatch(Event::ChatSubmitted("slow".to_string()));
        assert_eq!(rt.drain(), 0);
        assert_eq!(rt.in_flight(), 1);
        assert!(rt.state().loading);
    }

    #[tokio::test]
    async fn test_next_completion_with_nothing_in_flight() {
        let (mut rt, _) = runtime(MockBackend::healthy());
        assert!(!rt.next_completion().await);
    }

    #[tokio::test]
    async fn test_late_result_after_drop_is_discarded() {
        let (mut rt, backend) =
            runtime(MockBackend::healthy().with_delay(Duration::from_millis(50)));
        rt.dispatch(Event::ChatSubmitted("bye".to_string()));
        drop(rt);
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(backend.chat_requests().len(), 1);
    }
}
