/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `chat`    - Interactive map chat session
- `search`  - One-shot location resolution
- `models`  - List selectable chat models and map styles

The handlers wire configuration, the HTTP backend and the runtime together;
all state transitions live in the coordinator.
*/

use crate::backend::HttpBackend;
use crate::config::Config;
use crate::coordinator::{Coordinator, Event};
use crate::error::{MapChatError, Result};
use crate::geolocation;
use crate::map_style::MapStyle;
use crate::models::ChatModel;
use crate::runtime::Runtime;
use std::sync::Arc;

// Slash-command parser for the interactive session
pub mod special_commands;

// Listing of models and styles
pub mod models;

// Terminal rendering of coordinator state
pub mod view;

/// Build a runtime for `config`, applying optional model/style overrides
pub fn build_runtime(
    config: &Config,
    model: Option<&str>,
    style: Option<&str>,
) -> Result<Runtime> {
    let mut coordinator = Coordinator::from_config(config);

    if let Some(model) = model {
        let model = ChatModel::parse_str(model).map_err(MapChatError::Config)?;
        coordinator.handle(Event::ModelSelected(model));
    }
    if let Some(style) = style {
        let style = MapStyle::parse_str(style).map_err(MapChatError::Config)?;
        coordinator.handle(Event::StyleSelected(style));
    }

    let backend = Arc::new(HttpBackend::new(&config.backend)?);
    let mut runtime = Runtime::new(coordinator, backend);
    if let Some(locator) = geolocation::from_config(config) {
        runtime = runtime.with_geolocator(locator);
    }
    Ok(runtime)
}

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Reads lines with rustyline, turns slash commands into coordinator
    //! events and everything else into chat submissions, then waits for the
    //! resulting calls to finish before redrawing.

    use super::*;
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use crate::commands::view::TerminalView;
    use crate::coordinator::{AppState, Sender};
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;
    use uuid::Uuid;

    /// Start the interactive session
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `model` - Optional override for the configured default model
    /// * `style` - Optional override for the configured map style
    pub async fn run_chat(config: Config, model: Option<String>, style: Option<String>) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let mut runtime = build_runtime(&config, model.as_deref(), style.as_deref())?;
        let mut view = TerminalView::new(runtime.state());

        print_welcome_banner(runtime.state());

        runtime.dispatch(Event::Startup);
        view.refresh(&mut runtime).await;

        let mut rl = DefaultEditor::new()?;

        loop {
            let prompt = format!("{} >> ", runtime.state().model.colored_tag());
            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(trimmed)?;

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}", MapChatError::from(e).to_string().red());
                            continue;
                        }
                    };

                    let event = match command {
                        SpecialCommand::Exit => break,
                        SpecialCommand::Help => {
                            print_help();
                            continue;
                        }
                        SpecialCommand::ShowStatus => {
                            view.print_status(runtime.state());
                            continue;
                        }
                        SpecialCommand::ListMarkers => {
                            view.print_markers(runtime.state());
                            continue;
                        }
                        SpecialCommand::Unmark(target) => {
                            match resolve_marker(runtime.state(), &target) {
                                Some(id) => Event::MarkerRemoved(id),
                                None => {
                                    eprintln!("{}", format!("No marker matches '{}'", target).red());
                                    continue;
                                }
                            }
                        }
                        SpecialCommand::Suggest(n) => match latest_suggestion(runtime.state(), n) {
                            Some(suggestion) => Event::SuggestionClicked(suggestion),
                            None => {
                                eprintln!("{}", format!("No suggestion number {}", n).red());
                                continue;
                            }
                        },
                        SpecialCommand::Search(text) => Event::SearchSubmitted(text),
                        SpecialCommand::Here => Event::CurrentLocationRequested,
                        SpecialCommand::Click(point) => Event::MapClicked(point),
                        SpecialCommand::Move { center, zoom } => Event::MapMoved {
                            center,
                            zoom: zoom.unwrap_or(runtime.state().map_view.zoom),
                        },
                        SpecialCommand::Area(bounds) => Event::AreaDrawn(bounds),
                        SpecialCommand::ClearArea => Event::AreaDeleted,
                        SpecialCommand::Style(style) => Event::StyleSelected(style),
                        SpecialCommand::Model(model) => Event::ModelSelected(model),
                        SpecialCommand::Dismiss => Event::ErrorDismissed,
                        SpecialCommand::None => Event::ChatSubmitted(trimmed.to_string()),
                    };

                    let feedback = describe(&event);
                    runtime.dispatch(event);
                    if let Some(feedback) = feedback {
                        println!("{}", feedback.green());
                    }
                    view.refresh(&mut runtime).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Short confirmation for events that change the map silently
    fn describe(event: &Event) -> Option<String> {
        match event {
            Event::MapClicked(point) => Some(format!("Marker added at {}", point)),
            Event::MarkerRemoved(id) => Some(format!("Marker {} removed", id)),
            Event::AreaDrawn(bounds) => Some(format!(
                "Area selected: {} to {}",
                bounds.south_west, bounds.north_east
            )),
            Event::AreaDeleted => Some("Area cleared".to_string()),
            Event::MapMoved { center, zoom } => {
                Some(format!("Map moved to {} (Zoom: {})", center, zoom))
            }
            Event::StyleSelected(style) => Some(format!("Map style: {}", style)),
            Event::ModelSelected(model) => Some(format!("Model: {}", model.label())),
            _ => None,
        }
    }

    /// Find a marker by 1-based list position, full id or id prefix
    pub(crate) fn resolve_marker(state: &AppState, target: &str) -> Option<Uuid> {
        if let Ok(n) = target.parse::<usize>() {
            return n
                .checked_sub(1)
                .and_then(|i| state.markers.get(i))
                .map(|m| m.id);
        }
        let target = target.to_lowercase();
        let mut matches = state
            .markers
            .iter()
            .filter(|m| m.id.to_string().starts_with(&target));
        match (matches.next(), matches.next()) {
            (Some(marker), None) => Some(marker.id),
            _ => None,
        }
    }

    /// The n-th (1-based) suggestion of the most recent assistant reply
    pub(crate) fn latest_suggestion(
        state: &AppState,
        n: usize,
    ) -> Option<crate::coordinator::Suggestion> {
        state
            .messages
            .iter()
            .rev()
            .find(|m| m.sender == Sender::Assistant)
            .and_then(|m| m.suggestions.get(n.checked_sub(1)?))
            .cloned()
    }

    fn print_welcome_banner(state: &AppState) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║            MapChat Interactive Session - Welcome!            ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Model: {} ({})", state.model.colored_tag(), state.model.label());
        println!(
            "View:  {} (Zoom: {}) on {}\n",
            state.map_view.center, state.map_view.zoom, state.map_style
        );
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::backend::ChatResponse;
        use crate::coordinator::Suggestion;
        use crate::geo::LatLng;

        fn state_with_markers(n: usize) -> Coordinator {
            let mut c = Coordinator::default();
            for i in 0..n {
                c.handle(Event::MapClicked(LatLng::new(i as f64, 0.0)));
            }
            c
        }

        #[test]
        fn test_resolve_marker_by_index_and_prefix() {
            let c = state_with_markers(2);
            let state = c.state();
            assert_eq!(resolve_marker(state, "2"), Some(state.markers[1].id));
            assert_eq!(resolve_marker(state, "0"), None);
            assert_eq!(resolve_marker(state, "3"), None);

            let id = state.markers[0].id.to_string();
            assert_eq!(resolve_marker(state, &id), Some(state.markers[0].id));
            assert_eq!(resolve_marker(state, "not-an-id"), None);
        }

        #[test]
        fn test_latest_suggestion_uses_last_reply() {
            let mut c = Coordinator::default();
            c.handle(Event::ChatSubmitted("one".to_string()));
            c.handle(Event::ChatCompleted(Ok(ChatResponse {
                text: "first".to_string(),
                metadata: None,
                suggestions: Some(vec![Suggestion::new("Old", "https://old.example")]),
            })));
            c.handle(Event::ChatSubmitted("two".to_string()));
            c.handle(Event::ChatCompleted(Ok(ChatResponse {
                text: "second".to_string(),
                metadata: None,
                suggestions: Some(vec![
                    Suggestion::new("A", "https://a.example"),
                    Suggestion::new("B", "zoom_in"),
                ]),
            })));

            let state = c.state();
            assert_eq!(latest_suggestion(state, 2), Some(Suggestion::new("B", "zoom_in")));
            assert_eq!(latest_suggestion(state, 3), None);
            assert_eq!(latest_suggestion(state, 0), None);
        }

        #[test]
        fn test_describe_silent_events() {
            assert!(describe(&Event::AreaDeleted).is_some());
            assert!(describe(&Event::ChatSubmitted("hi".to_string())).is_none());
        }
    }
}

// One-shot search handler
pub mod search {
    //! Resolve a single search query and print the resulting map center.

    use super::*;
    use crate::geo::tile_for;
    use serde_json::json;

    /// Run one search against the configured backend
    ///
    /// Coordinate input is resolved locally; place names go through the
    /// geocoding endpoint.
    ///
    /// # Errors
    ///
    /// Returns the same message the interactive session would show, e.g.
    /// `Invalid coordinates. ...` or `Geocoding failed: ...`.
    pub async fn run_search(config: Config, query: String, json_output: bool) -> Result<()> {
        tracing::info!("Resolving search query: {}", query);

        let mut runtime = build_runtime(&config, None, None)?;
        runtime.dispatch(Event::SearchSubmitted(query.clone()));
        runtime.settle().await;

        let state = runtime.state();
        if let Some(error) = &state.error {
            return Err(anyhow::anyhow!(error.clone()));
        }

        let location = state.location;
        let zoom = state.map_view.zoom;
        let (x, y) = tile_for(location, zoom);
        let tile_url = state.map_style.tile_url(zoom, x, y);

        if json_output {
            let body = json!({
                "query": query,
                "lat": location.lat,
                "lng": location.lng,
                "zoom": zoom,
                "tile": tile_url,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        } else {
            println!("{} (Zoom: {})", location, zoom);
            println!("Tile: {}", tile_url);
        }
        Ok(())
    }
}
