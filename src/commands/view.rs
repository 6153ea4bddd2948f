//! Terminal rendering of the coordinator state
//!
//! Stands in for the chat panel and the map widget. The view remembers what
//! it has already shown so each refresh prints only what changed.

use crate::coordinator::{AppState, ChatMessage, Event, Sender};
use crate::geo::tile_for;
use crate::runtime::Runtime;
use colored::Colorize;

/// Something new to show after a refresh
#[derive(Debug, Clone, PartialEq)]
pub enum ViewUpdate {
    Reply(ChatMessage),
    Error(String),
}

/// Current view as `lat, lng (Zoom: z)`
pub fn format_view(state: &AppState) -> String {
    format!("{} (Zoom: {})", state.map_view.center, state.map_view.zoom)
}

/// Tile URL of the tile under the view center in the active style
pub fn center_tile_url(state: &AppState) -> String {
    let zoom = state.map_view.zoom;
    let (x, y) = tile_for(state.map_view.center, zoom);
    state.map_style.tile_url(zoom, x, y)
}

/// Incremental printer for one interactive session
#[derive(Debug)]
pub struct TerminalView {
    shown_messages: usize,
    location_revision: u64,
    error_revision: u64,
}

impl TerminalView {
    pub fn new(state: &AppState) -> Self {
        Self {
            shown_messages: state.messages.len(),
            location_revision: state.location_revision,
            error_revision: state.error_revision,
        }
    }

    /// Wait for pending calls, let the map follow the requested location,
    /// then print whatever is new
    pub async fn refresh(&mut self, runtime: &mut Runtime) {
        if runtime.in_flight() > 0 {
            println!("{}", "...".dimmed());
        }
        runtime.settle().await;

        if let Some(event) = self.follow_location(runtime.state()) {
            runtime.dispatch(event);
            println!(
                "{} {}",
                "Map centered on".cyan(),
                format_view(runtime.state())
            );
        }

        for update in self.updates(runtime.state()) {
            match update {
                ViewUpdate::Reply(message) => print_reply(&message),
                ViewUpdate::Error(error) => eprintln!("{}", format!("Error: {}", error).red()),
            }
        }
    }

    /// Map settle event for a newly requested location
    ///
    /// Every new request recenters, including a repeat of the previous one.
    /// The widget keeps its zoom when it recenters.
    pub fn follow_location(&mut self, state: &AppState) -> Option<Event> {
        if state.location_revision == self.location_revision {
            return None;
        }
        self.location_revision = state.location_revision;
        Some(Event::MapMoved {
            center: state.location,
            zoom: state.map_view.zoom,
        })
    }

    /// Assistant replies and errors not yet shown
    pub fn updates(&mut self, state: &AppState) -> Vec<ViewUpdate> {
        let mut updates: Vec<ViewUpdate> = state
            .messages
            .iter()
            .skip(self.shown_messages)
            .filter(|m| m.sender == Sender::Assistant)
            .cloned()
            .map(ViewUpdate::Reply)
            .collect();
        self.shown_messages = state.messages.len();

        if state.error_revision != self.error_revision {
            if let Some(error) = &state.error {
                updates.push(ViewUpdate::Error(error.clone()));
            }
            self.error_revision = state.error_revision;
        }
        updates
    }

    pub fn print_status(&self, state: &AppState) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                     MapChat Session Status                   ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!(
            "Model:             {} ({})",
            state.model.colored_tag(),
            state.model.label()
        );
        println!("Current View:      {}", format_view(state));
        println!("Center Tile:       {}", center_tile_url(state));
        println!(
            "Map Style:         {} ({})",
            state.map_style,
            state.map_style.attribution()
        );
        println!("Markers:           {}", state.markers.len());
        match &state.selected_area {
            Some(area) => println!(
                "Selected Area:     {} to {}",
                area.bounds.south_west, area.bounds.north_east
            ),
            None => println!("Selected Area:     none"),
        }
        println!(
            "Session:           {}",
            if state.session.is_some() {
                "established".green()
            } else {
                "none".yellow()
            }
        );
        if let Some(visualization) = &state.visualization {
            println!("Overlay:           {}", visualization.kind());
        }
        println!("Conversation Size: {} messages", state.messages.len());
        if let Some(error) = &state.error {
            println!("Error:             {}", error.red());
        }
        println!();
    }

    pub fn print_markers(&self, state: &AppState) {
        if state.markers.is_empty() {
            println!("No markers. Use /click <lat> <lng> to add one.");
            return;
        }
        for (i, marker) in state.markers.iter().enumerate() {
            println!(
                "{:>3}. {}  {}  {}",
                i + 1,
                marker.position,
                marker.id.to_string().dimmed(),
                marker.created_at.format("%H:%M:%S")
            );
        }
    }
}

fn print_reply(message: &ChatMessage) {
    println!("\n{}\n", message.text);
    if let Some(visualization) = message.visualization() {
        println!("{} {}", "Overlay:".magenta(), visualization.kind());
    }
    for (i, suggestion) in message.suggestions.iter().enumerate() {
        println!(
            "  {} {} {}",
            format!("[{}]", i + 1).cyan(),
            suggestion.label,
            suggestion.action.dimmed()
        );
    }
    if !message.suggestions.is_empty() {
        println!("  Use /suggest <n> to follow one\n");
    }
}
