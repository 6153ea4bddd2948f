//! Special commands parser for the interactive map chat
//!
//! The terminal has no search box, map widget or drawing toolbar, so each of
//! those interactions is a slash command. Commands are case-insensitive;
//! their arguments keep their case. Anything that is not a command is a chat
//! message.

use crate::config::MAX_ZOOM;
use crate::error::MapChatError;
use crate::geo::{Bounds, LatLng};
use crate::map_style::MapStyle;
use crate::models::ChatModel;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

impl From<CommandError> for MapChatError {
    fn from(e: CommandError) -> Self {
        MapChatError::Command(e.to_string())
    }
}

/// Commands entered at the interactive prompt
#[derive(Debug, Clone, PartialEq)]
pub enum SpecialCommand {
    /// Submit text to the location search
    Search(String),
    /// Center on the current position
    Here,
    /// Drop a marker, as a map click would
    Click(LatLng),
    /// Pan (and optionally zoom) the map
    Move { center: LatLng, zoom: Option<u8> },
    ListMarkers,
    /// Remove a marker by list number or id
    Unmark(String),
    /// Draw the rectangular selection
    Area(Bounds),
    ClearArea,
    Style(MapStyle),
    Model(ChatModel),
    /// Activate the n-th suggestion (1-based) of the latest reply
    Suggest(usize),
    ShowStatus,
    Dismiss,
    Help,
    Exit,
    /// Not a command; send as chat
    None,
}

fn missing(command: &str, usage: &str) -> CommandError {
    CommandError::MissingArgument {
        command: command.to_string(),
        usage: usage.to_string(),
    }
}

fn unsupported(command: &str, arg: &str) -> CommandError {
    CommandError::UnsupportedArgument {
        command: command.to_string(),
        arg: arg.to_string(),
    }
}

fn parse_numbers(command: &str, args: &str) -> Result<Vec<f64>, CommandError> {
    args.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<f64>().map_err(|_| unsupported(command, s)))
        .collect()
}

fn parse_point(command: &str, lat: f64, lng: f64) -> Result<LatLng, CommandError> {
    let point = LatLng::new(lat, lng);
    if point.in_bounds() {
        Ok(point)
    } else {
        Err(unsupported(command, &format!("{}, {}", lat, lng)))
    }
}

fn parse_zoom(command: &str, value: f64) -> Result<u8, CommandError> {
    if value.fract() == 0.0 && (0.0..=f64::from(MAX_ZOOM)).contains(&value) {
        Ok(value as u8)
    } else {
        Err(unsupported(command, &value.to_string()))
    }
}

/// Parse one line of user input
///
/// # Examples
///
/// ```
/// use mapchat::commands::special_commands::{parse_special_command, SpecialCommand};
/// use mapchat::map_style::MapStyle;
///
/// assert_eq!(
///     parse_special_command("/style satellite").unwrap(),
///     SpecialCommand::Style(MapStyle::Satellite)
/// );
/// assert_eq!(
///     parse_special_command("what is near here?").unwrap(),
///     SpecialCommand::None
/// );
/// assert!(parse_special_command("/teleport").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if lower == "exit" || lower == "quit" {
        return Ok(SpecialCommand::Exit);
    }
    if !trimmed.starts_with('/') {
        return Ok(SpecialCommand::None);
    }

    let (name, args) = match trimmed.split_once(char::is_whitespace) {
        Some((name, args)) => (name.to_lowercase(), args.trim()),
        None => (lower.clone(), ""),
    };

    match name.as_str() {
        "/search" | "/find" => {
            if args.is_empty() {
                return Err(missing("/search", "/search <place or lat, lng>"));
            }
            Ok(SpecialCommand::Search(args.to_string()))
        }
        "/here" | "/locate" => Ok(SpecialCommand::Here),

        "/click" | "/mark" => {
            let usage = "/click <lat> <lng>";
            match parse_numbers("/click", args)?.as_slice() {
                [] => Err(missing("/click", usage)),
                [lat, lng] => Ok(SpecialCommand::Click(parse_point("/click", *lat, *lng)?)),
                _ => Err(unsupported("/click", args)),
            }
        }
        "/move" => {
            let usage = "/move <lat> <lng> [zoom]";
            match parse_numbers("/move", args)?.as_slice() {
                [] => Err(missing("/move", usage)),
                [lat, lng] => Ok(SpecialCommand::Move {
                    center: parse_point("/move", *lat, *lng)?,
                    zoom: None,
                }),
                [lat, lng, zoom] => Ok(SpecialCommand::Move {
                    center: parse_point("/move", *lat, *lng)?,
                    zoom: Some(parse_zoom("/move", *zoom)?),
                }),
                _ => Err(unsupported("/move", args)),
            }
        }

        "/markers" => Ok(SpecialCommand::ListMarkers),
        "/unmark" => {
            if args.is_empty() {
                return Err(missing("/unmark", "/unmark <number|id>"));
            }
            Ok(SpecialCommand::Unmark(args.to_string()))
        }

        "/area" => {
            let usage = "/area <south> <west> <north> <east>";
            match parse_numbers("/area", args)?.as_slice() {
                [] => Err(missing("/area", usage)),
                [south, west, north, east] => {
                    let a = parse_point("/area", *south, *west)?;
                    let b = parse_point("/area", *north, *east)?;
                    Ok(SpecialCommand::Area(Bounds::from_corners(a, b)))
                }
                _ => Err(unsupported("/area", args)),
            }
        }
        "/clear-area" | "/clear" => Ok(SpecialCommand::ClearArea),

        "/style" => {
            if args.is_empty() {
                return Err(missing("/style", "/style <openstreetmap|satellite|terrain>"));
            }
            MapStyle::parse_str(args)
                .map(SpecialCommand::Style)
                .map_err(|_| unsupported("/style", args))
        }
        "/model" => {
            if args.is_empty() {
                return Err(missing("/model", "/model <gpt-4|gpt-3|claude-2|gemmni|deepseek>"));
            }
            ChatModel::parse_str(args)
                .map(SpecialCommand::Model)
                .map_err(|_| unsupported("/model", args))
        }

        "/suggest" => {
            if args.is_empty() {
                return Err(missing("/suggest", "/suggest <number>"));
            }
            match args.parse::<usize>() {
                Ok(n) if n > 0 => Ok(SpecialCommand::Suggest(n)),
                _ => Err(unsupported("/suggest", args)),
            }
        }

        "/status" => Ok(SpecialCommand::ShowStatus),
        "/dismiss" => Ok(SpecialCommand::Dismiss),
        "/help" | "/?" => Ok(SpecialCommand::Help),
        "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Print the command reference
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Map Chat
=========================================

LOCATION:
  /search <text>        - Search a place name or "lat, lng"
  /here                 - Center on your current position
  /move <lat> <lng> [z] - Pan the map (and optionally zoom)

MAP:
  /click <lat> <lng>    - Drop a marker
  /markers              - List markers
  /unmark <n|id>        - Remove a marker by number or id
  /area <s> <w> <n> <e> - Select a rectangular area
  /clear-area           - Remove the selected area
  /style <name>         - openstreetmap, satellite or terrain

CHAT:
  /model <name>         - gpt-4, gpt-3, claude-2, gemmni or deepseek
  /suggest <n>          - Follow suggestion n of the latest reply

SESSION:
  /status               - Show map view, model and selection
  /dismiss              - Clear the current error
  /help                 - Show this help
  exit | quit           - Leave the session

Any other text is sent to the assistant together with the current view.
"#
    );
}
