//! Listing of selectable chat models and map styles

use crate::map_style::MapStyle;
use crate::models::ChatModel;
use colored::Colorize;

/// Print the chat models the backend accepts
pub fn list_models(current: ChatModel) {
    println!("\nAvailable models:\n");
    for model in ChatModel::ALL {
        let marker = if model == current { "*".green() } else { " ".normal() };
        println!("  {} {:<10} {}", marker, model.id(), model.label());
    }
    println!();
}

/// Print the map styles with their tile sources
pub fn list_styles(current: MapStyle) {
    println!("\nAvailable map styles:\n");
    for style in MapStyle::ALL {
        let marker = if style == current { "*".green() } else { " ".normal() };
        println!("  {} {:<14} {}", marker, style.name(), style.attribution());
        println!("    {}", style.url_template().dimmed());
    }
    println!();
}
