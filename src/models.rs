//! Chat model selector
//!
//! The backend decides what each identifier maps to; the client only picks
//! one of a fixed set and sends its wire name with every chat request.

use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Model identifiers offered to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChatModel {
    #[default]
    #[serde(rename = "gpt-4")]
    Gpt4,
    #[serde(rename = "gpt-3")]
    Gpt3,
    #[serde(rename = "claude-2")]
    Claude2,
    // Spelling matches the identifier the backend expects.
    #[serde(rename = "gemmni")]
    Gemini,
    #[serde(rename = "deepseek")]
    Deepseek,
}

impl ChatModel {
    /// All selectable models in menu order
    pub const ALL: [ChatModel; 5] = [
        Self::Gpt4,
        Self::Gpt3,
        Self::Claude2,
        Self::Gemini,
        Self::Deepseek,
    ];

    /// Identifier sent to the backend
    pub fn id(&self) -> &'static str {
        match self {
            Self::Gpt4 => "gpt-4",
            Self::Gpt3 => "gpt-3",
            Self::Claude2 => "claude-2",
            Self::Gemini => "gemmni",
            Self::Deepseek => "deepseek",
        }
    }

    /// Human-friendly label for menus
    pub fn label(&self) -> &'static str {
        match self {
            Self::Gpt4 => "GPT-4",
            Self::Gpt3 => "GPT-3",
            Self::Claude2 => "Claude 2",
            Self::Gemini => "Gemmni",
            Self::Deepseek => "Deepseek",
        }
    }

    /// Parse a model from its identifier or label, case-insensitively
    ///
    /// # Examples
    ///
    /// ```
    /// use mapchat::models::ChatModel;
    ///
    /// assert_eq!(ChatModel::parse_str("claude-2").unwrap(), ChatModel::Claude2);
    /// assert_eq!(ChatModel::parse_str("GPT-4").unwrap(), ChatModel::Gpt4);
    /// assert!(ChatModel::parse_str("llama").is_err());
    /// ```
    pub fn parse_str(s: &str) -> Result<Self, String> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.id() == wanted || m.label().to_lowercase() == wanted)
            .ok_or_else(|| {
                format!(
                    "Unknown model: {}. Must be one of: {}",
                    s.trim(),
                    Self::ALL.map(|m| m.id()).join(", ")
                )
            })
    }

    /// Upper-cased tag used in the interactive prompt
    pub fn colored_tag(&self) -> String {
        format!("[{}]", self.id().to_uppercase().blue())
    }
}

impl fmt::Display for ChatModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
