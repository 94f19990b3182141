//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Editor settings
    pub editor: EditorConfig,
    /// Completion settings
    pub completion: CompletionConfig,
    /// Keymap customizations
    pub keymap: KeymapConfig,
}

/// Language mode of the editor, named by MIME type like `text/x-sql`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EditorMode {
    #[default]
    #[serde(rename = "text/x-sql")]
    Sql,
    #[serde(rename = "text/plain")]
    PlainText,
}

impl EditorMode {
    pub fn label(&self) -> &'static str {
        match self {
            EditorMode::Sql => "SQL",
            EditorMode::PlainText => "Text",
        }
    }
}

/// Editor-related settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Language mode
    pub mode: EditorMode,
    /// Show line numbers in the gutter
    pub line_numbers: bool,
    /// Tab size in spaces
    pub tab_size: u8,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            mode: EditorMode::Sql,
            line_numbers: true,
            tab_size: 4,
        }
    }
}

/// Completion-related settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompletionConfig {
    /// Offer SQL keywords after vocabulary candidates (SQL mode only)
    pub keywords: bool,
    /// Maximum number of rows in the completion popup
    pub max_visible: usize,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            keywords: true,
            max_visible: 8,
        }
    }
}

/// Keymap customization settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KeymapConfig {
    /// Custom keybindings for the editor page
    pub editor: Vec<CustomKeyBinding>,
}

/// A custom keybinding definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomKeyBinding {
    /// Key combination (e.g., "ctrl+space", "Ctrl-Space", "f5")
    pub key: String,
    /// Action to perform
    pub action: String,
    /// Optional description for help display
    pub description: Option<String>,
}
