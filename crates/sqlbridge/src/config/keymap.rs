//! Keymap and action definitions for the editor page.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;
use tracing::warn;

use super::schema::KeymapConfig;

/// Commands a key binding can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Show completions for the word before the cursor
    Autocomplete,
    /// Submit the form owning the edited field
    SubmitForm,
    /// Leave without submitting
    Quit,
}

impl Action {
    pub fn description(&self) -> &'static str {
        match self {
            Action::Autocomplete => "Show completions",
            Action::SubmitForm => "Submit the form",
            Action::Quit => "Quit without submitting",
        }
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept "autocomplete", "submit-form", "Submit_Form"
        let normalized = s.trim().to_lowercase().replace('-', "_");

        match normalized.as_str() {
            "autocomplete" => Ok(Action::Autocomplete),
            "submit_form" | "submit" => Ok(Action::SubmitForm),
            "quit" => Ok(Action::Quit),
            _ => Err(format!("Unknown action: {}", s)),
        }
    }
}

/// Represents a key binding (key + modifiers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Parse a key binding from a string like "ctrl+space", "Ctrl-Space", "f5"
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        let (head, key_part) = split_binding(&s);
        if key_part.is_empty() {
            return None;
        }

        let mut modifiers = KeyModifiers::NONE;
        if !head.is_empty() {
            for part in head.split(['+', '-']) {
                match part {
                    "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
                    "alt" | "meta" => modifiers |= KeyModifiers::ALT,
                    "shift" => modifiers |= KeyModifiers::SHIFT,
                    _ => return None,
                }
            }
        }

        let code = match key_part {
            "enter" | "return" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "backspace" | "bs" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "esc" | "escape" => KeyCode::Esc,
            "space" => KeyCode::Char(' '),
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            f if f.len() > 1 && f.starts_with('f') => match f[1..].parse::<u8>() {
                Ok(n @ 1..=12) => KeyCode::F(n),
                _ => return None,
            },
            c if c.chars().count() == 1 => KeyCode::Char(c.chars().next()?),
            _ => return None,
        };

        Some(Self { code, modifiers })
    }
}

/// Split "ctrl+shift+a" into ("ctrl+shift", "a"). Both `+` and `-` separate,
/// and a separator in key position ("ctrl+-", "-") is the key itself.
fn split_binding(s: &str) -> (&str, &str) {
    let is_sep = |b: u8| b == b'+' || b == b'-';
    let bytes = s.as_bytes();
    let n = bytes.len();

    if n <= 1 {
        return ("", s);
    }
    if is_sep(bytes[n - 1]) && is_sep(bytes[n - 2]) {
        return (&s[..n - 2], &s[n - 1..]);
    }
    match s.rfind(['+', '-']) {
        Some(i) => (&s[..i], &s[i + 1..]),
        None => ("", s),
    }
}

impl std::fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts: Vec<String> = Vec::new();

        if self.modifiers.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            parts.push("Alt".to_string());
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".to_string());
        }

        let key = match self.code {
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::Backspace => "Backspace".to_string(),
            KeyCode::Delete => "Delete".to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Up => "↑".to_string(),
            KeyCode::Down => "↓".to_string(),
            KeyCode::Left => "←".to_string(),
            KeyCode::Right => "→".to_string(),
            KeyCode::Home => "Home".to_string(),
            KeyCode::End => "End".to_string(),
            KeyCode::PageUp => "PgUp".to_string(),
            KeyCode::PageDown => "PgDn".to_string(),
            KeyCode::F(n) => format!("F{}", n),
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(c) => c.to_uppercase().to_string(),
            _ => "?".to_string(),
        };
        parts.push(key);

        write!(f, "{}", parts.join("+"))
    }
}

impl From<KeyEvent> for KeyBinding {
    fn from(event: KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event.modifiers,
        }
    }
}

/// A keymap is a collection of key bindings mapped to actions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Keymap {
    bindings: HashMap<KeyBinding, Action>,
}

impl Keymap {
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    pub fn bind(&mut self, key: KeyBinding, action: Action) {
        self.bindings.insert(key, action);
    }

    pub fn get(&self, key: &KeyBinding) -> Option<&Action> {
        self.bindings.get(key)
    }

    /// Look up an action for a KeyEvent
    pub fn get_action(&self, event: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from(*event);
        self.bindings.get(&binding).copied()
    }

    /// First key bound to `action`, for hints in the status line.
    pub fn key_for(&self, action: Action) -> Option<KeyBinding> {
        let mut keys: Vec<KeyBinding> = self
            .bindings
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|(k, _)| *k)
            .collect();
        // HashMap order is arbitrary; keep the hint stable.
        keys.sort_by_key(|k| k.to_string());
        keys.into_iter().next()
    }

    /// Default bindings: Ctrl-Space completes, Ctrl-S submits, Ctrl-Q quits.
    pub fn default_editor_keymap() -> Self {
        let mut km = Self::new();

        km.bind(
            KeyBinding::new(KeyCode::Char(' '), KeyModifiers::CONTROL),
            Action::Autocomplete,
        );
        km.bind(
            KeyBinding::new(KeyCode::Char('s'), KeyModifiers::CONTROL),
            Action::SubmitForm,
        );
        km.bind(
            KeyBinding::new(KeyCode::Char('q'), KeyModifiers::CONTROL),
            Action::Quit,
        );
        km.bind(
            KeyBinding::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Action::Quit,
        );

        km
    }

    /// Default bindings overlaid with the user's custom ones.
    ///
    /// Entries whose key or action cannot be parsed are skipped with a warning.
    pub fn from_config(config: &KeymapConfig) -> Self {
        let mut km = Self::default_editor_keymap();

        for custom in &config.editor {
            let Some(key) = KeyBinding::parse(&custom.key) else {
                warn!(key = %custom.key, "ignoring binding with unparseable key");
                continue;
            };
            match custom.action.parse::<Action>() {
                Ok(action) => km.bind(key, action),
                Err(e) => warn!(key = %custom.key, "ignoring binding: {}", e),
            }
        }

        km
    }
}
