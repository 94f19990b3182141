use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::style::{Color, Modifier, Style};
use tui_textarea::{CursorMove, TextArea};

use super::completion::{get_word_before_cursor, CompletionPopup, HintOptions, WordAtCursor};
use crate::config::{Action, Config, EditorMode, Keymap};
use crate::vocabulary::Vocabulary;

/// What caused a content change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// Whole content replaced programmatically
    SetValue,
    /// Typed by the user
    Input,
    Paste,
    Delete,
    /// A completion was accepted
    Complete,
    /// Any other key-driven edit (undo, kill line, ...)
    Other,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChangeEvent {
    pub origin: ChangeOrigin,
    /// Text inserted by this change, empty for pure deletions
    pub inserted: String,
}

pub type EditorListener = Box<dyn FnMut(&mut EditorSurface, &ChangeEvent)>;

/// How a completion request was made.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HintTrigger {
    /// Raised while typing: only opens the popup, never inserts, and needs
    /// something to complete.
    Auto,
    /// Requested by shortcut: a single match is inserted right away and an
    /// empty prefix lists every candidate.
    Explicit,
}

/// Options an editor surface is created with.
#[derive(Clone, Debug)]
pub struct EditorOptions {
    pub mode: EditorMode,
    pub line_numbers: bool,
    pub tab_size: u8,
    pub keymap: Keymap,
    pub hint: HintOptions,
}

impl EditorOptions {
    pub fn from_config(config: &Config, vocabulary: Vocabulary) -> Self {
        Self {
            mode: config.editor.mode,
            line_numbers: config.editor.line_numbers,
            tab_size: config.editor.tab_size,
            keymap: Keymap::from_config(&config.keymap),
            hint: HintOptions {
                vocabulary,
                keywords: config.completion.keywords && config.editor.mode == EditorMode::Sql,
            },
        }
    }
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self::from_config(&Config::default(), Vocabulary::new())
    }
}

#[derive(Clone, Copy)]
enum ListenerSet {
    Change,
    InputRead,
}

/// An editable text buffer with change notifications and completion.
pub struct EditorSurface {
    pub textarea: TextArea<'static>,
    pub completion: CompletionPopup,
    options: EditorOptions,
    change_listeners: Vec<EditorListener>,
    input_read_listeners: Vec<EditorListener>,
}

impl EditorSurface {
    /// Create a surface showing `value`. Seeding does not notify anyone.
    pub fn new(value: &str, options: EditorOptions) -> Self {
        let textarea = build_textarea(value, &options);
        Self {
            textarea,
            completion: CompletionPopup::new(),
            options,
            change_listeners: Vec::new(),
            input_read_listeners: Vec::new(),
        }
    }

    pub fn options(&self) -> &EditorOptions {
        &self.options
    }

    pub fn mode(&self) -> EditorMode {
        self.options.mode
    }

    pub fn keymap(&self) -> &Keymap {
        &self.options.keymap
    }

    pub fn text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    /// Register a listener called after every content change.
    pub fn on_change(&mut self, listener: impl FnMut(&mut EditorSurface, &ChangeEvent) + 'static) {
        self.change_listeners.push(Box::new(listener));
    }

    /// Register a listener called after the user inserted text.
    pub fn on_input_read(
        &mut self,
        listener: impl FnMut(&mut EditorSurface, &ChangeEvent) + 'static,
    ) {
        self.input_read_listeners.push(Box::new(listener));
    }

    /// Replace the whole content. Change listeners see `ChangeOrigin::SetValue`;
    /// input-read listeners are not called.
    pub fn set_text(&mut self, s: &str) {
        self.replace_silently(s);
        self.dispatch(
            ListenerSet::Change,
            ChangeEvent {
                origin: ChangeOrigin::SetValue,
                inserted: s.to_string(),
            },
        );
    }

    /// Replace the whole content without notifying any listener.
    pub fn replace_silently(&mut self, s: &str) {
        self.textarea = build_textarea(s, &self.options);
        self.completion.close();
    }

    /// Insert `s` at the cursor as if typed.
    pub fn insert_str(&mut self, s: &str) {
        self.insert_with_origin(s, ChangeOrigin::Input);
    }

    /// Insert pasted text at the cursor. Terminals deliver pasted line
    /// breaks as `\r` or `\r\n`, so both become `\n`.
    pub fn paste(&mut self, s: &str) {
        let normalized = s.replace("\r\n", "\n").replace('\r', "\n");
        self.insert_with_origin(&normalized, ChangeOrigin::Paste);
    }

    fn insert_with_origin(&mut self, s: &str, origin: ChangeOrigin) {
        if s.is_empty() || !self.textarea.insert_str(s) {
            return;
        }
        let event = ChangeEvent {
            origin,
            inserted: s.to_string(),
        };
        self.dispatch(ListenerSet::Change, event.clone());
        self.dispatch(ListenerSet::InputRead, event);
        if self.completion.active {
            self.refresh_completion();
        }
    }

    pub fn move_cursor_to_end(&mut self) {
        self.textarea.move_cursor(CursorMove::Bottom);
        self.textarea.move_cursor(CursorMove::End);
    }

    /// Handle a key press.
    ///
    /// Keys bound to actions the editor does not run itself are returned to
    /// the caller.
    pub fn input(&mut self, key: KeyEvent) -> Option<Action> {
        if self.completion.active && self.handle_completion_key(&key) {
            return None;
        }

        if let Some(action) = self.options.keymap.get_action(&key) {
            return match action {
                Action::Autocomplete => {
                    self.show_hint(HintTrigger::Explicit);
                    None
                }
                other => Some(other),
            };
        }

        let origin = origin_for_key(&key);
        let typed = typed_char(&key);
        if !self.textarea.input(key) {
            return None;
        }

        self.dispatch(
            ListenerSet::Change,
            ChangeEvent {
                origin,
                inserted: typed.map(String::from).unwrap_or_default(),
            },
        );
        if let Some(c) = typed {
            self.dispatch(
                ListenerSet::InputRead,
                ChangeEvent {
                    origin: ChangeOrigin::Input,
                    inserted: c.to_string(),
                },
            );
        }
        if self.completion.active {
            self.refresh_completion();
        }
        None
    }

    /// Keys the open popup consumes. Returns false when the key should still
    /// reach the text buffer.
    fn handle_completion_key(&mut self, key: &KeyEvent) -> bool {
        match (key.code, key.modifiers) {
            (KeyCode::Tab, KeyModifiers::NONE) | (KeyCode::Enter, KeyModifiers::NONE) => {
                self.pick_completion();
                true
            }
            (KeyCode::Down, KeyModifiers::NONE) | (KeyCode::Char('n'), KeyModifiers::CONTROL) => {
                self.completion.select_next();
                true
            }
            (KeyCode::Up, KeyModifiers::NONE) | (KeyCode::Char('p'), KeyModifiers::CONTROL) => {
                self.completion.select_prev();
                true
            }
            (KeyCode::Esc, _) => {
                self.completion.close();
                true
            }
            // Keep typing the word, the filter follows
            (KeyCode::Char(c), m)
                if is_word_char(c) && !m.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                false
            }
            (KeyCode::Backspace, KeyModifiers::NONE) => false,
            _ => {
                self.completion.close();
                false
            }
        }
    }

    fn word_at_cursor(&self) -> WordAtCursor {
        let (row, col) = self.textarea.cursor();
        let line = self
            .textarea
            .lines()
            .get(row)
            .map(String::as_str)
            .unwrap_or("");
        get_word_before_cursor(line, col)
    }

    /// Open the completion popup for the word before the cursor.
    pub fn show_hint(&mut self, trigger: HintTrigger) {
        let word = self.word_at_cursor();
        if trigger == HintTrigger::Auto && word.prefix.is_empty() && word.qualifier.is_none() {
            self.completion.close();
            return;
        }

        let items = self.options.hint.candidates(&word);
        self.completion.open(items, word.prefix, word.start_col);

        if trigger == HintTrigger::Explicit
            && self.completion.active
            && self.completion.match_count() == 1
        {
            self.pick_completion();
        }
    }

    /// Replace the typed prefix with the selected completion.
    pub fn pick_completion(&mut self) {
        let Some(item) = self.completion.selected_item() else {
            return;
        };
        let label = item.label.clone();
        let start_col = self.completion.start_col;
        let (_, col) = self.textarea.cursor();

        for _ in start_col..col {
            self.textarea.delete_char();
        }
        self.textarea.insert_str(&label);
        self.completion.close();

        self.dispatch(
            ListenerSet::Change,
            ChangeEvent {
                origin: ChangeOrigin::Complete,
                inserted: label,
            },
        );
    }

    fn refresh_completion(&mut self) {
        let word = self.word_at_cursor();
        let lost_word = word.prefix.is_empty() && word.qualifier.is_none();
        if lost_word || word.start_col != self.completion.start_col {
            self.completion.close();
        } else {
            self.completion.update_prefix(word.prefix);
        }
    }

    fn listeners_mut(&mut self, set: ListenerSet) -> &mut Vec<EditorListener> {
        match set {
            ListenerSet::Change => &mut self.change_listeners,
            ListenerSet::InputRead => &mut self.input_read_listeners,
        }
    }

    fn dispatch(&mut self, set: ListenerSet, event: ChangeEvent) {
        let mut listeners = std::mem::take(self.listeners_mut(set));
        for listener in listeners.iter_mut() {
            listener(self, &event);
        }
        // Listeners registered during dispatch go after the existing ones.
        let added = std::mem::replace(self.listeners_mut(set), listeners);
        self.listeners_mut(set).extend(added);
    }
}

/// Lines split on `\n` only, so `text()` gives back exactly what was seeded.
fn build_textarea(text: &str, options: &EditorOptions) -> TextArea<'static> {
    let lines: Vec<String> = text.split('\n').map(str::to_string).collect();

    let mut textarea = TextArea::new(lines);
    textarea.set_cursor_line_style(Style::default().add_modifier(Modifier::UNDERLINED));
    textarea.set_tab_length(options.tab_size);
    if options.line_numbers {
        textarea.set_line_number_style(Style::default().fg(Color::DarkGray));
    } else {
        textarea.remove_line_number();
    }
    textarea
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn plain(key: &KeyEvent) -> bool {
    !key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
}

/// The character a key press types, if it types one.
fn typed_char(key: &KeyEvent) -> Option<char> {
    match key.code {
        KeyCode::Char(c) if plain(key) => Some(c),
        _ => None,
    }
}

fn origin_for_key(key: &KeyEvent) -> ChangeOrigin {
    match key.code {
        KeyCode::Char(_) | KeyCode::Enter | KeyCode::Tab if plain(key) => ChangeOrigin::Input,
        KeyCode::Backspace | KeyCode::Delete => ChangeOrigin::Delete,
        _ => ChangeOrigin::Other,
    }
}

/// Shared handle to an editor surface mounted at an element.
#[derive(Clone)]
pub struct EditorHandle {
    mount_id: String,
    surface: Rc<RefCell<EditorSurface>>,
}

impl EditorHandle {
    pub fn new(mount_id: &str, surface: EditorSurface) -> Self {
        Self {
            mount_id: mount_id.to_string(),
            surface: Rc::new(RefCell::new(surface)),
        }
    }

    pub fn mount_id(&self) -> &str {
        &self.mount_id
    }

    pub fn text(&self) -> String {
        self.surface.borrow().text()
    }

    pub fn set_text(&self, s: &str) {
        self.surface.borrow_mut().set_text(s);
    }

    pub fn replace_silently(&self, s: &str) {
        self.surface.borrow_mut().replace_silently(s);
    }

    pub fn insert_str(&self, s: &str) {
        self.surface.borrow_mut().insert_str(s);
    }

    pub fn paste(&self, s: &str) {
        self.surface.borrow_mut().paste(s);
    }

    pub fn input(&self, key: KeyEvent) -> Option<Action> {
        self.surface.borrow_mut().input(key)
    }

    pub fn borrow(&self) -> Ref<'_, EditorSurface> {
        self.surface.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, EditorSurface> {
        self.surface.borrow_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn options_with_vocab() -> EditorOptions {
        let vocabulary: Vocabulary = [
            ("users", vec!["id", "name"]),
            ("orders", vec!["id", "user_id"]),
        ]
        .into_iter()
        .collect();
        EditorOptions::from_config(&Config::default(), vocabulary)
    }

    fn recorder(surface: &mut EditorSurface) -> (Rc<RefCell<Vec<ChangeEvent>>>, Rc<Cell<usize>>) {
        let changes = Rc::new(RefCell::new(Vec::new()));
        let reads = Rc::new(Cell::new(0));
        let c = changes.clone();
        surface.on_change(move |_, event| c.borrow_mut().push(event.clone()));
        let r = reads.clone();
        surface.on_input_read(move |_, _| r.set(r.get() + 1));
        (changes, reads)
    }

    #[test]
    fn test_seed_content() {
        let surface = EditorSurface::new("SELECT 1\nFROM t", EditorOptions::default());
        assert_eq!(surface.text(), "SELECT 1\nFROM t");
        assert_eq!(surface.textarea.lines().len(), 2);
    }

    #[test]
    fn test_empty_seed() {
        let surface = EditorSurface::new("", EditorOptions::default());
        assert_eq!(surface.text(), "");
    }

    #[test]
    fn test_trailing_newline_survives() {
        let mut surface = EditorSurface::new("", EditorOptions::default());
        surface.replace_silently("SELECT 1\n");
        assert_eq!(surface.text(), "SELECT 1\n");
    }

    #[test]
    fn test_set_text_notifies_change_only() {
        let mut surface = EditorSurface::new("", EditorOptions::default());
        let (changes, reads) = recorder(&mut surface);

        surface.set_text("SELECT 2");

        assert_eq!(changes.borrow().len(), 1);
        assert_eq!(changes.borrow()[0].origin, ChangeOrigin::SetValue);
        assert_eq!(reads.get(), 0);
    }

    #[test]
    fn test_replace_silently_notifies_nobody() {
        let mut surface = EditorSurface::new("a", EditorOptions::default());
        let (changes, reads) = recorder(&mut surface);

        surface.replace_silently("b");

        assert_eq!(surface.text(), "b");
        assert!(changes.borrow().is_empty());
        assert_eq!(reads.get(), 0);
    }

    #[test]
    fn test_typing_notifies_change_and_input_read() {
        let mut surface = EditorSurface::new("", EditorOptions::default());
        let (changes, reads) = recorder(&mut surface);

        surface.input(key(KeyCode::Char('x')));

        assert_eq!(surface.text(), "x");
        assert_eq!(changes.borrow()[0].origin, ChangeOrigin::Input);
        assert_eq!(changes.borrow()[0].inserted, "x");
        assert_eq!(reads.get(), 1);
    }

    #[test]
    fn test_backspace_is_a_delete_without_input_read() {
        let mut surface = EditorSurface::new("", EditorOptions::default());
        surface.insert_str("ab");
        let (changes, reads) = recorder(&mut surface);

        surface.input(key(KeyCode::Backspace));

        assert_eq!(surface.text(), "a");
        assert_eq!(changes.borrow()[0].origin, ChangeOrigin::Delete);
        assert_eq!(reads.get(), 0);
    }

    #[test]
    fn test_cursor_motion_is_not_a_change() {
        let mut surface = EditorSurface::new("abc", EditorOptions::default());
        let (changes, _) = recorder(&mut surface);

        surface.input(key(KeyCode::Right));

        assert!(changes.borrow().is_empty());
    }

    #[test]
    fn test_seed_keeps_carriage_returns() {
        let crlf = EditorSurface::new("SELECT 1\r\nFROM t", EditorOptions::default());
        assert_eq!(crlf.text(), "SELECT 1\r\nFROM t");

        let lone_cr = EditorSurface::new("SELECT 1\rFROM t", EditorOptions::default());
        assert_eq!(lone_cr.text(), "SELECT 1\rFROM t");
    }

    #[test]
    fn test_paste_normalizes_line_endings() {
        let mut surface = EditorSurface::new("", EditorOptions::default());
        let (changes, reads) = recorder(&mut surface);

        surface.paste("a\r\nb\rc");

        assert_eq!(surface.text(), "a\nb\nc");
        assert_eq!(changes.borrow()[0].origin, ChangeOrigin::Paste);
        assert_eq!(reads.get(), 1);
    }

    #[test]
    fn test_unhandled_action_is_returned() {
        let mut surface = EditorSurface::new("", EditorOptions::default());
        assert_eq!(surface.input(ctrl('s')), Some(Action::SubmitForm));
        assert_eq!(surface.text(), "");
    }

    #[test]
    fn test_explicit_hint_inserts_single_match() {
        let mut surface = EditorSurface::new("", options_with_vocab());
        surface.insert_str("SELECT user_");

        surface.input(KeyEvent::new(KeyCode::Char(' '), KeyModifiers::CONTROL));

        assert_eq!(surface.text(), "SELECT user_id");
        assert!(!surface.completion.active);
    }

    #[test]
    fn test_auto_hint_never_inserts() {
        let mut surface = EditorSurface::new("", options_with_vocab());
        surface.insert_str("SELECT user_");

        surface.show_hint(HintTrigger::Auto);

        assert_eq!(surface.text(), "SELECT user_");
        assert!(surface.completion.active);
        assert_eq!(surface.completion.match_count(), 1);
    }

    #[test]
    fn test_auto_hint_needs_a_prefix() {
        let mut surface = EditorSurface::new("", options_with_vocab());
        surface.insert_str("SELECT ");

        surface.show_hint(HintTrigger::Auto);
        assert!(!surface.completion.active);

        surface.show_hint(HintTrigger::Explicit);
        assert!(surface.completion.active);
    }

    #[test]
    fn test_accept_completion_with_tab() {
        let mut surface = EditorSurface::new("", options_with_vocab());
        surface.insert_str("SELECT * FROM ord");
        surface.show_hint(HintTrigger::Auto);
        // "orders" comes before the ORDER keyword
        assert_eq!(surface.completion.selected_item().unwrap().label, "orders");

        let (changes, reads) = recorder(&mut surface);
        surface.input(key(KeyCode::Tab));

        assert_eq!(surface.text(), "SELECT * FROM orders");
        assert!(!surface.completion.active);
        assert_eq!(changes.borrow()[0].origin, ChangeOrigin::Complete);
        assert_eq!(reads.get(), 0);
    }

    #[test]
    fn test_popup_navigation_consumes_keys() {
        let mut surface = EditorSurface::new("", options_with_vocab());
        surface.insert_str("SELECT i");
        surface.show_hint(HintTrigger::Explicit);
        assert!(surface.completion.match_count() > 1);

        surface.input(key(KeyCode::Down));
        assert_eq!(surface.completion.selected, 1);
        surface.input(key(KeyCode::Up));
        assert_eq!(surface.completion.selected, 0);
        assert_eq!(surface.text(), "SELECT i");

        surface.input(key(KeyCode::Esc));
        assert!(!surface.completion.active);
    }

    #[test]
    fn test_typing_refilters_open_popup() {
        let mut surface = EditorSurface::new("", options_with_vocab());
        surface.insert_str("SELECT u");
        surface.show_hint(HintTrigger::Auto);
        let before = surface.completion.match_count();

        surface.input(key(KeyCode::Char('s')));
        surface.input(key(KeyCode::Char('e')));
        surface.input(key(KeyCode::Char('r')));
        surface.input(key(KeyCode::Char('_')));

        assert!(surface.completion.active);
        assert!(surface.completion.match_count() < before);
        assert_eq!(surface.completion.selected_item().unwrap().label, "user_id");
    }

    #[test]
    fn test_non_word_key_closes_popup() {
        let mut surface = EditorSurface::new("", options_with_vocab());
        surface.insert_str("SELECT u");
        surface.show_hint(HintTrigger::Auto);

        surface.input(key(KeyCode::Char(' ')));

        assert!(!surface.completion.active);
        assert_eq!(surface.text(), "SELECT u ");
    }

    #[test]
    fn test_backspace_past_word_start_closes_popup() {
        let mut surface = EditorSurface::new("", options_with_vocab());
        surface.insert_str("SELECT u");
        surface.show_hint(HintTrigger::Auto);

        surface.input(key(KeyCode::Backspace));

        assert!(!surface.completion.active);
    }

    #[test]
    fn test_qualified_completion() {
        let mut surface = EditorSurface::new("", options_with_vocab());
        surface.insert_str("SELECT users.");
        surface.show_hint(HintTrigger::Auto);

        assert!(surface.completion.active);
        assert_eq!(surface.completion.match_count(), 2);
        surface.pick_completion();
        assert_eq!(surface.text(), "SELECT users.id");
    }

    #[test]
    fn test_plain_text_mode_has_no_keywords() {
        let mut config = Config::default();
        config.editor.mode = EditorMode::PlainText;
        let mut surface = EditorSurface::new("", EditorOptions::from_config(&config, Vocabulary::new()));
        surface.insert_str("SEL");

        surface.show_hint(HintTrigger::Explicit);

        assert!(!surface.completion.active);
        assert_eq!(surface.text(), "SEL");
    }

    #[test]
    fn test_listener_registered_during_dispatch_is_kept() {
        let mut surface = EditorSurface::new("", EditorOptions::default());
        let late_calls = Rc::new(Cell::new(0));

        let calls = late_calls.clone();
        let mut registered = false;
        surface.on_change(move |editor, _| {
            if !registered {
                registered = true;
                let calls = calls.clone();
                editor.on_change(move |_, _| calls.set(calls.get() + 1));
            }
        });

        surface.set_text("a");
        assert_eq!(late_calls.get(), 0);
        surface.set_text("b");
        assert_eq!(late_calls.get(), 1);
    }

    #[test]
    fn test_handle_shares_surface() {
        let handle = EditorHandle::new("editor", EditorSurface::new("x", EditorOptions::default()));
        let other = handle.clone();

        other.set_text("y");

        assert_eq!(handle.text(), "y");
        assert_eq!(handle.mount_id(), "editor");
    }
}
