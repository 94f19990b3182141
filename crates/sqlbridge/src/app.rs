//! Terminal page hosting one bridged editor.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use ratatui::backend::Backend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::{Frame, Terminal};
use tracing::{debug, warn};

use crate::config::{Action, Config};
use crate::document::{Field, Submission};
use crate::ui::{render_editor, EditorHandle};

/// How the page was left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppExit {
    /// The form was submitted
    Submitted(Submission),
    Quit,
}

pub struct App {
    editor: EditorHandle,
    field: Field,
    config: Config,
    last_status: Option<String>,
}

impl App {
    pub fn new(editor: EditorHandle, field: Field, config: Config) -> Self {
        editor.borrow_mut().move_cursor_to_end();
        Self {
            editor,
            field,
            config,
            last_status: None,
        }
    }

    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<AppExit> {
        loop {
            terminal.draw(|frame| self.draw(frame))?;

            if !event::poll(Duration::from_millis(250))? {
                continue;
            }
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if let Some(exit) = self.on_key(key) {
                        return Ok(exit);
                    }
                }
                Event::Paste(text) => self.editor.paste(&text),
                _ => {}
            }
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Option<AppExit> {
        self.last_status = None;

        match self.editor.input(key)? {
            Action::SubmitForm => self.submit(),
            Action::Quit => Some(AppExit::Quit),
            Action::Autocomplete => None,
        }
    }

    fn submit(&mut self) -> Option<AppExit> {
        let Some(form) = self.field.form() else {
            warn!(field = %self.field.id(), "submit requested but the field has no form");
            self.last_status = Some("Nothing to submit: the field has no form".to_string());
            return None;
        };
        let submission = form.submit();
        debug!(form = %form.id(), "submitted from keyboard");
        Some(AppExit::Submitted(submission))
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(3),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(frame.area());

        {
            let mut surface = self.editor.borrow_mut();
            render_editor(
                frame,
                chunks[0],
                &mut surface,
                self.editor.mount_id(),
                self.config.completion.max_visible,
            );
        }

        self.draw_field(frame, chunks[1]);
        self.draw_status(frame, chunks[2]);
    }

    /// One-line preview of the backing field, so the mirror is visible.
    fn draw_field(&self, frame: &mut Frame, area: Rect) {
        let value = self.field.value();
        let lines = value.lines().count();
        let mut preview: String = value.lines().next().unwrap_or("").to_string();
        if lines > 1 {
            preview.push_str(&format!(" … (+{} lines)", lines - 1));
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" field: {} ", self.field.name()))
            .border_style(Style::default().fg(Color::DarkGray));
        frame.render_widget(Paragraph::new(preview).block(block), area);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let keymap = self.editor.borrow().keymap().clone();
        let mut spans = Vec::new();

        if let Some(status) = &self.last_status {
            spans.push(Span::styled(
                format!("{}  ", status),
                Style::default().fg(Color::Yellow),
            ));
        }
        for action in [Action::SubmitForm, Action::Autocomplete, Action::Quit] {
            if let Some(key) = keymap.key_for(action) {
                spans.push(Span::styled(
                    key.to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                ));
                spans.push(Span::raw(format!(" {}  ", action.description())));
            }
        }

        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}
