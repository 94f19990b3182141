//! Rendering of the editor surface and its completion popup.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use super::completion::CompletionKind;
use super::editor::EditorSurface;

const POPUP_WIDTH: u16 = 40;

/// Render `surface` into `area`, with the completion popup on top when open.
pub fn render_editor(
    frame: &mut Frame,
    area: Rect,
    surface: &mut EditorSurface,
    title: &str,
    max_visible: usize,
) {
    surface.textarea.set_block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} [{}] ", title, surface.mode().label()))
            .border_style(Style::default().fg(Color::Cyan)),
    );
    frame.render_widget(&surface.textarea, area);

    if !surface.completion.active {
        return;
    }
    let visible = surface.completion.visible_items(max_visible);
    if visible.is_empty() {
        return;
    }

    let (cursor_row, _) = surface.textarea.cursor();
    let line = surface
        .textarea
        .lines()
        .get(cursor_row)
        .map(String::as_str)
        .unwrap_or("");
    let before_word: String = line.chars().take(surface.completion.start_col).collect();
    let gutter = if surface.options().line_numbers {
        line_number_width(surface.textarea.lines().len())
    } else {
        0
    };

    let popup = popup_area(
        area,
        frame.area(),
        cursor_row as u16,
        gutter + before_word.width() as u16,
        visible.len() as u16,
    );

    let lines: Vec<Line> = visible
        .iter()
        .map(|(idx, item)| {
            let is_selected = *idx == surface.completion.selected;
            let marker = match item.kind {
                CompletionKind::Keyword => "K",
                CompletionKind::Table => "T",
                CompletionKind::Column => "C",
            };
            let style = if is_selected {
                Style::default().bg(Color::Blue).fg(Color::White)
            } else {
                Style::default()
            };
            let mut spans = vec![
                Span::styled(format!("{} ", marker), Style::default().fg(Color::DarkGray)),
                Span::styled(item.label.clone(), style),
            ];
            if let Some(table) = &item.detail {
                spans.push(Span::styled(
                    format!("  {}", table),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            Line::from(spans)
        })
        .collect();

    let completion_block = Block::default()
        .borders(Borders::ALL)
        .title("Completions (Tab select, Esc cancel)")
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(Clear, popup);
    frame.render_widget(Paragraph::new(lines).block(completion_block), popup);
}

/// Width of the line number gutter: the digits plus one space on each side.
fn line_number_width(line_count: usize) -> u16 {
    line_count.max(1).to_string().len() as u16 + 2
}

/// Place the popup below the cursor row, starting at the completed word,
/// kept inside `screen`.
fn popup_area(editor: Rect, screen: Rect, cursor_row: u16, word_x: u16, items: u16) -> Rect {
    // +1 skips the editor border, +1 more puts the popup under the cursor row
    let y = editor.y + 2 + cursor_row;
    let x = editor.x + 1 + word_x;

    let height = (items + 2).min(screen.height); // +2 for borders
    let width = POPUP_WIDTH.min(screen.width);

    let y = if y + height > screen.bottom() {
        screen.bottom().saturating_sub(height)
    } else {
        y
    };
    let x = x.min(screen.right().saturating_sub(width));

    Rect {
        x,
        y,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::ui::{EditorOptions, HintTrigger};
    use crate::vocabulary::Vocabulary;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_line_number_width() {
        assert_eq!(line_number_width(0), 3);
        assert_eq!(line_number_width(9), 3);
        assert_eq!(line_number_width(10), 4);
    }

    #[test]
    fn test_popup_below_cursor() {
        let screen = Rect::new(0, 0, 80, 24);
        let area = popup_area(screen, screen, 0, 10, 3);
        assert_eq!(area, Rect::new(11, 2, 40, 5));
    }

    #[test]
    fn test_popup_stays_on_screen() {
        let screen = Rect::new(0, 0, 60, 10);
        let area = popup_area(screen, screen, 8, 50, 4);

        assert!(area.bottom() <= screen.bottom());
        assert!(area.right() <= screen.right());
    }

    #[test]
    fn test_render_editor_with_popup() {
        let vocabulary: Vocabulary = [("users", vec!["id"])].into_iter().collect();
        let mut surface =
            EditorSurface::new("", EditorOptions::from_config(&Config::default(), vocabulary));
        surface.insert_str("SELECT * FROM use");
        surface.show_hint(HintTrigger::Auto);

        let mut terminal = Terminal::new(TestBackend::new(60, 12)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render_editor(frame, area, &mut surface, "query", 8);
            })
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("query [SQL]"));
        assert!(text.contains("SELECT * FROM use"));
        assert!(text.contains("T users"));
    }

    #[test]
    fn test_render_editor_without_popup() {
        let mut surface = EditorSurface::new("SELECT 1", EditorOptions::default());

        let mut terminal = Terminal::new(TestBackend::new(40, 6)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render_editor(frame, area, &mut surface, "query", 8);
            })
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("SELECT 1"));
        assert!(!text.contains("Completions"));
    }
}
