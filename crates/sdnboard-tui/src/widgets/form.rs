//! Inline multi-field form backed by `tui-input`.
//!
//! Tab / Shift-Tab move between fields, Enter submits, Esc cancels. The
//! owning screen decides what a submission means; the form only collects
//! text.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};
use tui_input::{Input, InputRequest};

use crate::theme;

/// What a key press did to the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    Editing,
    Submitted,
    Cancelled,
}

struct Field {
    label: &'static str,
    input: Input,
}

pub struct Form {
    title: String,
    fields: Vec<Field>,
    active: usize,
    error: Option<String>,
}

impl Form {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            fields: Vec::new(),
            active: 0,
            error: None,
        }
    }

    #[must_use]
    pub fn field(mut self, label: &'static str, initial: impl Into<String>) -> Self {
        self.fields.push(Field {
            label,
            input: Input::new(initial.into()),
        });
        self
    }

    pub fn value(&self, index: usize) -> &str {
        self.fields.get(index).map_or("", |f| f.input.value().trim())
    }

    /// Show a validation message under the fields; the form stays open.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormOutcome {
        let request = match (key.modifiers, key.code) {
            (_, KeyCode::Esc) => return FormOutcome::Cancelled,
            (_, KeyCode::Enter) => return FormOutcome::Submitted,
            (_, KeyCode::Tab | KeyCode::Down) => {
                self.active = (self.active + 1) % self.fields.len().max(1);
                return FormOutcome::Editing;
            }
            (_, KeyCode::BackTab | KeyCode::Up) => {
                let len = self.fields.len().max(1);
                self.active = (self.active + len - 1) % len;
                return FormOutcome::Editing;
            }
            (KeyModifiers::CONTROL, KeyCode::Char('u')) => InputRequest::DeleteLine,
            (_, KeyCode::Char(c)) => InputRequest::InsertChar(c),
            (_, KeyCode::Backspace) => InputRequest::DeletePrevChar,
            (_, KeyCode::Delete) => InputRequest::DeleteNextChar,
            (_, KeyCode::Left) => InputRequest::GoToPrevChar,
            (_, KeyCode::Right) => InputRequest::GoToNextChar,
            (_, KeyCode::Home) => InputRequest::GoToStart,
            (_, KeyCode::End) => InputRequest::GoToEnd,
            _ => return FormOutcome::Editing,
        };
        if let Some(field) = self.fields.get_mut(self.active) {
            let _ = field.input.handle(request);
            self.error = None;
        }
        FormOutcome::Editing
    }

    /// Draw as a centred popup over `area`.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let label_width = self
            .fields
            .iter()
            .map(|f| f.label.len())
            .max()
            .unwrap_or(0);
        let width = 56u16.min(area.width.saturating_sub(4));
        let rows = u16::try_from(self.fields.len()).unwrap_or(u16::MAX);
        let height = rows.saturating_add(5).min(area.height);
        let x = area.x + area.width.saturating_sub(width) / 2;
        let y = area.y + area.height.saturating_sub(height) / 2;
        let popup = Rect::new(x, y, width, height);

        frame.render_widget(Clear, popup);
        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused())
            .style(Style::default().bg(theme::BG_DARK));
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let mut constraints: Vec<Constraint> =
            self.fields.iter().map(|_| Constraint::Length(1)).collect();
        constraints.push(Constraint::Length(1));
        constraints.push(Constraint::Length(1));
        constraints.push(Constraint::Min(0));
        let layout = Layout::vertical(constraints).split(inner);

        for (i, field) in self.fields.iter().enumerate() {
            let Some(&row) = layout.get(i) else { break };
            let active = i == self.active;
            let label_style = if active {
                theme::key_hint_key()
            } else {
                theme::key_hint()
            };
            let prefix = format!(" {:<label_width$} ", field.label);
            let prefix_len = u16::try_from(prefix.chars().count()).unwrap_or(0);
            let value_width = usize::from(row.width.saturating_sub(prefix_len + 1));
            let scroll = field.input.visual_scroll(value_width);
            let visible: String = field.input.value().chars().skip(scroll).collect();
            let line = Line::from(vec![
                Span::styled(prefix, label_style),
                Span::styled(visible, Style::default().fg(theme::DIM_WHITE)),
            ]);
            frame.render_widget(Paragraph::new(line), row);

            if active {
                let cursor = field.input.visual_cursor().saturating_sub(scroll);
                let cursor = u16::try_from(cursor).unwrap_or(0);
                frame.set_cursor_position(Position::new(row.x + prefix_len + cursor, row.y));
            }
        }

        let status_row = layout.get(self.fields.len() + 1).copied();
        if let Some(row) = status_row {
            let line = match &self.error {
                Some(err) => Line::from(Span::styled(
                    format!(" {err}"),
                    Style::default().fg(theme::ERROR_RED),
                )),
                None => Line::from(vec![
                    Span::styled(" Enter ", theme::key_hint_key()),
                    Span::styled("submit  ", theme::key_hint()),
                    Span::styled("Tab ", theme::key_hint_key()),
                    Span::styled("next field  ", theme::key_hint()),
                    Span::styled("Esc ", theme::key_hint_key()),
                    Span::styled("cancel", theme::key_hint()),
                ]),
            };
            frame.render_widget(Paragraph::new(line), row);
        }
    }
}
