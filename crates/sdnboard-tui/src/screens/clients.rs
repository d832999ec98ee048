//! Clients screen: active stream clients next to the hosts that could
//! start one.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, BorderType, Borders, Cell, List, ListItem, ListState, Paragraph, Row, Table, TableState,
};

use sdnboard_core::ActiveClient;

use crate::action::{Action, ConfirmAction};
use crate::component::Component;
use crate::theme;
use crate::widgets::{self, table_nav};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Active,
    Candidates,
}

pub struct ClientsScreen {
    focused: bool,
    clients: Arc<Vec<Arc<ActiveClient>>>,
    candidates: Arc<Vec<String>>,
    pane: Pane,
    table_state: TableState,
    /// Candidates reuse the table cursor helpers through a second state.
    candidate_state: TableState,
}

impl ClientsScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            clients: Arc::new(Vec::new()),
            candidates: Arc::new(Vec::new()),
            pane: Pane::Active,
            table_state: TableState::default(),
            candidate_state: TableState::default(),
        }
    }

    fn pane_block(&self, title: String, pane: Pane) -> Block<'static> {
        Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused && self.pane == pane {
                theme::border_focused()
            } else {
                theme::border_default()
            })
    }
}

impl Default for ClientsScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for ClientsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Char('h') | KeyCode::Left => {
                self.pane = Pane::Active;
                return Ok(None);
            }
            KeyCode::Char('l') | KeyCode::Right => {
                self.pane = Pane::Candidates;
                return Ok(None);
            }
            _ => {}
        }

        let action = match self.pane {
            Pane::Active => {
                if table_nav::navigate(&mut self.table_state, self.clients.len(), key) {
                    return Ok(None);
                }
                match key.code {
                    KeyCode::Char('d' | 'x') => self
                        .table_state
                        .selected()
                        .and_then(|i| self.clients.get(i))
                        .map(|c| {
                            Action::ShowConfirm(ConfirmAction::StopClient {
                                host: c.host.clone(),
                            })
                        }),
                    _ => None,
                }
            }
            Pane::Candidates => {
                if table_nav::navigate(&mut self.candidate_state, self.candidates.len(), key) {
                    return Ok(None);
                }
                match key.code {
                    KeyCode::Enter | KeyCode::Char('s') => self
                        .candidate_state
                        .selected()
                        .and_then(|i| self.candidates.get(i))
                        .map(|host| Action::RequestStartClient { host: host.clone() }),
                    _ => None,
                }
            }
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::ClientsUpdated(clients) => {
                self.clients = Arc::clone(clients);
                table_nav::clamp(&mut self.table_state, self.clients.len());
            }
            Action::CandidatesUpdated(names) => {
                self.candidates = Arc::clone(names);
                table_nav::clamp(&mut self.candidate_state, self.candidates.len());
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let [body, hints_area] =
            Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(area);
        let [table_area, list_area] =
            Layout::horizontal([Constraint::Min(40), Constraint::Length(28)]).areas(body);

        // ── Active clients ──
        let block = self.pane_block(format!(" Clients ({}) ", self.clients.len()), Pane::Active);
        let header = Row::new(vec!["Host", "Server", "Group", "Video", "Running"])
            .style(theme::table_header());
        let rows: Vec<Row> = self
            .clients
            .iter()
            .map(|c| {
                let group = match (&c.destination_ip, c.port) {
                    (Some(ip), Some(port)) => format!("{ip}:{port}"),
                    (Some(ip), None) => ip.clone(),
                    _ => "-".to_owned(),
                };
                Row::new(vec![
                    Cell::from(Span::styled(
                        c.host.clone(),
                        Style::default().fg(theme::SUCCESS_GREEN),
                    )),
                    Cell::from(c.server.clone().unwrap_or_else(|| "-".into())),
                    Cell::from(group),
                    Cell::from(c.video.clone().unwrap_or_else(|| "-".into())),
                    Cell::from(widgets::ago(c.started_at_utc())),
                ])
                .style(theme::table_row())
            })
            .collect();
        let table = Table::new(
            rows,
            [
                Constraint::Length(12),
                Constraint::Length(12),
                Constraint::Length(22),
                Constraint::Min(12),
                Constraint::Length(16),
            ],
        )
        .header(header)
        .block(block)
        .row_highlight_style(if self.pane == Pane::Active {
            theme::table_selected()
        } else {
            Style::default()
        });
        let mut state = self.table_state.clone();
        frame.render_stateful_widget(table, table_area, &mut state);

        // ── Candidates ──
        let block = self.pane_block(
            format!(" Can start ({}) ", self.candidates.len()),
            Pane::Candidates,
        );
        let items: Vec<ListItem> = self
            .candidates
            .iter()
            .map(|name| ListItem::new(Span::styled(format!(" △ {name}"), theme::table_row())))
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(if self.pane == Pane::Candidates {
                theme::table_selected()
            } else {
                Style::default()
            });
        let mut list_state = ListState::default().with_selected(self.candidate_state.selected());
        frame.render_stateful_widget(list, list_area, &mut list_state);

        let hints = Line::from(vec![
            Span::styled(" h/l ", theme::key_hint_key()),
            Span::styled("pane  ", theme::key_hint()),
            Span::styled("j/k ", theme::key_hint_key()),
            Span::styled("move  ", theme::key_hint()),
            Span::styled("d ", theme::key_hint_key()),
            Span::styled("stop client  ", theme::key_hint()),
            Span::styled("Enter ", theme::key_hint_key()),
            Span::styled("start client", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), hints_area);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn client(host: &str) -> Arc<ActiveClient> {
        Arc::new(ActiveClient {
            host: host.into(),
            server: Some("h1".into()),
            destination_ip: Some("239.0.0.1".into()),
            port: Some(5004),
            video: None,
            started_at: None,
        })
    }

    #[test]
    fn candidates_pane_starts_a_client() {
        let mut screen = ClientsScreen::new();
        screen
            .update(&Action::CandidatesUpdated(Arc::new(vec![
                "h2".into(),
                "h3".into(),
            ])))
            .unwrap();
        screen.handle_key_event(key(KeyCode::Char('l'))).unwrap();
        screen.handle_key_event(key(KeyCode::Char('j'))).unwrap();
        let action = screen.handle_key_event(key(KeyCode::Enter)).unwrap();
        assert!(matches!(action, Some(Action::RequestStartClient { host }) if host == "h3"));
    }

    #[test]
    fn stop_needs_confirmation() {
        let mut screen = ClientsScreen::new();
        screen
            .update(&Action::ClientsUpdated(Arc::new(vec![client("h5")])))
            .unwrap();
        let action = screen.handle_key_event(key(KeyCode::Char('d'))).unwrap();
        assert!(matches!(
            action,
            Some(Action::ShowConfirm(ConfirmAction::StopClient { host })) if host == "h5"
        ));
    }
}
