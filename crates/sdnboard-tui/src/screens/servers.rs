//! Servers screen: active video servers.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};

use sdnboard_core::ActiveServer;

use crate::action::{Action, ConfirmAction};
use crate::component::Component;
use crate::theme;
use crate::widgets::{self, table_nav};

pub struct ServersScreen {
    focused: bool,
    servers: Arc<Vec<Arc<ActiveServer>>>,
    table_state: TableState,
}

impl ServersScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            servers: Arc::new(Vec::new()),
            table_state: TableState::default(),
        }
    }

    fn selected(&self) -> Option<&Arc<ActiveServer>> {
        self.table_state.selected().and_then(|i| self.servers.get(i))
    }
}

impl Default for ServersScreen {
    fn default() -> Self {
        Self::new()
    }
}

fn dash(value: Option<&str>) -> String {
    value.unwrap_or("-").to_owned()
}

impl Component for ServersScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if table_nav::navigate(&mut self.table_state, self.servers.len(), key) {
            return Ok(None);
        }
        let action = match key.code {
            KeyCode::Char('d' | 'x') => self.selected().map(|s| {
                Action::ShowConfirm(ConfirmAction::StopServer {
                    host_name: s.host_name.clone(),
                })
            }),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::ServersUpdated(servers) = action {
            self.servers = Arc::clone(servers);
            table_nav::clamp(&mut self.table_state, self.servers.len());
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(format!(" Servers ({}) ", self.servers.len()))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [table_area, hints_area] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(inner);

        let header = Row::new(vec!["Host", "Video", "Group", "Weight", "Status", "Updated"])
            .style(theme::table_header());
        let rows: Vec<Row> = self
            .servers
            .iter()
            .map(|s| {
                let status = s.status.as_deref().unwrap_or("-");
                let status_color = if status.eq_ignore_ascii_case("active") {
                    theme::SUCCESS_GREEN
                } else {
                    theme::DIM_WHITE
                };
                Row::new(vec![
                    Cell::from(Span::styled(
                        s.host_name.clone(),
                        Style::default().fg(theme::CORAL),
                    )),
                    Cell::from(dash(s.video_path.as_deref())),
                    Cell::from(dash(s.group().as_deref())),
                    Cell::from(s.weight.map_or_else(|| "-".into(), |w| w.to_string())),
                    Cell::from(Span::styled(
                        status.to_owned(),
                        Style::default().fg(status_color),
                    )),
                    Cell::from(widgets::ago(s.last_updated_at())),
                ])
                .style(theme::table_row())
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(12),
                Constraint::Min(16),
                Constraint::Length(22),
                Constraint::Length(8),
                Constraint::Length(10),
                Constraint::Length(20),
            ],
        )
        .header(header)
        .row_highlight_style(theme::table_selected());
        let mut state = self.table_state.clone();
        frame.render_stateful_widget(table, table_area, &mut state);

        let hints = Line::from(vec![
            Span::styled(" j/k ", theme::key_hint_key()),
            Span::styled("move  ", theme::key_hint()),
            Span::styled("d ", theme::key_hint_key()),
            Span::styled("stop server  ", theme::key_hint()),
            Span::styled("1 ", theme::key_hint_key()),
            Span::styled("start from the map", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), hints_area);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}
