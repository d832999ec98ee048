//! Stats screen: active algorithms, event counts, recent controller
//! events, and the latency comparison between routing algorithms.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table};

use sdnboard_core::LatencyMetrics;

use crate::action::{Action, StatsData};
use crate::component::Component;
use crate::theme;

/// Newest events shown in the log panel.
const LOG_ROWS: usize = 50;

pub struct StatsScreen {
    focused: bool,
    data: Option<StatsData>,
    loading: bool,
}

impl StatsScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            data: None,
            loading: false,
        }
    }

    fn panel(title: &str) -> Block<'static> {
        Block::default()
            .title(format!(" {title} "))
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default())
    }

    fn render_algorithms(frame: &mut Frame, area: Rect, data: &StatsData) {
        let label = |s: &str| Span::styled(format!(" {s:<12}"), theme::key_hint());
        let value = |s: Option<&str>| {
            Span::styled(
                s.unwrap_or("-").to_owned(),
                Style::default()
                    .fg(theme::NEON_CYAN)
                    .add_modifier(Modifier::BOLD),
            )
        };
        let config = data.config.as_ref();
        let mut lines = vec![
            Line::from(vec![
                label("Balancing"),
                value(config.and_then(|c| c.balancing.as_deref())),
            ]),
            Line::from(vec![
                label("Routing"),
                value(config.and_then(|c| c.routing.as_deref())),
            ]),
            Line::from(vec![
                label("Since"),
                Span::styled(
                    config
                        .and_then(|c| c.activated_at.clone())
                        .unwrap_or_else(|| "-".into()),
                    theme::table_row(),
                ),
            ]),
        ];
        if config.is_some_and(sdnboard_core::AlgorithmConfig::uses_weights) {
            lines.push(Line::from(Span::styled(
                " server weights apply",
                Style::default().fg(theme::AMBER),
            )));
        }
        frame.render_widget(
            Paragraph::new(lines).block(Self::panel("Algorithms")),
            area,
        );
    }

    fn render_summary(frame: &mut Frame, area: Rect, data: &StatsData) {
        let rows: Vec<Row> = data
            .summary
            .iter()
            .map(|row| {
                Row::new(vec![
                    Cell::from(row.kind.clone()),
                    Cell::from(row.total.to_string()),
                ])
                .style(theme::table_row())
            })
            .collect();
        let table = Table::new(rows, [Constraint::Min(16), Constraint::Length(8)])
            .header(Row::new(vec!["Event", "Total"]).style(theme::table_header()))
            .block(Self::panel("Event counts"));
        frame.render_widget(table, area);
    }

    fn render_comparison(frame: &mut Frame, area: Rect, data: &StatsData) {
        let fmt = |v: Option<f64>| v.map_or_else(|| "-".to_owned(), |v| format!("{v:.2} ms"));
        let row = |name: &'static str, m: &LatencyMetrics| {
            Row::new(vec![
                Cell::from(name),
                Cell::from(fmt(m.avg_rtt_ms)),
                Cell::from(fmt(m.avg_jitter_ms)),
            ])
            .style(theme::table_row())
        };
        let rows = data.comparison.as_ref().map_or_else(Vec::new, |c| {
            vec![
                row("dijkstra", &c.dijkstra),
                row("shortest_path", &c.shortest_path),
            ]
        });
        let table = Table::new(
            rows,
            [
                Constraint::Length(15),
                Constraint::Length(12),
                Constraint::Length(12),
            ],
        )
        .header(Row::new(vec!["Routing", "Avg RTT", "Avg jitter"]).style(theme::table_header()))
        .block(Self::panel("Latency by algorithm"));
        frame.render_widget(table, area);
    }

    fn render_logs(frame: &mut Frame, area: Rect, data: &StatsData) {
        let dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".into());
        let rows: Vec<Row> = data
            .logs
            .iter()
            .take(LOG_ROWS)
            .map(|entry| {
                Row::new(vec![
                    Cell::from(dash(&entry.date)),
                    Cell::from(dash(&entry.origin)),
                    Cell::from(dash(&entry.event_type)),
                ])
                .style(theme::table_row())
            })
            .collect();
        let table = Table::new(
            rows,
            [
                Constraint::Length(22),
                Constraint::Length(16),
                Constraint::Min(16),
            ],
        )
        .header(Row::new(vec!["Date", "Origin", "Event"]).style(theme::table_header()))
        .block(Self::panel(&format!("Recent events ({})", data.logs.len())));
        frame.render_widget(table, area);
    }
}

impl Default for StatsScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for StatsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Char('r') if !self.loading => Ok(Some(Action::RequestStats)),
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::RequestStats => self.loading = true,
            Action::StatsUpdated(data) => {
                self.data = Some(data.as_ref().clone());
                self.loading = false;
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let title = if self.loading {
            " Stats  ·  loading… "
        } else {
            " Stats "
        };
        let block = Block::default()
            .title(title)
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

        let Some(data) = &self.data else {
            let text = if self.loading {
                " Fetching statistics…"
            } else {
                " Press r to load statistics."
            };
            frame.render_widget(Paragraph::new(Span::styled(text, theme::key_hint())), inner);
            return;
        };

        let error_rows = u16::try_from(data.errors.len()).unwrap_or(u16::MAX);
        let [top, bottom, errors_area, hints_area] = Layout::vertical([
            Constraint::Length(7),
            Constraint::Min(4),
            Constraint::Length(error_rows),
            Constraint::Length(1),
        ])
        .areas(inner);
        let [algorithms, comparison, summary] = Layout::horizontal([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .areas(top);

        Self::render_algorithms(frame, algorithms, data);
        Self::render_comparison(frame, comparison, data);
        Self::render_summary(frame, summary, data);
        Self::render_logs(frame, bottom, data);

        let errors: Vec<Line> = data
            .errors
            .iter()
            .map(|e| Line::from(Span::styled(format!(" {e}"), Style::default().fg(theme::AMBER))))
            .collect();
        frame.render_widget(Paragraph::new(errors), errors_area);

        let hints = Line::from(vec![
            Span::styled(" r ", theme::key_hint_key()),
            Span::styled("refresh", theme::key_hint()),
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

    #[test]
    fn refresh_is_ignored_while_loading() {
        let mut screen = StatsScreen::new();
        let r = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::NONE);
        let action = screen.handle_key_event(r).unwrap();
        assert!(matches!(action, Some(Action::RequestStats)));

        screen.update(&Action::RequestStats).unwrap();
        assert!(screen.handle_key_event(r).unwrap().is_none());

        screen
            .update(&Action::StatsUpdated(Box::default()))
            .unwrap();
        assert!(!screen.loading);
        assert!(screen.data.is_some());
    }
}
