//! Links screen: inter-switch links with their bandwidth tier, plus
//! create / edit / delete.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};

use sdnboard_core::{BandwidthTier, Link, LinkRequest, Topology};

use crate::action::{Action, ConfirmAction};
use crate::component::Component;
use crate::theme;
use crate::widgets::form::{Form, FormOutcome};
use crate::widgets::table_nav;

enum LinkForm {
    Create(Form),
    Edit { source: i64, dest: i64, form: Form },
}

pub struct LinksScreen {
    focused: bool,
    links: Arc<Vec<Arc<Link>>>,
    topology: Arc<Topology>,
    table_state: TableState,
    form: Option<LinkForm>,
}

impl LinksScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            links: Arc::new(Vec::new()),
            topology: Arc::new(Topology::default()),
            table_state: TableState::default(),
            form: None,
        }
    }

    fn selected_link(&self) -> Option<&Arc<Link>> {
        self.table_state.selected().and_then(|i| self.links.get(i))
    }

    fn switch_label(&self, id: i64) -> String {
        self.topology
            .switch(id)
            .map_or_else(|| id.to_string(), |s| format!("{} ({id})", s.name))
    }

    /// Accept a switch id or a switch name.
    fn resolve_switch(&self, input: &str) -> Option<i64> {
        if let Ok(id) = input.parse::<i64>() {
            return Some(id);
        }
        self.topology
            .switches
            .iter()
            .find(|s| s.name == input)
            .map(|s| s.id)
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Option<Action> {
        let outcome = match self.form.as_mut()? {
            LinkForm::Create(form) | LinkForm::Edit { form, .. } => form.handle_key(key),
        };
        match outcome {
            FormOutcome::Editing => None,
            FormOutcome::Cancelled => {
                self.form = None;
                None
            }
            FormOutcome::Submitted => self.submit_form(),
        }
    }

    fn submit_form(&mut self) -> Option<Action> {
        let action = match self.form.as_ref()? {
            LinkForm::Create(form) => {
                let source = self.resolve_switch(form.value(0));
                let dest = self.resolve_switch(form.value(1));
                let bandwidth = form.value(2).parse::<u32>();
                match (source, dest, bandwidth) {
                    (None, _, _) => Err("unknown source switch"),
                    (_, None, _) => Err("unknown destination switch"),
                    (_, _, Err(_)) => Err("bandwidth must be a whole number of Mbps"),
                    (Some(source), Some(dest), Ok(bandwidth_mbps)) => {
                        Ok(Action::RequestCreateLink(LinkRequest {
                            source,
                            dest,
                            bandwidth_mbps,
                        }))
                    }
                }
            }
            LinkForm::Edit { source, dest, form } => form
                .value(0)
                .parse::<u32>()
                .map(|bandwidth_mbps| {
                    Action::RequestUpdateLink(LinkRequest {
                        source: *source,
                        dest: *dest,
                        bandwidth_mbps,
                    })
                })
                .map_err(|_| "bandwidth must be a whole number of Mbps"),
        };

        match action {
            Ok(action) => {
                self.form = None;
                Some(action)
            }
            Err(message) => {
                if let Some(LinkForm::Create(form) | LinkForm::Edit { form, .. }) = &mut self.form {
                    form.set_error(message);
                }
                None
            }
        }
    }
}

impl Default for LinksScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for LinksScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.form.is_some() {
            return Ok(self.handle_form_key(key));
        }
        if table_nav::navigate(&mut self.table_state, self.links.len(), key) {
            return Ok(None);
        }

        let action = match key.code {
            KeyCode::Char('n') => {
                self.form = Some(LinkForm::Create(
                    Form::new("New link")
                        .field("From switch", "")
                        .field("To switch", "")
                        .field("Bandwidth (Mbps)", "100"),
                ));
                None
            }
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(link) = self.selected_link() {
                    let title = format!(
                        "Bandwidth {} → {}",
                        self.switch_label(link.source),
                        self.switch_label(link.dest)
                    );
                    self.form = Some(LinkForm::Edit {
                        source: link.source,
                        dest: link.dest,
                        form: Form::new(title)
                            .field("Bandwidth (Mbps)", link.bandwidth_mbps.to_string()),
                    });
                }
                None
            }
            KeyCode::Char('d') => self.selected_link().map(|link| {
                Action::ShowConfirm(ConfirmAction::DeleteLink {
                    source: link.source,
                    dest: link.dest,
                })
            }),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::LinksUpdated(links) => {
                self.links = Arc::clone(links);
                table_nav::clamp(&mut self.table_state, self.links.len());
            }
            Action::SceneUpdated { topology, .. } => {
                self.topology = Arc::clone(topology);
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(format!(" Links ({}) ", self.links.len()))
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

        let header = Row::new(vec!["From", "To", "Bandwidth", "Tier"]).style(theme::table_header());
        let rows: Vec<Row> = self
            .links
            .iter()
            .map(|link| {
                let tier = BandwidthTier::from_mbps(link.bandwidth_mbps);
                Row::new(vec![
                    Cell::from(self.switch_label(link.source)),
                    Cell::from(self.switch_label(link.dest)),
                    Cell::from(format!("{} Mbps", link.bandwidth_mbps)),
                    Cell::from(Span::styled(
                        tier.to_string(),
                        Style::default().fg(theme::tier_color(tier)),
                    )),
                ])
                .style(theme::table_row())
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Percentage(35),
                Constraint::Percentage(35),
                Constraint::Length(14),
                Constraint::Min(10),
            ],
        )
        .header(header)
        .row_highlight_style(theme::table_selected());
        let mut state = self.table_state.clone();
        frame.render_stateful_widget(table, table_area, &mut state);

        let hints = Line::from(vec![
            Span::styled(" j/k ", theme::key_hint_key()),
            Span::styled("move  ", theme::key_hint()),
            Span::styled("n ", theme::key_hint_key()),
            Span::styled("new  ", theme::key_hint()),
            Span::styled("e ", theme::key_hint_key()),
            Span::styled("bandwidth  ", theme::key_hint()),
            Span::styled("d ", theme::key_hint_key()),
            Span::styled("delete", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), hints_area);

        match &self.form {
            Some(LinkForm::Create(form) | LinkForm::Edit { form, .. }) => form.render(frame, area),
            None => {}
        }
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn captures_input(&self) -> bool {
        self.form.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use sdnboard_core::{Switch, SwitchStatus};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(screen: &mut LinksScreen, s: &str) {
        for c in s.chars() {
            screen.handle_key_event(key(KeyCode::Char(c))).unwrap();
        }
    }

    fn screen() -> LinksScreen {
        let switch = |id: i64, name: &str| Switch {
            id,
            name: name.into(),
            dpid_hex: None,
            latitude: None,
            longitude: None,
            status: SwitchStatus::Connected,
        };
        let mut screen = LinksScreen::new();
        screen.topology = Arc::new(Topology {
            switches: vec![switch(1, "ams"), switch(2, "ber")],
            hosts: Vec::new(),
            links: Vec::new(),
        });
        screen
            .update(&Action::LinksUpdated(Arc::new(vec![Arc::new(Link {
                source: 1,
                dest: 2,
                bandwidth_mbps: 200,
            })])))
            .unwrap();
        screen
    }

    #[test]
    fn create_form_accepts_switch_names() {
        let mut screen = screen();
        screen.handle_key_event(key(KeyCode::Char('n'))).unwrap();
        type_str(&mut screen, "ber");
        screen.handle_key_event(key(KeyCode::Tab)).unwrap();
        type_str(&mut screen, "1");
        let action = screen.handle_key_event(key(KeyCode::Enter)).unwrap();
        match action {
            Some(Action::RequestCreateLink(req)) => {
                assert_eq!((req.source, req.dest, req.bandwidth_mbps), (2, 1, 100));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_switch_keeps_the_form_open() {
        let mut screen = screen();
        screen.handle_key_event(key(KeyCode::Char('n'))).unwrap();
        type_str(&mut screen, "paris");
        assert!(screen.handle_key_event(key(KeyCode::Enter)).unwrap().is_none());
        assert!(screen.captures_input());
    }

    #[test]
    fn delete_asks_for_confirmation() {
        let mut screen = screen();
        let action = screen.handle_key_event(key(KeyCode::Char('d'))).unwrap();
        assert!(matches!(
            action,
            Some(Action::ShowConfirm(ConfirmAction::DeleteLink { source: 1, dest: 2 }))
        ));
    }
}
