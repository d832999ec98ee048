//! Application core: event loop, screen management, action dispatch.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs},
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use sdnboard_core::{
    Command, Controller, MacAddress, PingEvent, ReconcileEvent, RefreshTarget,
    StartServerRequest,
};

use crate::action::{Action, ConfirmAction, Notification, NotificationLevel, StatsData};
use crate::component::Component;
use crate::event::{Event, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;

/// Toasts disappear after this long.
const TOAST_TTL: Duration = Duration::from_secs(3);

/// Backend connection as seen by the TUI.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// Top-level application state and event loop.
pub struct App {
    active_screen: ScreenId,
    /// Previous screen for GoBack.
    previous_screen: Option<ScreenId>,
    screens: HashMap<ScreenId, Box<dyn Component>>,
    running: bool,
    connection_status: ConnectionStatus,
    /// SDN controller state from the latest scene.
    controller_online: bool,
    /// Views whose last refresh failed, with the failure message.
    stale: BTreeMap<RefreshTarget, String>,
    help_visible: bool,
    action_tx: mpsc::UnboundedSender<Action>,
    action_rx: mpsc::UnboundedReceiver<Action>,
    controller: Controller,
    /// Cancellation token for the data bridge task.
    data_cancel: CancellationToken,
    /// Cancels the running ping, if any.
    ping_cancel: CancellationToken,
    /// Pending confirmation dialog (blocks other input while active).
    pending_confirm: Option<ConfirmAction>,
    notification: Option<(Notification, Instant)>,
}

impl App {
    pub fn new(controller: Controller) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();
        let screens: HashMap<ScreenId, Box<dyn Component>> =
            create_screens().into_iter().collect();

        Self {
            active_screen: ScreenId::Map,
            previous_screen: None,
            screens,
            running: true,
            connection_status: ConnectionStatus::default(),
            controller_online: false,
            stale: BTreeMap::new(),
            help_visible: false,
            action_tx,
            action_rx,
            controller,
            data_cancel: CancellationToken::new(),
            ping_cancel: CancellationToken::new(),
            pending_confirm: None,
            notification: None,
        }
    }

    /// Run the main event loop until the user quits.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;

        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }

        let controller = self.controller.clone();
        let cancel = self.data_cancel.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            crate::data_bridge::spawn_data_bridge(controller, tx, cancel).await;
        });

        let mut events = EventReader::new(
            Duration::from_millis(250), // 4 Hz tick
            Duration::from_millis(33),  // ~30 FPS render
        );

        info!("TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => self.action_tx.send(Action::Resize(w, h))?,
                Event::Tick => self.action_tx.send(Action::Tick)?,
                Event::Render => self.action_tx.send(Action::Render)?,
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.ping_cancel.cancel();
        self.data_cancel.cancel();
        events.stop();
        tui.exit()?;
        info!("TUI event loop ended");
        Ok(())
    }

    /// Map a key event to an action. Global keys are handled here;
    /// screen-specific keys are delegated to the active screen.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        // Confirmation dialog captures all input
        if self.pending_confirm.is_some() {
            return Ok(match key.code {
                KeyCode::Char('y' | 'Y') => Some(Action::ConfirmYes),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Some(Action::ConfirmNo),
                _ => None,
            });
        }

        if self.help_visible {
            return Ok(match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Some(Action::ToggleHelp),
                _ => None,
            });
        }

        // An open form gets every key
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            if screen.captures_input() {
                return screen.handle_key_event(key);
            }
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),
            (_, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),
            (KeyModifiers::NONE, KeyCode::Char(c @ '1'..='5')) => {
                let screen = c
                    .to_digit(10)
                    .and_then(|n| u8::try_from(n).ok())
                    .and_then(ScreenId::from_number);
                if let Some(screen) = screen {
                    return Ok(Some(Action::SwitchScreen(screen)));
                }
            }
            (KeyModifiers::NONE, KeyCode::Tab) => {
                return Ok(Some(Action::SwitchScreen(self.active_screen.next())));
            }
            (_, KeyCode::BackTab) => {
                return Ok(Some(Action::SwitchScreen(self.active_screen.prev())));
            }
            _ => {}
        }

        let delegated = match self.screens.get_mut(&self.active_screen) {
            Some(screen) => screen.handle_key_event(key)?,
            None => None,
        };
        // Esc falls back to the previous screen when the screen had no use for it
        if delegated.is_none() && key.code == KeyCode::Esc {
            return Ok(Some(Action::GoBack));
        }
        Ok(delegated)
    }

    /// Process a single action: update app state and propagate to screens.
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => self.running = false,

            Action::Resize(..) | Action::Render => {}

            Action::SwitchScreen(target) => {
                if *target != self.active_screen {
                    debug!("switching screen: {} → {}", self.active_screen, target);
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(false);
                    }
                    self.previous_screen = Some(self.active_screen);
                    self.active_screen = *target;
                    if let Some(screen) = self.screens.get_mut(&self.active_screen) {
                        screen.set_focused(true);
                    }
                    if *target == ScreenId::Stats {
                        self.action_tx.send(Action::RequestStats)?;
                    }
                }
            }

            Action::GoBack => {
                if let Some(prev) = self.previous_screen.take() {
                    self.action_tx.send(Action::SwitchScreen(prev))?;
                }
            }

            Action::ToggleHelp => self.help_visible = !self.help_visible,

            Action::Connecting => self.connection_status = ConnectionStatus::Connecting,
            Action::Connected => self.connection_status = ConnectionStatus::Connected,
            Action::Disconnected(reason) => {
                debug!(%reason, "backend disconnected");
                self.connection_status = ConnectionStatus::Disconnected;
            }

            Action::Tick => {
                if let Some((_, created)) = &self.notification {
                    if created.elapsed() > TOAST_TTL {
                        self.notification = None;
                    }
                }
            }

            Action::Reconciled(event) => self.note_reconcile(event)?,

            // Data updates go to ALL screens so they stay in sync
            Action::SceneUpdated { .. }
            | Action::LinksUpdated(_)
            | Action::ServersUpdated(_)
            | Action::ClientsUpdated(_)
            | Action::CandidatesUpdated(_)
            | Action::PingStarted { .. }
            | Action::Ping(_)
            | Action::StatsUpdated(_) => {
                if let Action::SceneUpdated { scene, .. } = action {
                    self.controller_online = scene.controller_online;
                }
                self.broadcast(action)?;
            }

            // ── Ping ──
            Action::RequestPing {
                source,
                destination,
            } => self.start_ping(source.clone(), destination.clone()),
            Action::CancelPing => self.ping_cancel.cancel(),

            // ── Host roles ──
            Action::RequestStartServer {
                host_name,
                video_path,
                weight,
            } => self.execute_command(Command::StartServer(StartServerRequest {
                host_name: host_name.clone(),
                video_path: video_path.clone(),
                weight: *weight,
            })),
            Action::RequestStartClient { host } => {
                self.execute_command(Command::StartClient { host: host.clone() });
            }
            Action::RequestStopRole { host } => {
                let store = self.controller.store();
                let confirm = if store.is_active_server(host) {
                    Some(ConfirmAction::StopServer {
                        host_name: host.clone(),
                    })
                } else if store.client_by_host(host).is_some() {
                    Some(ConfirmAction::StopClient { host: host.clone() })
                } else {
                    None
                };
                let follow_up = confirm.map_or_else(
                    || {
                        Action::Notify(Notification::warning(format!(
                            "{host} is neither a server nor a client"
                        )))
                    },
                    Action::ShowConfirm,
                );
                self.action_tx.send(follow_up)?;
            }
            Action::RequestStopServer { host_name } => {
                self.execute_command(Command::StopServer {
                    host_name: host_name.clone(),
                });
            }
            Action::RequestStopClient { host } => self.execute_command(Command::StopClient {
                host: host.clone(),
                pid: None,
            }),

            // ── Links ──
            Action::RequestCreateLink(req) => self.execute_command(Command::CreateLink(req.clone())),
            Action::RequestUpdateLink(req) => self.execute_command(Command::UpdateLink(req.clone())),
            Action::RequestDeleteLink { source, dest } => {
                self.execute_command(Command::DeleteLink {
                    source: *source,
                    dest: *dest,
                });
            }

            // ── Stats ──
            Action::RequestStats => {
                self.fetch_stats();
                if let Some(screen) = self.screens.get_mut(&ScreenId::Stats) {
                    screen.update(action)?;
                }
            }

            // ── Confirm dialog ──
            Action::ShowConfirm(confirm) => self.pending_confirm = Some(confirm.clone()),
            Action::ConfirmYes => {
                if let Some(confirm) = self.pending_confirm.take() {
                    self.action_tx.send(confirm_request(confirm))?;
                }
            }
            Action::ConfirmNo => self.pending_confirm = None,

            Action::Notify(n) => self.notification = Some((n.clone(), Instant::now())),
        }

        Ok(())
    }

    fn broadcast(&mut self, action: &Action) -> Result<()> {
        for screen in self.screens.values_mut() {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    /// Track which views are stale. Only the first failure of a view
    /// raises a toast; polling would otherwise repeat it every interval.
    fn note_reconcile(&mut self, event: &ReconcileEvent) -> Result<()> {
        match event {
            ReconcileEvent::Refreshed { target } => {
                if self.stale.remove(target).is_some() {
                    debug!(%target, "view recovered");
                }
            }
            ReconcileEvent::Superseded { target } => debug!(%target, "refresh superseded"),
            ReconcileEvent::Failed { target, message } => {
                let first = self.stale.insert(*target, message.clone()).is_none();
                if first {
                    self.action_tx.send(Action::Notify(Notification::error(format!(
                        "{target}: {message}"
                    ))))?;
                }
            }
        }
        Ok(())
    }

    // ── Background work ───────────────────────────────────────────

    /// Spawn a command execution task. Sends a Notify action on completion
    /// carrying the backend's own message.
    fn execute_command(&self, cmd: Command) {
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            match controller.execute(cmd).await {
                Ok(result) => {
                    let _ = tx.send(Action::Notify(Notification::success(result.summary())));
                }
                Err(e) => {
                    warn!(error = %e, "command execution failed");
                    let _ = tx.send(Action::Notify(Notification::error(e.user_message())));
                }
            }
        });
    }

    /// Start a ping, replacing any ping still running.
    fn start_ping(&mut self, source: MacAddress, destination: MacAddress) {
        self.ping_cancel.cancel();
        self.ping_cancel = CancellationToken::new();
        let cancel = self.ping_cancel.clone();
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();

        tokio::spawn(async move {
            let mut session = match controller.ping(source.as_str(), destination.as_str()).await {
                Ok(session) => session,
                Err(e) => {
                    warn!(error = %e, "ping did not start");
                    let _ = tx.send(Action::Notify(Notification::error(e.user_message())));
                    return;
                }
            };
            let _ = tx.send(Action::PingStarted {
                source: session.source().name.clone(),
                destination: session.destination().name.clone(),
            });

            let mut cancelled = false;
            loop {
                tokio::select! {
                    () = cancel.cancelled(), if !cancelled => {
                        session.cancel();
                        cancelled = true;
                    }
                    event = session.next_event() => {
                        let Some(event) = event else { break };
                        let finished = matches!(event, PingEvent::Finished);
                        let _ = tx.send(Action::Ping(event));
                        if finished {
                            break;
                        }
                    }
                }
            }
        });
    }

    /// Fetch every Stats section concurrently; a failing section does not
    /// hide the others.
    fn fetch_stats(&self) {
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let (config, summary, logs, comparison) = tokio::join!(
                controller.algorithm_config(),
                controller.stats_summary(),
                controller.event_logs(),
                controller.compare_algorithms(),
            );

            let mut data = StatsData::default();
            match config {
                Ok(c) => data.config = Some(c),
                Err(e) => data.errors.push(format!("algorithms: {}", e.user_message())),
            }
            match summary {
                Ok(rows) => data.summary = rows,
                Err(e) => data.errors.push(format!("event counts: {}", e.user_message())),
            }
            match logs {
                Ok(entries) => data.logs = entries,
                Err(e) => data.errors.push(format!("event log: {}", e.user_message())),
            }
            match comparison {
                Ok(c) => data.comparison = Some(c),
                Err(e) => data.errors.push(format!("latency: {}", e.user_message())),
            }
            let _ = tx.send(Action::StatsUpdated(Box::new(data)));
        });
    }

    // ── Rendering ─────────────────────────────────────────────────

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let [content_area, tab_area, status_area] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, content_area);
        }
        self.render_tab_bar(frame, tab_area);
        self.render_status_bar(frame, status_area);

        // Overlays, last = topmost
        if let Some((notif, _)) = &self.notification {
            render_notification(frame, area, notif);
        }
        if let Some(confirm) = &self.pending_confirm {
            render_confirm_dialog(frame, area, confirm);
        }
        if self.help_visible {
            render_help_overlay(frame, area);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = ScreenId::ALL
            .iter()
            .map(|&id| {
                let style = if id == self.active_screen {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                Line::from(Span::styled(
                    format!(" {} {} ", id.number(), id.label()),
                    style,
                ))
            })
            .collect();

        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(
                ScreenId::ALL
                    .iter()
                    .position(|&s| s == self.active_screen)
                    .unwrap_or(0),
            );
        frame.render_widget(tabs, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        let backend = match &self.connection_status {
            ConnectionStatus::Connected if self.stale.is_empty() => {
                Span::styled("● backend", Style::default().fg(theme::SUCCESS_GREEN))
            }
            ConnectionStatus::Connected => {
                Span::styled("◐ backend", Style::default().fg(theme::AMBER))
            }
            ConnectionStatus::Connecting => Span::styled(
                "◐ connecting",
                Style::default().fg(theme::ELECTRIC_YELLOW),
            ),
            ConnectionStatus::Disconnected => {
                Span::styled("○ disconnected", Style::default().fg(theme::ERROR_RED))
            }
        };
        let sdn = if self.controller_online {
            Span::styled("  ● controller", Style::default().fg(theme::SUCCESS_GREEN))
        } else {
            Span::styled("  ○ controller", Style::default().fg(theme::ERROR_RED))
        };

        let mut spans = vec![Span::raw(" "), backend, sdn];
        if !self.stale.is_empty() {
            let names: Vec<String> = self.stale.keys().map(ToString::to_string).collect();
            spans.push(Span::styled(
                format!("  stale: {}", names.join(", ")),
                Style::default().fg(theme::AMBER),
            ));
        }
        spans.push(Span::styled(
            format!("  │ {}", self.controller.config().backend_url),
            theme::key_hint(),
        ));
        spans.push(Span::styled("  │ ? help  q quit", theme::key_hint()));
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

/// The request a confirmed dialog stands for.
fn confirm_request(confirm: ConfirmAction) -> Action {
    match confirm {
        ConfirmAction::DeleteLink { source, dest } => Action::RequestDeleteLink { source, dest },
        ConfirmAction::StopServer { host_name } => Action::RequestStopServer { host_name },
        ConfirmAction::StopClient { host } => Action::RequestStopClient { host },
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect::new(x, y, width, height)
}

fn help_line(key: &'static str, text: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
        Span::styled(text, theme::key_hint()),
    ])
}

fn help_heading(title: &'static str) -> Line<'static> {
    Line::from(Span::styled(
        format!("  {title}"),
        Style::default().fg(theme::NEON_CYAN),
    ))
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let help_area = centered(area, 62, 30);
    frame.render_widget(Clear, help_area);

    let block = Block::default()
        .title(" Keyboard Shortcuts ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border_focused())
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(help_area);
    frame.render_widget(block, help_area);

    let help_text = vec![
        help_heading("Navigation"),
        help_line("1-5", "Jump to screen"),
        help_line("Tab", "Next / previous screen (Shift-Tab)"),
        help_line("j/k ↑/↓", "Move up / down"),
        help_line("g/G", "Top / bottom"),
        help_line("Esc", "Back / close"),
        Line::from(""),
        help_heading("Map"),
        help_line("←↑↓→ +/-", "Pan / zoom"),
        help_line("f / r", "Fit topology / reset view"),
        help_line("j/k", "Move host cursor"),
        help_line("Space", "Select host (two at most)"),
        help_line("u", "Clear selection"),
        help_line("p", "Ping between the two selected hosts"),
        help_line("s / c", "Start server / client on selected host"),
        help_line("x", "Stop the selected host's role"),
        help_line("Esc", "Cancel the running ping"),
        Line::from(""),
        help_heading("Tables"),
        help_line("n / e / d", "New / edit / delete link"),
        help_line("d", "Stop server or client"),
        help_line("h/l Enter", "Clients: switch pane, start client"),
        help_line("r", "Stats: refresh"),
        Line::from(""),
        help_line("? / q", "This help / quit"),
    ];
    frame.render_widget(Paragraph::new(help_text), inner);
}

fn render_confirm_dialog(frame: &mut Frame, area: Rect, confirm: &ConfirmAction) {
    let dialog_area = centered(area, 50, 5);
    frame.render_widget(Clear, dialog_area);

    let block = Block::default()
        .title(" Confirm ")
        .title_style(theme::title_style())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::ELECTRIC_YELLOW))
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(dialog_area);
    frame.render_widget(block, dialog_area);

    let text = vec![
        Line::from(Span::styled(
            format!("  {confirm}"),
            Style::default().fg(theme::DIM_WHITE),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("  y ", theme::key_hint_key()),
            Span::styled("confirm    ", theme::key_hint()),
            Span::styled("n ", theme::key_hint_key()),
            Span::styled("cancel", theme::key_hint()),
        ]),
    ];
    frame.render_widget(Paragraph::new(text), inner);
}

/// Toast in the bottom-right corner, above the status bar.
fn render_notification(frame: &mut Frame, area: Rect, notif: &Notification) {
    let msg_len = u16::try_from(notif.message.chars().count()).unwrap_or(u16::MAX);
    let width = msg_len.saturating_add(6).clamp(20, 70).min(area.width);
    let height = 3u16;

    let x = area.width.saturating_sub(width + 1);
    let y = area.height.saturating_sub(height + 2);
    let toast_area = Rect::new(area.x + x, area.y + y, width, height);

    let (border_color, icon) = match notif.level {
        NotificationLevel::Success => (theme::SUCCESS_GREEN, "✓"),
        NotificationLevel::Error => (theme::ERROR_RED, "✗"),
        NotificationLevel::Warning => (theme::ELECTRIC_YELLOW, "!"),
        NotificationLevel::Info => (theme::NEON_CYAN, "·"),
    };

    frame.render_widget(Clear, toast_area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(theme::BG_DARK));
    let inner = block.inner(toast_area);
    frame.render_widget(block, toast_area);

    let line = Line::from(vec![
        Span::styled(format!(" {icon} "), Style::default().fg(border_color)),
        Span::styled(notif.message.as_str(), Style::default().fg(theme::DIM_WHITE)),
    ]);
    frame.render_widget(Paragraph::new(line), inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmed_dialogs_map_to_requests() {
        assert!(matches!(
            confirm_request(ConfirmAction::DeleteLink { source: 1, dest: 2 }),
            Action::RequestDeleteLink { source: 1, dest: 2 }
        ));
        assert!(matches!(
            confirm_request(ConfirmAction::StopClient { host: "h3".into() }),
            Action::RequestStopClient { host } if host == "h3"
        ));
    }

    #[test]
    fn centered_rect_fits_small_terminals() {
        let area = Rect::new(0, 0, 30, 6);
        let rect = centered(area, 50, 5);
        assert!(rect.width <= 26);
        assert!(rect.right() <= area.right());
        assert!(rect.bottom() <= area.bottom());
    }
}
