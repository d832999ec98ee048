//! Map screen: the rendered topology on a canvas, host selection, and the
//! transcript of the running ping.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Context, Line as CanvasLine};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};
use tracing::debug;

use sdnboard_core::{
    ActiveClient, ActiveServer, Bounds, GeoPoint, MacAddress, PingEnd, PingEvent, RoleIndex,
    RouteOverlay, RoutePath, Scene, SelectionController, Topology, ToggleOutcome, Viewport,
};

use crate::action::{Action, Notification};
use crate::component::Component;
use crate::theme;
use crate::widgets::form::{Form, FormOutcome};

/// Share of the visible span moved per pan key.
const PAN_STEP: f64 = 0.1;
const ZOOM_STEP: f64 = 1.25;
const MIN_SPAN: f64 = 0.0005;
const TRANSCRIPT_LIMIT: usize = 500;
const SIDE_PANEL_WIDTH: u16 = 40;

// ── View ────────────────────────────────────────────────────────────

/// Visible box of the canvas, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
struct MapView {
    center: GeoPoint,
    lat_span: f64,
    lon_span: f64,
}

impl MapView {
    fn from_bounds(bounds: Bounds) -> Self {
        Self {
            center: bounds.center(),
            lat_span: bounds.lat_span().max(MIN_SPAN),
            lon_span: bounds.lon_span().max(MIN_SPAN),
        }
    }

    fn pan(&mut self, east: f64, north: f64) {
        self.center.lon += east * self.lon_span * PAN_STEP;
        self.center.lat += north * self.lat_span * PAN_STEP;
    }

    fn zoom(&mut self, factor: f64) {
        self.lat_span = (self.lat_span / factor).clamp(MIN_SPAN, 180.0);
        self.lon_span = (self.lon_span / factor).clamp(MIN_SPAN, 360.0);
    }

    fn x_bounds(&self) -> [f64; 2] {
        let half = self.lon_span / 2.0;
        [self.center.lon - half, self.center.lon + half]
    }

    fn y_bounds(&self) -> [f64; 2] {
        let half = self.lat_span / 2.0;
        [self.center.lat - half, self.center.lat + half]
    }
}

// ── Ping transcript ─────────────────────────────────────────────────

#[derive(Debug, Default)]
struct PingPanel {
    title: Option<String>,
    lines: Vec<String>,
    running: bool,
    route: Option<RoutePath>,
    overlay: Option<RouteOverlay>,
}

impl PingPanel {
    fn start(&mut self, source: &str, destination: &str) {
        self.title = Some(format!("{source} → {destination}"));
        self.lines.clear();
        self.running = true;
        self.route = None;
        self.overlay = None;
    }

    fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
        if self.lines.len() > TRANSCRIPT_LIMIT {
            let excess = self.lines.len() - TRANSCRIPT_LIMIT;
            self.lines.drain(..excess);
        }
    }

    /// Fold one event into the panel. Returns a toast for the events that
    /// deserve one.
    fn apply(&mut self, event: &PingEvent) -> Option<Notification> {
        match event {
            PingEvent::Line(line) => self.push(line.clone()),
            PingEvent::Closed(end) => match end {
                PingEnd::Sentinel | PingEnd::EndOfStream => self.push("── ping finished ──"),
                PingEnd::Cancelled => self.push("── ping cancelled ──"),
                PingEnd::StreamError(e) => {
                    self.push(format!("── stream error: {e} ──"));
                    return Some(Notification::error(e.clone()));
                }
            },
            PingEvent::Route { path, overlay } => {
                let hops: Vec<String> = path.hops.iter().map(|h| h.dpid.to_string()).collect();
                self.push(format!("path: {}", hops.join(" → ")));
                if !overlay.unresolved.is_empty() {
                    self.push(format!(
                        "{} hop(s) not on the map",
                        overlay.unresolved.len()
                    ));
                }
                self.route = Some(path.clone());
                self.overlay = Some(overlay.clone());
            }
            PingEvent::RouteFailed(message) => {
                self.push(format!("path: {message}"));
                return Some(Notification::error(message.clone()));
            }
            PingEvent::RouteInstalled(message) => {
                self.push(format!("flows: {message}"));
                return Some(Notification::success(message.clone()));
            }
            PingEvent::RouteInstallFailed(message) => {
                self.push(format!("flows: {message}"));
                return Some(Notification::warning(message.clone()));
            }
            PingEvent::Finished => self.running = false,
        }
        None
    }
}

// ── Screen ──────────────────────────────────────────────────────────

pub struct MapScreen {
    focused: bool,
    scene: Arc<Scene>,
    topology: Arc<Topology>,
    servers: Arc<Vec<Arc<ActiveServer>>>,
    clients: Arc<Vec<Arc<ActiveClient>>>,
    roles: RoleIndex,
    selection: SelectionController,
    cursor: Option<MacAddress>,
    view: MapView,
    /// Set once the user pans or zooms; new scenes then keep the view.
    view_pinned: bool,
    ping: PingPanel,
    server_form: Option<(String, Form)>,
}

impl MapScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            scene: Arc::new(Scene::default()),
            topology: Arc::new(Topology::default()),
            servers: Arc::new(Vec::new()),
            clients: Arc::new(Vec::new()),
            roles: RoleIndex::default(),
            selection: SelectionController::new(),
            cursor: None,
            view: MapView::from_bounds(Viewport::default().bounds()),
            view_pinned: false,
            ping: PingPanel::default(),
            server_form: None,
        }
    }

    fn rebuild_roles(&mut self) {
        self.roles = RoleIndex::new(
            self.servers.iter().map(AsRef::as_ref),
            self.clients.iter().map(AsRef::as_ref),
        );
    }

    fn cursor_index(&self) -> Option<usize> {
        let mac = self.cursor.as_ref()?;
        self.scene.hosts.iter().position(|h| &h.mac == mac)
    }

    fn move_cursor(&mut self, forward: bool) {
        let len = self.scene.hosts.len();
        if len == 0 {
            self.cursor = None;
            return;
        }
        let next = match self.cursor_index() {
            None => 0,
            Some(i) if forward => (i + 1) % len,
            Some(i) => (i + len - 1) % len,
        };
        self.cursor = self.scene.hosts.get(next).map(|h| h.mac.clone());
    }

    fn host_name(&self, mac: &MacAddress) -> Option<String> {
        self.topology.host(mac).map(|h| h.name.clone())
    }

    fn toggle_cursor(&mut self) -> Option<Action> {
        let mac = self.cursor.clone()?;
        match self.selection.toggle_host(&mac) {
            ToggleOutcome::Replaced { evicted } => {
                let name = self.host_name(&evicted).unwrap_or_else(|| evicted.to_string());
                Some(Action::Notify(Notification::info(format!(
                    "{name} deselected (two hosts at most)"
                ))))
            }
            ToggleOutcome::Selected | ToggleOutcome::Deselected => None,
        }
    }

    /// Resolve the single selected host for a host action.
    fn single_host(&self, action: &'static str) -> Result<String, Action> {
        let mac = self
            .selection
            .require_single(action)
            .map_err(|e| Action::Notify(Notification::error(e.to_string())))?;
        self.host_name(&mac).ok_or_else(|| {
            Action::Notify(Notification::error(format!("host {mac} is no longer known")))
        })
    }

    fn open_server_form(&mut self) -> Option<Action> {
        match self.single_host("start server") {
            Ok(host) => {
                let form = Form::new(format!("Start server on {host}"))
                    .field("Video path", "")
                    .field("Weight", "1");
                self.server_form = Some((host, form));
                None
            }
            Err(action) => Some(action),
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Option<Action> {
        let (host, form) = self.server_form.as_mut()?;
        match form.handle_key(key) {
            FormOutcome::Editing => None,
            FormOutcome::Cancelled => {
                self.server_form = None;
                None
            }
            FormOutcome::Submitted => {
                let video_path = form.value(0).to_owned();
                if video_path.is_empty() {
                    form.set_error("video path is required");
                    return None;
                }
                let weight = match form.value(1).parse::<u32>() {
                    Ok(w) if w >= 1 => w,
                    _ => {
                        form.set_error("weight must be a whole number of at least 1");
                        return None;
                    }
                };
                let host_name = host.clone();
                self.server_form = None;
                Some(Action::RequestStartServer {
                    host_name,
                    video_path,
                    weight,
                })
            }
        }
    }

    fn apply_scene(&mut self, scene: &Arc<Scene>, topology: &Arc<Topology>) {
        self.scene = Arc::clone(scene);
        self.topology = Arc::clone(topology);
        let removed = self.selection.retain_known(&self.topology);
        if !removed.is_empty() {
            debug!(count = removed.len(), "dropped vanished hosts from the selection");
        }
        if self.cursor_index().is_none() {
            self.cursor = self.scene.hosts.first().map(|h| h.mac.clone());
        }
        if !self.view_pinned {
            self.view = MapView::from_bounds(self.scene.viewport.bounds());
        }
        if let Some(route) = &self.ping.route {
            self.ping.overlay = Some(self.scene.route_overlay(route));
        }
    }

    // ── Rendering ───────────────────────────────────────────────────

    fn paint(&self, ctx: &mut Context<'_>) {
        let scene = &self.scene;

        for link in &scene.links {
            ctx.draw(&CanvasLine {
                x1: link.from.lon,
                y1: link.from.lat,
                x2: link.to.lon,
                y2: link.to.lat,
                color: theme::tier_color(link.tier),
            });
        }
        for host in &scene.hosts {
            ctx.draw(&CanvasLine {
                x1: host.anchor.lon,
                y1: host.anchor.lat,
                x2: host.position.lon,
                y2: host.position.lat,
                color: theme::BORDER_GRAY,
            });
        }

        if let Some(overlay) = &self.ping.overlay {
            ctx.layer();
            for pair in overlay.points.windows(2) {
                ctx.draw(&CanvasLine {
                    x1: pair[0].lon,
                    y1: pair[0].lat,
                    x2: pair[1].lon,
                    y2: pair[1].lat,
                    color: theme::ROUTE,
                });
            }
        }

        ctx.layer();
        for switch in &scene.switches {
            let color = theme::switch_color(switch.status);
            ctx.print(
                switch.position.lon,
                switch.position.lat,
                Span::styled(
                    format!("■ {}", switch.name),
                    Style::default().fg(color).add_modifier(Modifier::BOLD),
                ),
            );
        }

        let cursor = self.cursor.as_ref();
        for host in &scene.hosts {
            let role = self.selection.displayed_role(&host.mac, &host.name, &self.roles);
            let (glyph, color) = theme::host_marker(role);
            let mut style = Style::default().fg(color);
            let text = if cursor == Some(&host.mac) {
                style = style.bg(theme::BG_HIGHLIGHT).add_modifier(Modifier::BOLD);
                format!("{glyph} {}", host.name)
            } else {
                glyph.to_owned()
            };
            ctx.print(host.position.lon, host.position.lat, Span::styled(text, style));
        }
    }

    fn render_details(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(" Hosts ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_default());

        let mut lines = vec![Line::from(Span::styled(
            format!(" Selected {}/2", self.selection.len()),
            theme::table_header(),
        ))];
        for mac in self.selection.selection() {
            lines.push(self.host_line(mac));
        }
        lines.push(Line::default());
        if let Some(mac) = &self.cursor {
            lines.push(Line::from(Span::styled(" Cursor", theme::table_header())));
            lines.push(self.host_line(mac));
        }
        if !self.scene.warnings.is_empty() {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled(
                format!(" {} item(s) not placed", self.scene.warnings.len()),
                Style::default().fg(theme::AMBER),
            )));
        }

        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn host_line(&self, mac: &MacAddress) -> Line<'static> {
        let Some(host) = self.scene.host(mac) else {
            return Line::from(Span::styled(format!("  {mac}"), theme::key_hint()));
        };
        let role = self.selection.displayed_role(mac, &host.name, &self.roles);
        let (glyph, color) = theme::host_marker(role);
        let switch = self
            .scene
            .switch(host.switch_id)
            .map_or_else(|| host.switch_id.to_string(), |s| s.name.clone());
        Line::from(vec![
            Span::styled(format!("  {glyph} "), Style::default().fg(color)),
            Span::styled(host.name.clone(), theme::table_row()),
            Span::styled(
                format!("  {}  @{switch}", host.ip.as_deref().unwrap_or("-")),
                theme::key_hint(),
            ),
        ])
    }

    fn render_transcript(&self, frame: &mut Frame, area: Rect) {
        let title = match (&self.ping.title, self.ping.running) {
            (Some(t), true) => format!(" Ping {t} … "),
            (Some(t), false) => format!(" Ping {t} "),
            (None, _) => " Ping ".to_owned(),
        };
        let block = Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.ping.running {
                theme::border_focused()
            } else {
                theme::border_default()
            });
        let inner_height = usize::from(area.height.saturating_sub(2));
        let skip = self.ping.lines.len().saturating_sub(inner_height);
        let lines: Vec<Line> = self
            .ping
            .lines
            .iter()
            .skip(skip)
            .map(|l| Line::from(Span::styled(l.clone(), theme::table_row())))
            .collect();
        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
            area,
        );
    }
}

impl Default for MapScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for MapScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.server_form.is_some() {
            return Ok(self.handle_form_key(key));
        }

        let action = match key.code {
            KeyCode::Left => {
                self.view.pan(-1.0, 0.0);
                self.view_pinned = true;
                None
            }
            KeyCode::Right => {
                self.view.pan(1.0, 0.0);
                self.view_pinned = true;
                None
            }
            KeyCode::Up => {
                self.view.pan(0.0, 1.0);
                self.view_pinned = true;
                None
            }
            KeyCode::Down => {
                self.view.pan(0.0, -1.0);
                self.view_pinned = true;
                None
            }
            KeyCode::Char('+' | '=') => {
                self.view.zoom(ZOOM_STEP);
                self.view_pinned = true;
                None
            }
            KeyCode::Char('-') => {
                self.view.zoom(1.0 / ZOOM_STEP);
                self.view_pinned = true;
                None
            }
            KeyCode::Char('f') => {
                self.view = MapView::from_bounds(self.scene.viewport.bounds());
                self.view_pinned = false;
                None
            }
            KeyCode::Char('r') => {
                self.view = MapView::from_bounds(Viewport::default().bounds());
                self.view_pinned = true;
                None
            }
            KeyCode::Char('j' | 'n') => {
                self.move_cursor(true);
                None
            }
            KeyCode::Char('k' | 'N') => {
                self.move_cursor(false);
                None
            }
            KeyCode::Char(' ') => self.toggle_cursor(),
            KeyCode::Char('u') => {
                self.selection.clear();
                None
            }
            KeyCode::Char('p') => Some(match self.selection.require_pair() {
                Ok((source, destination)) => Action::RequestPing {
                    source,
                    destination,
                },
                Err(e) => Action::Notify(Notification::error(e.to_string())),
            }),
            KeyCode::Char('s') => self.open_server_form(),
            KeyCode::Char('c') => Some(match self.single_host("start client") {
                Ok(host) => Action::RequestStartClient { host },
                Err(action) => action,
            }),
            KeyCode::Char('x') => Some(match self.single_host("stop") {
                Ok(host) => Action::RequestStopRole { host },
                Err(action) => action,
            }),
            KeyCode::Esc if self.ping.running => Some(Action::CancelPing),
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::SceneUpdated { scene, topology } => self.apply_scene(scene, topology),
            Action::ServersUpdated(servers) => {
                self.servers = Arc::clone(servers);
                self.rebuild_roles();
            }
            Action::ClientsUpdated(clients) => {
                self.clients = Arc::clone(clients);
                self.rebuild_roles();
            }
            Action::PingStarted {
                source,
                destination,
            } => self.ping.start(source, destination),
            Action::Ping(event) => {
                return Ok(self.ping.apply(event).map(Action::Notify));
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let [body, hints_area] =
            Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(area);
        let side_width = if body.width > SIDE_PANEL_WIDTH * 2 {
            SIDE_PANEL_WIDTH
        } else {
            0
        };
        let [map_area, side_area] =
            Layout::horizontal([Constraint::Min(10), Constraint::Length(side_width)]).areas(body);

        let controller = if self.scene.controller_online {
            Span::styled("controller online", Style::default().fg(theme::SUCCESS_GREEN))
        } else {
            Span::styled("controller offline", Style::default().fg(theme::ERROR_RED))
        };
        let block = Block::default()
            .title(Line::from(vec![
                Span::styled(" Map  ·  ", theme::title_style()),
                Span::styled(
                    format!(
                        "{} switches  {} hosts  {} links  ·  ",
                        self.scene.switches.len(),
                        self.scene.hosts.len(),
                        self.scene.links.len()
                    ),
                    theme::key_hint(),
                ),
                controller,
                Span::raw(" "),
            ]))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });

        let canvas = Canvas::default()
            .block(block)
            .marker(Marker::Braille)
            .x_bounds(self.view.x_bounds())
            .y_bounds(self.view.y_bounds())
            .paint(|ctx| self.paint(ctx));
        frame.render_widget(canvas, map_area);

        if side_width > 0 {
            let [details, transcript] =
                Layout::vertical([Constraint::Length(11), Constraint::Min(3)]).areas(side_area);
            self.render_details(frame, details);
            self.render_transcript(frame, transcript);
        }

        let hints = Line::from(vec![
            Span::styled(" ←↑↓→ ", theme::key_hint_key()),
            Span::styled("pan  ", theme::key_hint()),
            Span::styled("+/- ", theme::key_hint_key()),
            Span::styled("zoom  ", theme::key_hint()),
            Span::styled("f ", theme::key_hint_key()),
            Span::styled("fit  ", theme::key_hint()),
            Span::styled("j/k ", theme::key_hint_key()),
            Span::styled("host  ", theme::key_hint()),
            Span::styled("Space ", theme::key_hint_key()),
            Span::styled("select  ", theme::key_hint()),
            Span::styled("p ", theme::key_hint_key()),
            Span::styled("ping  ", theme::key_hint()),
            Span::styled("s/c ", theme::key_hint_key()),
            Span::styled("server/client  ", theme::key_hint()),
            Span::styled("x ", theme::key_hint_key()),
            Span::styled("stop", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), hints_area);

        if let Some((_, form)) = &self.server_form {
            form.render(frame, area);
        }
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn captures_input(&self) -> bool {
        self.server_form.is_some()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use sdnboard_core::{Host, HostLayout, Switch, SwitchStatus, TopologyRenderer};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn host(n: u8) -> Host {
        Host {
            mac: MacAddress::new(format!("00:00:00:00:00:{n:02x}")),
            name: format!("h{n}"),
            ip: Some(format!("10.0.0.{n}")),
            switch_id: Some(1),
        }
    }

    fn topology(hosts: &[u8]) -> Arc<Topology> {
        Arc::new(Topology {
            switches: vec![Switch {
                id: 1,
                name: "s1".into(),
                dpid_hex: Some("0000000000000001".into()),
                latitude: Some(52.37),
                longitude: Some(4.89),
                status: SwitchStatus::Connected,
            }],
            hosts: hosts.iter().copied().map(host).collect(),
            links: Vec::new(),
        })
    }

    fn screen_with(hosts: &[u8]) -> MapScreen {
        let topology = topology(hosts);
        let scene = Arc::new(TopologyRenderer::new(HostLayout::FanOut).render(&topology));
        let mut screen = MapScreen::new();
        screen
            .update(&Action::SceneUpdated { scene, topology })
            .unwrap();
        screen
    }

    fn select_next(screen: &mut MapScreen) -> Option<Action> {
        let action = screen.handle_key_event(key(KeyCode::Char(' '))).unwrap();
        screen.handle_key_event(key(KeyCode::Char('j'))).unwrap();
        action
    }

    #[test]
    fn ping_needs_two_hosts() {
        let mut screen = screen_with(&[1, 2, 3]);
        select_next(&mut screen);
        let action = screen.handle_key_event(key(KeyCode::Char('p'))).unwrap();
        assert!(matches!(action, Some(Action::Notify(n)) if n.message.contains("exactly 2")));

        select_next(&mut screen);
        let action = screen.handle_key_event(key(KeyCode::Char('p'))).unwrap();
        assert!(matches!(action, Some(Action::RequestPing { .. })));
    }

    #[test]
    fn third_selection_evicts_the_oldest() {
        let mut screen = screen_with(&[1, 2, 3]);
        let first = screen.scene.hosts[0].name.clone();
        assert!(select_next(&mut screen).is_none());
        assert!(select_next(&mut screen).is_none());
        let action = select_next(&mut screen);
        assert!(matches!(action, Some(Action::Notify(n)) if n.message.starts_with(&first)));
        assert_eq!(screen.selection.len(), 2);
    }

    #[test]
    fn vanished_hosts_leave_the_selection() {
        let mut screen = screen_with(&[1, 2]);
        select_next(&mut screen);
        select_next(&mut screen);
        let topology = topology(&[2]);
        let scene = Arc::new(TopologyRenderer::new(HostLayout::FanOut).render(&topology));
        screen
            .update(&Action::SceneUpdated { scene, topology })
            .unwrap();
        assert_eq!(
            screen.selection.selection(),
            &[MacAddress::new("00:00:00:00:00:02")]
        );
    }

    #[test]
    fn server_form_validates_weight() {
        let mut screen = screen_with(&[1]);
        select_next(&mut screen);
        assert!(screen.handle_key_event(key(KeyCode::Char('s'))).unwrap().is_none());
        assert!(screen.captures_input());

        for c in "/videos/a.mp4".chars() {
            screen.handle_key_event(key(KeyCode::Char(c))).unwrap();
        }
        screen.handle_key_event(key(KeyCode::Tab)).unwrap();
        screen.handle_key_event(key(KeyCode::Backspace)).unwrap();
        screen.handle_key_event(key(KeyCode::Char('0'))).unwrap();
        assert!(screen.handle_key_event(key(KeyCode::Enter)).unwrap().is_none());
        assert!(screen.captures_input());

        screen.handle_key_event(key(KeyCode::Backspace)).unwrap();
        screen.handle_key_event(key(KeyCode::Char('3'))).unwrap();
        let action = screen.handle_key_event(key(KeyCode::Enter)).unwrap();
        match action {
            Some(Action::RequestStartServer {
                host_name,
                video_path,
                weight,
            }) => {
                assert_eq!(host_name, "h1");
                assert_eq!(video_path, "/videos/a.mp4");
                assert_eq!(weight, 3);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(!screen.captures_input());
    }

    #[test]
    fn zoom_and_pan_move_the_view() {
        let mut view = MapView::from_bounds(Bounds {
            south: 0.0,
            west: 0.0,
            north: 10.0,
            east: 20.0,
        });
        view.pan(1.0, 0.0);
        assert!((view.center.lon - 12.0).abs() < 1e-9);
        view.zoom(2.0);
        assert!((view.lon_span - 10.0).abs() < 1e-9);
        assert!((view.x_bounds()[0] - 7.0).abs() < 1e-9);
    }

    #[test]
    fn ping_transcript_collects_lines_and_route_errors() {
        let mut panel = PingPanel::default();
        panel.start("h1", "h2");
        assert!(panel.apply(&PingEvent::Line("64 bytes".into())).is_none());
        let toast = panel.apply(&PingEvent::RouteFailed("no path".into()));
        assert_eq!(toast.unwrap().message, "no path");
        panel.apply(&PingEvent::Finished);
        assert!(!panel.running);
        assert_eq!(panel.lines.len(), 2);
    }
}
