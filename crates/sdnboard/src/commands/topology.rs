//! Topology command handlers.

use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;

use sdnboard_core::{Controller, Host, RoleIndex, Scene, Switch, Viewport};

use crate::cli::{GlobalOpts, TopologyArgs, TopologyCommand};
use crate::error::CliError;
use crate::output;

use super::util::or_dash;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct SwitchRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "DPID")]
    dpid: String,
    #[tabled(rename = "Lat")]
    lat: String,
    #[tabled(rename = "Lon")]
    lon: String,
    #[tabled(rename = "Status")]
    status: String,
}

fn switch_row(s: &Arc<Switch>, color: bool) -> SwitchRow {
    SwitchRow {
        id: s.id,
        name: s.name.clone(),
        dpid: or_dash(s.dpid()),
        lat: or_dash(s.latitude.map(|v| format!("{v:.4}"))),
        lon: or_dash(s.longitude.map(|v| format!("{v:.4}"))),
        status: output::paint_status(s.status, color),
    }
}

#[derive(Tabled)]
struct HostRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "Switch")]
    switch: String,
    #[tabled(rename = "Role")]
    role: String,
}

fn host_row(h: &Arc<Host>, roles: &RoleIndex) -> HostRow {
    HostRow {
        name: h.name.clone(),
        mac: h.mac.to_string(),
        ip: or_dash(h.ip.as_deref()),
        switch: or_dash(h.switch_id),
        role: roles.role_of(&h.name).to_string(),
    }
}

// ── Summary ─────────────────────────────────────────────────────────

#[derive(Serialize)]
struct TopologySummary {
    controller_online: bool,
    switches: usize,
    hosts: usize,
    links: usize,
    active_servers: usize,
    active_clients: usize,
    viewport: Viewport,
    warnings: Vec<String>,
}

impl TopologySummary {
    fn collect(controller: &Controller, scene: &Scene) -> Self {
        let store = controller.store();
        Self {
            controller_online: store.controller_online(),
            switches: store.switch_count(),
            hosts: store.host_count(),
            links: store.link_count(),
            active_servers: store.server_count(),
            active_clients: store.client_count(),
            viewport: scene.viewport,
            warnings: scene.warnings.iter().map(ToString::to_string).collect(),
        }
    }
}

fn describe_viewport(viewport: &Viewport) -> String {
    match viewport {
        Viewport::Default { center, zoom } => {
            format!("default ({:.2}, {:.2}) zoom {zoom}", center.lat, center.lon)
        }
        Viewport::Fit(b) => format!(
            "fit S {:.2} W {:.2} N {:.2} E {:.2}",
            b.south, b.west, b.north, b.east
        ),
    }
}

fn summary_detail(s: &TopologySummary, color: bool) -> String {
    let controller = if s.controller_online {
        output::paint_outcome(true, color) + " online"
    } else {
        output::paint_outcome(false, color) + " offline"
    };
    let mut lines = vec![
        format!("Controller:  {controller}"),
        format!("Switches:    {}", s.switches),
        format!("Hosts:       {}", s.hosts),
        format!("Links:       {}", s.links),
        format!("Servers:     {}", s.active_servers),
        format!("Clients:     {}", s.active_clients),
        format!("Viewport:    {}", describe_viewport(&s.viewport)),
    ];
    if !s.warnings.is_empty() {
        lines.push(String::new());
        lines.push("Not placed on the map:".into());
        lines.extend(s.warnings.iter().map(|w| format!("  - {w}")));
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: TopologyArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let color = output::should_color(&global.color);

    match args.command {
        TopologyCommand::Show => {
            let scene = controller.store().scene();
            let summary = TopologySummary::collect(controller, &scene);
            let out = output::render_single(
                &global.output,
                &summary,
                |s| summary_detail(s, color),
                |s| s.controller_online.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TopologyCommand::Switches => {
            let snap = controller.store().switches_snapshot();
            let out = output::render_list(
                &global.output,
                &snap,
                |s| switch_row(s, color),
                |s| s.id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TopologyCommand::Hosts => {
            let store = controller.store();
            let snap = store.hosts_snapshot();
            let roles = store.role_index();
            let out = output::render_list(
                &global.output,
                &snap,
                |h| host_row(h, &roles),
                |h| h.name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        TopologyCommand::Catalog => {
            let names = controller.host_catalog().await?;
            let out = output::render_single(
                &global.output,
                &names,
                |n| n.join("\n"),
                |n| n.join("\n"),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}
