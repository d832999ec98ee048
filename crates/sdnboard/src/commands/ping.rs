//! Ping handler: streams the transcript, then shows the computed route.

use serde::Serialize;
use tabled::Tabled;

use sdnboard_core::{Controller, Dpid, PingEnd, PingEvent, RouteOverlay, RoutePath};

use crate::cli::{GlobalOpts, OutputFormat, PingArgs};
use crate::error::CliError;
use crate::output;

use super::util::or_dash;

// ── Report ──────────────────────────────────────────────────────────

#[derive(Debug, Default, Serialize)]
struct PingReport {
    source: String,
    destination: String,
    transcript: Vec<String>,
    ended: Option<String>,
    route: Option<RoutePath>,
    overlay: Option<RouteOverlay>,
    route_error: Option<String>,
    install: Option<String>,
}

#[derive(Tabled)]
struct HopRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "DPID")]
    dpid: String,
    #[tabled(rename = "Switch")]
    switch: String,
    #[tabled(rename = "In")]
    in_port: String,
    #[tabled(rename = "Out")]
    out_port: String,
}

fn describe_end(end: &PingEnd) -> String {
    match end {
        PingEnd::Sentinel => "completed".into(),
        PingEnd::EndOfStream => "stream ended".into(),
        PingEnd::StreamError(reason) => format!("stream error: {reason}"),
        PingEnd::Cancelled => "cancelled".into(),
    }
}

fn hop_rows(controller: &Controller, route: &RoutePath) -> Vec<HopRow> {
    let switches = controller.store().switches_snapshot();
    let name_of = |dpid: Dpid| {
        switches
            .iter()
            .find(|s| s.dpid() == Some(dpid))
            .map(|s| s.name.clone())
    };
    route
        .hops
        .iter()
        .enumerate()
        .map(|(i, hop)| HopRow {
            index: i + 1,
            dpid: hop.dpid.to_string(),
            switch: or_dash(name_of(hop.dpid)),
            in_port: or_dash(hop.in_port),
            out_port: or_dash(hop.out_port),
        })
        .collect()
}

fn route_detail(controller: &Controller, report: &PingReport) -> String {
    let mut lines = Vec::new();
    if let Some(ended) = &report.ended {
        lines.push(format!("Ping {ended}."));
    }
    match (&report.route, &report.route_error) {
        (Some(route), _) if route.is_empty() => lines.push("No route between the hosts.".into()),
        (Some(route), _) => {
            lines.push(format!(
                "Route {} -> {} ({} hops):",
                report.source,
                report.destination,
                route.hops.len()
            ));
            lines.push(output::render_table(&hop_rows(controller, route)));
            if let Some(overlay) = report.overlay.as_ref().filter(|o| !o.unresolved.is_empty()) {
                let missing: Vec<String> =
                    overlay.unresolved.iter().map(ToString::to_string).collect();
                lines.push(format!("Not on the map: {}", missing.join(", ")));
            }
        }
        (None, Some(error)) => lines.push(format!("Route unavailable: {error}")),
        (None, None) => {}
    }
    if let Some(install) = &report.install {
        lines.push(install.clone());
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: PingArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let mut session = controller.ping(&args.source, &args.destination).await?;
    let live = matches!(global.output, OutputFormat::Table | OutputFormat::Plain);

    let mut report = PingReport {
        source: session.source().name.clone(),
        destination: session.destination().name.clone(),
        ..PingReport::default()
    };

    loop {
        let event = tokio::select! {
            event = session.next_event() => event,
            _ = tokio::signal::ctrl_c() => {
                session.cancel();
                continue;
            }
        };
        let Some(event) = event else { break };

        match event {
            PingEvent::Line(line) => {
                if live {
                    output::print_output(&line, global.quiet);
                }
                report.transcript.push(line);
            }
            PingEvent::Closed(end) => report.ended = Some(describe_end(&end)),
            PingEvent::Route { path, overlay } => {
                report.route = Some(path);
                report.overlay = Some(overlay);
            }
            PingEvent::RouteFailed(message) => report.route_error = Some(message),
            PingEvent::RouteInstalled(message) => {
                report.install = Some(format!("Route installed: {message}"));
            }
            PingEvent::RouteInstallFailed(message) => {
                report.install = Some(format!("Route install failed: {message}"));
            }
            PingEvent::Finished => break,
        }
    }

    let out = match global.output {
        OutputFormat::Plain => String::new(),
        _ => output::render_single(
            &global.output,
            &report,
            |r| route_detail(controller, r),
            |_| String::new(),
        ),
    };
    output::print_output(&out, global.quiet);

    match report.route_error {
        Some(message) => Err(CliError::Rejected { message }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ends_are_described_for_humans() {
        assert_eq!(describe_end(&PingEnd::Sentinel), "completed");
        assert_eq!(
            describe_end(&PingEnd::StreamError("reset".into())),
            "stream error: reset"
        );
    }
}
