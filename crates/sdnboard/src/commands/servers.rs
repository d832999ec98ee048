//! Video server command handlers.

use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use tabled::Tabled;

use sdnboard_core::{ActiveServer, Command as CoreCommand, Controller};

use crate::cli::{GlobalOpts, ServersArgs, ServersCommand};
use crate::error::CliError;
use crate::output;

use super::util::{self, or_dash};

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ServerRow {
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "Video")]
    video: String,
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Weight")]
    weight: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Updated")]
    updated: String,
}

impl From<&Arc<ActiveServer>> for ServerRow {
    fn from(s: &Arc<ActiveServer>) -> Self {
        Self {
            host: s.host_name.clone(),
            video: or_dash(s.video_path.as_deref()),
            group: or_dash(s.group()),
            weight: or_dash(s.weight),
            status: or_dash(s.status.as_deref()),
            updated: or_dash(
                s.last_updated_at()
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string()),
            ),
        }
    }
}

fn spinner(message: String, quiet: bool) -> Option<ProgressBar> {
    if quiet {
        return None;
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(100));
    Some(bar)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: ServersArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ServersCommand::List => {
            let snap = controller.store().servers_snapshot();
            let out = output::render_list(
                &global.output,
                &snap,
                |s| ServerRow::from(s),
                |s| s.host_name.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ServersCommand::Start {
            hosts,
            video,
            weight,
        } => {
            let total = hosts.len();
            let bar = spinner(format!("Starting {total} server(s)"), global.quiet);
            let report = controller.start_servers(hosts, video, weight).await;
            if let Some(bar) = bar {
                bar.finish_and_clear();
            }
            let report = report?;

            let color = output::should_color(&global.color);
            for outcome in &report.outcomes {
                let line = match &outcome.outcome {
                    Ok(started) => format!(
                        "{} {}: {}:{}",
                        output::paint_outcome(true, color),
                        outcome.host,
                        started.multicast_ip,
                        started.multicast_port
                    ),
                    Err(message) => format!(
                        "{} {}: {message}",
                        output::paint_outcome(false, color),
                        outcome.host
                    ),
                };
                output::notice(&line, global.quiet);
            }

            let failed = report.failed().count();
            if failed > 0 {
                return Err(CliError::PartialFailure { failed, total });
            }
            Ok(())
        }

        ServersCommand::Stop { host } => {
            if !util::confirm(&format!("Stop the server on {host}?"), global.yes)? {
                return Ok(());
            }
            let result = controller
                .execute(CoreCommand::StopServer { host_name: host })
                .await?;
            output::notice(&result.summary(), global.quiet);
            Ok(())
        }
    }
}
