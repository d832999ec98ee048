//! Video client command handlers.

use std::sync::Arc;

use tabled::Tabled;

use sdnboard_core::{ActiveClient, Command as CoreCommand, CommandResult, Controller};

use crate::cli::{ClientsArgs, ClientsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util::or_dash;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "Server")]
    server: String,
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Video")]
    video: String,
    #[tabled(rename = "Started")]
    started: String,
}

impl From<&Arc<ActiveClient>> for ClientRow {
    fn from(c: &Arc<ActiveClient>) -> Self {
        let group = match (&c.destination_ip, c.port) {
            (Some(ip), Some(port)) => format!("{ip}:{port}"),
            (Some(ip), None) => ip.clone(),
            _ => "-".into(),
        };
        Self {
            host: c.host.clone(),
            server: or_dash(c.server.as_deref()),
            group,
            video: or_dash(c.video.as_deref()),
            started: or_dash(
                c.started_at_utc()
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string()),
            ),
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: ClientsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        ClientsCommand::List => {
            let snap = controller.store().clients_snapshot();
            let out = output::render_list(
                &global.output,
                &snap,
                |c| ClientRow::from(c),
                |c| c.host.clone(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ClientsCommand::Candidates => {
            let candidates = controller.store().client_candidates();
            let out = output::render_single(
                &global.output,
                candidates.as_slice(),
                |c| c.join("\n"),
                |c| c.join("\n"),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ClientsCommand::Start { host } => {
            let result = controller
                .execute(CoreCommand::StartClient { host })
                .await?;
            match result {
                CommandResult::ClientStarted(started) => {
                    let out = output::render_single(
                        &global.output,
                        &started,
                        |s| {
                            let mut lines = vec![
                                format!("Host:      {}", s.host),
                                format!("Server:    {}", s.assignment.server_host),
                                format!(
                                    "Group:     {}:{}",
                                    s.assignment.multicast_ip, s.assignment.multicast_port
                                ),
                            ];
                            if let Some(pid) = s.player_pid {
                                lines.push(format!("PID:       {pid}"));
                            }
                            lines.push(format!("Message:   {}", s.message));
                            lines.join("\n")
                        },
                        |s| s.host.clone(),
                    );
                    output::print_output(&out, global.quiet);
                }
                other => output::notice(&other.summary(), global.quiet),
            }
            Ok(())
        }

        ClientsCommand::Stop { host, pid } => {
            let result = controller
                .execute(CoreCommand::StopClient { host, pid })
                .await?;
            output::notice(&result.summary(), global.quiet);
            Ok(())
        }
    }
}
