//! Link command handlers.

use tabled::Tabled;

use sdnboard_core::{Command as CoreCommand, Controller, LinkLine, LinkRequest};

use crate::cli::{GlobalOpts, LinksArgs, LinksCommand};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct LinkRow {
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Dest")]
    dest: String,
    #[tabled(rename = "Mbps")]
    bandwidth: u32,
    #[tabled(rename = "Tier")]
    tier: String,
}

fn link_row(line: &LinkLine, names: &impl Fn(i64) -> String, color: bool) -> LinkRow {
    LinkRow {
        source: names(line.source),
        dest: names(line.dest),
        bandwidth: line.bandwidth_mbps,
        tier: output::paint_tier(line.tier, color),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: LinksArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        LinksCommand::List => {
            let color = output::should_color(&global.color);
            // Only links with both endpoints placed are part of the scene.
            let scene = controller.store().scene();
            let store = controller.store();
            let names = |id: i64| {
                store
                    .switch_by_id(id)
                    .map_or_else(|| id.to_string(), |s| format!("{} ({id})", s.name))
            };
            let out = output::render_list(
                &global.output,
                &scene.links,
                |l| link_row(l, &names, color),
                |l| format!("{}-{}", l.source, l.dest),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        LinksCommand::Create {
            source,
            dest,
            bandwidth,
        } => {
            let result = controller
                .execute(CoreCommand::CreateLink(LinkRequest {
                    source,
                    dest,
                    bandwidth_mbps: bandwidth,
                }))
                .await?;
            output::notice(&result.summary(), global.quiet);
            Ok(())
        }

        LinksCommand::Update {
            source,
            dest,
            bandwidth,
        } => {
            let result = controller
                .execute(CoreCommand::UpdateLink(LinkRequest {
                    source,
                    dest,
                    bandwidth_mbps: bandwidth,
                }))
                .await?;
            output::notice(&result.summary(), global.quiet);
            Ok(())
        }

        LinksCommand::Delete { source, dest } => {
            if !util::confirm(&format!("Delete link {source}-{dest}?"), global.yes)? {
                return Ok(());
            }
            let result = controller
                .execute(CoreCommand::DeleteLink { source, dest })
                .await?;
            output::notice(&result.summary(), global.quiet);
            Ok(())
        }
    }
}
