//! Command dispatch: bridges CLI args -> core Commands -> output formatting.

pub mod algorithms;
pub mod clients;
pub mod config_cmd;
pub mod links;
pub mod ping;
pub mod rules;
pub mod servers;
pub mod stats;
pub mod topology;
pub mod util;

use sdnboard_core::Controller;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a testbed-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Topology(args) => topology::handle(controller, args, global).await,
        Command::Links(args) => links::handle(controller, args, global).await,
        Command::Servers(args) => servers::handle(controller, args, global).await,
        Command::Clients(args) => clients::handle(controller, args, global).await,
        Command::Ping(args) => ping::handle(controller, args, global).await,
        Command::Algorithms(args) => algorithms::handle(controller, args, global).await,
        Command::Stats(args) => stats::handle(controller, args, global).await,
        Command::Rules(args) => rules::handle(controller, args, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "handled without a testbed connection".into(),
        }),
    }
}
