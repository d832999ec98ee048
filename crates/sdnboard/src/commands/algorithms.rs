//! Algorithm configuration handlers.

use tabled::Tabled;

use sdnboard_core::{AlgorithmConfig, Command as CoreCommand, Controller};

use crate::cli::{AlgorithmsArgs, AlgorithmsCommand, GlobalOpts};
use crate::error::CliError;
use crate::output;

use super::util::{self, or_dash};

#[derive(Tabled)]
struct ConfigRow {
    #[tabled(rename = "Balancing")]
    balancing: String,
    #[tabled(rename = "Routing")]
    routing: String,
    #[tabled(rename = "Activated")]
    activated: String,
}

impl From<&AlgorithmConfig> for ConfigRow {
    fn from(c: &AlgorithmConfig) -> Self {
        Self {
            balancing: or_dash(c.balancing.as_deref()),
            routing: or_dash(c.routing.as_deref()),
            activated: or_dash(c.activated_at.as_deref()),
        }
    }
}

fn detail(c: &AlgorithmConfig) -> String {
    let mut lines = vec![
        format!("Balancing:  {}", c.balancing.as_deref().unwrap_or("-")),
        format!("Routing:    {}", c.routing.as_deref().unwrap_or("-")),
        format!("Activated:  {}", c.activated_at.as_deref().unwrap_or("-")),
    ];
    if c.uses_weights() {
        lines.push("Server weights are in effect.".into());
    }
    lines.join("\n")
}

pub async fn handle(
    controller: &Controller,
    args: AlgorithmsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        AlgorithmsCommand::Show => {
            let config = controller.algorithm_config().await?;
            let out = output::render_single(&global.output, &config, detail, |c| {
                c.balancing.clone().unwrap_or_default()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AlgorithmsCommand::History => {
            let history = controller.algorithm_history().await?;
            let out = output::render_list(
                &global.output,
                &history,
                |c| ConfigRow::from(c),
                |c| c.activated_at.clone().unwrap_or_default(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        AlgorithmsCommand::Balancing { algorithm } => {
            let result = controller
                .execute(CoreCommand::SetBalancing(algorithm))
                .await?;
            output::notice(&result.summary(), global.quiet);
            Ok(())
        }

        AlgorithmsCommand::Routing { algorithm } => {
            let result = controller
                .execute(CoreCommand::SetRouting(algorithm))
                .await?;
            output::notice(&result.summary(), global.quiet);
            Ok(())
        }

        AlgorithmsCommand::Weights { pairs } => {
            let weights = util::parse_weights(&pairs)?;
            let config = controller.algorithm_config().await?;
            if !config.uses_weights() {
                output::notice(
                    "Note: weights only take effect with weighted round robin (WRR).",
                    global.quiet,
                );
            }
            let result = controller
                .execute(CoreCommand::SetServerWeights(weights))
                .await?;
            output::notice(&result.summary(), global.quiet);
            Ok(())
        }
    }
}
