//! Flow rule handlers.

use tabled::Tabled;

use sdnboard_core::{Command as CoreCommand, Controller, FlowRule, FlowRuleLog, FlowRuleRequest};

use crate::cli::{FlowRuleArgs, GlobalOpts, RulesArgs, RulesCommand};
use crate::error::CliError;
use crate::output;

use super::util::{self, or_dash};

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct RuleRow {
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "DPID")]
    dpid: String,
    #[tabled(rename = "Prio")]
    priority: String,
    #[tabled(rename = "Match")]
    matches: String,
    #[tabled(rename = "Actions")]
    actions: String,
}

/// `field=value` pairs of the match fields that are set.
fn match_summary(r: &FlowRule) -> String {
    let mut parts = Vec::new();
    if let Some(v) = r.eth_type {
        parts.push(format!("eth_type=0x{v:04x}"));
    }
    if let Some(v) = r.ip_proto {
        parts.push(format!("ip_proto={v}"));
    }
    if let Some(v) = &r.ipv4_src {
        parts.push(format!("ipv4_src={v}"));
    }
    if let Some(v) = &r.ipv4_dst {
        parts.push(format!("ipv4_dst={v}"));
    }
    if let Some(v) = r.tcp_src {
        parts.push(format!("tcp_src={v}"));
    }
    if let Some(v) = r.tcp_dst {
        parts.push(format!("tcp_dst={v}"));
    }
    if let Some(v) = r.in_port {
        parts.push(format!("in_port={v}"));
    }
    if parts.is_empty() {
        "*".into()
    } else {
        parts.join(" ")
    }
}

impl From<&FlowRule> for RuleRow {
    fn from(r: &FlowRule) -> Self {
        Self {
            id: r.rule_id,
            dpid: or_dash(r.dpid),
            priority: or_dash(r.priority),
            matches: match_summary(r),
            actions: r.actions.to_string(),
        }
    }
}

fn detail(r: &FlowRule) -> String {
    [
        format!("ID:        {}", r.rule_id),
        format!("DPID:      {}", or_dash(r.dpid)),
        format!("Priority:  {}", or_dash(r.priority)),
        format!("Match:     {}", match_summary(r)),
        format!("Actions:   {}", r.actions),
    ]
    .join("\n")
}

#[derive(Tabled)]
struct RuleLogRow {
    #[tabled(rename = "Time")]
    timestamp: String,
    #[tabled(rename = "DPID")]
    dpid: String,
    #[tabled(rename = "Rule")]
    rule_id: String,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Prio")]
    priority: String,
}

impl From<&FlowRuleLog> for RuleLogRow {
    fn from(l: &FlowRuleLog) -> Self {
        Self {
            timestamp: or_dash(l.timestamp.as_deref()),
            dpid: or_dash(l.dpid),
            rule_id: or_dash(l.rule_id),
            action: or_dash(l.action.as_deref()),
            priority: or_dash(l.priority),
        }
    }
}

fn to_request(args: FlowRuleArgs, rule_id: Option<i64>) -> Result<FlowRuleRequest, CliError> {
    Ok(FlowRuleRequest {
        rule_id,
        priority: args.priority,
        eth_type: args.eth_type,
        ip_proto: args.ip_proto,
        ipv4_src: args.ipv4_src,
        ipv4_dst: args.ipv4_dst,
        tcp_src: args.tcp_src,
        tcp_dst: args.tcp_dst,
        in_port: args.in_port,
        actions: util::parse_json_arg("actions", &args.actions)?,
    })
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: RulesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        RulesCommand::List => {
            let rules = controller.flow_rules().await?;
            let out = output::render_list(
                &global.output,
                &rules,
                |r| RuleRow::from(r),
                |r| r.rule_id.to_string(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RulesCommand::Get { id } => {
            let rule = controller.flow_rule(id).await?;
            let out = output::render_single(&global.output, &rule, detail, |r| {
                r.rule_id.to_string()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RulesCommand::Create {
            dpid,
            rule_id,
            rule,
        } => {
            let rule = to_request(rule, rule_id)?;
            let result = controller
                .execute(CoreCommand::CreateFlowRule { dpid, rule })
                .await?;
            output::notice(&result.summary(), global.quiet);
            Ok(())
        }

        RulesCommand::Update { id, rule } => {
            let rule = to_request(rule, Some(id))?;
            let result = controller
                .execute(CoreCommand::UpdateFlowRule { rule_id: id, rule })
                .await?;
            output::notice(&result.summary(), global.quiet);
            Ok(())
        }

        RulesCommand::Delete { id } => {
            if !util::confirm(&format!("Delete flow rule {id}?"), global.yes)? {
                return Ok(());
            }
            let result = controller
                .execute(CoreCommand::DeleteFlowRule { rule_id: id })
                .await?;
            output::notice(&result.summary(), global.quiet);
            Ok(())
        }

        RulesCommand::Logs => {
            let logs = controller.flow_rule_logs().await?;
            let out = output::render_list(
                &global.output,
                &logs,
                |l| RuleLogRow::from(l),
                |l| or_dash(l.rule_id),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        RulesCommand::NextId => {
            let next = controller.next_flow_rule_id().await?;
            output::print_output(&next.to_string(), global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn match_summary_lists_set_fields_only() {
        let rule = FlowRule {
            rule_id: 3,
            dpid: Some(1),
            priority: Some(100),
            eth_type: Some(2048),
            ip_proto: None,
            ipv4_src: Some("10.0.0.1".into()),
            ipv4_dst: None,
            tcp_src: None,
            tcp_dst: Some(80),
            in_port: None,
            actions: json!([]),
        };
        assert_eq!(
            match_summary(&rule),
            "eth_type=0x0800 ipv4_src=10.0.0.1 tcp_dst=80"
        );
    }
}
