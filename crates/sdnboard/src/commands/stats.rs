//! Statistics handlers.

use tabled::Tabled;

use sdnboard_core::{AlgorithmComparison, Controller, EventLogEntry, LatencyMetrics, StatsSummaryRow};

use crate::cli::{GlobalOpts, StatsArgs, StatsCommand};
use crate::error::CliError;
use crate::output;

use super::util::or_dash;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "Event")]
    kind: String,
    #[tabled(rename = "Total")]
    total: i64,
}

#[derive(Tabled)]
struct LogRow {
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Type")]
    event_type: String,
    #[tabled(rename = "Origin")]
    origin: String,
}

impl From<&EventLogEntry> for LogRow {
    fn from(e: &EventLogEntry) -> Self {
        Self {
            date: or_dash(e.date.as_deref()),
            event_type: or_dash(e.event_type.as_deref()),
            origin: or_dash(e.origin.as_deref()),
        }
    }
}

#[derive(Tabled)]
struct ComparisonRow {
    #[tabled(rename = "Algorithm")]
    algorithm: &'static str,
    #[tabled(rename = "Avg RTT (ms)")]
    rtt: String,
    #[tabled(rename = "Avg jitter (ms)")]
    jitter: String,
}

fn comparison_rows(c: &AlgorithmComparison) -> Vec<ComparisonRow> {
    let row = |algorithm, m: &LatencyMetrics| ComparisonRow {
        algorithm,
        rtt: or_dash(m.avg_rtt_ms.map(|v| format!("{v:.3}"))),
        jitter: or_dash(m.avg_jitter_ms.map(|v| format!("{v:.3}"))),
    };
    vec![
        row("dijkstra", &c.dijkstra),
        row("shortest_path", &c.shortest_path),
    ]
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    controller: &Controller,
    args: StatsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        StatsCommand::Summary => {
            let rows = controller.stats_summary().await?;
            let out = output::render_list(
                &global.output,
                &rows,
                |r: &StatsSummaryRow| SummaryRow {
                    kind: r.kind.clone(),
                    total: r.total,
                },
                |r| format!("{}\t{}", r.kind, r.total),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        StatsCommand::Logs { limit } => {
            let mut logs = controller.event_logs().await?;
            if let Some(limit) = limit {
                logs.truncate(limit);
            }
            let out = output::render_list(
                &global.output,
                &logs,
                |e| LogRow::from(e),
                |e| e.event_type.clone().unwrap_or_default(),
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }

        StatsCommand::Compare => {
            let comparison = controller.compare_algorithms().await?;
            let out = output::render_single(
                &global.output,
                &comparison,
                |c| output::render_table(&comparison_rows(c)),
                |c| {
                    comparison_rows(c)
                        .iter()
                        .map(|r| format!("{}\t{}\t{}", r.algorithm, r.rtt, r.jitter))
                        .collect::<Vec<_>>()
                        .join("\n")
                },
            );
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_metrics_show_dash() {
        let rows = comparison_rows(&AlgorithmComparison {
            dijkstra: LatencyMetrics {
                avg_rtt_ms: Some(1.23456),
                avg_jitter_ms: None,
            },
            shortest_path: LatencyMetrics::default(),
        });
        assert_eq!(rows[0].rtt, "1.235");
        assert_eq!(rows[0].jitter, "-");
        assert_eq!(rows[1].algorithm, "shortest_path");
    }
}
