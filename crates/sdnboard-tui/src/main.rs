//! `sdnboard-tui`: live terminal dashboard for an SDN testbed.
//!
//! Built on [ratatui](https://ratatui.rs) with reactive data from
//! `sdnboard-core`'s [`DataStore`](sdnboard_core::DataStore). Screens are
//! navigable via number keys (1-5): Map, Links, Servers, Clients, Stats.
//!
//! The terminal belongs to the UI, so logging is off unless `--log-file`
//! is given. A background data bridge task streams store updates into the
//! TUI action loop.

mod action;
mod app;
mod component;
mod data_bridge;
mod event;
mod screen;
mod screens;
mod theme;
mod tui;
mod widgets;

use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use sdnboard_core::{Controller, DashboardConfig, HostLayout};

use crate::app::App;

/// Terminal dashboard for an SDN testbed.
#[derive(Parser, Debug)]
#[command(name = "sdnboard-tui", version, about)]
struct Cli {
    /// Config profile to use
    #[arg(short, long, env = "SDNBOARD_PROFILE")]
    profile: Option<String>,

    /// Backend base URL (overrides the profile)
    #[arg(long, env = "SDNBOARD_BACKEND")]
    backend: Option<String>,

    /// Mininet agent base URL (overrides the profile)
    #[arg(long, env = "SDNBOARD_AGENT")]
    agent: Option<String>,

    /// Ryu controller base URL (overrides the profile)
    #[arg(long, env = "SDNBOARD_RYU")]
    ryu: Option<String>,

    /// Host placement around each switch
    #[arg(long)]
    layout: Option<HostLayout>,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Set up file-based tracing. Nothing may be written to stdout/stderr
/// while the TUI owns the terminal. The guard must live as long as the
/// app so buffered lines get flushed.
fn setup_tracing(cli: &Cli) -> Option<WorkerGuard> {
    let log_file = cli.log_file.as_ref()?;
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "sdnboard_tui={log_level},sdnboard_core={log_level},sdnboard_api={log_level}"
        ))
    });

    let log_dir = log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let log_filename = log_file
        .file_name()
        .unwrap_or(std::ffi::OsStr::new("sdnboard-tui.log"));

    let file_appender = tracing_appender::rolling::never(log_dir, log_filename);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true),
        )
        .init();

    Some(guard)
}

/// Resolve the profile from the shared config file and apply flag
/// overrides. Polling stays on: the dashboard reconciles continuously.
fn build_config(cli: &Cli) -> Result<DashboardConfig> {
    let cfg = sdnboard_config::load_config_or_default();
    let name = cli
        .profile
        .clone()
        .unwrap_or_else(|| cfg.default_profile_name().to_owned());
    let mut profile = cfg.profile(&name)?;

    if let Some(backend) = &cli.backend {
        profile.backend_url.clone_from(backend);
    }
    if let Some(agent) = &cli.agent {
        profile.agent_url.clone_from(agent);
    }
    if let Some(ryu) = &cli.ryu {
        profile.ryu_url = Some(ryu.clone());
    }
    if let Some(layout) = cli.layout {
        profile.host_layout = layout;
    }

    Ok(sdnboard_config::profile_to_dashboard_config(
        &profile,
        &cfg.defaults,
    )?)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = setup_tracing(&cli);

    // Config errors surface before the terminal switches modes
    let config = build_config(&cli)?;
    tui::install_hooks()?;

    info!(
        backend = %config.backend_url,
        agent = %config.agent_url,
        "starting sdnboard-tui"
    );

    let controller = Controller::new(config);
    let mut app = App::new(controller);
    app.run().await?;

    Ok(())
}
