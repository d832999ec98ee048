//! CLI configuration: thin wrapper around `sdnboard_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--backend, --agent, etc.).

use std::time::Duration;

use sdnboard_core::DashboardConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use sdnboard_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, parse_endpoint, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.default_profile_name().to_owned())
}

/// Translate a `Profile` + global flags into a `DashboardConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<DashboardConfig, CliError> {
    let mut profile = profile.clone();

    // 1. Endpoints (flag > env > profile)
    if let Some(backend) = &global.backend {
        profile.backend_url.clone_from(backend);
    }
    if let Some(agent) = &global.agent {
        profile.agent_url.clone_from(agent);
    }
    if let Some(ryu) = &global.ryu {
        profile.ryu_url = Some(ryu.clone());
    }

    // 2. Timeout
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    let mut config = sdnboard_config::profile_to_dashboard_config(&profile, defaults)?;

    // 3. Polling is never useful for a single invocation.
    config.dashboard_poll_interval = Duration::ZERO;
    config.links_poll_interval = Duration::ZERO;
    Ok(config)
}

/// Build the `DashboardConfig` for a controller-bound command.
pub fn build_dashboard_config(global: &GlobalOpts) -> Result<DashboardConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let profile = cfg.profile(&profile_name).map_err(|_| {
        let available: Vec<_> = cfg.profiles.keys().cloned().collect();
        CliError::ProfileNotFound {
            name: profile_name.clone(),
            available: if available.is_empty() {
                "(none)".into()
            } else {
                available.join(", ")
            },
        }
    })?;

    resolve_profile(&profile, &cfg.defaults, global)
}
