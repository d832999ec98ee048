//! Config subcommand handlers.

use std::collections::BTreeMap;

use dialoguer::{Confirm, Input, Select};

use sdnboard_core::HostLayout;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Defaults, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display as TOML-like text.
fn format_config(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);

    for (name, p) in &cfg.profiles {
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "backend_url = \"{}\"", p.backend_url);
        let _ = writeln!(out, "agent_url = \"{}\"", p.agent_url);
        if let Some(ref ryu) = p.ryu_url {
            let _ = writeln!(out, "ryu_url = \"{ryu}\"");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        let _ = writeln!(out, "dashboard_poll_secs = {}", p.dashboard_poll_secs);
        let _ = writeln!(out, "links_poll_secs = {}", p.links_poll_secs);
        let _ = writeln!(out, "host_layout = \"{}\"", p.host_layout);
        let _ = writeln!(out, "install_routes = {}", p.install_routes);
        if let Some(ref sentinels) = p.ping_sentinels {
            let quoted: Vec<String> = sentinels.iter().map(|s| format!("{s:?}")).collect();
            let _ = writeln!(out, "ping_sentinels = [{}]", quoted.join(", "));
        }
    }

    out
}

fn save_config(cfg: &Config) -> Result<(), CliError> {
    config::save_config(cfg)?;
    Ok(())
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn prompt_url(prompt: &str, field: &str, default: &str) -> Result<String, CliError> {
    let raw: String = Input::new()
        .with_prompt(prompt)
        .default(default.to_owned())
        .interact_text()
        .map_err(prompt_err)?;
    config::parse_endpoint(field, &raw)?;
    Ok(raw)
}

fn parse_value<T: std::str::FromStr>(field: &str, value: &str, expected: &str) -> Result<T, CliError> {
    value.trim().parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("must be {expected}"),
    })
}

/// Apply `key = value` to a profile.
fn set_profile_key(profile: &mut Profile, key: &str, value: String) -> Result<(), CliError> {
    match key {
        "backend_url" | "backend-url" | "backend" => {
            config::parse_endpoint("backend_url", &value)?;
            profile.backend_url = value;
        }
        "agent_url" | "agent-url" | "agent" => {
            config::parse_endpoint("agent_url", &value)?;
            profile.agent_url = value;
        }
        "ryu_url" | "ryu-url" | "ryu" => {
            if value.is_empty() {
                profile.ryu_url = None;
            } else {
                config::parse_endpoint("ryu_url", &value)?;
                profile.ryu_url = Some(value);
            }
        }
        "timeout" => profile.timeout = Some(parse_value("timeout", &value, "a number (seconds)")?),
        "dashboard_poll_secs" | "dashboard-poll-secs" => {
            profile.dashboard_poll_secs =
                parse_value("dashboard_poll_secs", &value, "a number (seconds)")?;
        }
        "links_poll_secs" | "links-poll-secs" => {
            profile.links_poll_secs = parse_value("links_poll_secs", &value, "a number (seconds)")?;
        }
        "host_layout" | "host-layout" => {
            profile.host_layout =
                parse_value::<HostLayout>("host_layout", &value, "'fan-out' or 'jitter'")?;
        }
        "install_routes" | "install-routes" => {
            profile.install_routes = parse_value("install_routes", &value, "'true' or 'false'")?;
        }
        "ping_sentinels" | "ping-sentinels" => {
            let phrases: Vec<String> = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned)
                .collect();
            profile.ping_sentinels = (!phrases.is_empty()).then_some(phrases);
        }
        other => {
            return Err(CliError::Validation {
                field: other.into(),
                reason: format!(
                    "unknown config key '{other}'. Valid keys: backend_url, agent_url, ryu_url, \
                     timeout, dashboard_poll_secs, links_poll_secs, host_layout, install_routes, \
                     ping_sentinels"
                ),
            });
        }
    }
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("sdnboard configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let defaults = Profile::default();
            let backend_url = prompt_url("Backend URL", "backend_url", &defaults.backend_url)?;
            let agent_url = prompt_url("Emulation agent URL", "agent_url", &defaults.agent_url)?;

            let ryu_url = if Confirm::new()
                .with_prompt("Install computed routes through Ryu?")
                .default(false)
                .interact()
                .map_err(prompt_err)?
            {
                Some(prompt_url("Ryu REST URL", "ryu_url", "http://localhost:8080")?)
            } else {
                None
            };

            let layouts = ["fan-out", "jitter"];
            let layout = Select::new()
                .with_prompt("Host layout around switches")
                .items(&layouts)
                .default(0)
                .interact()
                .map_err(prompt_err)?;

            let profile = Profile {
                backend_url,
                agent_url,
                install_routes: ryu_url.is_some(),
                ryu_url,
                host_layout: if layout == 0 {
                    HostLayout::FanOut
                } else {
                    HostLayout::Jitter
                },
                ..defaults
            };

            let cfg = Config {
                default_profile: Some(profile_name.clone()),
                defaults: Defaults::default(),
                profiles: BTreeMap::from([(profile_name.clone(), profile)]),
            };
            save_config(&cfg)?;

            eprintln!("\nConfiguration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: sdnboard topology show");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = output::render_single(&global.output, &cfg, format_config, |_| {
                "config".into()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            let profile = cfg.profiles.entry(profile_name.clone()).or_default();
            set_profile_key(profile, &key, value)?;

            save_config(&cfg)?;
            output::notice(&format!("Set {key} on profile '{profile_name}'"), global.quiet);
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile_name();
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: sdnboard config init");
            } else {
                for name in cfg.profiles.keys() {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();

            if !cfg.profiles.contains_key(&name) {
                let available: Vec<_> = cfg.profiles.keys().cloned().collect();
                return Err(CliError::ProfileNotFound {
                    name,
                    available: if available.is_empty() {
                        "(none)".into()
                    } else {
                        available.join(", ")
                    },
                });
            }

            cfg.default_profile = Some(name.clone());
            save_config(&cfg)?;
            output::notice(&format!("Default profile set to '{name}'"), global.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            println!("{}", config::config_path().display());
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn set_rejects_non_http_endpoints() {
        let mut profile = Profile::default();
        assert!(set_profile_key(&mut profile, "backend_url", "ftp://lab:5000".into()).is_err());
        set_profile_key(&mut profile, "backend_url", "http://lab:5000".into()).unwrap();
        assert_eq!(profile.backend_url, "http://lab:5000");
    }

    #[test]
    fn set_parses_typed_values() {
        let mut profile = Profile::default();
        set_profile_key(&mut profile, "host-layout", "jitter".into()).unwrap();
        set_profile_key(&mut profile, "links_poll_secs", "0".into()).unwrap();
        set_profile_key(&mut profile, "ping_sentinels", "fin, error".into()).unwrap();
        assert_eq!(profile.host_layout, HostLayout::Jitter);
        assert_eq!(profile.links_poll_secs, 0);
        assert_eq!(
            profile.ping_sentinels,
            Some(vec!["fin".to_owned(), "error".to_owned()])
        );
        assert!(set_profile_key(&mut profile, "install_routes", "maybe".into()).is_err());
        assert!(set_profile_key(&mut profile, "colour", "x".into()).is_err());
    }

    #[test]
    fn empty_ryu_clears_it() {
        let mut profile = Profile {
            ryu_url: Some("http://ryu:8080".into()),
            ..Profile::default()
        };
        set_profile_key(&mut profile, "ryu_url", String::new()).unwrap();
        assert!(profile.ryu_url.is_none());
    }

    #[test]
    fn formatted_config_lists_profiles() {
        let cfg = Config {
            default_profile: Some("lab".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::from([("lab".to_owned(), Profile::default())]),
        };
        let text = format_config(&cfg);
        assert!(text.contains("[profiles.lab]"));
        assert!(text.contains("backend_url = \"http://localhost:5000\""));
    }
}
