//! Shared configuration for the sdnboard CLI and TUI.
//!
//! TOML profiles naming the backend, agent, and (optionally) Ryu endpoints
//! of a testbed, layered with `SDNBOARD_*` environment variables, and the
//! translation to `sdnboard_core::DashboardConfig`. The CLI adds
//! flag-aware wrappers on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use sdnboard_core::{DEFAULT_PING_SENTINELS, DashboardConfig, HostLayout};

/// Environment variable prefix for every config key.
pub const ENV_PREFIX: &str = "SDNBOARD_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration shared by CLI and TUI.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named testbed profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use when none is given explicitly.
    pub fn default_profile_name(&self) -> &str {
        self.default_profile.as_deref().unwrap_or("default")
    }

    /// Look up a profile; the implicit `default` profile always exists.
    pub fn profile(&self, name: &str) -> Result<Profile, ConfigError> {
        match self.profiles.get(name) {
            Some(profile) => Ok(profile.clone()),
            None if name == "default" => Ok(Profile::default()),
            None => Err(ConfigError::UnknownProfile { name: name.into() }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// One testbed: where its services live and how the dashboard polls them.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    /// Backend REST root (e.g., "http://localhost:5000").
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Emulation agent root.
    #[serde(default = "default_agent_url")]
    pub agent_url: String,

    /// Ryu REST root; only used when `install_routes` is on.
    pub ryu_url: Option<String>,

    /// Override the request timeout (seconds).
    pub timeout: Option<u64>,

    /// Topology/server/client polling period (seconds, 0 disables).
    #[serde(default = "default_dashboard_poll")]
    pub dashboard_poll_secs: u64,

    /// Link table polling period (seconds, 0 disables).
    #[serde(default = "default_links_poll")]
    pub links_poll_secs: u64,

    #[serde(default)]
    pub host_layout: HostLayout,

    /// Push computed ping routes to Ryu.
    #[serde(default)]
    pub install_routes: bool,

    /// Replace the built-in ping end markers.
    pub ping_sentinels: Option<Vec<String>>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            agent_url: default_agent_url(),
            ryu_url: None,
            timeout: None,
            dashboard_poll_secs: default_dashboard_poll(),
            links_poll_secs: default_links_poll(),
            host_layout: HostLayout::default(),
            install_routes: false,
            ping_sentinels: None,
        }
    }
}

fn default_backend_url() -> String {
    "http://localhost:5000".into()
}
fn default_agent_url() -> String {
    "http://localhost:5002".into()
}
fn default_dashboard_poll() -> u64 {
    5
}
fn default_links_poll() -> u64 {
    10
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
///
/// `SDNBOARD_CONFIG` overrides the location entirely.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os("SDNBOARD_CONFIG") {
        return PathBuf::from(path);
    }
    ProjectDirs::from("org", "sdnboard", "sdnboard").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("sdnboard");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file path, still layering environment variables.
///
/// `SDNBOARD_DEFAULTS__TIMEOUT=10` sets `defaults.timeout`;
/// `SDNBOARD_PROFILES__LAB__BACKEND_URL=...` sets a profile key.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist or is broken.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation to DashboardConfig ──────────────────────────────────

/// Parse one endpoint field into a URL.
pub fn parse_endpoint(field: &str, raw: &str) -> Result<Url, ConfigError> {
    let url: Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Validation {
            field: field.into(),
            reason: format!("unsupported scheme '{other}' in {raw}"),
        }),
    }
}

/// Build a `DashboardConfig` from a profile, no CLI flag overrides.
///
/// Suitable for the TUI; the polling periods come straight from the
/// profile.
pub fn profile_to_dashboard_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<DashboardConfig, ConfigError> {
    let backend = parse_endpoint("backend_url", &profile.backend_url)?;
    let agent = parse_endpoint("agent_url", &profile.agent_url)?;
    let ryu = profile
        .ryu_url
        .as_deref()
        .map(|raw| parse_endpoint("ryu_url", raw))
        .transpose()?;

    if profile.install_routes && ryu.is_none() {
        return Err(ConfigError::Validation {
            field: "install_routes".into(),
            reason: "needs ryu_url to be set".into(),
        });
    }

    let mut config = DashboardConfig::new(backend, agent);
    config.ryu_url = ryu;
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.dashboard_poll_interval = Duration::from_secs(profile.dashboard_poll_secs);
    config.links_poll_interval = Duration::from_secs(profile.links_poll_secs);
    config.host_layout = profile.host_layout;
    config.install_routes = profile.install_routes;
    config.ping_sentinels = match &profile.ping_sentinels {
        Some(custom) if !custom.is_empty() => custom.clone(),
        _ => DEFAULT_PING_SENTINELS.iter().map(|s| (*s).to_owned()).collect(),
    };
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile_name(), "default");
        assert_eq!(cfg.defaults.output, "table");
        assert_eq!(cfg.profile("default").unwrap(), Profile::default());
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "lab".into(),
            Profile {
                backend_url: "http://192.168.18.151:5000".into(),
                ryu_url: Some("http://192.168.18.151:8080".into()),
                install_routes: true,
                host_layout: HostLayout::Jitter,
                ..Profile::default()
            },
        );
        cfg.default_profile = Some("lab".into());
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_profile_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[profiles.lab]\nbackend_url = \"http://10.0.0.5:5000\"\nhost_layout = \"jitter\"\n",
        )
        .unwrap();

        let cfg = load_config_from(&path).unwrap();
        let lab = cfg.profile("lab").unwrap();
        assert_eq!(lab.agent_url, "http://localhost:5002");
        assert_eq!(lab.dashboard_poll_secs, 5);
        assert_eq!(lab.links_poll_secs, 10);
        assert_eq!(lab.host_layout, HostLayout::Jitter);
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let cfg = Config::default();
        assert!(matches!(
            cfg.profile("staging"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn profile_translates_to_dashboard_config() {
        let profile = Profile {
            timeout: Some(7),
            links_poll_secs: 0,
            ..Profile::default()
        };
        let config = profile_to_dashboard_config(&profile, &Defaults::default()).unwrap();
        assert_eq!(config.backend_url.as_str(), "http://localhost:5000/");
        assert_eq!(config.timeout, Duration::from_secs(7));
        assert_eq!(config.dashboard_poll_interval, Duration::from_secs(5));
        assert_eq!(config.links_poll_interval, Duration::ZERO);
        assert_eq!(config.ping_sentinels.len(), DEFAULT_PING_SENTINELS.len());
    }

    #[test]
    fn install_routes_requires_ryu() {
        let profile = Profile {
            install_routes: true,
            ..Profile::default()
        };
        let err = profile_to_dashboard_config(&profile, &Defaults::default()).unwrap_err();
        assert!(err.to_string().contains("install_routes"));
    }

    #[test]
    fn non_http_endpoints_are_rejected() {
        assert!(parse_endpoint("backend_url", "ftp://lab:21").is_err());
        assert!(parse_endpoint("backend_url", "not a url").is_err());
        assert!(parse_endpoint("backend_url", "https://lab.example").is_ok());
    }
}
