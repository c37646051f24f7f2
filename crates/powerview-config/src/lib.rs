//! Shared configuration for PowerView tools.
//!
//! TOML hub profiles merged with `POWERVIEW_` environment overrides, and
//! translation to `powerview_core::HubConfig`. The CLI layers its own flag
//! overrides on top.

use std::collections::HashMap;
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

use powerview_core::{DispatchTiming, HubConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no hub profile named '{name}'")]
    UnknownHub { name: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Hub profile used when `--hub` is not given.
    pub default_hub: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named hub profiles.
    #[serde(default)]
    pub hubs: HashMap<String, HubProfile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_hub: Some("default".into()),
            defaults: Defaults::default(),
            hubs: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile by name, falling back to `default_hub`.
    pub fn hub(&self, name: Option<&str>) -> Result<(&str, &HubProfile), ConfigError> {
        let name = name
            .or(self.default_hub.as_deref())
            .unwrap_or("default");
        self.hubs
            .get_key_value(name)
            .map(|(k, v)| (k.as_str(), v))
            .ok_or_else(|| ConfigError::UnknownHub { name: name.into() })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    /// HTTP timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    #[serde(default = "default_request_interval_ms")]
    pub request_interval_ms: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            timeout: default_timeout(),
            initial_delay_ms: default_initial_delay_ms(),
            request_interval_ms: default_request_interval_ms(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_initial_delay_ms() -> u64 {
    100
}
fn default_request_interval_ms() -> u64 {
    100
}

/// A named hub profile.
#[derive(Debug, Deserialize, Serialize)]
pub struct HubProfile {
    /// Hub address: a bare host ("192.168.1.20") or a base URL.
    pub host: String,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,

    /// Override the delay before the first queued dispatch.
    pub initial_delay_ms: Option<u64>,

    /// Override the pause between queued requests.
    pub request_interval_ms: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "powerview", "powerview").map_or_else(
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
    p.push("powerview");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load Config from `path` + environment. A missing file yields defaults.
///
/// Nested keys use a double underscore: `POWERVIEW_DEFAULTS__TIMEOUT=5`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("POWERVIEW_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── HubConfig translation ───────────────────────────────────────────

/// Parse a hub address. Bare hosts get an `http://` scheme.
pub fn parse_host(host: &str) -> Result<Url, ConfigError> {
    let raw = if host.contains("://") {
        host.to_owned()
    } else {
        format!("http://{host}")
    };
    Url::parse(&raw).map_err(|e| ConfigError::Validation {
        field: "host".into(),
        reason: format!("invalid hub address '{host}': {e}"),
    })
}

/// Build a `HubConfig` from a profile, with global defaults filling gaps.
pub fn profile_to_hub_config(
    profile: &HubProfile,
    defaults: &Defaults,
) -> Result<HubConfig, ConfigError> {
    let url = parse_host(&profile.host)?;

    let timing = DispatchTiming {
        initial_delay: Duration::from_millis(
            profile.initial_delay_ms.unwrap_or(defaults.initial_delay_ms),
        ),
        request_interval: Duration::from_millis(
            profile
                .request_interval_ms
                .unwrap_or(defaults.request_interval_ms),
        ),
    };

    Ok(HubConfig {
        url,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        timing,
    })
}
