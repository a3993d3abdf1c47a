//! Configuration for the hasslink CLI.
//!
//! TOML profiles, access-token resolution (env + keyring + plaintext),
//! and translation to `hasslink_core::ConnectorConfig`. The CLI adds its
//! flag overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use hasslink_core::ConnectorConfig;
use hasslink_core::config::{DEFAULT_RECONNECT_COOLDOWN, DEFAULT_SHUTDOWN_TIMEOUT};

/// Keyring service name under which access tokens are stored.
pub const KEYRING_SERVICE: &str = "hasslink";

/// Environment variable consulted last for the access token.
pub const TOKEN_ENV: &str = "HASSLINK_TOKEN";

/// Default port of the hub's HTTP/WebSocket server.
pub const DEFAULT_PORT: u16 = 8123;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no access token configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named hub profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Name of the profile to use: the requested one, else the configured
    /// default, else `"default"`.
    pub fn active_profile_name(&self, requested: Option<&str>) -> String {
        requested
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into())
    }

    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default = "default_reconnect_cooldown_secs")]
    pub reconnect_cooldown_secs: u64,

    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            reconnect_cooldown_secs: default_reconnect_cooldown_secs(),
            shutdown_timeout_secs: default_shutdown_timeout_secs(),
        }
    }
}

fn default_output() -> String {
    "plain".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_reconnect_cooldown_secs() -> u64 {
    DEFAULT_RECONNECT_COOLDOWN.as_secs()
}
fn default_shutdown_timeout_secs() -> u64 {
    DEFAULT_SHUTDOWN_TIMEOUT.as_secs()
}

/// A named hub profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Hub host name or address (e.g., "homeassistant.local").
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Connect over `wss://`.
    #[serde(default)]
    pub tls: bool,

    /// Access token (plaintext -- prefer keyring or env var).
    pub access_token: Option<String>,

    /// Environment variable name containing the access token.
    pub access_token_env: Option<String>,

    /// Override the device event type (default `deconz_event`).
    pub event_type: Option<String>,

    /// Override the reconnect cooldown.
    pub reconnect_cooldown_secs: Option<u64>,

    /// Override the shutdown timeout.
    pub shutdown_timeout_secs: Option<u64>,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

impl Profile {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_PORT,
            tls: false,
            access_token: None,
            access_token_env: None,
            event_type: None,
            reconnect_cooldown_secs: None,
            shutdown_timeout_secs: None,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "hasslink", "hasslink").map_or_else(
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
    p.push("hasslink");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
///
/// A missing file is not an error. Environment variables prefixed
/// `HASSLINK_` override file values, with `__` separating nested keys
/// (`HASSLINK_PROFILES__HOME__HOST=10.0.0.2`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("HASSLINK_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it cannot be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Access token resolution ─────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, keyring::Error> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/access-token"))
}

/// Resolve the access token from the credential chain (no CLI flag step):
/// the profile's `access_token_env` variable, the system keyring, the
/// plaintext profile value, then `HASSLINK_TOKEN`.
pub fn resolve_access_token(
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    resolve_access_token_with(
        profile,
        profile_name,
        |name| std::env::var(name).ok(),
        |profile_name| keyring_entry(profile_name).ok()?.get_password().ok(),
    )
}

fn resolve_access_token_with(
    profile: &Profile,
    profile_name: &str,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's access_token_env → env var lookup
    if let Some(token) = profile.access_token_env.as_deref().and_then(&env) {
        return Ok(SecretString::from(token));
    }

    // 2. System keyring
    if let Some(token) = keyring(profile_name) {
        return Ok(SecretString::from(token));
    }

    // 3. Plaintext in config
    if let Some(ref token) = profile.access_token {
        return Ok(SecretString::from(token.clone()));
    }

    // 4. Global env var
    if let Some(token) = env(TOKEN_ENV) {
        return Ok(SecretString::from(token));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store an access token for `profile_name` in the system keyring.
pub fn store_access_token(profile_name: &str, token: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(token)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Build a `ConnectorConfig` from a profile -- no CLI flag overrides.
///
/// Profile values win over `defaults`.
pub fn profile_to_connector_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ConnectorConfig, ConfigError> {
    let token = resolve_access_token(profile, profile_name)?;
    build_connector_config(profile, token, defaults)
}

/// Build a `ConnectorConfig` from a profile and an already-resolved token.
pub fn build_connector_config(
    profile: &Profile,
    access_token: SecretString,
    defaults: &Defaults,
) -> Result<ConnectorConfig, ConfigError> {
    if profile.host.trim().is_empty() {
        return Err(ConfigError::Validation {
            field: "host".into(),
            reason: "must not be empty".into(),
        });
    }

    let mut config = ConnectorConfig::for_hub(&profile.host, profile.port, profile.tls, access_token)
        .map_err(|e| ConfigError::Validation {
            field: "host".into(),
            reason: format!("{}: {e}", profile.host),
        })?;

    config.reconnect_cooldown = Duration::from_secs(
        profile
            .reconnect_cooldown_secs
            .unwrap_or(defaults.reconnect_cooldown_secs),
    );
    config.shutdown_timeout = Duration::from_secs(
        profile
            .shutdown_timeout_secs
            .unwrap_or(defaults.shutdown_timeout_secs),
    );
    if let Some(ref event_type) = profile.event_type {
        config.entity_event_type.clone_from(event_type);
    }
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn loads_profiles_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "home"

[defaults]
reconnect_cooldown_secs = 3

[profiles.home]
host = "homeassistant.local"
access_token_env = "HOME_HASS_TOKEN"

[profiles.cabin]
host = "cabin.example.org"
port = 443
tls = true
event_type = "zha_event"
"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.active_profile_name(None), "home");
        assert_eq!(config.active_profile_name(Some("cabin")), "cabin");
        assert_eq!(config.defaults.reconnect_cooldown_secs, 3);
        assert_eq!(config.defaults.shutdown_timeout_secs, 5);

        let home = config.profile("home").unwrap();
        assert_eq!(home.port, 8123);
        assert!(!home.tls);

        let cabin = config.profile("cabin").unwrap();
        assert!(cabin.tls);
        assert!(matches!(
            config.profile("office"),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.default_profile.as_deref(), Some("default"));
        assert!(config.profiles.is_empty());
        assert_eq!(config.defaults.output, "plain");
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        let mut profile = Profile::new("10.0.0.2");
        profile.access_token_env = Some("HASS_TOKEN".into());
        config.profiles.insert("default".into(), profile);
        save_config_to(&config, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        let profile = loaded.profile("default").unwrap();
        assert_eq!(profile.host, "10.0.0.2");
        assert_eq!(profile.access_token_env.as_deref(), Some("HASS_TOKEN"));
    }

    #[test]
    fn token_chain_order() {
        let mut profile = Profile::new("hub");
        profile.access_token_env = Some("HUB_TOKEN".into());
        profile.access_token = Some("plaintext".into());

        let env = |name: &str| match name {
            "HUB_TOKEN" => Some("from-env".to_string()),
            TOKEN_ENV => Some("from-global".to_string()),
            _ => None,
        };
        let keyring = |_: &str| Some("from-keyring".to_string());

        let token = resolve_access_token_with(&profile, "home", env, keyring).unwrap();
        assert_eq!(token.expose_secret(), "from-env");

        let token = resolve_access_token_with(&profile, "home", no_env, keyring).unwrap();
        assert_eq!(token.expose_secret(), "from-keyring");

        let token = resolve_access_token_with(&profile, "home", no_env, no_env).unwrap();
        assert_eq!(token.expose_secret(), "plaintext");

        profile.access_token = None;
        let global = |name: &str| (name == TOKEN_ENV).then(|| "from-global".to_string());
        let token = resolve_access_token_with(&profile, "home", global, no_env).unwrap();
        assert_eq!(token.expose_secret(), "from-global");

        assert!(matches!(
            resolve_access_token_with(&profile, "home", no_env, no_env),
            Err(ConfigError::NoCredentials { ref profile }) if profile == "home"
        ));
    }

    #[test]
    fn profile_overrides_defaults() {
        let mut profile = Profile::new("cabin.example.org");
        profile.port = 8443;
        profile.tls = true;
        profile.event_type = Some("zha_event".into());
        profile.shutdown_timeout_secs = Some(1);

        let defaults = Defaults {
            reconnect_cooldown_secs: 7,
            ..Defaults::default()
        };
        let config =
            build_connector_config(&profile, SecretString::from("t".to_string()), &defaults).unwrap();

        assert_eq!(config.endpoint.as_str(), "wss://cabin.example.org:8443/api/websocket");
        assert_eq!(config.reconnect_cooldown, Duration::from_secs(7));
        assert_eq!(config.shutdown_timeout, Duration::from_secs(1));
        assert_eq!(config.entity_event_type, "zha_event");
    }

    #[test]
    fn empty_host_is_invalid() {
        let profile = Profile::new("  ");
        let err = build_connector_config(
            &profile,
            SecretString::from("t".to_string()),
            &Defaults::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "host"));
    }
}
