//! Shared configuration for roompla tools.
//!
//! TOML profiles, base-path selection per deployment environment, token
//! resolution (env + keyring + plaintext), and translation to
//! `roompla_api::Configuration`.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use roompla_api::{API_PREFIX, Configuration, DEVELOPMENT_BASE_PATH};

const KEYRING_SERVICE: &str = "roompla";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found (available: {available})")]
    UnknownProfile { name: String, available: String },

    #[error("keyring access failed: {0}")]
    Keyring(#[from] keyring::Error),

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

// ── Deployment environment ──────────────────────────────────────────

/// Where the roompla server lives relative to the client.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Deserialize,
    Serialize,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Environment {
    /// Local server on `localhost:5050`.
    #[default]
    Development,
    /// Server reached at the profile's `server` origin.
    Production,
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
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
    /// Look up a profile by name.
    pub fn profile(&self, name: &str) -> Result<&Profile, ConfigError> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::UnknownProfile {
                name: name.into(),
                available: self.available_profiles(),
            })
    }

    /// Comma-separated, sorted profile names, or `(none)`.
    pub fn available_profiles(&self) -> String {
        let mut names: Vec<_> = self.profiles.keys().map(String::as_str).collect();
        if names.is_empty() {
            return "(none)".into();
        }
        names.sort_unstable();
        names.join(", ")
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}

/// A named server profile.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    #[serde(default)]
    pub environment: Environment,

    /// Server origin (e.g., "https://rooms.example.org"). Required
    /// outside development.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,

    /// Account name used for login; doubles as the session user id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Environment variable name containing a token.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_env: Option<String>,

    /// Token (plaintext -- prefer keyring).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("org", "roompla", "roompla").map_or_else(
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
    p.push("roompla");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
///
/// Environment keys nest on a double underscore:
/// `ROOMPLA_PROFILES__LAB__SERVER` sets `profiles.lab.server`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ROOMPLA_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Base path ───────────────────────────────────────────────────────

/// API base path for a profile.
///
/// Development always targets the local server; every other environment
/// uses `<server origin>/roompla/v0`.
pub fn base_path(profile: &Profile) -> Result<String, ConfigError> {
    match profile.environment {
        Environment::Development => Ok(DEVELOPMENT_BASE_PATH.into()),
        Environment::Production => {
            let server = profile
                .server
                .as_deref()
                .ok_or_else(|| ConfigError::Validation {
                    field: "server".into(),
                    reason: "required for the production environment".into(),
                })?;
            Ok(format!("{}{API_PREFIX}", server_origin(server)?))
        }
    }
}

fn server_origin(server: &str) -> Result<String, ConfigError> {
    let url: url::Url = server.parse().map_err(|_| ConfigError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {server}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "server".into(),
            reason: format!("expected an http(s) origin, got {server}"),
        });
    }
    Ok(url.origin().ascii_serialization())
}

// ── Token storage ───────────────────────────────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/token"),
    )?)
}

/// Resolve a stored token: profile's `token_env`, then the system
/// keyring, then plaintext in config. `None` means anonymous.
pub fn resolve_token(profile: &Profile, profile_name: &str) -> Option<SecretString> {
    // 1. Profile's token_env → env var lookup
    if let Some(ref env_name) = profile.token_env {
        if let Ok(val) = std::env::var(env_name) {
            return Some(SecretString::from(val));
        }
    }

    // 2. System keyring
    if let Ok(entry) = keyring_entry(profile_name) {
        if let Ok(secret) = entry.get_password() {
            return Some(SecretString::from(secret));
        }
    }

    // 3. Plaintext in config
    profile.token.clone().map(SecretString::from)
}

/// Store a token for `profile_name` in the system keyring.
pub fn store_token(profile_name: &str, token: &SecretString) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(token.expose_secret())?;
    Ok(())
}

/// Remove the keyring token for `profile_name`. Returns `false` if there
/// was none.
pub fn delete_token(profile_name: &str) -> Result<bool, ConfigError> {
    match keyring_entry(profile_name)?.delete_credential() {
        Ok(()) => Ok(true),
        Err(keyring::Error::NoEntry) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

// ── Translation ─────────────────────────────────────────────────────

/// Build an API `Configuration` from a profile and an optional token.
pub fn configuration_with_token(
    profile: &Profile,
    token: Option<SecretString>,
) -> Result<Configuration, ConfigError> {
    let config = Configuration::new(base_path(profile)?);
    Ok(match token {
        Some(token) => config.with_access_token(token),
        None => config,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;

    use super::*;

    fn production(server: &str) -> Profile {
        Profile {
            environment: Environment::Production,
            server: Some(server.into()),
            ..Profile::default()
        }
    }

    #[test]
    fn development_uses_local_server() {
        let profile = Profile {
            server: Some("https://ignored.example.org".into()),
            ..Profile::default()
        };
        assert_eq!(base_path(&profile).unwrap(), "http://localhost:5050/roompla/v0");
    }

    #[test]
    fn production_uses_server_origin() {
        assert_eq!(
            base_path(&production("https://rooms.example.org/app/index.html")).unwrap(),
            "https://rooms.example.org/roompla/v0"
        );
        assert_eq!(
            base_path(&production("http://10.0.0.5:8080")).unwrap(),
            "http://10.0.0.5:8080/roompla/v0"
        );
    }

    #[test]
    fn production_requires_server() {
        let profile = Profile {
            environment: Environment::Production,
            ..Profile::default()
        };
        let err = base_path(&profile).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "server"));
    }

    #[test]
    fn production_rejects_non_http_server() {
        assert!(base_path(&production("ftp://rooms.example.org")).is_err());
        assert!(base_path(&production("not a url")).is_err());
    }

    #[test]
    fn environment_parses_case_insensitively() {
        assert_eq!(Environment::from_str("Production").unwrap(), Environment::Production);
        assert_eq!(Environment::from_str("development").unwrap(), Environment::Development);
        assert!(Environment::from_str("staging").is_err());
        assert_eq!(Environment::Production.to_string(), "production");
    }

    #[test]
    fn config_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.default_profile = Some("lab".into());
        cfg.profiles.insert(
            "lab".into(),
            Profile {
                username: Some("ada".into()),
                ..production("https://rooms.example.org")
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.default_profile.as_deref(), Some("lab"));
        assert_eq!(loaded.profile("lab").unwrap(), cfg.profile("lab").unwrap());
        assert_eq!(loaded.defaults.output, "table");
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.default_profile.as_deref(), Some("default"));
    }

    #[test]
    fn unknown_profile_lists_available() {
        let mut cfg = Config::default();
        cfg.profiles.insert("b".into(), Profile::default());
        cfg.profiles.insert("a".into(), Profile::default());
        match cfg.profile("c").unwrap_err() {
            ConfigError::UnknownProfile { name, available } => {
                assert_eq!(name, "c");
                assert_eq!(available, "a, b");
            }
            other => panic!("expected UnknownProfile, got {other:?}"),
        }
        assert_eq!(Config::default().available_profiles(), "(none)");
    }

    #[test]
    fn configuration_carries_token_when_given() {
        let profile = production("https://rooms.example.org");
        let config =
            configuration_with_token(&profile, Some(SecretString::from("jwt".to_owned()))).unwrap();
        assert_eq!(config.base_path(), "https://rooms.example.org/roompla/v0");
        assert_eq!(config.resolve_token().unwrap().expose_secret(), "jwt");

        let anonymous = configuration_with_token(&profile, None).unwrap();
        assert!(anonymous.access_token().is_none());
    }
}
