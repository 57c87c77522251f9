//! Configuration for the ontap-san CLI.
//!
//! TOML profiles, credential lookup (env var indirection + plaintext),
//! and translation into the connection settings `ontap_api` consumes.
//! Flag and environment overrides are layered on top by the binary.

use std::collections::BTreeMap;
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

use ontap_api::{AuthSettings, TlsMode, TransportConfig};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("profile '{name}' not found in configuration")]
    ProfileNotFound { name: String, available: String },

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
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named cluster profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named cluster profile.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct Profile {
    /// Cluster management address, bare (`10.0.0.5`) or a full URL.
    pub host: Option<String>,

    pub username: Option<String>,

    /// Password (plaintext; prefer `password_env`).
    pub password: Option<String>,

    /// Environment variable holding the password.
    pub password_env: Option<String>,

    /// OAuth 2.0 access token (plaintext; prefer `oauth_token_env`).
    pub oauth_token: Option<String>,

    /// Environment variable holding the OAuth token.
    pub oauth_token_env: Option<String>,

    /// Path to a PEM CA certificate to trust in addition to the system store.
    pub ca_cert: Option<PathBuf>,

    pub insecure: Option<bool>,

    pub timeout: Option<u64>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("", "", "ontap-san").map_or_else(
        || {
            let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
            p.push(".config");
            p.push("ontap-san");
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the config from the canonical path plus `ONTAP_SAN_*` environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the config from an explicit file. A missing file yields defaults.
///
/// Environment keys use `__` as the nesting separator, e.g.
/// `ONTAP_SAN_DEFAULTS__TIMEOUT=60`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ONTAP_SAN_").split("__"));

    Ok(figment.extract()?)
}

// ── Connection resolution ───────────────────────────────────────────

/// Connection values supplied by flags or the process environment.
/// Every field set here beats the profile, except `fallback_username`.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub host: Option<String>,
    pub username: Option<String>,
    /// Login name from the environment (`USER`). Used only when neither
    /// `username` nor the profile names an account.
    pub fallback_username: Option<String>,
    pub password: Option<SecretString>,
    pub oauth_token: Option<SecretString>,
    pub insecure: bool,
    pub timeout: Option<u64>,
}

/// Everything needed to build an `OntapClient`, resolved once.
#[derive(Debug, Clone)]
pub struct Connection {
    /// Empty when neither a flag nor the profile names a host.
    pub host: String,
    pub auth: AuthSettings,
    pub transport: TransportConfig,
}

impl Config {
    /// The active profile: `requested` if given (must exist), else
    /// `default_profile` when it names an existing profile.
    pub fn active_profile(
        &self,
        requested: Option<&str>,
    ) -> Result<Option<(&str, &Profile)>, ConfigError> {
        if let Some(name) = requested {
            return self
                .profiles
                .get_key_value(name)
                .map(|(k, v)| Some((k.as_str(), v)))
                .ok_or_else(|| ConfigError::ProfileNotFound {
                    name: name.into(),
                    available: self.profile_names(),
                });
        }

        Ok(self
            .default_profile
            .as_deref()
            .and_then(|name| self.profiles.get_key_value(name))
            .map(|(k, v)| (k.as_str(), v)))
    }

    fn profile_names(&self) -> String {
        if self.profiles.is_empty() {
            return "(none)".into();
        }
        self.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }

    /// Merge overrides, the active profile, and `[defaults]` into a
    /// [`Connection`]. Credentials are collected but not validated here.
    pub fn resolve(
        &self,
        profile_name: Option<&str>,
        overrides: Overrides,
    ) -> Result<Connection, ConfigError> {
        let profile = self
            .active_profile(profile_name)?
            .map(|(_, p)| p.clone())
            .unwrap_or_default();

        let host = overrides
            .host
            .filter(|h| !h.trim().is_empty())
            .or_else(|| profile.host.clone())
            .unwrap_or_default();

        let auth = AuthSettings {
            username: overrides
                .username
                .or_else(|| profile.username.clone())
                .or(overrides.fallback_username),
            password: overrides.password.or_else(|| profile.resolve_password()),
            oauth_token: overrides.oauth_token.or_else(|| profile.resolve_oauth_token()),
        };

        let insecure =
            overrides.insecure || profile.insecure.unwrap_or(self.defaults.insecure);
        let tls = if insecure {
            TlsMode::DangerAcceptInvalid
        } else if let Some(ref ca) = profile.ca_cert {
            TlsMode::CustomCa(ca.clone())
        } else {
            TlsMode::System
        };

        let timeout = overrides
            .timeout
            .or(profile.timeout)
            .unwrap_or(self.defaults.timeout);

        Ok(Connection {
            host,
            auth,
            transport: TransportConfig {
                tls,
                timeout: Duration::from_secs(timeout),
            },
        })
    }
}

impl Profile {
    /// `password_env` lookup first, then the plaintext value.
    pub fn resolve_password(&self) -> Option<SecretString> {
        secret_from(self.password_env.as_deref(), self.password.as_deref())
    }

    /// `oauth_token_env` lookup first, then the plaintext value.
    pub fn resolve_oauth_token(&self) -> Option<SecretString> {
        secret_from(self.oauth_token_env.as_deref(), self.oauth_token.as_deref())
    }
}

fn secret_from(env_name: Option<&str>, plaintext: Option<&str>) -> Option<SecretString> {
    env_name
        .and_then(|name| std::env::var(name).ok())
        .filter(|v| !v.is_empty())
        .or_else(|| plaintext.map(str::to_owned))
        .map(SecretString::from)
}
