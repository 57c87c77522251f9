//! CLI configuration: thin wrapper around `ontap_config`.
//!
//! Turns `GlobalOpts` (flags and their environment variables) into the
//! overrides the shared crate layers over the active profile, then builds
//! the API client from the result.

use clap::ValueEnum;
use secrecy::SecretString;

use ontap_api::{Credentials, OntapClient};
use ontap_config::{Config, Overrides, config_path, load_config};

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Flag values that beat the profile. The login shell's `USER` only
/// fills in when the profile names no account.
pub fn overrides(global: &GlobalOpts) -> Overrides {
    Overrides {
        host: global.host.clone(),
        username: global.user.clone().filter(|u| !u.is_empty()),
        fallback_username: std::env::var("USER").ok().filter(|u| !u.is_empty()),
        password: global.password.clone().map(SecretString::from),
        oauth_token: global.oauth_token.clone().map(SecretString::from),
        insecure: global.insecure,
        timeout: global.timeout,
    }
}

/// Output format: `--output` / `ONTAP_OUTPUT`, else `[defaults] output`,
/// else table.
pub fn output_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    global.output.unwrap_or_else(|| {
        OutputFormat::from_str(&config.defaults.output, true).unwrap_or_else(|_| {
            tracing::warn!(
                value = %config.defaults.output,
                "unknown output format in config, using table"
            );
            OutputFormat::Table
        })
    })
}

/// Load the config file. A missing file yields defaults; a malformed one
/// is an error.
pub fn load() -> Result<Config, CliError> {
    Ok(load_config()?)
}

/// Resolve host, credentials, and transport once and build the client.
pub fn build_client(global: &GlobalOpts, config: &Config) -> Result<OntapClient, CliError> {
    let conn = config.resolve(global.profile.as_deref(), overrides(global))?;

    if conn.host.trim().is_empty() {
        return Err(CliError::NoHost {
            path: config_path().display().to_string(),
        });
    }

    let credentials = Credentials::resolve(&conn.auth)?;
    tracing::debug!(host = %conn.host, strategy = ?credentials.strategy(), "resolved connection");

    Ok(OntapClient::new(&conn.host, &credentials, &conn.transport)?)
}
