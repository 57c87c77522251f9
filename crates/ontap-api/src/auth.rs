use base64::prelude::*;
use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Which authentication scheme a set of [`Credentials`] uses.
///
/// Marker enum (no data) -- useful for logging the auth flow without
/// carrying secret material.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStrategy {
    /// `Authorization: Basic base64(user:pass)`
    Basic,
    /// `Authorization: Bearer <token>` (ONTAP OAuth 2.0)
    Bearer,
}

/// Raw credential material as found in configuration.
///
/// Every field is optional; [`Credentials::resolve`] decides which
/// scheme wins. Empty strings count as absent.
#[derive(Debug, Clone, Default)]
pub struct AuthSettings {
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub oauth_token: Option<SecretString>,
}

/// Credentials for authenticating with an ONTAP cluster.
///
/// Resolved once at startup and held immutably for the process lifetime.
#[derive(Debug, Clone)]
pub enum Credentials {
    /// HTTP Basic auth with a cluster or SVM account.
    Basic {
        username: String,
        password: SecretString,
    },

    /// OAuth 2.0 access token.
    Bearer { token: SecretString },
}

impl Credentials {
    /// Pick the credentials to use from configuration.
    ///
    /// A bearer token takes precedence over a Basic pair when both are set.
    pub fn resolve(settings: &AuthSettings) -> Result<Self, Error> {
        if let Some(token) = settings
            .oauth_token
            .as_ref()
            .filter(|t| !t.expose_secret().is_empty())
        {
            return Ok(Self::Bearer {
                token: token.clone(),
            });
        }

        let username = settings.username.as_deref().filter(|u| !u.is_empty());
        let password = settings
            .password
            .as_ref()
            .filter(|p| !p.expose_secret().is_empty());

        match (username, password) {
            (Some(username), Some(password)) => Ok(Self::Basic {
                username: username.to_owned(),
                password: password.clone(),
            }),
            (Some(_), None) => Err(Error::Configuration {
                message: "a username is set but no password (set PASSWORD)".into(),
            }),
            (None, Some(_)) => Err(Error::Configuration {
                message: "a password is set but no username (set USER)".into(),
            }),
            (None, None) => Err(Error::Configuration {
                message: "no credentials configured (set USER and PASSWORD, or ONTAP_OAUTH_TOKEN)"
                    .into(),
            }),
        }
    }

    pub fn strategy(&self) -> AuthStrategy {
        match self {
            Self::Basic { .. } => AuthStrategy::Basic,
            Self::Bearer { .. } => AuthStrategy::Bearer,
        }
    }

    /// The `Authorization` header value for these credentials, marked sensitive.
    pub fn header_value(&self) -> Result<HeaderValue, Error> {
        let raw = match self {
            Self::Basic { username, password } => format!(
                "Basic {}",
                BASE64_STANDARD.encode(format!("{username}:{}", password.expose_secret()))
            ),
            Self::Bearer { token } => format!("Bearer {}", token.expose_secret()),
        };

        let mut value = HeaderValue::from_str(&raw).map_err(|e| Error::Configuration {
            message: format!("credentials are not a valid header value: {e}"),
        })?;
        value.set_sensitive(true);
        Ok(value)
    }
}
