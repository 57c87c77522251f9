// Transport configuration for building the reqwest::Client.
//
// TLS mode, timeout, and default headers live here so the API client
// only deals with request/response mechanics.

use std::path::PathBuf;
use std::sync::Once;
use std::time::Duration;

use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use tracing::warn;

use crate::error::Error;

static INSECURE_WARNING: Once = Once::new();

/// TLS verification mode.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Trust an additional CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (lab clusters with self-signed certificates).
    DangerAcceptInvalid,
}

/// Transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    pub fn insecure(mut self, insecure: bool) -> Self {
        if insecure {
            self.tls = TlsMode::DangerAcceptInvalid;
        }
        self
    }

    /// Build a `reqwest::Client` with the given default headers
    /// (the `Authorization` header is injected this way).
    pub fn build_client(&self, mut headers: HeaderMap) -> Result<reqwest::Client, Error> {
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("ontap-san/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                INSECURE_WARNING.call_once(|| {
                    warn!("TLS certificate verification is disabled");
                });
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn insecure_flag_switches_tls_mode() {
        let config = TransportConfig::default().insecure(true);
        assert!(matches!(config.tls, TlsMode::DangerAcceptInvalid));

        let config = TransportConfig::default().insecure(false);
        assert!(matches!(config.tls, TlsMode::System));
    }

    #[test]
    fn insecure_client_builds_repeatedly() {
        let config = TransportConfig::default().insecure(true);
        config.build_client(HeaderMap::new()).unwrap();
        config.build_client(HeaderMap::new()).unwrap();
    }

    #[test]
    fn missing_ca_file_is_tls_error() {
        let config = TransportConfig {
            tls: TlsMode::CustomCa(PathBuf::from("/nonexistent/ca.pem")),
            ..TransportConfig::default()
        };
        let err = config.build_client(HeaderMap::new()).unwrap_err();
        assert!(matches!(err, Error::Tls(_)), "got {err:?}");
    }
}
