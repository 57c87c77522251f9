use thiserror::Error;

/// Top-level error type for the `ontap-api` crate.
///
/// Covers every failure mode of a single CLI invocation: credential
/// resolution, input validation, HTTP status classification, transport,
/// and response parsing. The binary maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Configuration ───────────────────────────────────────────────
    /// Missing or unusable connection settings (credentials, host).
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    // ── Input ───────────────────────────────────────────────────────
    /// Malformed user input, rejected before any request is sent.
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    // ── HTTP status classes ─────────────────────────────────────────
    /// HTTP 401 or 403.
    #[error("Authentication failed (HTTP {status}): {message}")]
    Authentication { status: u16, message: String },

    /// HTTP 404. Delete flows use this to report "already absent".
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// HTTP 409, e.g. a duplicate name.
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// Any other non-2xx response, parsed from the `{error: {message, code}}` envelope.
    #[error("ONTAP API error (HTTP {status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── Data ────────────────────────────────────────────────────────
    /// Response body did not have the expected shape.
    #[error("Unexpected response: {message}")]
    Parse { message: String, body: String },
}

impl Error {
    /// Returns `true` for HTTP 404 responses.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if the server rejected the credentials or permissions.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// The HTTP status behind this error, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. } | Self::Api { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(404),
            Self::Conflict { .. } => Some(409),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Extract the ONTAP error code, if available.
    pub fn api_error_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    pub(crate) fn parse(message: impl Into<String>, body: &str) -> Self {
        let preview: String = body.chars().take(200).collect();
        Self::Parse {
            message: format!("{} (body preview: {preview:?})", message.into()),
            body: body.to_owned(),
        }
    }
}
