//! CLI error types with miette diagnostics.
//!
//! Maps `ontap_api::Error` and `ConfigError` variants into user-facing
//! errors with actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use ontap_api::Error as ApiError;
use ontap_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Usage ────────────────────────────────────────────────────────
    #[error("{message}")]
    #[diagnostic(code(ontap::usage), help("Run: ontap-san --help"))]
    Usage { message: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(ontap::validation))]
    Validation { field: String, reason: String },

    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the cluster: {source}")]
    #[diagnostic(
        code(ontap::connection_failed),
        help(
            "Check that HOST points at a reachable management LIF.\n\
             Use --insecure (-k) for clusters with self-signed certificates."
        )
    )]
    ConnectionFailed {
        #[source]
        source: ApiError,
    },

    #[error("{message}")]
    #[diagnostic(
        code(ontap::tls_error),
        help(
            "Use --insecure (-k) to accept a self-signed certificate,\n\
             or set ca_cert in your profile."
        )
    )]
    Tls { message: String },

    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(ontap::timeout),
        help("Increase the timeout with --timeout or ONTAP_TIMEOUT.")
    )]
    Timeout { seconds: u64 },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(ontap::auth_failed),
        help("Verify USER / PASSWORD, or ONTAP_OAUTH_TOKEN.")
    )]
    AuthFailed { message: String },

    #[error("Permission denied: {message}")]
    #[diagnostic(
        code(ontap::permission_denied),
        help("The account lacks the role required for this operation.")
    )]
    PermissionDenied { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(ontap::no_credentials),
        help(
            "Set USER and PASSWORD, or ONTAP_OAUTH_TOKEN,\n\
             or configure a profile in {path}"
        )
    )]
    NoCredentials { message: String, path: String },

    #[error("No cluster host configured")]
    #[diagnostic(
        code(ontap::no_host),
        help("Pass --host, set HOST, or configure a profile in {path}")
    )]
    NoHost { path: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("Not found: {message}")]
    #[diagnostic(code(ontap::not_found))]
    NotFound { message: String },

    #[error("Conflict: {message}")]
    #[diagnostic(
        code(ontap::conflict),
        help("The object already exists or is in use.")
    )]
    Conflict { message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("ONTAP API error (HTTP {status}{}): {message}", code_suffix(.code))]
    #[diagnostic(code(ontap::api_error))]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Unexpected response from the cluster: {message}")]
    #[diagnostic(code(ontap::parse_error))]
    Parse { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(ontap::profile_not_found),
        help("Available profiles: {available}")
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(ontap::config))]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(ontap::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Rendering ───────────────────────────────────────────────
    #[error("Failed to render output: {0}")]
    #[diagnostic(code(ontap::render))]
    Render(String),

    #[error(transparent)]
    #[diagnostic(code(ontap::io))]
    Io(#[from] std::io::Error),
}

#[allow(clippy::ref_option)]
fn code_suffix(code: &Option<String>) -> String {
    code.as_deref().map(|c| format!(", code {c}")).unwrap_or_default()
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Usage { .. }
            | Self::Validation { .. }
            | Self::NoHost { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::ConnectionFailed { .. } | Self::Tls { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            _ => exit_code::GENERAL,
        }
    }

    /// Short kind label for the one-line `error[<kind>]: ...` rendering.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Usage { .. } => "usage",
            Self::Validation { .. } => "validation",
            Self::ConnectionFailed { .. } => "transport",
            Self::Tls { .. } => "tls",
            Self::Timeout { .. } => "timeout",
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => "authentication",
            Self::PermissionDenied { .. } => "permission",
            Self::NotFound { .. } => "not-found",
            Self::Conflict { .. } => "conflict",
            Self::Api { .. } => "api",
            Self::Parse { .. } => "parse",
            Self::NoHost { .. } | Self::ProfileNotFound { .. } | Self::Config(_) => "config",
            Self::NonInteractiveRequiresYes { .. } => "confirmation",
            Self::Render(_) => "render",
            Self::Io(_) => "io",
        }
    }
}

// ── ontap_api::Error → CliError mapping ──────────────────────────────

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Configuration { message } => Self::NoCredentials {
                message,
                path: ontap_config::config_path().display().to_string(),
            },
            ApiError::Validation { field, reason } => Self::Validation { field, reason },
            ApiError::Authentication { status: 403, message } => {
                Self::PermissionDenied { message }
            }
            ApiError::Authentication { message, .. } => Self::AuthFailed { message },
            ApiError::NotFound { message } => Self::NotFound { message },
            ApiError::Conflict { message } => Self::Conflict { message },
            ApiError::Api {
                status,
                code,
                message,
            } => Self::Api {
                status,
                code,
                message,
            },
            ApiError::Timeout { timeout_secs } => Self::Timeout {
                seconds: timeout_secs,
            },
            ApiError::Tls(message) => Self::Tls { message },
            ApiError::InvalidUrl(e) => Self::Validation {
                field: "host".into(),
                reason: e.to_string(),
            },
            ApiError::Parse { message, .. } => Self::Parse { message },
            err @ ApiError::Transport(_) => Self::ConnectionFailed { source: err },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ProfileNotFound { name, available } => {
                Self::ProfileNotFound { name, available }
            }
            other @ ConfigError::Figment(_) => Self::Config(Box::new(other)),
        }
    }
}
