//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use roompla_config::ConfigError;
use roompla_core::{ApiError, CoreError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the roompla server at {url}")]
    #[diagnostic(
        code(roompla::connection_failed),
        help(
            "Check that the server is running and reachable.\n\
             URL: {url}\n\
             Development profiles expect a local server on port 5050;\n\
             select another with --environment production --server <origin>."
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed")]
    #[diagnostic(
        code(roompla::auth_failed),
        help("Log in again with: roompla login")
    )]
    AuthFailed,

    #[error("Could not store the token for profile '{profile}'")]
    #[diagnostic(
        code(roompla::keyring),
        help(
            "The system keyring is unavailable.\n\
             Use `roompla login --print-token` and export it as ROOMPLA_TOKEN,\n\
             or point the profile's token_env at a variable holding it."
        )
    )]
    TokenStorage {
        profile: String,
        #[source]
        source: ConfigError,
    },

    // ── Server responses ─────────────────────────────────────────────
    #[error("Not found: {message}")]
    #[diagnostic(
        code(roompla::not_found),
        help("Run: roompla rooms list to see available rooms")
    )]
    NotFound { message: String },

    #[error("Not permitted: {message}")]
    #[diagnostic(
        code(roompla::permission),
        help(
            "The server refused the request. It rejects changes to occupancies\n\
             booked by other accounts and time ranges whose end is not after\n\
             their start."
        )
    )]
    PermissionDenied { message: String },

    #[error("Conflict: {message}")]
    #[diagnostic(
        code(roompla::conflict),
        help("The room is full for that slot. Pick another time or room.")
    )]
    Conflict { message: String },

    #[error("API error (HTTP {status}): {message}")]
    #[diagnostic(code(roompla::api_error))]
    Api { status: u16, message: String },

    #[error("Unexpected response from server: {message}")]
    #[diagnostic(code(roompla::decode))]
    Decode { message: String },

    #[error("Session changed while the request was in flight")]
    #[diagnostic(code(roompla::stale_session), help("Run the command again."))]
    StaleSession,

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(roompla::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(roompla::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: roompla config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(
        code(roompla::config),
        help("Inspect the configuration with: roompla config show")
    )]
    Config(ConfigError),

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed | Self::TokenStorage { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownProfile { name, available } => {
                CliError::ProfileNotFound { name, available }
            }
            other => CliError::Config(other),
        }
    }
}

// ── CoreError / ApiError → CliError mapping ──────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::StaleSession { .. } => CliError::StaleSession,

            CoreError::InvalidTimeRange { message } => CliError::Validation {
                field: "time range".into(),
                reason: message,
            },

            CoreError::Api(api) => api.into(),
        }
    }
}

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::RequiredParameter {
                parameter,
                operation,
            } => CliError::Validation {
                field: parameter.into(),
                reason: format!("required by {operation}"),
            },

            ApiError::InvalidTimeRange { message } => CliError::Validation {
                field: "time range".into(),
                reason: message,
            },

            ApiError::Configuration { message } => CliError::Validation {
                field: "server".into(),
                reason: message,
            },

            ApiError::Api { status, body } => match status {
                401 => CliError::AuthFailed,
                403 => CliError::PermissionDenied { message: body },
                404 => CliError::NotFound { message: body },
                409 => CliError::Conflict { message: body },
                _ => CliError::Api {
                    status,
                    message: body,
                },
            },

            ApiError::Transport(e) => CliError::ConnectionFailed {
                url: e.url().map(ToString::to_string).unwrap_or_else(|| "<unknown>".into()),
                source: Box::new(e),
            },

            ApiError::Decode { message, .. } => CliError::Decode { message },
        }
    }
}
