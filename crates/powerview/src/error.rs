//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with help text.

use miette::Diagnostic;
use thiserror::Error;

use powerview_config::ConfigError;
use powerview_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to hub at {url}")]
    #[diagnostic(
        code(powerview::connection_failed),
        help(
            "Check that the hub is powered and on the same network.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Hub request timed out")]
    #[diagnostic(
        code(powerview::timeout),
        help("Increase timeout with --timeout or check hub responsiveness.\n{message}")
    )]
    Timeout { message: String },

    // ── Hub responses ────────────────────────────────────────────────
    #[error("Shade '{identifier}' not found")]
    #[diagnostic(
        code(powerview::not_found),
        help("Run: powerview shades list to see available shades")
    )]
    NotFound { identifier: String },

    #[error("Hub error: {message}")]
    #[diagnostic(code(powerview::hub_error))]
    HubError { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(powerview::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Hub profile '{name}' not found in configuration")]
    #[diagnostic(
        code(powerview::hub_not_found),
        help(
            "Add a [hubs.{name}] table to {path}\n\
             Or pass the hub address with --host."
        )
    )]
    HubNotFound { name: String, path: String },

    #[error("Configuration error: {message}")]
    #[diagnostic(code(powerview::config))]
    Config { message: String },
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::HubNotFound { .. } | Self::Config { .. } => {
                exit_code::USAGE
            }
            Self::HubError { .. } => exit_code::GENERAL,
        }
    }

    /// Turn a 404 from the hub into a shade-specific `NotFound`.
    pub fn for_shade(err: CoreError, shade: u32) -> Self {
        match err {
            CoreError::HttpStatus { status: 404 } => Self::NotFound {
                identifier: shade.to_string(),
            },
            other => other.into(),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::Timeout { message } => CliError::Timeout { message },

            CoreError::InvalidPosition { message } => CliError::Validation {
                field: "position".into(),
                reason: message,
            },

            CoreError::Config { message } => CliError::Config { message },

            other @ (CoreError::Transport { .. }
            | CoreError::HttpStatus { .. }
            | CoreError::MalformedResponse { .. }
            | CoreError::HubShutdown
            | CoreError::Internal(_)) => CliError::HubError {
                message: other.to_string(),
            },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::UnknownHub { name } => CliError::HubNotFound {
                name,
                path: powerview_config::config_path().display().to_string(),
            },
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other @ ConfigError::Figment(_) => CliError::Config {
                message: other.to_string(),
            },
        }
    }
}
