// ── Core error types ──
//
// Errors handed to callers of `Hub`. A single failed hub request is delivered
// to every caller merged into it, so this type is `Clone` and carries only
// owned data. The `From<powerview_api::Error>` impl translates transport-layer
// errors into these variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    // ── Transport errors ─────────────────────────────────────────────
    #[error("Cannot connect to hub at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Hub request timed out: {message}")]
    Timeout { message: String },

    #[error("Hub transport error: {message}")]
    Transport { message: String },

    // ── Protocol errors ──────────────────────────────────────────────
    #[error("HTTP Error {status}")]
    HttpStatus { status: u16 },

    #[error("Malformed hub response: {message}")]
    MalformedResponse { message: String },

    // ── Input errors ─────────────────────────────────────────────────
    #[error("Invalid position: {message}")]
    InvalidPosition { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Lifecycle errors ─────────────────────────────────────────────
    #[error("Hub request queue has shut down")]
    HubShutdown,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// The HTTP status code behind this error, if the hub answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if the hub was never reached.
    pub fn is_connection(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed { .. } | Self::Timeout { .. } | Self::Transport { .. }
        )
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<powerview_api::Error> for CoreError {
    fn from(err: powerview_api::Error) -> Self {
        match err {
            powerview_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout {
                        message: e.to_string(),
                    }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Transport {
                        message: e.to_string(),
                    }
                }
            }
            powerview_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            powerview_api::Error::ClientBuild(message) => CoreError::Config { message },
            powerview_api::Error::Status { status } => CoreError::HttpStatus { status },
            powerview_api::Error::Deserialization { message, body: _ } => {
                CoreError::MalformedResponse { message }
            }
        }
    }
}
