use thiserror::Error;

/// Top-level error type for the `powerview-api` crate.
///
/// Covers every failure mode of a single hub round-trip: reaching the hub,
/// a non-200 answer, and a body that does not parse. `powerview-core` maps
/// these into cloneable domain errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    // ── Protocol ────────────────────────────────────────────────────
    /// The hub answered with something other than `200 OK`.
    #[error("HTTP Error {status}")]
    Status { status: u16 },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if the hub could not be reached at all.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Returns `true` if this is a "not found" answer from the hub.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404 })
    }

    /// The HTTP status code behind this error, if the hub answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
