// ── Runtime hub configuration ──
//
// These types describe *how* to talk to a hub. They never touch disk; the
// CLI (through `powerview-config`) constructs a `HubConfig` and hands it in.

use std::time::Duration;

use url::Url;

/// Delay between the first enqueue into an idle queue and its dispatch.
///
/// Gives rapid successive calls (slider drags) a window to merge.
pub const INITIAL_REQUEST_DELAY: Duration = Duration::from_millis(100);

/// Pause between the completion of one queued request and the next dispatch.
pub const REQUEST_INTERVAL: Duration = Duration::from_millis(100);

/// Default per-request HTTP timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Pacing of the request queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchTiming {
    /// Delay before the first dispatch after the queue was empty.
    pub initial_delay: Duration,
    /// Delay between one completion and the next dispatch.
    pub request_interval: Duration,
}

impl Default for DispatchTiming {
    fn default() -> Self {
        Self {
            initial_delay: INITIAL_REQUEST_DELAY,
            request_interval: REQUEST_INTERVAL,
        }
    }
}

/// Configuration for talking to a single hub.
///
/// Built by the CLI, passed to `Hub` -- core never reads config files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubConfig {
    /// Hub base URL (e.g., `http://192.168.1.20`).
    pub url: Url,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
    /// Queue pacing.
    pub timing: DispatchTiming,
}

impl HubConfig {
    /// Configuration for a hub at `url` with default timeout and pacing.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            timeout: DEFAULT_TIMEOUT,
            timing: DispatchTiming::default(),
        }
    }
}
