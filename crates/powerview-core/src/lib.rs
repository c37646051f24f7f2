// powerview-core: Serialized, merging request queue for a PowerView hub.

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod hub;
pub mod merge;
pub mod model;
pub mod queue;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{
    DEFAULT_TIMEOUT, DispatchTiming, HubConfig, INITIAL_REQUEST_DELAY, REQUEST_INTERVAL,
};
pub use dispatcher::{HubTransport, QueueHandle};
pub use error::CoreError;
pub use hub::Hub;
pub use queue::{Enqueued, EntryState, Job, JobKind, PendingRequest, RequestQueue, Update};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    MAX_POSITION, Motion, PositionKind, PositionMap, Shade, ShadeId, UserData,
    position_from_percent, position_to_percent,
};
