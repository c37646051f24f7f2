// ── Domain model ──
//
// Consumer-facing types. Wire types from `powerview-api` are converted here
// so the queue and the CLI never deal with raw `posKindN` objects.

pub mod position;
pub mod shade;

pub use position::{
    MAX_POSITION, PositionKind, PositionMap, position_from_percent, position_to_percent,
};
pub use shade::Shade;

pub use powerview_api::{Motion, ShadeId, UserData};
