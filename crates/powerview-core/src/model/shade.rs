use serde::Serialize;

use powerview_api::ShadeId;

use super::position::PositionMap;

/// A shade as seen by consumers, with positions decoded into a [`PositionMap`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shade {
    pub id: ShadeId,
    /// Base64-encoded display name as stored on the hub.
    pub name: Option<String>,
    pub room_id: Option<u32>,
    pub shade_type: Option<u32>,
    pub battery_strength: Option<u32>,
    pub positions: PositionMap,
}

impl From<powerview_api::Shade> for Shade {
    fn from(raw: powerview_api::Shade) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            room_id: raw.room_id,
            shade_type: raw.shade_type,
            battery_strength: raw.battery_strength,
            positions: raw
                .positions
                .as_ref()
                .map(PositionMap::from_wire_lossy)
                .unwrap_or_default(),
        }
    }
}
