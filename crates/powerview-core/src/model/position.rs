// ── Shade positions ──
//
// A shade has up to three independently positioned axes. The hub addresses
// them by a small integer kind index; `PositionMap` keeps them sorted by that
// index so the wire encoding is stable.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use tracing::debug;

use powerview_api::{PositionEntry, ShadePositions};

use crate::error::CoreError;

/// Highest raw position value the hub accepts.
pub const MAX_POSITION: u16 = u16::MAX;

/// Which physical axis of a shade a position applies to.
///
/// Declaration order matches the hub's kind index, so the derived `Ord`
/// sorts exactly the way the wire format expects.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PositionKind {
    Bottom = 1,
    Top = 2,
    Vanes = 3,
}

impl PositionKind {
    /// The hub's `posKind` index.
    pub fn index(self) -> u8 {
        match self {
            Self::Bottom => 1,
            Self::Top => 2,
            Self::Vanes => 3,
        }
    }
}

impl TryFrom<u8> for PositionKind {
    type Error = CoreError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        match index {
            1 => Ok(Self::Bottom),
            2 => Ok(Self::Top),
            3 => Ok(Self::Vanes),
            other => Err(CoreError::InvalidPosition {
                message: format!("unknown position kind {other}"),
            }),
        }
    }
}

/// Convert a percentage (0..=100) into a raw hub position.
pub fn position_from_percent(percent: u8) -> Result<u16, CoreError> {
    if percent > 100 {
        return Err(CoreError::InvalidPosition {
            message: format!("percentage must be 0-100, got {percent}"),
        });
    }
    let raw = (u32::from(percent) * u32::from(MAX_POSITION) + 50) / 100;
    u16::try_from(raw).map_err(|_| CoreError::Internal(format!("position overflow: {raw}")))
}

/// Convert a raw hub position into a rounded percentage.
pub fn position_to_percent(value: u16) -> u8 {
    let max = u32::from(MAX_POSITION);
    let percent = (u32::from(value) * 100 + max / 2) / max;
    u8::try_from(percent).unwrap_or(100)
}

/// Sparse map of position kind to raw hub value, ordered by kind index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PositionMap(BTreeMap<PositionKind, u16>);

impl PositionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// A map holding exactly one position.
    pub fn single(kind: PositionKind, value: u16) -> Self {
        let mut map = Self::new();
        map.set(kind, value);
        map
    }

    pub fn get(&self, kind: PositionKind) -> Option<u16> {
        self.0.get(&kind).copied()
    }

    pub fn set(&mut self, kind: PositionKind, value: u16) {
        self.0.insert(kind, value);
    }

    pub fn remove(&mut self, kind: PositionKind) -> Option<u16> {
        self.0.remove(&kind)
    }

    pub fn contains(&self, kind: PositionKind) -> bool {
        self.0.contains_key(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate positions in ascending kind order.
    pub fn iter(&self) -> impl Iterator<Item = (PositionKind, u16)> + '_ {
        self.0.iter().map(|(kind, value)| (*kind, *value))
    }

    /// Encode for the hub: ascending kind index, numbered from 1.
    pub fn to_wire(&self) -> ShadePositions {
        self.iter()
            .map(|(kind, value)| PositionEntry {
                kind: kind.index(),
                value,
            })
            .collect()
    }

    /// Decode a hub position object, rejecting unknown kinds.
    pub fn from_wire(positions: &ShadePositions) -> Result<Self, CoreError> {
        let mut map = Self::new();
        for entry in positions.entries() {
            map.set(PositionKind::try_from(entry.kind)?, entry.value);
        }
        Ok(map)
    }

    /// Decode a hub position object, skipping kinds this crate does not model.
    pub fn from_wire_lossy(positions: &ShadePositions) -> Self {
        let mut map = Self::new();
        for entry in positions.entries() {
            match PositionKind::try_from(entry.kind) {
                Ok(kind) => map.set(kind, entry.value),
                Err(_) => debug!(kind = entry.kind, "ignoring unknown position kind"),
            }
        }
        map
    }
}

impl FromIterator<(PositionKind, u16)> for PositionMap {
    fn from_iter<I: IntoIterator<Item = (PositionKind, u16)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn wire_encoding_is_ordered_by_kind_index() {
        let mut map = PositionMap::new();
        map.set(PositionKind::Vanes, 5);
        map.set(PositionKind::Top, 2);

        let wire = map.to_wire();
        assert_eq!(
            wire.entries(),
            &[
                PositionEntry { kind: 2, value: 2 },
                PositionEntry { kind: 3, value: 5 },
            ]
        );

        let json = serde_json::to_value(&wire).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "posKind1": 2, "position1": 2,
                "posKind2": 3, "position2": 5,
            })
        );
    }

    #[test]
    fn wire_decoding_restores_kinds() {
        let map: PositionMap = [(PositionKind::Top, 2), (PositionKind::Vanes, 5)]
            .into_iter()
            .collect();

        let decoded = PositionMap::from_wire(&map.to_wire()).unwrap();
        assert_eq!(decoded, map);
        assert_eq!(decoded.get(PositionKind::Top), Some(2));
        assert_eq!(decoded.get(PositionKind::Vanes), Some(5));
        assert_eq!(decoded.get(PositionKind::Bottom), None);
    }

    #[test]
    fn unknown_kind_is_rejected_or_skipped() {
        let wire = ShadePositions::new(vec![
            PositionEntry { kind: 1, value: 10 },
            PositionEntry { kind: 7, value: 20 },
        ]);

        assert!(matches!(
            PositionMap::from_wire(&wire),
            Err(CoreError::InvalidPosition { .. })
        ));
        assert_eq!(
            PositionMap::from_wire_lossy(&wire),
            PositionMap::single(PositionKind::Bottom, 10)
        );
    }

    #[test]
    fn percent_conversion() {
        assert_eq!(position_from_percent(0).unwrap(), 0);
        assert_eq!(position_from_percent(100).unwrap(), MAX_POSITION);
        assert_eq!(position_from_percent(50).unwrap(), 32768);
        assert!(position_from_percent(101).is_err());

        assert_eq!(position_to_percent(0), 0);
        assert_eq!(position_to_percent(MAX_POSITION), 100);
        assert_eq!(position_to_percent(32768), 50);
    }

    #[test]
    fn kind_parses_from_lowercase_name() {
        assert_eq!("vanes".parse::<PositionKind>().unwrap(), PositionKind::Vanes);
        assert_eq!(PositionKind::Bottom.to_string(), "bottom");
    }
}
