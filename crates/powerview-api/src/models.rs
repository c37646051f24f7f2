// PowerView hub request/response types
//
// Shade endpoints wrap their payload in a `{ "shade": {...} }` envelope and
// the user data endpoint in `{ "userData": {...} }`. Fields use
// `#[serde(default)]` liberally because hub firmware versions disagree about
// which fields are present.

use std::collections::HashMap;
use std::fmt;

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ── Identifiers ──────────────────────────────────────────────────────

/// Numeric shade identifier assigned by the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShadeId(pub u32);

impl fmt::Display for ShadeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<u32> for ShadeId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

// ── Envelopes ────────────────────────────────────────────────────────

/// `{ "shade": ... }` envelope used by `/home/shades/{id}` in both directions.
#[derive(Debug, Serialize, Deserialize)]
pub struct ShadeEnvelope<T> {
    pub shade: T,
}

/// `{ "userData": ... }` envelope returned by `/home/userdata`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDataEnvelope {
    pub user_data: UserData,
}

// ── Positions ────────────────────────────────────────────────────────

/// One `posKindN` / `positionN` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionEntry {
    /// Raw position kind index (1 = bottom rail, 2 = top rail, 3 = vanes).
    pub kind: u8,
    /// Raw hub position, 0..=65535.
    pub value: u16,
}

/// The hub's flattened position object.
///
/// On the wire the entries are numbered from 1 without gaps:
/// ```json
/// { "posKind1": 1, "position1": 32768, "posKind2": 3, "position2": 0 }
/// ```
/// Entry order is preserved exactly as given; callers that build a payload
/// are responsible for ordering it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShadePositions {
    entries: Vec<PositionEntry>,
}

impl ShadePositions {
    pub fn new(entries: Vec<PositionEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[PositionEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl FromIterator<PositionEntry> for ShadePositions {
    fn from_iter<I: IntoIterator<Item = PositionEntry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Serialize for ShadePositions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len() * 2))?;
        for (n, entry) in self.entries.iter().enumerate() {
            let n = n + 1;
            map.serialize_entry(&format!("posKind{n}"), &entry.kind)?;
            map.serialize_entry(&format!("position{n}"), &entry.value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ShadePositions {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = HashMap::<String, u32>::deserialize(deserializer)?;

        // Walk posKind1, posKind2, ... until the numbering stops.
        let mut entries = Vec::new();
        for n in 1.. {
            let Some(&kind) = raw.get(&format!("posKind{n}")) else {
                break;
            };
            let value = raw
                .get(&format!("position{n}"))
                .copied()
                .ok_or_else(|| D::Error::custom(format!("missing position{n} for posKind{n}")))?;
            entries.push(PositionEntry {
                kind: u8::try_from(kind)
                    .map_err(|_| D::Error::custom(format!("posKind{n} out of range: {kind}")))?,
                value: u16::try_from(value)
                    .map_err(|_| D::Error::custom(format!("position{n} out of range: {value}")))?,
            });
        }

        Ok(Self { entries })
    }
}

// ── Requests ─────────────────────────────────────────────────────────

/// Single-word motion commands understood by the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Motion {
    Jog,
    Calibrate,
}

impl fmt::Display for Motion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Jog => "jog",
            Self::Calibrate => "calibrate",
        })
    }
}

/// Body of a `PUT /home/shades/{id}` request (inside the `shade` envelope).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ShadeUpdate {
    Positions { positions: ShadePositions },
    Motion { motion: Motion },
}

// ── Responses ────────────────────────────────────────────────────────

/// A shade as reported by the hub.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shade {
    pub id: ShadeId,
    /// Base64-encoded display name, exactly as the hub stores it.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub room_id: Option<u32>,
    #[serde(default)]
    pub group_id: Option<u32>,
    #[serde(default, rename = "type")]
    pub shade_type: Option<u32>,
    #[serde(default)]
    pub battery_status: Option<u8>,
    #[serde(default)]
    pub battery_strength: Option<u32>,
    #[serde(default)]
    pub positions: Option<ShadePositions>,
}

/// Response of `GET /home/shades`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShadesResponse {
    #[serde(default)]
    pub shade_ids: Vec<ShadeId>,
    #[serde(default)]
    pub shade_data: Vec<Shade>,
}

/// Hub account / identity information from `GET /home/userdata`.
///
/// Only the commonly needed fields are modelled; everything else lands in `extra`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserData {
    /// Base64-encoded hub name.
    #[serde(default)]
    pub hub_name: Option<String>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub mac_address: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default, rename = "rfID")]
    pub rf_id: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn positions_serialize_numbered_from_one() {
        let positions = ShadePositions::new(vec![
            PositionEntry { kind: 1, value: 100 },
            PositionEntry { kind: 3, value: 0 },
        ]);
        let body = serde_json::to_value(ShadeEnvelope {
            shade: ShadeUpdate::Positions { positions },
        })
        .unwrap();

        assert_eq!(
            body,
            json!({ "shade": { "positions": {
                "posKind1": 1, "position1": 100,
                "posKind2": 3, "position2": 0,
            } } })
        );
    }

    #[test]
    fn motion_serializes_as_single_word() {
        let body = serde_json::to_value(ShadeUpdate::Motion {
            motion: Motion::Calibrate,
        })
        .unwrap();
        assert_eq!(body, json!({ "motion": "calibrate" }));
    }

    #[test]
    fn positions_deserialize_stops_at_gap() {
        let positions: ShadePositions = serde_json::from_value(json!({
            "posKind2": 3, "position2": 7,
            "posKind1": 2, "position1": 5,
            "posKind4": 1, "position4": 9,
        }))
        .unwrap();

        assert_eq!(
            positions.entries(),
            &[
                PositionEntry { kind: 2, value: 5 },
                PositionEntry { kind: 3, value: 7 },
            ]
        );
    }

    #[test]
    fn positions_deserialize_rejects_missing_value() {
        let err = serde_json::from_value::<ShadePositions>(json!({ "posKind1": 1 })).unwrap_err();
        assert!(err.to_string().contains("position1"));
    }

    #[test]
    fn positions_deserialize_rejects_out_of_range_value() {
        let err = serde_json::from_value::<ShadePositions>(json!({
            "posKind1": 1, "position1": 70000,
        }))
        .unwrap_err();
        assert!(err.to_string().contains("out of range"));
    }
}
