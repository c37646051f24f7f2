// ── Merge policy ──
//
// Pure rules for folding a new update into a payload that is still waiting in
// the queue. Bottom rail and vanes are mutually exclusive on the hub: moving
// the bottom rail opens the vanes and tilting the vanes lowers the rail, so a
// merged request must never carry both.

use crate::model::{Motion, PositionKind, PositionMap};

/// Fold `(kind, value)` into a queued position map.
///
/// `user_initiated` marks an explicit user command as opposed to a default or
/// derived value. An explicit bottom or vanes write evicts the other axis; a
/// derived one is dropped when the other axis is already queued. Top never
/// takes part in the exclusion.
pub fn merge_position(
    positions: &mut PositionMap,
    kind: PositionKind,
    value: u16,
    user_initiated: bool,
) {
    positions.set(kind, value);

    match kind {
        PositionKind::Vanes if user_initiated => {
            positions.remove(PositionKind::Bottom);
        }
        PositionKind::Vanes if positions.contains(PositionKind::Bottom) => {
            positions.remove(PositionKind::Vanes);
        }
        PositionKind::Bottom if user_initiated => {
            positions.remove(PositionKind::Vanes);
        }
        PositionKind::Bottom if positions.contains(PositionKind::Vanes) => {
            positions.remove(PositionKind::Bottom);
        }
        _ => {}
    }
}

/// Fold a sequence of position updates, in order, starting from `initial`.
pub fn fold_positions(
    initial: PositionMap,
    updates: impl IntoIterator<Item = (PositionKind, u16, bool)>,
) -> PositionMap {
    updates
        .into_iter()
        .fold(initial, |mut positions, (kind, value, user_initiated)| {
            merge_position(&mut positions, kind, value, user_initiated);
            positions
        })
}

/// Whether a new motion command folds into a queued one.
///
/// Motion commands are atomic: a repeat of the same verb is a duplicate,
/// anything else must be sent on its own.
pub fn motion_absorbs(queued: Motion, incoming: Motion) -> bool {
    queued == incoming
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn map(entries: &[(PositionKind, u16)]) -> PositionMap {
        entries.iter().copied().collect()
    }

    #[test]
    fn user_vanes_evicts_queued_bottom() {
        let mut positions = PositionMap::single(PositionKind::Bottom, 3);
        merge_position(&mut positions, PositionKind::Vanes, 5, true);
        assert_eq!(positions, map(&[(PositionKind::Vanes, 5)]));
    }

    #[test]
    fn derived_vanes_is_dropped_when_bottom_queued() {
        let mut positions = PositionMap::single(PositionKind::Bottom, 3);
        merge_position(&mut positions, PositionKind::Vanes, 0, false);
        assert_eq!(positions, map(&[(PositionKind::Bottom, 3)]));
    }

    #[test]
    fn user_bottom_evicts_queued_vanes() {
        let mut positions = PositionMap::single(PositionKind::Vanes, 7);
        merge_position(&mut positions, PositionKind::Bottom, 4, true);
        assert_eq!(positions, map(&[(PositionKind::Bottom, 4)]));
    }

    #[test]
    fn derived_bottom_is_dropped_when_vanes_queued() {
        let mut positions = PositionMap::single(PositionKind::Vanes, 7);
        merge_position(&mut positions, PositionKind::Bottom, 0, false);
        assert_eq!(positions, map(&[(PositionKind::Vanes, 7)]));
    }

    #[test]
    fn derived_write_without_conflict_is_kept() {
        let mut positions = PositionMap::single(PositionKind::Top, 1);
        merge_position(&mut positions, PositionKind::Bottom, 0, false);
        assert_eq!(
            positions,
            map(&[(PositionKind::Bottom, 0), (PositionKind::Top, 1)])
        );
    }

    #[test]
    fn top_never_evicts() {
        let mut positions = map(&[(PositionKind::Bottom, 2)]);
        merge_position(&mut positions, PositionKind::Top, 9, true);
        assert_eq!(
            positions,
            map(&[(PositionKind::Bottom, 2), (PositionKind::Top, 9)])
        );

        let mut positions = map(&[(PositionKind::Vanes, 2)]);
        merge_position(&mut positions, PositionKind::Top, 9, false);
        assert_eq!(
            positions,
            map(&[(PositionKind::Top, 9), (PositionKind::Vanes, 2)])
        );
    }

    #[test]
    fn same_kind_overwrites() {
        let positions = fold_positions(
            PositionMap::new(),
            [
                (PositionKind::Bottom, 10, true),
                (PositionKind::Bottom, 20, true),
                (PositionKind::Bottom, 30, false),
            ],
        );
        assert_eq!(positions, map(&[(PositionKind::Bottom, 30)]));
    }

    #[test]
    fn fold_applies_rules_in_order() {
        let positions = fold_positions(
            PositionMap::single(PositionKind::Bottom, 100),
            [
                (PositionKind::Top, 5, true),
                (PositionKind::Vanes, 0, false),
                (PositionKind::Vanes, 40, true),
                (PositionKind::Bottom, 0, false),
            ],
        );
        assert_eq!(
            positions,
            map(&[(PositionKind::Top, 5), (PositionKind::Vanes, 40)])
        );
    }

    #[test]
    fn motion_only_absorbs_same_verb() {
        assert!(motion_absorbs(Motion::Jog, Motion::Jog));
        assert!(motion_absorbs(Motion::Calibrate, Motion::Calibrate));
        assert!(!motion_absorbs(Motion::Jog, Motion::Calibrate));
    }
}
