// ── Request queue ──
//
// Ordered list of not-yet-completed hub requests. New updates merge into a
// waiting entry for the same shade and job kind, or are appended. The head is
// frozen (`InFlight`) while its network call is outstanding and removed once
// it completes. The queue is a plain data structure; timing and I/O live in
// the dispatcher.

use std::collections::VecDeque;

use powerview_api::ShadeUpdate;
use tracing::debug;

use crate::merge::{merge_position, motion_absorbs};
use crate::model::{Motion, PositionKind, PositionMap, ShadeId};

/// A single caller-requested change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    /// Move one axis of the shade.
    Position {
        kind: PositionKind,
        value: u16,
        user_initiated: bool,
    },
    /// Send a one-word motion command.
    Motion(Motion),
    /// Ask the hub to re-poll the shade and report fresh state.
    Refresh,
}

impl Update {
    pub fn kind(&self) -> JobKind {
        match self {
            Self::Position { .. } => JobKind::Positions,
            Self::Motion(motion) => JobKind::Motion(*motion),
            Self::Refresh => JobKind::Refresh,
        }
    }
}

/// Merge discriminator: only entries of the same kind and shade merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobKind {
    Positions,
    Motion(Motion),
    Refresh,
}

/// Accumulated work for one queue entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    Positions(PositionMap),
    Motion(Motion),
    Refresh,
}

impl Job {
    fn from_update(update: Update) -> Self {
        match update {
            Update::Position { kind, value, .. } => Self::Positions(PositionMap::single(kind, value)),
            Update::Motion(motion) => Self::Motion(motion),
            Update::Refresh => Self::Refresh,
        }
    }

    pub fn kind(&self) -> JobKind {
        match self {
            Self::Positions(_) => JobKind::Positions,
            Self::Motion(motion) => JobKind::Motion(*motion),
            Self::Refresh => JobKind::Refresh,
        }
    }

    /// Fold an update of the same kind into this job.
    fn absorb(&mut self, update: Update) {
        match (self, update) {
            (
                Self::Positions(positions),
                Update::Position {
                    kind,
                    value,
                    user_initiated,
                },
            ) => merge_position(positions, kind, value, user_initiated),
            (Self::Motion(queued), Update::Motion(incoming)) => {
                debug_assert!(motion_absorbs(*queued, incoming));
            }
            (Self::Refresh, Update::Refresh) => {}
            (job, update) => unreachable!("mismatched merge of {update:?} into {job:?}"),
        }
    }

    /// The hub request that carries out this job.
    pub fn to_request(&self) -> HubRequest {
        match self {
            Self::Positions(positions) => HubRequest::Put(ShadeUpdate::Positions {
                positions: positions.to_wire(),
            }),
            Self::Motion(motion) => HubRequest::Put(ShadeUpdate::Motion { motion: *motion }),
            Self::Refresh => HubRequest::Refresh,
        }
    }
}

/// Whether an entry may still absorb updates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Waiting in the queue; merges allowed.
    Pending,
    /// Its request has been sent; the payload is frozen.
    InFlight,
}

/// A frozen snapshot of the head entry, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HubRequest {
    /// `PUT /home/shades/{id}` with this body.
    Put(ShadeUpdate),
    /// `GET /home/shades/{id}?refresh=true`.
    Refresh,
}

/// What the dispatcher sends for the head of the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub target: ShadeId,
    pub request: HubRequest,
}

/// Outcome of [`RequestQueue::enqueue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueued {
    /// A new entry was appended at the back.
    Appended,
    /// The update was folded into an existing pending entry.
    Merged,
}

/// One unit of work and everyone waiting on it.
#[derive(Debug)]
pub struct PendingRequest<W> {
    target: ShadeId,
    job: Job,
    state: EntryState,
    waiters: Vec<W>,
}

impl<W> PendingRequest<W> {
    pub fn target(&self) -> ShadeId {
        self.target
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn state(&self) -> EntryState {
        self.state
    }

    pub fn waiters(&self) -> &[W] {
        &self.waiters
    }

    /// Waiters in registration order.
    pub fn into_waiters(self) -> Vec<W> {
        self.waiters
    }

    fn accepts(&self, target: ShadeId, kind: JobKind) -> bool {
        self.state == EntryState::Pending && self.target == target && self.job.kind() == kind
    }
}

/// FIFO of pending requests, generic over the waiter type.
#[derive(Debug)]
pub struct RequestQueue<W> {
    entries: VecDeque<PendingRequest<W>>,
}

impl<W> Default for RequestQueue<W> {
    fn default() -> Self {
        Self {
            entries: VecDeque::new(),
        }
    }
}

impl<W> RequestQueue<W> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingRequest<W>> {
        self.entries.iter()
    }

    /// The entry that would be (or is being) sent next.
    pub fn head(&self) -> Option<&PendingRequest<W>> {
        self.entries.front()
    }

    /// Merge `update` into a pending entry for the same shade and job kind,
    /// or append a new entry. Either way `waiter` is registered on it.
    pub fn enqueue(&mut self, target: ShadeId, update: Update, waiter: W) -> Enqueued {
        let kind = update.kind();

        if let Some(entry) = self.entries.iter_mut().find(|e| e.accepts(target, kind)) {
            entry.job.absorb(update);
            entry.waiters.push(waiter);
            debug!(shade = %target, ?kind, waiters = entry.waiters.len(), "merged into queued request");
            return Enqueued::Merged;
        }

        self.entries.push_back(PendingRequest {
            target,
            job: Job::from_update(update),
            state: EntryState::Pending,
            waiters: vec![waiter],
        });
        debug!(shade = %target, ?kind, queued = self.entries.len(), "queued request");
        Enqueued::Appended
    }

    /// Freeze the head entry and return a snapshot of its request.
    ///
    /// Returns `None` if the queue is empty or the head is already in flight.
    /// The entry stays at the front so the queue is not considered idle, but
    /// later updates for the same shade start a new entry instead of touching it.
    pub fn begin_dispatch(&mut self) -> Option<Dispatch> {
        let head = self.entries.front_mut()?;
        if head.state == EntryState::InFlight {
            return None;
        }
        head.state = EntryState::InFlight;
        Some(Dispatch {
            target: head.target,
            request: head.job.to_request(),
        })
    }

    /// Remove the in-flight head so its waiters can be notified.
    ///
    /// Returns `None` if the head has not been dispatched.
    pub fn complete(&mut self) -> Option<PendingRequest<W>> {
        match self.entries.front() {
            Some(head) if head.state == EntryState::InFlight => self.entries.pop_front(),
            _ => None,
        }
    }

    /// Remove every entry, in queue order.
    pub fn drain(&mut self) -> impl Iterator<Item = PendingRequest<W>> + '_ {
        self.entries.drain(..)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::merge::fold_positions;
    use pretty_assertions::assert_eq;

    const SHADE: ShadeId = ShadeId(11);
    const OTHER: ShadeId = ShadeId(12);

    fn position(kind: PositionKind, value: u16, user_initiated: bool) -> Update {
        Update::Position {
            kind,
            value,
            user_initiated,
        }
    }

    #[test]
    fn repeated_position_updates_share_one_entry() {
        let updates = [
            (PositionKind::Bottom, 100, true),
            (PositionKind::Top, 20, true),
            (PositionKind::Bottom, 300, false),
            (PositionKind::Vanes, 0, false),
            (PositionKind::Bottom, 500, true),
        ];

        let mut queue = RequestQueue::new();
        for (n, (kind, value, user)) in updates.iter().copied().enumerate() {
            queue.enqueue(SHADE, position(kind, value, user), n);
        }

        assert_eq!(queue.len(), 1);
        let head = queue.head().unwrap();
        assert_eq!(head.waiters(), &[0, 1, 2, 3, 4]);

        let (first, rest) = updates.split_first().unwrap();
        let expected = fold_positions(PositionMap::single(first.0, first.1), rest.iter().copied());
        assert_eq!(head.job(), &Job::Positions(expected));
    }

    #[test]
    fn user_vanes_after_bottom_removes_bottom() {
        let mut queue = RequestQueue::new();
        queue.enqueue(SHADE, position(PositionKind::Bottom, 3, true), ());
        queue.enqueue(SHADE, position(PositionKind::Vanes, 5, true), ());

        assert_eq!(
            queue.head().unwrap().job(),
            &Job::Positions(PositionMap::single(PositionKind::Vanes, 5))
        );
    }

    #[test]
    fn derived_bottom_after_vanes_is_dropped() {
        let mut queue = RequestQueue::new();
        queue.enqueue(SHADE, position(PositionKind::Vanes, 7, true), ());
        queue.enqueue(SHADE, position(PositionKind::Bottom, 0, false), ());

        assert_eq!(
            queue.head().unwrap().job(),
            &Job::Positions(PositionMap::single(PositionKind::Vanes, 7))
        );
    }

    #[test]
    fn job_kinds_never_merge_with_each_other() {
        let mut queue = RequestQueue::new();
        assert_eq!(
            queue.enqueue(SHADE, position(PositionKind::Bottom, 1, true), 'a'),
            Enqueued::Appended
        );
        assert_eq!(queue.enqueue(SHADE, Update::Refresh, 'b'), Enqueued::Appended);
        assert_eq!(queue.enqueue(SHADE, Update::Motion(Motion::Jog), 'c'), Enqueued::Appended);
        assert_eq!(
            queue.enqueue(SHADE, Update::Motion(Motion::Calibrate), 'd'),
            Enqueued::Appended
        );
        assert_eq!(queue.enqueue(SHADE, Update::Refresh, 'e'), Enqueued::Merged);
        assert_eq!(queue.enqueue(SHADE, Update::Motion(Motion::Jog), 'f'), Enqueued::Merged);

        let kinds: Vec<_> = queue.iter().map(|e| e.job().kind()).collect();
        assert_eq!(
            kinds,
            vec![
                JobKind::Positions,
                JobKind::Refresh,
                JobKind::Motion(Motion::Jog),
                JobKind::Motion(Motion::Calibrate),
            ]
        );
        let waiters: Vec<_> = queue.iter().map(|e| e.waiters().to_vec()).collect();
        assert_eq!(waiters, vec![vec!['a'], vec!['b', 'e'], vec!['c', 'f'], vec!['d']]);
    }

    #[test]
    fn merges_keep_original_queue_position() {
        let mut queue = RequestQueue::new();
        queue.enqueue(SHADE, position(PositionKind::Bottom, 1, true), 1);
        queue.enqueue(OTHER, position(PositionKind::Bottom, 2, true), 2);
        queue.enqueue(SHADE, position(PositionKind::Top, 3, true), 3);

        let targets: Vec<_> = queue.iter().map(PendingRequest::target).collect();
        assert_eq!(targets, vec![SHADE, OTHER]);
    }

    #[test]
    fn in_flight_entry_is_frozen() {
        let mut queue = RequestQueue::new();
        queue.enqueue(SHADE, position(PositionKind::Bottom, 1, true), 1);

        let dispatch = queue.begin_dispatch().unwrap();
        assert_eq!(dispatch.target, SHADE);
        assert_eq!(
            dispatch.request,
            Job::Positions(PositionMap::single(PositionKind::Bottom, 1)).to_request()
        );
        assert_eq!(queue.head().unwrap().state(), EntryState::InFlight);

        // Same shade while in flight: a fresh entry behind the frozen one.
        assert_eq!(
            queue.enqueue(SHADE, position(PositionKind::Bottom, 2, true), 2),
            Enqueued::Appended
        );
        assert_eq!(queue.len(), 2);
        assert_eq!(
            queue.head().unwrap().job(),
            &Job::Positions(PositionMap::single(PositionKind::Bottom, 1))
        );

        // Only one dispatch at a time.
        assert!(queue.begin_dispatch().is_none());

        let done = queue.complete().unwrap();
        assert_eq!(done.into_waiters(), vec![1]);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.head().unwrap().state(), EntryState::Pending);
    }

    #[test]
    fn complete_requires_in_flight_head() {
        let mut queue = RequestQueue::new();
        assert!(queue.complete().is_none());
        assert!(queue.begin_dispatch().is_none());

        queue.enqueue(SHADE, Update::Refresh, ());
        assert!(queue.complete().is_none());
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn motion_and_refresh_requests() {
        assert_eq!(
            Job::Motion(Motion::Jog).to_request(),
            HubRequest::Put(ShadeUpdate::Motion { motion: Motion::Jog })
        );
        assert_eq!(Job::Refresh.to_request(), HubRequest::Refresh);
    }
}
