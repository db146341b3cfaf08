//! Timed events and the pending-event queue
//!
//! The queue is a min-heap on `(at, seq)`. `seq` counts insertions, so events
//! scheduled for the same instant come out in the order they went in.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

use super::state::{BodyId, WallId};
use super::{Millis, SimTime};

/// Registry index of an active object
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub usize);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "object#{}", self.0)
    }
}

/// Insertion sequence number, unique per queue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(pub u64);

/// Keyboard input understood by the painter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
}

/// Event payloads. `elapsed` is the simulated time since the event that
/// scheduled this one; the handler advances bodies by exactly that much.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    WallCollision {
        body: BodyId,
        wall: WallId,
        elapsed: Millis,
    },
    BodyCollision {
        a: BodyId,
        b: BodyId,
        elapsed: Millis,
    },
    PaintTick {
        elapsed: Millis,
    },
    InputKey(Key),
}

impl EventKind {
    /// Collision and paint events are re-armed after each one is handled;
    /// at most one of them may be pending per target.
    pub fn is_rearm(&self) -> bool {
        !matches!(self, EventKind::InputKey(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            EventKind::WallCollision { .. } => "wall-collision",
            EventKind::BodyCollision { .. } => "body-collision",
            EventKind::PaintTick { .. } => "paint",
            EventKind::InputKey(_) => "key",
        }
    }
}

/// A scheduled occurrence addressed to one active object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    pub target: ObjectId,
    /// Absolute instant the event becomes due
    pub at: SimTime,
    pub kind: EventKind,
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    // Reversed so the max-heap yields the earliest, then oldest
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .at
            .cmp(&self.at)
            .then_with(|| other.id.cmp(&self.id))
    }
}

/// Pending events
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<Event>,
    next_seq: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an event due at `at`
    pub fn schedule(&mut self, target: ObjectId, at: SimTime, kind: EventKind) -> EventId {
        let id = EventId(self.next_seq);
        self.next_seq += 1;
        self.heap.push(Event {
            id,
            target,
            at,
            kind,
        });
        id
    }

    /// Remove and return the earliest event due at or before `now`
    pub fn pop_next_due(&mut self, now: SimTime) -> Option<Event> {
        if self.heap.peek()?.at <= now {
            self.heap.pop()
        } else {
            None
        }
    }

    /// Remove and return the earliest event regardless of the clock
    pub fn pop_next(&mut self) -> Option<Event> {
        self.heap.pop()
    }

    pub fn peek(&self) -> Option<&Event> {
        self.heap.peek()
    }

    pub fn peek_time(&self) -> Option<SimTime> {
        self.heap.peek().map(|e| e.at)
    }

    /// Drop every pending collision/paint event of `target`; returns how many
    pub fn cancel_rearm(&mut self, target: ObjectId) -> usize {
        let before = self.heap.len();
        self.heap
            .retain(|e| !(e.target == target && e.kind.is_rearm()));
        before - self.heap.len()
    }

    /// Pending collision/paint events of `target`
    pub fn pending_rearm(&self, target: ObjectId) -> usize {
        self.heap
            .iter()
            .filter(|e| e.target == target && e.kind.is_rearm())
            .count()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}
