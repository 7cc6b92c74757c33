//! Event types and sinks for observing strokes.
//!
//! The engine reports everything the UI shell may want to show through
//! [`StrokeEvent`]s: commits, skipped events, created groups and single-line
//! status messages. Sinks collect, forward or drop them.
use crate::scene::{NodeRef, WorldTransform};
use crate::stroke::engine::ToolMode;
use crate::stroke::groups::GroupScope;
use crate::stroke::placement::Placement;

/// Why a pointer event produced no commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No target surface under the cursor.
    NoHit,
    /// The flux gate has not reopened yet.
    Flux,
}

/// Describes events emitted by the stroke engine.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum StrokeEvent {
    /// Emitted on press, before anything is committed.
    StrokeStarted { stroke: u64, mode: ToolMode },

    /// Emitted on release or cancel.
    StrokeFinished {
        stroke: u64,
        /// Objects committed during the stroke.
        committed: usize,
        cancelled: bool,
    },

    /// Emitted when a new object was committed.
    Placed { stroke: u64, placement: Placement },

    /// Emitted when an already committed object got a new transform
    /// (place-mode drag or spin, ramp pass).
    Moved {
        stroke: u64,
        node: NodeRef,
        transform: WorldTransform,
    },

    /// Emitted when a pointer event was ignored.
    Skipped { stroke: u64, reason: SkipReason },

    /// Emitted when an output group was created.
    GroupCreated { scope: GroupScope, group: NodeRef },

    /// Single-line message for the status field.
    Status { message: String },
}

/// A generic event sink that accepts [`StrokeEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: StrokeEvent);

    fn send_many<I>(&mut self, events: I)
    where
        Self: Sized,
        I: IntoIterator<Item = StrokeEvent>,
    {
        for e in events {
            self.send(e);
        }
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: StrokeEvent) {}
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(StrokeEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(StrokeEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(StrokeEvent),
{
    #[inline]
    fn send(&mut self, event: StrokeEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects all events in a `Vec`.
#[derive(Default)]
pub struct VecSink {
    events: Vec<StrokeEvent>,
}

impl VecSink {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn into_inner(self) -> Vec<StrokeEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[StrokeEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Committed placements, in commit order.
    pub fn placements(&self) -> impl Iterator<Item = &Placement> {
        self.events.iter().filter_map(|e| match e {
            StrokeEvent::Placed { placement, .. } => Some(placement),
            _ => None,
        })
    }

    /// Status messages, in emission order.
    pub fn statuses(&self) -> impl Iterator<Item = &str> {
        self.events.iter().filter_map(|e| match e {
            StrokeEvent::Status { message } => Some(message.as_str()),
            _ => None,
        })
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: StrokeEvent) {
        self.events.push(event);
    }
}

/// Fan-out sink that forwards each event to all contained sinks.
pub struct MultiSink<S: EventSink> {
    pub(crate) sinks: Vec<S>,
}

impl<S: EventSink> MultiSink<S> {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn with_sinks(sinks: Vec<S>) -> Self {
        Self { sinks }
    }

    pub fn push(&mut self, sink: S) {
        self.sinks.push(sink);
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }
}

impl<S: EventSink> Default for MultiSink<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: EventSink> EventSink for MultiSink<S> {
    fn send(&mut self, event: StrokeEvent) {
        let Some((last, rest)) = self.sinks.split_last_mut() else {
            return;
        };
        for sink in rest {
            sink.send(event.clone());
        }
        last.send(event);
    }
}
