//! Event types and sinks for observing placement runs.
//!
//! [`crate::place::runner::Placer`] emits [`PlaceEvent`]s for every rule it solves and
//! every regeneration it runs. Sinks decide per [`PlaceEventKind`] whether they want an
//! event at all, so unobserved runs do not build event payloads.
use crate::error::Error;
use crate::grid::Placement;
use crate::place::allocate::Direction;
use crate::place::rules::Rule;
use crate::place::runner::{GenerationReport, PlacementOutcome, PlacementRequest};

/// Describes events emitted by placement operations.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum PlaceEvent {
    /// Emitted when a regeneration starts, after the output layer was cleared.
    RegenerationStarted {
        /// Number of steps in the plan.
        steps: usize,
    },

    /// Emitted when every step of a regeneration ran.
    RegenerationFinished {
        /// Per-step outcomes.
        report: GenerationReport,
    },

    /// Emitted before a rule is compiled and solved.
    RuleStarted {
        /// The rule being placed.
        rule: Rule,
        /// What to place.
        request: PlacementRequest,
    },

    /// Emitted once the candidate set of a rule is known.
    CandidatesEnumerated {
        rule: Rule,
        /// Number of predicates the rule compiled to.
        predicates: usize,
        /// Distinct candidate cells after occupancy filtering.
        candidates: usize,
    },

    /// Emitted when a direction filter was applied.
    DirectionFiltered {
        rule: Rule,
        direction: Direction,
        /// Candidates before filtering.
        before: usize,
        /// Candidates after filtering.
        after: usize,
    },

    /// Emitted for every item written to the output layer.
    PlacementMade {
        rule: Rule,
        placement: Placement,
    },

    /// Emitted when a rule finished with at least one candidate.
    RuleFinished {
        outcome: PlacementOutcome,
    },

    /// Emitted when a rule could not be placed.
    RuleFailed {
        rule: Rule,
        error: Error,
    },

    /// Non-fatal warning generated during placement.
    Warning {
        /// Context string (e.g. rule name).
        context: String,
        /// Human-readable message.
        message: String,
    },
}

/// Discriminant of [`PlaceEvent`], used by sinks to filter events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceEventKind {
    RegenerationStarted,
    RegenerationFinished,
    RuleStarted,
    CandidatesEnumerated,
    DirectionFiltered,
    PlacementMade,
    RuleFinished,
    RuleFailed,
    Warning,
}

impl PlaceEvent {
    pub fn kind(&self) -> PlaceEventKind {
        match self {
            PlaceEvent::RegenerationStarted { .. } => PlaceEventKind::RegenerationStarted,
            PlaceEvent::RegenerationFinished { .. } => PlaceEventKind::RegenerationFinished,
            PlaceEvent::RuleStarted { .. } => PlaceEventKind::RuleStarted,
            PlaceEvent::CandidatesEnumerated { .. } => PlaceEventKind::CandidatesEnumerated,
            PlaceEvent::DirectionFiltered { .. } => PlaceEventKind::DirectionFiltered,
            PlaceEvent::PlacementMade { .. } => PlaceEventKind::PlacementMade,
            PlaceEvent::RuleFinished { .. } => PlaceEventKind::RuleFinished,
            PlaceEvent::RuleFailed { .. } => PlaceEventKind::RuleFailed,
            PlaceEvent::Warning { .. } => PlaceEventKind::Warning,
        }
    }
}

/// A generic event sink that accepts [`PlaceEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: PlaceEvent);

    /// Returns `false` to skip building events of `kind`.
    fn wants(&self, _kind: PlaceEventKind) -> bool {
        true
    }

    fn send_many<I>(&mut self, events: I)
    where
        Self: Sized,
        I: IntoIterator<Item = PlaceEvent>,
    {
        for e in events {
            self.send(e);
        }
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: PlaceEvent) {}

    #[inline]
    fn wants(&self, _kind: PlaceEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(PlaceEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(PlaceEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(PlaceEvent),
{
    #[inline]
    fn send(&mut self, event: PlaceEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects events in a `Vec`, optionally restricted to some kinds.
#[derive(Default)]
pub struct VecSink {
    events: Vec<PlaceEvent>,
    only: Option<Vec<PlaceEventKind>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect only events of the given kinds.
    pub fn only(kinds: impl IntoIterator<Item = PlaceEventKind>) -> Self {
        Self {
            events: Vec::new(),
            only: Some(kinds.into_iter().collect()),
        }
    }

    pub fn into_inner(self) -> Vec<PlaceEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[PlaceEvent] {
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

    /// Number of collected events of `kind`.
    pub fn count(&self, kind: PlaceEventKind) -> usize {
        self.events.iter().filter(|e| e.kind() == kind).count()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: PlaceEvent) {
        if self.wants(event.kind()) {
            self.events.push(event);
        }
    }

    fn wants(&self, kind: PlaceEventKind) -> bool {
        self.only.as_ref().is_none_or(|kinds| kinds.contains(&kind))
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

    pub fn sinks(&self) -> &[S] {
        &self.sinks
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
    fn send(&mut self, event: PlaceEvent) {
        let kind = event.kind();
        let mut targets: Vec<&mut S> = self.sinks.iter_mut().filter(|s| s.wants(kind)).collect();
        let Some(last) = targets.pop() else {
            return;
        };
        for sink in targets {
            sink.send(event.clone());
        }
        last.send(event);
    }

    fn wants(&self, kind: PlaceEventKind) -> bool {
        self.sinks.iter().any(|s| s.wants(kind))
    }
}
