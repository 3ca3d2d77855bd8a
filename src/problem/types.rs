//! Core traits describing a controlled discrete-event system.

use std::fmt::Debug;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use super::automaton::Automaton;

/// An event of the controlled automaton.
///
/// Events are compared by identity. Controllable events may be disabled by
/// the control logic; uncontrollable ones (typically task completions) may
/// not.
pub trait Event: Clone + Eq + Hash + Debug + Send + Sync {
    /// Whether the control logic can prevent this event.
    fn is_controllable(&self) -> bool;
}

/// A state of the controlled automaton.
pub trait State: Clone + Eq + Hash + Debug + Send + Sync {
    /// Number of tasks running in parallel while the system is in this state.
    fn active_tasks(&self) -> u32;
}

/// Per-event timing bookkeeping advanced as events fire.
///
/// `PartialEq` is the scheduler *signature*: two schedulers are equal iff
/// every event's enabled flag and remaining duration match. The frontier
/// search uses it as its dominance key.
pub trait Scheduler<E>: Clone + PartialEq + Send + Sync {
    /// Whether `event` may fire under the current timing state.
    fn is_enabled(&self, event: &E) -> bool;

    /// Time that elapses when `event` fires next.
    fn duration(&self, event: &E) -> f64;

    /// Returns the scheduler after `event` has fired.
    fn update(&self, event: &E) -> Self;
}

/// Per-event resource availability, advanced only on controllable events.
pub trait Restriction<E>: Clone + Send + Sync {
    /// Whether `event` still has capacity left.
    fn is_enabled(&self, event: &E) -> bool;

    /// Returns the restriction after `event` has fired.
    fn update(&self, event: &E) -> Self;
}

/// State → (event → successor) lookup. Missing pairs mean "not enabled".
pub type TransitionTable<Q, E> = FxHashMap<Q, FxHashMap<E, Q>>;

/// A scheduling problem instance.
///
/// Implementors supply the state graph, the initial timing and resource
/// bookkeeping, and the supervisor used for feasibility repair. All data is
/// read-only during search, hence the `Send + Sync` bound: the frontier
/// engine shares the problem across rayon workers.
pub trait SchedulingProblem: Send + Sync {
    /// Event type.
    type Event: Event;
    /// State type.
    type State: State;
    /// Timing bookkeeping.
    type Scheduler: Scheduler<Self::Event>;
    /// Resource bookkeeping.
    type Restriction: Restriction<Self::Event>;

    /// The state the plant starts in.
    fn initial_state(&self) -> &Self::State;

    /// The completion state every schedule must reach.
    fn target_state(&self) -> &Self::State;

    /// Every event of the alphabet, in a stable order.
    fn events(&self) -> &[Self::Event];

    /// The (supervised) transition relation.
    fn transitions(&self) -> &TransitionTable<Self::State, Self::Event>;

    /// Timing state before any event fires.
    fn initial_scheduler(&self) -> Self::Scheduler;

    /// Resource state sized for `batch_count` products.
    fn initial_restriction(&self, batch_count: usize) -> Self::Restriction;

    /// Number of events needed to complete one product.
    fn depth(&self) -> usize;

    /// The supervisor automaton encoding legal event orderings.
    fn supervisor(&self) -> &Automaton<Self::Event>;
}

/// Result of evaluating a sequence with a [`MakespanOracle`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Evaluation<E> {
    /// Total completion time. `f64::INFINITY` if the sequence deadlocks.
    pub makespan: f64,
    /// The sequence as actually executed, including inserted events.
    pub sequence: Vec<E>,
}

/// Time-evaluation oracle.
///
/// Must be a pure function of its input so the optimizer stays
/// reproducible.
pub trait MakespanOracle<E>: Sync {
    /// Evaluates `sequence` and returns its makespan and canonical form.
    fn evaluate(&self, sequence: &[E]) -> Evaluation<E>;
}
