//! Problem model for supervisory-control scheduling.
//!
//! The search core is generic over [`SchedulingProblem`]: anything that can
//! supply a state graph, per-event timing ([`Scheduler`]) and resource
//! ([`Restriction`]) bookkeeping, and a supervisor [`Automaton`] can be
//! planned for.
//!
//! Two concrete problem sources ship with the crate: [`TableProblem`] for
//! hand-written automata and the [`line`](crate::line) model for serial
//! production lines. Both use the clock-based [`TimedScheduler`] and the
//! batch-scaled [`QuotaRestriction`].

mod automaton;
mod replay;
mod table;
mod timing;
mod types;

pub use automaton::Automaton;
pub use replay::{parallelism_score, replay, timed_makespan, TimedReplay};
pub use table::{NamedState, ProblemBuilder, TableProblem};
pub use timing::{EventLabel, QuotaRestriction, TimedScheduler, TimingRules};
pub use types::{
    Evaluation, Event, MakespanOracle, Restriction, Scheduler, SchedulingProblem, State,
    TransitionTable,
};
