//! Algorithm variants and plan results.

use std::fmt;
use std::time::Duration;

/// Planning strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Algorithm {
    /// Exact frontier search over all products, minimizing time.
    TimeOptimal,
    /// Exact frontier search over all products, maximizing the
    /// accumulated number of parallel tasks.
    Parallelism,
    /// Exact search over a short batch string, phase composition up to the
    /// requested batch size, then neighborhood search.
    Composed,
}

impl Algorithm {
    /// Every variant, in reporting order.
    pub const ALL: [Algorithm; 3] = [
        Algorithm::TimeOptimal,
        Algorithm::Parallelism,
        Algorithm::Composed,
    ];

    /// Short kebab-case name.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::TimeOptimal => "time-optimal",
            Algorithm::Parallelism => "parallelism",
            Algorithm::Composed => "composed",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A planned schedule with its figures of merit.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct PlanOutcome<E> {
    /// Strategy that produced the schedule.
    pub algorithm: Algorithm,
    /// Number of products scheduled.
    pub batch_count: usize,
    /// The schedule, controllable and uncontrollable events interleaved.
    pub schedule: Vec<E>,
    /// Completion time (`f64::INFINITY` if the schedule deadlocks).
    pub makespan: f64,
    /// Accumulated active-task count over the visited states.
    pub parallelism: f64,
    /// Whether the schedule replays to the target state with every
    /// product's controllable events present. Composition can fall short
    /// of this for some batch counts; such plans are kept and flagged.
    pub complete: bool,
    /// Wall-clock planning time.
    pub elapsed: Duration,
}
