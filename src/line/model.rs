//! Serial production line as a [`SchedulingProblem`].

use std::collections::VecDeque;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use super::state::LineState;
use crate::error::{PlanningError, Result};
use crate::problem::{
    Automaton, Event, EventLabel, QuotaRestriction, SchedulingProblem, TimedReplay,
    TimedScheduler, TimingRules, TransitionTable,
};

/// Makespan oracle for a [`ProductionLine`].
pub type LineOracle<'a> = TimedReplay<'a, ProductionLine>;

/// A line of machines in series separated by unit buffers.
///
/// Machine `i` has two events: `s{i+1}` (start, controllable) and `f{i+1}`
/// (finish, uncontrollable, fires `durations[i]` after the start). The
/// supervised plant is enumerated up front, so every state in the
/// transition table is reachable and free of buffer overflow.
///
/// # Examples
///
/// ```
/// use u_desplan::line::ProductionLine;
/// use u_desplan::problem::SchedulingProblem;
///
/// let line = ProductionLine::new(&[3.0, 2.0]).unwrap();
/// assert_eq!(line.machines(), 2);
/// assert_eq!(line.depth(), 4);
/// assert_eq!(line.state_count(), 6);
/// ```
#[derive(Debug, Clone)]
pub struct ProductionLine {
    durations: Vec<f64>,
    events: Vec<EventLabel>,
    transitions: TransitionTable<LineState, EventLabel>,
    initial: LineState,
    timing: Arc<TimingRules>,
    quotas: Vec<u32>,
    supervisor: Automaton<EventLabel>,
}

impl ProductionLine {
    /// Largest supported line.
    pub const MAX_MACHINES: usize = 16;

    /// Builds a line with one machine per processing time.
    ///
    /// # Errors
    ///
    /// [`PlanningError::InvalidConfig`] if `durations` is empty, longer
    /// than [`MAX_MACHINES`](Self::MAX_MACHINES) or holds a non-positive or
    /// non-finite time.
    pub fn new(durations: &[f64]) -> Result<Self> {
        if durations.is_empty() {
            return Err(PlanningError::InvalidConfig(
                "a line needs at least one machine".into(),
            ));
        }
        if durations.len() > Self::MAX_MACHINES {
            return Err(PlanningError::InvalidConfig(format!(
                "at most {} machines are supported, got {}",
                Self::MAX_MACHINES,
                durations.len()
            )));
        }
        if let Some(bad) = durations.iter().find(|d| !d.is_finite() || **d <= 0.0) {
            return Err(PlanningError::InvalidConfig(format!(
                "processing times must be positive and finite, got {bad}"
            )));
        }

        let events: Vec<EventLabel> = (0..durations.len())
            .flat_map(|i| {
                [
                    EventLabel::new(2 * i, format!("s{}", i + 1), true),
                    EventLabel::new(2 * i + 1, format!("f{}", i + 1), false),
                ]
            })
            .collect();

        let timing = durations
            .iter()
            .enumerate()
            .fold(TimingRules::new(events.len()), |rules, (i, d)| {
                rules.with_task(2 * i, 2 * i + 1, *d)
            });
        let quotas = events
            .iter()
            .map(|e| u32::from(e.is_controllable()))
            .collect();

        let initial = LineState::empty(durations.len());
        let (transitions, supervisor) = enumerate(&initial, &events);
        debug!(
            machines = durations.len(),
            states = supervisor.state_count(),
            transitions = supervisor.transition_count(),
            "line enumerated"
        );

        Ok(Self {
            durations: durations.to_vec(),
            events,
            transitions,
            initial,
            timing: Arc::new(timing),
            quotas,
            supervisor,
        })
    }

    /// `machines` identical machines with processing time `duration`.
    pub fn uniform(machines: usize, duration: f64) -> Result<Self> {
        Self::new(&vec![duration; machines])
    }

    /// Number of machines.
    pub fn machines(&self) -> usize {
        self.durations.len()
    }

    /// Processing time of machine `i`.
    pub fn duration(&self, i: usize) -> f64 {
        self.durations[i]
    }

    /// Start event of machine `i`.
    pub fn start_event(&self, i: usize) -> &EventLabel {
        &self.events[2 * i]
    }

    /// Finish event of machine `i`.
    pub fn finish_event(&self, i: usize) -> &EventLabel {
        &self.events[2 * i + 1]
    }

    /// Number of reachable states.
    pub fn state_count(&self) -> usize {
        self.supervisor.state_count()
    }

    /// Resolves event names such as `"s1"` or `"f2"`, skipping unknown ones.
    pub fn sequence(&self, names: &[&str]) -> Vec<EventLabel> {
        names
            .iter()
            .filter_map(|n| self.events.iter().find(|e| e.name() == *n).cloned())
            .collect()
    }

    /// Simulation oracle for this line.
    pub fn oracle(&self) -> LineOracle<'_> {
        TimedReplay::new(self)
    }
}

/// Breadth-first reachability from `initial`.
///
/// States are numbered in discovery order, so the supervisor's state 0 is
/// `initial`.
fn enumerate(
    initial: &LineState,
    events: &[EventLabel],
) -> (TransitionTable<LineState, EventLabel>, Automaton<EventLabel>) {
    let machines = events.len() / 2;
    let mut transitions: TransitionTable<LineState, EventLabel> = FxHashMap::default();
    let mut supervisor = Automaton::new(0, 1);
    let mut index: FxHashMap<LineState, usize> = FxHashMap::default();
    let mut queue = VecDeque::new();

    index.insert(initial.clone(), 0);
    queue.push_back(initial.clone());

    while let Some(state) = queue.pop_front() {
        let from = index[&state];
        for i in 0..machines {
            let moves = [
                (&events[2 * i], state.start(i)),
                (&events[2 * i + 1], state.finish(i)),
            ];
            for (event, next) in moves {
                let Some(next) = next else { continue };
                let to = match index.get(&next) {
                    Some(&to) => to,
                    None => {
                        let to = index.len();
                        index.insert(next.clone(), to);
                        queue.push_back(next.clone());
                        to
                    }
                };
                supervisor.add_transition(from, event.clone(), to);
                transitions
                    .entry(state.clone())
                    .or_default()
                    .insert(event.clone(), next);
            }
        }
    }

    (transitions, supervisor)
}

impl SchedulingProblem for ProductionLine {
    type Event = EventLabel;
    type State = LineState;
    type Scheduler = TimedScheduler;
    type Restriction = QuotaRestriction;

    fn initial_state(&self) -> &LineState {
        &self.initial
    }

    fn target_state(&self) -> &LineState {
        &self.initial
    }

    fn events(&self) -> &[EventLabel] {
        &self.events
    }

    fn transitions(&self) -> &TransitionTable<LineState, EventLabel> {
        &self.transitions
    }

    fn initial_scheduler(&self) -> TimedScheduler {
        TimedScheduler::new(Arc::clone(&self.timing))
    }

    fn initial_restriction(&self, batch_count: usize) -> QuotaRestriction {
        QuotaRestriction::new(&self.quotas, batch_count)
    }

    fn depth(&self) -> usize {
        self.events.len()
    }

    fn supervisor(&self) -> &Automaton<EventLabel> {
        &self.supervisor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{replay, MakespanOracle, Scheduler};
    use crate::search::{EngineConfig, FrontierEngine};

    #[test]
    fn test_single_machine_line() {
        let line = ProductionLine::new(&[5.0]).unwrap();
        assert_eq!(line.state_count(), 2);
        assert_eq!(line.supervisor().transition_count(), 2);
        assert_eq!(line.depth(), 2);
        assert_eq!(line.start_event(0).name(), "s1");
        assert_eq!(line.finish_event(0).name(), "f1");
    }

    #[test]
    fn test_two_machine_enumeration() {
        let line = ProductionLine::new(&[3.0, 2.0]).unwrap();
        // ., M, .|1|, .|M, M|M, .|1|M
        assert_eq!(line.state_count(), 6);
        assert_eq!(line.supervisor().transition_count(), 8);

        let cycle = line.sequence(&["s1", "f1", "s2", "f2"]);
        assert_eq!(replay(&line, &cycle).as_ref(), Some(line.initial_state()));
        assert_eq!(line.supervisor().run(&cycle), Some(0));
        assert!(replay(&line, &line.sequence(&["s2"])).is_none());
    }

    #[test]
    fn test_invalid_lines_rejected() {
        assert!(ProductionLine::new(&[]).is_err());
        assert!(ProductionLine::new(&[1.0, 0.0]).is_err());
        assert!(ProductionLine::new(&[f64::NAN]).is_err());
        assert!(ProductionLine::uniform(ProductionLine::MAX_MACHINES + 1, 1.0).is_err());
    }

    #[test]
    fn test_quotas_cover_starts_only() {
        let line = ProductionLine::new(&[3.0, 2.0]).unwrap();
        let quotas = line.initial_restriction(4);
        assert_eq!(quotas.remaining(line.start_event(0).index()), 4);
        assert_eq!(quotas.remaining(line.start_event(1).index()), 4);
        assert_eq!(quotas.remaining(line.finish_event(0).index()), 0);
        assert!(line.start_event(1).is_controllable());
        assert!(!line.finish_event(1).is_controllable());
    }

    #[test]
    fn test_scheduler_arms_finish() {
        let line = ProductionLine::new(&[3.0, 2.0]).unwrap();
        let s1 = line.start_event(0);
        let f1 = line.finish_event(0);
        let scheduler = line.initial_scheduler();
        assert!(!scheduler.is_enabled(f1));
        let scheduler = scheduler.update(s1);
        assert!(scheduler.is_enabled(f1));
        assert_eq!(scheduler.duration(f1), 3.0);
    }

    #[test]
    fn test_oracle_pipelines_two_batches() {
        let line = ProductionLine::new(&[3.0, 2.0]).unwrap();
        let eval = line
            .oracle()
            .evaluate(&line.sequence(&["s1", "s2", "s1", "s2"]));
        assert_eq!(eval.makespan, 8.0);
        assert_eq!(
            eval.sequence,
            line.sequence(&["s1", "f1", "s2", "s1", "f2", "f1", "s2", "f2"])
        );
    }

    #[test]
    fn test_engine_finds_optimal_line_schedule() {
        let line = ProductionLine::new(&[3.0, 2.0]).unwrap();
        let single = FrontierEngine::expand(&line, 1, &EngineConfig::default()).unwrap();
        assert_eq!(single.cost, 5.0);
        assert_eq!(single.sequence, line.sequence(&["s1", "f1", "s2", "f2"]));

        let double = FrontierEngine::expand(&line, 2, &EngineConfig::default()).unwrap();
        assert_eq!(double.cost, 8.0, "first machine is the bottleneck");
        assert_eq!(double.sequence.len(), 8);
    }
}
