//! Explicit, table-defined scheduling problems.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::automaton::Automaton;
use super::timing::{EventLabel, QuotaRestriction, TimedScheduler, TimingRules};
use super::types::{Event, SchedulingProblem, State, TransitionTable};
use crate::error::{PlanningError, Result};

/// An indexed, named state. Equality and hashing use the index only.
#[derive(Clone)]
pub struct NamedState {
    index: usize,
    name: Arc<str>,
    active_tasks: u32,
}

impl NamedState {
    /// Dense index of the state.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for NamedState {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for NamedState {}

impl Hash for NamedState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl fmt::Debug for NamedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl State for NamedState {
    fn active_tasks(&self) -> u32 {
        self.active_tasks
    }
}

/// A problem whose states, events and transitions are listed explicitly.
///
/// The supervisor is the transition graph itself.
///
/// # Examples
///
/// ```
/// use u_desplan::problem::{ProblemBuilder, SchedulingProblem};
///
/// let problem = ProblemBuilder::new()
///     .controllable("x")
///     .uncontrollable("y")
///     .state("A", 0)
///     .state("B", 1)
///     .state("C", 0)
///     .transition("A", "x", "B")
///     .transition("B", "y", "C")
///     .initial("A")
///     .target("C")
///     .depth(2)
///     .build()
///     .unwrap();
/// assert_eq!(problem.depth(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct TableProblem {
    events: Vec<EventLabel>,
    states: Vec<NamedState>,
    transitions: TransitionTable<NamedState, EventLabel>,
    initial: NamedState,
    target: NamedState,
    depth: usize,
    timing: Arc<TimingRules>,
    quotas: Vec<u32>,
    supervisor: Automaton<EventLabel>,
}

impl TableProblem {
    /// Looks up an event by name.
    pub fn event(&self, name: &str) -> Option<&EventLabel> {
        self.events.iter().find(|e| e.name() == name)
    }

    /// Looks up a state by name.
    pub fn state(&self, name: &str) -> Option<&NamedState> {
        self.states.iter().find(|s| s.name() == name)
    }

    /// Resolves a list of event names, skipping unknown ones.
    pub fn sequence(&self, names: &[&str]) -> Vec<EventLabel> {
        names.iter().filter_map(|n| self.event(n).cloned()).collect()
    }
}

impl SchedulingProblem for TableProblem {
    type Event = EventLabel;
    type State = NamedState;
    type Scheduler = TimedScheduler;
    type Restriction = QuotaRestriction;

    fn initial_state(&self) -> &NamedState {
        &self.initial
    }

    fn target_state(&self) -> &NamedState {
        &self.target
    }

    fn events(&self) -> &[EventLabel] {
        &self.events
    }

    fn transitions(&self) -> &TransitionTable<NamedState, EventLabel> {
        &self.transitions
    }

    fn initial_scheduler(&self) -> TimedScheduler {
        TimedScheduler::new(Arc::clone(&self.timing))
    }

    fn initial_restriction(&self, batch_count: usize) -> QuotaRestriction {
        QuotaRestriction::new(&self.quotas, batch_count)
    }

    fn depth(&self) -> usize {
        self.depth
    }

    fn supervisor(&self) -> &Automaton<EventLabel> {
        &self.supervisor
    }
}

/// Builder for [`TableProblem`].
///
/// Names are resolved in [`build`](Self::build); unknown names are
/// reported as [`PlanningError::InvalidConfig`].
#[derive(Debug, Clone, Default)]
pub struct ProblemBuilder {
    events: Vec<(String, bool)>,
    states: Vec<(String, u32)>,
    transitions: Vec<(String, String, String)>,
    tasks: Vec<(String, String, f64)>,
    quotas: Vec<(String, u32)>,
    initial: Option<String>,
    target: Option<String>,
    depth: Option<usize>,
}

impl ProblemBuilder {
    /// Empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a controllable event.
    pub fn controllable(mut self, name: &str) -> Self {
        self.events.push((name.to_owned(), true));
        self
    }

    /// Declares an uncontrollable event.
    pub fn uncontrollable(mut self, name: &str) -> Self {
        self.events.push((name.to_owned(), false));
        self
    }

    /// Declares a state with its active-task count.
    pub fn state(mut self, name: &str, active_tasks: u32) -> Self {
        self.states.push((name.to_owned(), active_tasks));
        self
    }

    /// Adds `from --event--> to`.
    pub fn transition(mut self, from: &str, event: &str, to: &str) -> Self {
        self.transitions
            .push((from.to_owned(), event.to_owned(), to.to_owned()));
        self
    }

    /// Firing `start` starts a task that completes with `finish` after
    /// `duration`.
    pub fn task(mut self, start: &str, finish: &str, duration: f64) -> Self {
        self.tasks
            .push((start.to_owned(), finish.to_owned(), duration));
        self
    }

    /// Per-batch firing quota of a controllable event (default 1).
    pub fn quota(mut self, event: &str, per_batch: u32) -> Self {
        self.quotas.push((event.to_owned(), per_batch));
        self
    }

    /// Initial state (default: first declared state).
    pub fn initial(mut self, name: &str) -> Self {
        self.initial = Some(name.to_owned());
        self
    }

    /// Target state (default: the initial state).
    pub fn target(mut self, name: &str) -> Self {
        self.target = Some(name.to_owned());
        self
    }

    /// Events per product (default: number of declared events).
    pub fn depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Resolves all names and builds the problem.
    pub fn build(self) -> Result<TableProblem> {
        if self.states.is_empty() {
            return Err(PlanningError::InvalidConfig(
                "a problem needs at least one state".into(),
            ));
        }

        let events: Vec<EventLabel> = self
            .events
            .iter()
            .enumerate()
            .map(|(i, (name, c))| EventLabel::new(i, name.as_str(), *c))
            .collect();
        let states: Vec<NamedState> = self
            .states
            .iter()
            .enumerate()
            .map(|(i, (name, active))| NamedState {
                index: i,
                name: Arc::from(name.as_str()),
                active_tasks: *active,
            })
            .collect();

        let event_ix: FxHashMap<&str, usize> = self
            .events
            .iter()
            .enumerate()
            .map(|(i, (n, _))| (n.as_str(), i))
            .collect();
        let state_ix: FxHashMap<&str, usize> = self
            .states
            .iter()
            .enumerate()
            .map(|(i, (n, _))| (n.as_str(), i))
            .collect();
        let event_of = |name: &str| {
            event_ix
                .get(name)
                .copied()
                .ok_or_else(|| PlanningError::InvalidConfig(format!("unknown event `{name}`")))
        };
        let state_of = |name: &str| {
            state_ix
                .get(name)
                .copied()
                .ok_or_else(|| PlanningError::InvalidConfig(format!("unknown state `{name}`")))
        };

        let initial = match &self.initial {
            Some(name) => state_of(name)?,
            None => 0,
        };
        let target = match &self.target {
            Some(name) => state_of(name)?,
            None => initial,
        };

        let mut transitions: TransitionTable<NamedState, EventLabel> = FxHashMap::default();
        let mut supervisor = Automaton::new(initial, states.len());
        for (from, event, to) in &self.transitions {
            let (q1, e, q2) = (state_of(from)?, event_of(event)?, state_of(to)?);
            transitions
                .entry(states[q1].clone())
                .or_default()
                .insert(events[e].clone(), states[q2].clone());
            supervisor.add_transition(q1, events[e].clone(), q2);
        }

        let mut timing = TimingRules::new(events.len());
        for (start, finish, duration) in &self.tasks {
            timing = timing.with_task(event_of(start)?, event_of(finish)?, *duration);
        }

        let mut quotas: Vec<u32> = events
            .iter()
            .map(|e| u32::from(e.is_controllable()))
            .collect();
        for (event, per_batch) in &self.quotas {
            quotas[event_of(event)?] = *per_batch;
        }

        Ok(TableProblem {
            depth: self.depth.unwrap_or(events.len()),
            initial: states[initial].clone(),
            target: states[target].clone(),
            timing: Arc::new(timing),
            events,
            states,
            transitions,
            quotas,
            supervisor,
        })
    }
}
