//! Deterministic finite automaton with natural projection.

use std::collections::{BTreeSet, VecDeque};
use std::hash::Hash;

use rustc_hash::FxHashMap;

/// A deterministic automaton over events `E` with states numbered `0..n`.
///
/// Used as the supervisor of a [`SchedulingProblem`](super::SchedulingProblem).
/// Lookups return `Option`; an undefined transition simply means the event
/// is not allowed in that state.
#[derive(Debug, Clone)]
pub struct Automaton<E> {
    initial: usize,
    transitions: Vec<FxHashMap<E, usize>>,
}

impl<E: Clone + Eq + Hash> Automaton<E> {
    /// Creates an automaton with `state_count` states and no transitions.
    pub fn new(initial: usize, state_count: usize) -> Self {
        let count = state_count.max(initial + 1);
        Self {
            initial,
            transitions: vec![FxHashMap::default(); count],
        }
    }

    /// Adds `from --event--> to`, growing the state set if needed.
    ///
    /// A second transition for the same `(from, event)` pair replaces the
    /// first.
    pub fn add_transition(&mut self, from: usize, event: E, to: usize) {
        let needed = from.max(to) + 1;
        if self.transitions.len() < needed {
            self.transitions.resize_with(needed, FxHashMap::default);
        }
        self.transitions[from].insert(event, to);
    }

    /// The initial state.
    pub fn initial_state(&self) -> usize {
        self.initial
    }

    /// Number of states.
    pub fn state_count(&self) -> usize {
        self.transitions.len()
    }

    /// Number of transitions.
    pub fn transition_count(&self) -> usize {
        self.transitions.iter().map(FxHashMap::len).sum()
    }

    /// Successor of `state` under `event`, if defined.
    pub fn step(&self, state: usize, event: &E) -> Option<usize> {
        self.transitions.get(state)?.get(event).copied()
    }

    /// Runs `sequence` from the initial state; `None` on the first
    /// undefined transition.
    pub fn run<'a, I>(&self, sequence: I) -> Option<usize>
    where
        I: IntoIterator<Item = &'a E>,
        E: 'a,
    {
        sequence
            .into_iter()
            .try_fold(self.initial, |state, event| self.step(state, event))
    }

    /// Natural projection erasing every event for which `erase` holds.
    ///
    /// The result is determinized by subset construction: each projected
    /// state stands for the set of original states reachable through erased
    /// events.
    pub fn project<F>(&self, erase: F) -> Automaton<E>
    where
        F: Fn(&E) -> bool,
    {
        let closure = |seed: BTreeSet<usize>| -> BTreeSet<usize> {
            let mut closed = seed.clone();
            let mut stack: Vec<usize> = seed.into_iter().collect();
            while let Some(state) = stack.pop() {
                for (event, &to) in &self.transitions[state] {
                    if erase(event) && closed.insert(to) {
                        stack.push(to);
                    }
                }
            }
            closed
        };

        let start = closure(BTreeSet::from([self.initial]));
        let mut index: FxHashMap<BTreeSet<usize>, usize> = FxHashMap::default();
        index.insert(start.clone(), 0);
        let mut subsets = vec![start];
        let mut projected = Automaton::new(0, 1);
        let mut queue = VecDeque::from([0usize]);

        while let Some(id) = queue.pop_front() {
            // Kept events in first-seen order so numbering is deterministic.
            let mut order: Vec<E> = Vec::new();
            let mut targets: FxHashMap<E, BTreeSet<usize>> = FxHashMap::default();
            for &state in &subsets[id] {
                for (event, &to) in &self.transitions[state] {
                    if erase(event) {
                        continue;
                    }
                    let entry = targets.entry(event.clone()).or_insert_with(|| {
                        order.push(event.clone());
                        BTreeSet::new()
                    });
                    entry.insert(to);
                }
            }

            for event in order {
                let Some(seed) = targets.remove(&event) else {
                    continue;
                };
                let subset = closure(seed);
                let next = match index.get(&subset) {
                    Some(&existing) => existing,
                    None => {
                        let fresh = subsets.len();
                        index.insert(subset.clone(), fresh);
                        subsets.push(subset);
                        queue.push_back(fresh);
                        fresh
                    }
                };
                projected.add_transition(id, event, next);
            }
        }

        projected
    }
}
