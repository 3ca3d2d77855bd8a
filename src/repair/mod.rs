//! Feasibility repair against the supervisor.
//!
//! A perturbed controllable sequence may violate the orderings the
//! supervisor allows. [`FeasibilityRepair`] walks the sequence through the
//! supervisor with its uncontrollable events erased (natural projection):
//!
//! 1. An event whose transition is defined is consumed.
//! 2. Otherwise it is postponed (FIFO).
//! 3. After every input event the postponed queue is rescanned in order,
//!    consuming every event that has become possible, until a pass makes no
//!    progress.
//!
//! Events still postponed when the input runs out are dropped. The output
//! is never longer than the input; [`RepairOutcome::dropped`] lists what was
//! lost.

use tracing::debug;

use crate::problem::{Automaton, Event};

/// Result of a repair pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepairOutcome<E> {
    /// The feasible sequence.
    pub sequence: Vec<E>,
    /// Events that never became possible, in postponement order.
    pub dropped: Vec<E>,
}

/// Repairs sequences against one supervisor.
///
/// The projection is computed once at construction, so a single repairer
/// can serve every candidate of an optimization run.
#[derive(Debug, Clone)]
pub struct FeasibilityRepair<E> {
    projected: Automaton<E>,
}

impl<E: Event> FeasibilityRepair<E> {
    /// Projects `supervisor` onto its controllable events.
    pub fn new(supervisor: &Automaton<E>) -> Self {
        Self {
            projected: supervisor.project(|e| !e.is_controllable()),
        }
    }

    /// The projected automaton the repair walks.
    pub fn automaton(&self) -> &Automaton<E> {
        &self.projected
    }

    /// Returns the repaired sequence.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_desplan::problem::{ProblemBuilder, SchedulingProblem};
    /// use u_desplan::repair::FeasibilityRepair;
    ///
    /// let problem = ProblemBuilder::new()
    ///     .controllable("a")
    ///     .controllable("b")
    ///     .state("0", 0)
    ///     .state("1", 0)
    ///     .state("2", 0)
    ///     .transition("0", "a", "1")
    ///     .transition("1", "b", "2")
    ///     .build()
    ///     .unwrap();
    /// let repair = FeasibilityRepair::new(problem.supervisor());
    /// let fixed = repair.repair(&problem.sequence(&["b", "a"]));
    /// assert_eq!(fixed, problem.sequence(&["a", "b"]));
    /// ```
    pub fn repair(&self, candidate: &[E]) -> Vec<E> {
        self.repair_with_report(candidate).sequence
    }

    /// Like [`repair`](Self::repair), also reporting dropped events.
    pub fn repair_with_report(&self, candidate: &[E]) -> RepairOutcome<E> {
        let mut state = self.projected.initial_state();
        let mut sequence = Vec::with_capacity(candidate.len());
        let mut postponed: Vec<E> = Vec::new();

        for event in candidate {
            match self.projected.step(state, event) {
                Some(next) => {
                    state = next;
                    sequence.push(event.clone());
                }
                None => postponed.push(event.clone()),
            }

            loop {
                let mut progressed = false;
                let mut i = 0;
                while i < postponed.len() {
                    match self.projected.step(state, &postponed[i]) {
                        Some(next) => {
                            state = next;
                            sequence.push(postponed.remove(i));
                            progressed = true;
                        }
                        None => i += 1,
                    }
                }
                if !progressed {
                    break;
                }
            }
        }

        if !postponed.is_empty() {
            debug!(dropped = postponed.len(), "repair dropped infeasible events");
        }
        RepairOutcome {
            sequence,
            dropped: postponed,
        }
    }
}
