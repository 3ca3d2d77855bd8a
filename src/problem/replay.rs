//! Sequence replay: reachability checks, parallelism scoring and a
//! simulation-based makespan oracle.

use super::types::{Evaluation, Event, MakespanOracle, Scheduler, SchedulingProblem, State};

/// Applies `sequence` to the transition table from the initial state.
///
/// Returns the final state, or `None` at the first undefined transition.
pub fn replay<P: SchedulingProblem>(problem: &P, sequence: &[P::Event]) -> Option<P::State> {
    let transitions = problem.transitions();
    sequence
        .iter()
        .try_fold(problem.initial_state().clone(), |state, event| {
            transitions.get(&state)?.get(event).cloned()
        })
}

/// Sum of the active-task counts of every visited successor state.
///
/// Returns `None` if the sequence leaves the transition table.
pub fn parallelism_score<P: SchedulingProblem>(problem: &P, sequence: &[P::Event]) -> Option<f64> {
    let transitions = problem.transitions();
    let mut state = problem.initial_state().clone();
    let mut total = 0.0;
    for event in sequence {
        state = transitions.get(&state)?.get(event)?.clone();
        total += f64::from(state.active_tasks());
    }
    Some(total)
}

/// Total scheduler time of `sequence` executed exactly as given.
///
/// Returns `None` if an event has no transition or its clock forbids it.
pub fn timed_makespan<P: SchedulingProblem>(problem: &P, sequence: &[P::Event]) -> Option<f64> {
    let transitions = problem.transitions();
    let mut state = problem.initial_state().clone();
    let mut scheduler = problem.initial_scheduler();
    let mut time = 0.0;
    for event in sequence {
        if !scheduler.is_enabled(event) {
            return None;
        }
        state = transitions.get(&state)?.get(event)?.clone();
        time += scheduler.duration(event);
        scheduler = scheduler.update(event);
    }
    Some(time)
}

/// Makespan oracle that simulates the problem's scheduler.
///
/// Only the controllable events of the input are honored, in order.
/// Whenever the next controllable event cannot fire, the uncontrollable
/// event that completes earliest is inserted instead. Once the input is
/// consumed, pending completions are drained. A sequence that gets stuck
/// evaluates to an infinite makespan.
#[derive(Debug, Clone, Copy)]
pub struct TimedReplay<'a, P> {
    problem: &'a P,
}

impl<'a, P: SchedulingProblem> TimedReplay<'a, P> {
    /// Oracle bound to `problem`.
    pub fn new(problem: &'a P) -> Self {
        Self { problem }
    }

    fn earliest_completion(
        &self,
        state: &P::State,
        scheduler: &P::Scheduler,
    ) -> Option<(P::Event, P::State)> {
        let outgoing = self.problem.transitions().get(state)?;
        self.problem
            .events()
            .iter()
            .filter(|e| !e.is_controllable() && scheduler.is_enabled(e))
            .filter_map(|e| outgoing.get(e).map(|next| (e, next)))
            .min_by(|a, b| scheduler.duration(a.0).total_cmp(&scheduler.duration(b.0)))
            .map(|(e, next)| (e.clone(), next.clone()))
    }
}

impl<P: SchedulingProblem> MakespanOracle<P::Event> for TimedReplay<'_, P> {
    fn evaluate(&self, sequence: &[P::Event]) -> Evaluation<P::Event> {
        let transitions = self.problem.transitions();
        let mut state = self.problem.initial_state().clone();
        let mut scheduler = self.problem.initial_scheduler();
        let mut time = 0.0;
        let mut executed = Vec::with_capacity(sequence.len() * 2);

        for event in sequence.iter().filter(|e| e.is_controllable()) {
            loop {
                let direct = transitions
                    .get(&state)
                    .and_then(|out| out.get(event))
                    .filter(|_| scheduler.is_enabled(event))
                    .cloned();
                if let Some(next) = direct {
                    fire(event.clone(), next, &mut state, &mut scheduler, &mut time, &mut executed);
                    break;
                }
                match self.earliest_completion(&state, &scheduler) {
                    Some((u, next)) => {
                        fire(u, next, &mut state, &mut scheduler, &mut time, &mut executed)
                    }
                    None => {
                        return Evaluation {
                            makespan: f64::INFINITY,
                            sequence: executed,
                        }
                    }
                }
            }
        }

        while let Some((u, next)) = self.earliest_completion(&state, &scheduler) {
            fire(u, next, &mut state, &mut scheduler, &mut time, &mut executed);
        }

        Evaluation {
            makespan: time,
            sequence: executed,
        }
    }
}

fn fire<S, E, Q: Scheduler<E>>(
    event: E,
    next: S,
    state: &mut S,
    scheduler: &mut Q,
    time: &mut f64,
    executed: &mut Vec<E>,
) {
    *time += scheduler.duration(&event);
    *scheduler = scheduler.update(&event);
    *state = next;
    executed.push(event);
}
