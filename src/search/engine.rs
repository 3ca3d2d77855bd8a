//! Breadth-first frontier expansion with dominance pruning.
//!
//! # Algorithm
//!
//! The search runs for exactly `batch_count * problem.depth()` layers. Each
//! layer maps every `(state, context)` pair of the frontier to its
//! successors and merges them into the next frontier:
//!
//! 1. Enabled events = (restriction-enabled ∪ uncontrollable)
//!    ∩ scheduler-enabled ∩ outgoing transitions of the state.
//! 2. With `controllable_first`, uncontrollable events are dropped whenever
//!    a controllable one is enabled.
//! 3. Each successor context extends the sequence, accumulates cost, and
//!    advances the scheduler (always) and the restriction (controllable
//!    events only).
//! 4. Successors are merged per [`MergePolicy`].
//!
//! # Concurrency
//!
//! Above `parallel_threshold` entries a layer is expanded with rayon. The
//! next frontier is then a two-level structure: a map lock guarding
//! `state → list handle`, and one lock per candidate list. A worker holds the
//! map lock only to fetch or insert a handle and the list lock only for the
//! check-and-merge; it never holds two locks at once. The merge is
//! order-independent in cost, so both paths yield the same best cost.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rayon::prelude::*;
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use super::config::{EngineConfig, MergePolicy};
use super::types::{Path, SearchContext, SearchOutcome};
use crate::error::{PlanningError, Result};
use crate::problem::{Event, Restriction, Scheduler, SchedulingProblem, State};

type Context<P> = SearchContext<
    <P as SchedulingProblem>::Event,
    <P as SchedulingProblem>::Scheduler,
    <P as SchedulingProblem>::Restriction,
>;

type Frontier<P> = FxHashMap<<P as SchedulingProblem>::State, Vec<Context<P>>>;

type SharedFrontier<P> =
    Mutex<FxHashMap<<P as SchedulingProblem>::State, Arc<Mutex<Vec<Context<P>>>>>>;

/// Frontier expansion engine.
pub struct FrontierEngine;

impl FrontierEngine {
    /// Searches for the best sequence completing `batch_count` products.
    ///
    /// The depth bound is `batch_count * problem.depth()`.
    ///
    /// # Errors
    ///
    /// [`PlanningError::TargetUnreachable`] if the target state is not in
    /// the final frontier.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_desplan::problem::ProblemBuilder;
    /// use u_desplan::search::{EngineConfig, FrontierEngine};
    ///
    /// let problem = ProblemBuilder::new()
    ///     .controllable("x")
    ///     .uncontrollable("y")
    ///     .state("A", 0)
    ///     .state("B", 1)
    ///     .state("C", 0)
    ///     .transition("A", "x", "B")
    ///     .transition("B", "y", "C")
    ///     .target("C")
    ///     .depth(2)
    ///     .build()
    ///     .unwrap();
    ///
    /// let outcome = FrontierEngine::expand(&problem, 1, &EngineConfig::default()).unwrap();
    /// assert_eq!(outcome.sequence, problem.sequence(&["x", "y"]));
    /// ```
    pub fn expand<P: SchedulingProblem>(
        problem: &P,
        batch_count: usize,
        config: &EngineConfig,
    ) -> Result<SearchOutcome<P::Event>> {
        let depth_bound = batch_count.saturating_mul(problem.depth());
        Self::expand_to_depth(problem, batch_count, depth_bound, config)
    }

    /// Like [`expand`](Self::expand) with an explicit layer count.
    #[tracing::instrument(
        skip_all,
        fields(batch_count = batch_count, depth_bound = depth_bound, policy = ?config.policy)
    )]
    pub fn expand_to_depth<P: SchedulingProblem>(
        problem: &P,
        batch_count: usize,
        depth_bound: usize,
        config: &EngineConfig,
    ) -> Result<SearchOutcome<P::Event>> {
        let mut frontier: Frontier<P> = FxHashMap::default();
        frontier.insert(
            problem.initial_state().clone(),
            vec![SearchContext {
                sequence: Path::new(),
                scheduler: problem.initial_scheduler(),
                restriction: problem.initial_restriction(batch_count),
                cost: 0.0,
            }],
        );
        let mut peak_frontier = 1;

        for layer in 0..depth_bound {
            let parallel = frontier.len() > config.parallel_threshold;
            frontier = if parallel {
                expand_parallel(problem, &frontier, config)
            } else {
                expand_sequential(problem, &frontier, config)
            };
            peak_frontier = peak_frontier.max(frontier.len());
            debug!(layer, frontier = frontier.len(), parallel, "layer expanded");

            if frontier.is_empty() {
                break;
            }
        }

        let target = problem.target_state();
        let best = frontier
            .remove(target)
            .and_then(|contexts| select_best(contexts, config.policy))
            .ok_or_else(|| PlanningError::TargetUnreachable {
                target: format!("{target:?}"),
                depth_bound,
            })?;

        info!(cost = best.cost, peak_frontier, "target reached");
        Ok(SearchOutcome {
            sequence: best.sequence.to_vec(),
            cost: best.cost,
            depth_bound,
            peak_frontier,
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Successor contexts of one `(state, context)` pair.
fn successors<P: SchedulingProblem>(
    problem: &P,
    state: &P::State,
    context: &Context<P>,
    config: &EngineConfig,
) -> Vec<(P::State, Context<P>)> {
    let Some(outgoing) = problem.transitions().get(state) else {
        return Vec::new();
    };

    let mut enabled: Vec<(&P::Event, &P::State)> = problem
        .events()
        .iter()
        .filter(|e| !e.is_controllable() || context.restriction.is_enabled(e))
        .filter(|e| context.scheduler.is_enabled(e))
        .filter_map(|e| outgoing.get(e).map(|next| (e, next)))
        .collect();

    if config.controllable_first && enabled.iter().any(|(e, _)| e.is_controllable()) {
        enabled.retain(|(e, _)| e.is_controllable());
    }

    enabled
        .into_iter()
        .map(|(event, next)| {
            let cost = match config.policy {
                MergePolicy::TimeDominance => context.cost + context.scheduler.duration(event),
                MergePolicy::Parallelism => context.cost + f64::from(next.active_tasks()),
            };
            let restriction = if event.is_controllable() {
                context.restriction.update(event)
            } else {
                context.restriction.clone()
            };
            let successor = SearchContext {
                sequence: context.sequence.push(event.clone()),
                scheduler: context.scheduler.update(event),
                restriction,
                cost,
            };
            (next.clone(), successor)
        })
        .collect()
}

/// Merges `candidate` into the contexts already recorded for one state.
pub(crate) fn merge_into<E, S: PartialEq, R>(
    contexts: &mut Vec<SearchContext<E, S, R>>,
    candidate: SearchContext<E, S, R>,
    policy: MergePolicy,
) {
    match policy {
        MergePolicy::TimeDominance => {
            match contexts
                .iter_mut()
                .find(|c| c.scheduler == candidate.scheduler)
            {
                Some(incumbent) => {
                    if policy.improves(candidate.cost, incumbent.cost) {
                        *incumbent = candidate;
                    }
                }
                None => contexts.push(candidate),
            }
        }
        MergePolicy::Parallelism => match contexts.first_mut() {
            Some(incumbent) => {
                if policy.improves(candidate.cost, incumbent.cost) {
                    *incumbent = candidate;
                }
            }
            None => contexts.push(candidate),
        },
    }
}

fn select_best<E, S, R>(
    contexts: Vec<SearchContext<E, S, R>>,
    policy: MergePolicy,
) -> Option<SearchContext<E, S, R>> {
    contexts.into_iter().reduce(|best, c| {
        if policy.improves(c.cost, best.cost) {
            c
        } else {
            best
        }
    })
}

fn expand_sequential<P: SchedulingProblem>(
    problem: &P,
    frontier: &Frontier<P>,
    config: &EngineConfig,
) -> Frontier<P> {
    let mut next: Frontier<P> = FxHashMap::default();
    for (state, contexts) in frontier {
        for context in contexts {
            for (successor, candidate) in successors(problem, state, context, config) {
                merge_into(next.entry(successor).or_default(), candidate, config.policy);
            }
        }
    }
    next
}

fn expand_parallel<P: SchedulingProblem>(
    problem: &P,
    frontier: &Frontier<P>,
    config: &EngineConfig,
) -> Frontier<P> {
    let shared: SharedFrontier<P> = Mutex::new(FxHashMap::default());

    frontier.par_iter().for_each(|(state, contexts)| {
        for context in contexts {
            for (successor, candidate) in successors(problem, state, context, config) {
                let slot = {
                    let mut index = lock(&shared);
                    Arc::clone(index.entry(successor).or_default())
                };
                let mut list = lock(&slot);
                merge_into(&mut list, candidate, config.policy);
            }
        }
    });

    shared
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner)
        .into_iter()
        .map(|(state, slot)| {
            let contexts = match Arc::try_unwrap(slot) {
                Ok(list) => list.into_inner().unwrap_or_else(PoisonError::into_inner),
                Err(still_shared) => lock(&still_shared).clone(),
            };
            (state, contexts)
        })
        .collect()
}
