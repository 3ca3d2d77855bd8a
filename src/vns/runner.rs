//! Variable Neighborhood Search over phase-composed schedules.
//!
//! # Algorithm
//!
//! 1. Evaluate the composer template: this is the incumbent.
//! 2. For each outer iteration, for `k = 1..=k_max`:
//!    a. **Shaking**: riffle the two halves of the production phase
//!    b. **Rebuild**: reassemble the template around the riffled phase
//!    c. **Repair**: make the candidate feasible for the supervisor; a
//!    candidate that loses events in repair is rejected unevaluated
//!    d. **Move or not**: accept on strict makespan improvement and start
//!    the next outer iteration; otherwise try the next `k`
//! 3. An outer iteration without acceptance counts towards
//!    `max_no_improvement`; the search stops when that budget or
//!    `max_iterations` is exhausted.
//!
//! Acceptance is greedy. The makespan history is therefore non-increasing.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use super::config::VnsConfig;
use super::neighborhood::riffle;
use crate::phase::PhaseTemplate;
use crate::problem::{Evaluation, Event, MakespanOracle};
use crate::repair::FeasibilityRepair;

/// Result of an optimizer run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct VnsOutcome<E> {
    /// Best schedule found, in the oracle's canonical form.
    pub schedule: Vec<E>,
    /// Its makespan.
    pub makespan: f64,
    /// Outer iterations executed.
    pub iterations: usize,
    /// Oracle calls, including the initial evaluation.
    pub evaluations: usize,
    /// Candidates discarded because repair had to drop events.
    pub rejected: usize,
    /// Outer iteration that produced the best schedule (0 if the template
    /// was never improved).
    pub best_iteration: usize,
    /// Makespan after the initial evaluation and after each outer
    /// iteration.
    pub makespan_history: Vec<f64>,
}

/// Neighborhood optimizer for multi-batch schedules.
pub struct VnsOptimizer;

impl VnsOptimizer {
    /// Optimizes the `batch_count`-batch schedule built from `template`.
    ///
    /// The random source is seeded from `config.seed` (random if `None`).
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid (call [`VnsConfig::validate`]
    /// first to get a descriptive error).
    pub fn optimize<E, O>(
        template: &PhaseTemplate<E>,
        batch_count: usize,
        oracle: &O,
        repair: &FeasibilityRepair<E>,
        config: &VnsConfig,
    ) -> VnsOutcome<E>
    where
        E: Event,
        O: MakespanOracle<E>,
    {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };
        Self::optimize_with_rng(template, batch_count, oracle, repair, config, &mut rng)
    }

    /// Like [`optimize`](Self::optimize) with an injected random source.
    #[tracing::instrument(skip_all, fields(batch_count = batch_count))]
    pub fn optimize_with_rng<E, O, R>(
        template: &PhaseTemplate<E>,
        batch_count: usize,
        oracle: &O,
        repair: &FeasibilityRepair<E>,
        config: &VnsConfig,
        rng: &mut R,
    ) -> VnsOutcome<E>
    where
        E: Event,
        O: MakespanOracle<E>,
        R: Rng,
    {
        config.validate().expect("invalid VnsConfig");

        let Evaluation {
            makespan: mut current_makespan,
            sequence: mut current,
        } = oracle.evaluate(&template.assemble(batch_count));

        let (lead, trail) = template.production.split_at(template.half_len());
        let mut makespan_history = Vec::with_capacity(config.max_iterations + 1);
        makespan_history.push(current_makespan);
        let mut evaluations = 1;
        let mut rejected = 0;
        let mut best_iteration = 0;
        let mut no_improve_count = 0;
        let mut iterations = 0;

        for outer in 0..config.max_iterations {
            if no_improve_count >= config.max_no_improvement {
                break;
            }
            iterations += 1;
            let mut improved = false;

            for k in 1..=config.k_max {
                let (production, pattern) = riffle(lead, trail, rng);
                let candidate = template.assemble_with(&production, &pattern, batch_count);
                let repaired = repair.repair_with_report(&candidate);
                if !repaired.dropped.is_empty() {
                    debug!(outer, k, dropped = repaired.dropped.len(), "neighbor rejected");
                    rejected += 1;
                    continue;
                }
                let evaluation = oracle.evaluate(&repaired.sequence);
                evaluations += 1;

                if evaluation.makespan < current_makespan {
                    debug!(outer, k, makespan = evaluation.makespan, "neighbor accepted");
                    current = evaluation.sequence;
                    current_makespan = evaluation.makespan;
                    best_iteration = outer + 1;
                    improved = true;
                    break;
                }
            }

            if improved {
                no_improve_count = 0;
            } else {
                no_improve_count += 1;
            }
            makespan_history.push(current_makespan);
        }

        info!(
            makespan = current_makespan,
            iterations,
            evaluations,
            rejected,
            "optimization finished"
        );
        VnsOutcome {
            schedule: current,
            makespan: current_makespan,
            iterations,
            evaluations,
            rejected,
            best_iteration,
            makespan_history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::Automaton;

    #[derive(Debug, Clone, PartialEq, Eq, Hash)]
    struct Job(u32);

    impl Event for Job {
        fn is_controllable(&self) -> bool {
            true
        }
    }

    /// Weighted completion: earlier positions are cheaper, so large jobs
    /// want to come first.
    struct WeightedCompletion;

    impl MakespanOracle<Job> for WeightedCompletion {
        fn evaluate(&self, sequence: &[Job]) -> Evaluation<Job> {
            let makespan = sequence
                .iter()
                .enumerate()
                .map(|(i, j)| (i as f64 + 1.0) / (f64::from(j.0) + 1.0))
                .sum();
            Evaluation {
                makespan,
                sequence: sequence.to_vec(),
            }
        }
    }

    struct Constant;

    impl MakespanOracle<Job> for Constant {
        fn evaluate(&self, sequence: &[Job]) -> Evaluation<Job> {
            Evaluation {
                makespan: 1.0,
                sequence: sequence.to_vec(),
            }
        }
    }

    fn jobs(n: u32) -> Vec<Job> {
        (0..n).map(Job).collect()
    }

    /// Supervisor that allows every job anywhere.
    fn permissive(n: u32) -> FeasibilityRepair<Job> {
        let mut a = Automaton::new(0, 1);
        for j in jobs(n) {
            a.add_transition(0, j, 0);
        }
        FeasibilityRepair::new(&a)
    }

    #[test]
    fn test_vns_history_non_increasing() {
        let template = PhaseTemplate::split(&jobs(8));
        let config = VnsConfig::default().with_max_iterations(30).with_seed(42);
        let result =
            VnsOptimizer::optimize(&template, 3, &WeightedCompletion, &permissive(8), &config);

        for window in result.makespan_history.windows(2) {
            assert!(
                window[1] <= window[0],
                "makespan history should be non-increasing: {} > {}",
                window[1],
                window[0]
            );
        }
        assert_eq!(result.makespan, *result.makespan_history.last().unwrap());
    }

    #[test]
    fn test_vns_never_worse_than_template() {
        let template = PhaseTemplate::split(&jobs(6));
        let initial = WeightedCompletion.evaluate(&template.assemble(4)).makespan;
        let config = VnsConfig::default().with_seed(7);
        let result =
            VnsOptimizer::optimize(&template, 4, &WeightedCompletion, &permissive(6), &config);
        assert!(result.makespan <= initial);
    }

    #[test]
    fn test_vns_reproducible_with_seed() {
        let template = PhaseTemplate::split(&jobs(8));
        let config = VnsConfig::default().with_seed(11);
        let a = VnsOptimizer::optimize(&template, 5, &WeightedCompletion, &permissive(8), &config);
        let b = VnsOptimizer::optimize(&template, 5, &WeightedCompletion, &permissive(8), &config);
        assert_eq!(a, b);
    }

    #[test]
    fn test_vns_stagnation_termination() {
        let template = PhaseTemplate::split(&jobs(6));
        let config = VnsConfig::default()
            .with_max_iterations(10_000)
            .with_max_no_improvement(3)
            .with_k_max(2)
            .with_seed(1);
        let result = VnsOptimizer::optimize(&template, 3, &Constant, &permissive(6), &config);

        assert_eq!(result.iterations, 3);
        assert_eq!(result.evaluations, 1 + 3 * 2);
        assert_eq!(result.best_iteration, 0);
        assert_eq!(result.rejected, 0);
        assert_eq!(result.makespan_history, vec![1.0; 4]);
    }

    #[test]
    fn test_vns_rejects_truncated_candidates() {
        // Only the template order completes; moving job 3 ahead of job 2
        // enters a dead end and repair drops the remainder. Truncated
        // candidates would score lower under WeightedCompletion.
        let template = PhaseTemplate::split(&jobs(4));
        let word = template.assemble(2);
        assert_eq!(word.len(), 8);

        let mut supervisor = Automaton::new(0, 10);
        for (i, job) in word.iter().enumerate() {
            supervisor.add_transition(i, job.clone(), i + 1);
        }
        supervisor.add_transition(2, Job(3), 9);
        let repair = FeasibilityRepair::new(&supervisor);

        let config = VnsConfig::default().with_seed(9);
        let result = VnsOptimizer::optimize(&template, 2, &WeightedCompletion, &repair, &config);
        assert_eq!(result.schedule, word);
        assert_eq!(result.best_iteration, 0);
        assert!(result.rejected > 0, "dead-end neighbors must be discarded");
    }

    #[test]
    fn test_vns_injected_rng() {
        let template = PhaseTemplate::split(&jobs(8));
        let config = VnsConfig::default();
        let mut rng_a = StdRng::seed_from_u64(5);
        let mut rng_b = StdRng::seed_from_u64(5);
        let repair = permissive(8);
        let oracle = WeightedCompletion;
        let a =
            VnsOptimizer::optimize_with_rng(&template, 3, &oracle, &repair, &config, &mut rng_a);
        let b =
            VnsOptimizer::optimize_with_rng(&template, 3, &oracle, &repair, &config, &mut rng_b);
        assert_eq!(a.schedule, b.schedule);
    }

    #[test]
    #[should_panic(expected = "invalid VnsConfig")]
    fn test_vns_rejects_invalid_config() {
        let template = PhaseTemplate::split(&jobs(4));
        let config = VnsConfig::default().with_k_max(0);
        VnsOptimizer::optimize(&template, 2, &Constant, &permissive(4), &config);
    }
}
