//! Planner: wires search, composition, repair and optimization together.

use std::time::Instant;

use tracing::{info, warn};

use super::config::PlannerConfig;
use super::types::{Algorithm, PlanOutcome};
use crate::error::{PlanningError, Result};
use crate::phase::PhaseTemplate;
use crate::problem::{
    parallelism_score, replay, timed_makespan, Event, SchedulingProblem, TimedReplay,
};
use crate::repair::FeasibilityRepair;
use crate::search::{FrontierEngine, MergePolicy};
use crate::vns::VnsOptimizer;

/// Runs one [`Algorithm`] against a problem.
pub struct Planner;

impl Planner {
    /// Plans `batch_count` products of `problem` with `algorithm`.
    ///
    /// # Errors
    ///
    /// - [`PlanningError::InvalidConfig`] if `batch_count` is zero,
    ///   `config` fails validation, or the composed strategy is asked for a
    ///   batch count that is not a multiple of `config.batch_string`.
    /// - [`PlanningError::TargetUnreachable`] if the frontier search fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_desplan::line::ProductionLine;
    /// use u_desplan::planner::{Algorithm, Planner, PlannerConfig};
    ///
    /// let line = ProductionLine::new(&[3.0, 2.0]).unwrap();
    /// let config = PlannerConfig::default();
    /// let plan = Planner::plan(&line, Algorithm::TimeOptimal, 2, &config).unwrap();
    /// assert_eq!(plan.makespan, 8.0);
    /// assert!(plan.complete);
    /// ```
    #[tracing::instrument(skip_all, fields(algorithm = %algorithm, batch_count = batch_count))]
    pub fn plan<P: SchedulingProblem>(
        problem: &P,
        algorithm: Algorithm,
        batch_count: usize,
        config: &PlannerConfig,
    ) -> Result<PlanOutcome<P::Event>> {
        if batch_count == 0 {
            return Err(PlanningError::InvalidConfig(
                "batch_count must be at least 1".into(),
            ));
        }
        config.validate().map_err(PlanningError::InvalidConfig)?;

        let start = Instant::now();
        let (schedule, makespan, complete) = match algorithm {
            Algorithm::TimeOptimal => {
                Self::exact(problem, batch_count, MergePolicy::TimeDominance, config)?
            }
            Algorithm::Parallelism => {
                Self::exact(problem, batch_count, MergePolicy::Parallelism, config)?
            }
            Algorithm::Composed => Self::composed(problem, batch_count, config)?,
        };
        let parallelism = parallelism_score(problem, &schedule).unwrap_or(0.0);
        let elapsed = start.elapsed();
        if !complete {
            warn!(
                batch_count,
                events = schedule.len(),
                "schedule does not complete every product"
            );
        }

        info!(
            makespan,
            parallelism,
            events = schedule.len(),
            elapsed_ms = elapsed.as_secs_f64() * 1e3,
            "plan finished"
        );
        Ok(PlanOutcome {
            algorithm,
            batch_count,
            schedule,
            makespan,
            parallelism,
            complete,
            elapsed,
        })
    }

    fn exact<P: SchedulingProblem>(
        problem: &P,
        batch_count: usize,
        policy: MergePolicy,
        config: &PlannerConfig,
    ) -> Result<(Vec<P::Event>, f64, bool)> {
        let engine = config.engine.clone().with_policy(policy);
        let outcome = FrontierEngine::expand(problem, batch_count, &engine)?;
        let makespan = timed_makespan(problem, &outcome.sequence).unwrap_or(f64::INFINITY);
        let complete = reaches_target(problem, &outcome.sequence);
        Ok((outcome.sequence, makespan, complete))
    }

    fn composed<P: SchedulingProblem>(
        problem: &P,
        batch_count: usize,
        config: &PlannerConfig,
    ) -> Result<(Vec<P::Event>, f64, bool)> {
        // The composer works in units of `batch_string` products.
        if batch_count % config.batch_string != 0 {
            return Err(PlanningError::InvalidConfig(format!(
                "batch_count {batch_count} is not a multiple of batch_string {}",
                config.batch_string
            )));
        }
        let units = batch_count / config.batch_string;

        let engine = config.engine.clone().with_policy(MergePolicy::TimeDominance);
        let base = FrontierEngine::expand(problem, config.batch_string, &engine)?;
        if units == 1 {
            let makespan = timed_makespan(problem, &base.sequence).unwrap_or(f64::INFINITY);
            let complete = reaches_target(problem, &base.sequence);
            return Ok((base.sequence, makespan, complete));
        }

        let controllable = base.controllable_sequence();
        let template = PhaseTemplate::split(&controllable);
        let oracle = TimedReplay::new(problem);
        let repair = FeasibilityRepair::new(problem.supervisor());
        let outcome = VnsOptimizer::optimize(&template, units, &oracle, &repair, &config.vns);

        let starts = outcome
            .schedule
            .iter()
            .filter(|e| e.is_controllable())
            .count();
        let complete =
            starts == units * controllable.len() && reaches_target(problem, &outcome.schedule);
        Ok((outcome.schedule, outcome.makespan, complete))
    }
}

/// Whether `schedule` replays from the initial state to the target.
fn reaches_target<P: SchedulingProblem>(problem: &P, schedule: &[P::Event]) -> bool {
    replay(problem, schedule).as_ref() == Some(problem.target_state())
}
