//! End-to-end planning.
//!
//! [`Planner::plan`] runs one of three strategies:
//!
//! - [`Algorithm::TimeOptimal`]: frontier search over every product with
//!   time dominance.
//! - [`Algorithm::Parallelism`]: frontier search over every product
//!   maximizing the accumulated number of parallel tasks.
//! - [`Algorithm::Composed`]: frontier search over a short batch string,
//!   phase composition up to the requested batch count, feasibility repair
//!   and Variable Neighborhood Search.
//!
//! Every outcome carries its makespan and parallelism score so strategies
//! can be compared side by side.

mod config;
mod runner;
mod types;

pub use config::PlannerConfig;
pub use runner::Planner;
pub use types::{Algorithm, PlanOutcome};
