//! Schedule optimization for supervisory-controlled discrete-event systems.
//!
//! Given a controlled automaton (states, controllable and uncontrollable
//! events, per-event timing and firing quotas), computes short-makespan
//! event sequences that drive the system from its initial state to its
//! completion state for a requested number of products:
//!
//! - **Frontier search** ([`search`]): layer-by-layer expansion of the
//!   reachable state space with time-dominance or parallelism pruning,
//!   parallelized with rayon above a frontier-size threshold.
//! - **Phase composition** ([`phase`]): cuts a single-batch sequence into
//!   initial, production and final phases and stitches them into an
//!   `N`-batch pipeline schedule.
//! - **Variable Neighborhood Search** ([`vns`]): perturbs the production
//!   phase by riffling its two halves and keeps strict makespan
//!   improvements.
//! - **Feasibility repair** ([`repair`]): reconciles perturbed sequences
//!   with the supervisor by postponing or dropping events.
//! - **Planner** ([`planner`]): runs the time-optimal, parallelism or
//!   composed strategy end to end.
//!
//! # Architecture
//!
//! The core is generic over [`problem::SchedulingProblem`]; it never
//! builds automata itself. [`problem::TableProblem`] and the
//! [`line::ProductionLine`] reference model are the two bundled problem
//! sources. Logging goes through `tracing`; the library never installs a
//! subscriber.

pub mod error;
pub mod line;
pub mod phase;
pub mod planner;
pub mod problem;
pub mod repair;
pub mod search;
pub mod vns;

pub use error::{PlanningError, Result};
