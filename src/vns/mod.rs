//! Variable Neighborhood Search over multi-batch schedules.
//!
//! Starting from a [`PhaseTemplate`](crate::phase::PhaseTemplate), the
//! optimizer repeatedly shakes the production phase with a random riffle of
//! its two halves, rebuilds and repairs the full schedule, and keeps the
//! candidate whenever the makespan oracle reports a strict improvement.
//!
//! # References
//!
//! - Mladenović, N. & Hansen, P. (1997). "Variable neighborhood search",
//!   *Computers & Operations Research* 24(11), 1097-1100.

mod config;
mod neighborhood;
mod runner;

pub use config::VnsConfig;
pub use neighborhood::riffle;
pub use runner::{VnsOptimizer, VnsOutcome};
