//! Error types shared by the planning pipeline.

use thiserror::Error;

/// Errors surfaced by the search engine and the planner.
///
/// The optimizer and the feasibility repair never fail; only the frontier
/// search and configuration validation produce errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlanningError {
    /// The target state was absent from the frontier after the final layer.
    #[error("the search could not reach the target {target} within {depth_bound} layers")]
    TargetUnreachable {
        /// Debug rendering of the target state.
        target: String,
        /// Number of layers that were expanded.
        depth_bound: usize,
    },

    /// A configuration value was rejected by `validate`.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PlanningError>;
